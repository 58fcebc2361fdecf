use std::sync::Mutex;

use crossbeam::{channel, scope};
use crossbeam::channel::{Receiver, Sender};
use crossbeam::thread::Scope;
use log::{debug, warn};

use crate::{abort_token::AbortToken, block::BlockRef, client::BlockClient, endpoint::Endpoint,
    errors::{UploadError, UploadStopped}, report::{UploadOutcome, UploadReport}};
use super::{upload_block, UploadOptions};


/*
 * Pipeline, stage 1
 */

/// Spawn the feeder thread.
///
/// Sends every block to the upload workers, and stops early once the
/// abort token is raised.
fn spawn_stage_1<'scope, 'scope_env: 'scope>(
    scope: &'scope Scope<'scope_env>,
    work_tx: Sender<BlockRef>,
    blocks: Vec<BlockRef>,
    abort: AbortToken,
) {
    scope.spawn(move |_| {
        for block in blocks {
            if abort.is_aborted() {
                break;
            }
            if work_tx.send(block).is_err() {
                // All workers are gone.
                break;
            }
        }
    });
}


/*
 * Pipeline, stage 2
 */

/// Run a worker for the stage two of the pipeline.
///
/// Each worker reads a payload from disk, posts it and passes the outcome
/// on to the collector. The first failure raises the abort token unless
/// `keep_going` is set, and is parked in `first_error` for the caller.
fn run_stage_2_worker(
    work_rx: Receiver<BlockRef>,
    outcome_tx: Sender<UploadOutcome>,
    endpoint: &Endpoint,
    client: &BlockClient,
    options: &UploadOptions,
    abort: AbortToken,
    first_error: &Mutex<Option<UploadError>>,
) {
    // Ends when the feeder drops its sender and the queue is drained.
    for block in work_rx.iter() {
        if abort.is_aborted() {
            debug!("Worker stopping, upload was aborted");
            break;
        }

        let outcome = match upload_block(block, endpoint, client, options.dry_run) {
            Ok(outcome) => outcome,
            Err((outcome, e)) => {
                warn!("Upload of {} failed: {}", outcome.block.path.display(), e);
                if !options.keep_going && abort.abort() {
                    if let Ok(mut slot) = first_error.lock() {
                        *slot = Some(e);
                    }
                }
                outcome
            }
        };

        if outcome_tx.send(outcome).is_err() {
            break;
        }
    }
}

/// Spawn stage two threads for the pipeline.
///
/// See `run_stage_2_worker` for more information.
#[allow(clippy::too_many_arguments)]
fn spawn_stage_2<'env, 'scope>(
    number_of_workers: usize,
    scope: &'scope Scope<'env>,
    work_rx: Receiver<BlockRef>,
    outcome_tx: Sender<UploadOutcome>,
    endpoint: &'env Endpoint,
    client: &'env BlockClient,
    options: &'env UploadOptions,
    abort: AbortToken,
    first_error: &'env Mutex<Option<UploadError>>,
) {
    for _ in 0..number_of_workers {
        let work_rx = work_rx.clone();
        let outcome_tx = outcome_tx.clone();
        let abort = abort.clone();

        scope.spawn(move |_| {
            run_stage_2_worker(work_rx, outcome_tx, endpoint, client, options, abort, first_error)
        });
    }
}


/*
 * Entry function
 */

/// Number of upload threads to start: at least one, and never more than
/// there are blocks to upload.
fn worker_count(jobs: usize, block_count: usize) -> usize {
    return jobs.clamp(1, block_count.max(1));
}

/// Uploads blocks with `options.jobs` concurrent workers.
///
/// The pipeline has three stages: a feeder thread queues the blocks,
/// a pool of workers reads and posts them, and the calling thread
/// collects outcomes into the report. All threads live in a `crossbeam`
/// scope, so every worker has finished when this returns.
///
/// A stopped run hands back the outcomes collected so far, which may include
/// uploads that finished on other workers after the first failure.
pub fn upload_parallel(
    blocks: Vec<BlockRef>,
    endpoint: &Endpoint,
    client: &BlockClient,
    options: &UploadOptions,
) -> Result<UploadReport, UploadStopped> {
    let worker_count = worker_count(options.jobs, blocks.len());

    let (work_tx, work_rx) = channel::unbounded::<BlockRef>();
    let (outcome_tx, outcome_rx) = channel::unbounded::<UploadOutcome>();

    let abort = AbortToken::new();
    let first_error: Mutex<Option<UploadError>> = Mutex::new(None);
    let mut report = UploadReport::new(endpoint.clone());

    let pipeline = scope(|scope| {
        // Stage 1 (queue blocks)
        spawn_stage_1(scope, work_tx, blocks, abort.clone());

        // Stage 2 (read and post)
        spawn_stage_2(
            worker_count,
            scope,
            work_rx,
            outcome_tx,
            endpoint,
            client,
            options,
            abort.clone(),
            &first_error,
        );

        // Stage 3 (collect), runs until every worker dropped its sender
        for outcome in outcome_rx.iter() {
            report.push(outcome);
        }
    });

    report.finish();
    if pipeline.is_err() {
        return Err(UploadStopped { report, error: UploadError::WorkerPanicked });
    }

    let first_error = first_error.into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(error) = first_error {
        return Err(UploadStopped { report, error });
    }

    return Ok(report);
}
