mod parallel;
mod sequential;

use std::time::{Duration, Instant};

use log::info;

use crate::{block::BlockRef, client::BlockClient, endpoint::Endpoint,
    errors::{UploadError, UploadStopped}, report::{OutcomeStatus, UploadOutcome, UploadReport},
    scan::ScanResult};

pub use parallel::upload_parallel;
pub use sequential::upload_sequential;

#[derive(Clone, Copy, Debug)]
pub struct UploadOptions {
    /// Number of concurrent uploads. 1 keeps the run strictly sequential.
    pub jobs: usize,
    /// Record failed uploads and carry on instead of stopping at the first one.
    pub keep_going: bool,
    /// Resolve targets and read payloads without sending anything.
    pub dry_run: bool
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self { jobs: 1, keep_going: false, dry_run: false }
    }
}

/// Uploads every block found by a scan and returns the run report.
/// Entries skipped by the scan are carried over into the report, also
/// when the run stops early.
pub fn run_upload(
    scan: ScanResult,
    endpoint: &Endpoint,
    client: &BlockClient,
    options: &UploadOptions,
) -> Result<UploadReport, UploadStopped> {
    let result = if options.jobs <= 1 {
        upload_sequential(scan.blocks, endpoint, client, options)
    } else {
        upload_parallel(scan.blocks, endpoint, client, options)
    };

    match result {
        Ok(mut report) => {
            report.skipped = scan.skipped;
            Ok(report)
        },
        Err(mut stopped) => {
            stopped.report.skipped = scan.skipped;
            Err(stopped)
        }
    }
}

/// Reads one block payload and posts it.
///
/// On failure the outcome is returned next to the error, so callers that
/// keep going can still record it.
fn upload_block(
    block: BlockRef,
    endpoint: &Endpoint,
    client: &BlockClient,
    dry_run: bool,
) -> Result<UploadOutcome, (UploadOutcome, UploadError)> {
    let url = endpoint.block_url(&block);
    let payload = match block.read_payload() {
        Ok(p) => p,
        Err(e) => return Err((UploadOutcome::unreadable(block, url, e.to_string()), e))
    };

    let mut outcome = UploadOutcome::new(block, url, &payload, OutcomeStatus::DryRun, Duration::ZERO);
    if dry_run {
        info!("[dry run] POST {} ({} bytes)", outcome.url, outcome.bytes);
        return Ok(outcome);
    }

    let start = Instant::now();
    let result = client.post_block(&outcome.url, payload);
    outcome.elapsed = start.elapsed();

    match result {
        Ok(code) => {
            info!("POST {} ({} bytes) -> {}", outcome.url, outcome.bytes, code);
            outcome.status = OutcomeStatus::Posted(code);
            Ok(outcome)
        },
        Err(e) => {
            outcome.status = OutcomeStatus::Failed(e.to_string());
            Err((outcome, e))
        }
    }
}
