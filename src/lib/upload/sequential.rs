use log::warn;

use crate::{block::BlockRef, client::BlockClient, endpoint::Endpoint, errors::UploadStopped,
    report::UploadReport};
use super::{upload_block, UploadOptions};

/// Uploads blocks one after another in the given order.
///
/// Stops at the first failure unless `options.keep_going` is set,
/// in which case failures are only recorded in the report. A stopped run
/// still hands back the report, including the failed block.
pub fn upload_sequential(
    blocks: Vec<BlockRef>,
    endpoint: &Endpoint,
    client: &BlockClient,
    options: &UploadOptions,
) -> Result<UploadReport, UploadStopped> {
    let mut report = UploadReport::new(endpoint.clone());

    for block in blocks {
        match upload_block(block, endpoint, client, options.dry_run) {
            Ok(outcome) => report.push(outcome),
            Err((outcome, e)) => {
                warn!("Upload of {} failed: {}", outcome.block.path.display(), e);
                report.push(outcome);
                if !options.keep_going {
                    report.finish();
                    return Err(UploadStopped { report, error: e });
                }
            }
        }
    }

    report.finish();
    return Ok(report);
}
