use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use dvidblocks::{client::BlockClient, report::UploadReport, scan::scan_blocks, upload::run_upload};

mod arguments;

use arguments::Args;


/// How a run that got through every block ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Clean,
    HadFailures
}

fn write_report(report: &UploadReport, path: &Path) -> Result<()> {
    report.write(path)?;
    info!("Wrote report to {}", path.display());
    return Ok(());
}

fn run(args: Args) -> Result<RunStatus> {
    let parameters = args.into_parameters().context("Invalid DVID endpoint")?;

    let scan = scan_blocks(&parameters.root, parameters.policy)
        .with_context(|| format!("Cannot scan {}", parameters.root.display()))?;
    info!(
        "Found {} block files under {} ({} entries skipped)",
        scan.blocks.len(),
        parameters.root.display(),
        scan.skipped.len()
    );

    let client = BlockClient::new(parameters.timeout)?;
    let report = match run_upload(scan, &parameters.endpoint, &client, &parameters.options) {
        Ok(report) => report,
        Err(stopped) => {
            // The upload error is what the caller needs to see, so a report
            // that cannot be written is only a warning here.
            if let Some(path) = &parameters.report {
                if let Err(e) = write_report(&stopped.report, path) {
                    warn!("{:#}", e);
                }
            }
            return Err(stopped.into());
        }
    };

    info!(
        "Uploaded {} blocks ({} bytes), {} failed",
        report.uploaded(),
        report.total_bytes(),
        report.failed()
    );

    if let Some(path) = &parameters.report {
        write_report(&report, path)?;
    }

    if report.failed() > 0 {
        warn!("{} uploads failed", report.failed());
        return Ok(RunStatus::HadFailures);
    }
    return Ok(RunStatus::Clean);
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(RunStatus::Clean) => ExitCode::SUCCESS,
        Ok(RunStatus::HadFailures) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dvidblocks::errors::{UploadError, UploadStopped};
    use mockito::Server;
    use tinyjson::JsonValue;

    use super::*;

    fn touch(root: &Path, rel: &str, data: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn args(server: &str, root: &Path, extra: &[&str]) -> Args {
        let root = root.to_str().unwrap();
        let mut argv = vec!["upload-blocks", server, "u", "n", "--root", root, "--timeout-secs", "5"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn read_report(path: &Path) -> JsonValue {
        fs::read_to_string(path).unwrap().parse().unwrap()
    }

    /// Two slabs: the first block is accepted, the second rejected with 500.
    fn one_good_one_bad(server: &mut Server, root: &Path) -> (mockito::Mock, mockito::Mock) {
        touch(root, "1.z/1-1.blocks", "good");
        touch(root, "2.z/1-1.blocks", "bad");
        let ok = server
            .mock("POST", "/api/node/u/n/blocks/0_1_1/1")
            .with_status(200)
            .expect(1)
            .create();
        let failing = server
            .mock("POST", "/api/node/u/n/blocks/0_1_2/1")
            .with_status(500)
            .expect(1)
            .create();
        return (ok, failing);
    }

    #[test]
    fn clean_run_succeeds() {
        let mut server = Server::new();
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "1.z/1-1.blocks", "good");
        let mock = server.mock("POST", "/api/node/u/n/blocks/0_1_1/1").with_status(200).create();

        let status = run(args(&server.url(), dir.path(), &[])).unwrap();
        assert_eq!(status, RunStatus::Clean);
        mock.assert();
    }

    #[test]
    fn keep_going_with_a_failure_is_not_clean() {
        let mut server = Server::new();
        let dir = tempfile::tempdir().unwrap();
        let (ok, failing) = one_good_one_bad(&mut server, dir.path());
        let report_path = dir.path().join("report.json");

        let status = run(args(
            &server.url(),
            dir.path(),
            &["--keep-going", "--report", report_path.to_str().unwrap()],
        )).unwrap();

        assert_eq!(status, RunStatus::HadFailures);
        ok.assert();
        failing.assert();
        let json = read_report(&report_path);
        let uploaded: Option<&f64> = json["uploaded"].get();
        let failed: Option<&f64> = json["failed"].get();
        assert_eq!(uploaded, Some(&1.0));
        assert_eq!(failed, Some(&1.0));
    }

    #[test]
    fn fail_fast_is_an_error_and_still_writes_the_report() {
        let mut server = Server::new();
        let dir = tempfile::tempdir().unwrap();
        let (ok, failing) = one_good_one_bad(&mut server, dir.path());
        touch(dir.path(), "3.z/1-1.blocks", "never sent");
        let never = server.mock("POST", "/api/node/u/n/blocks/0_1_3/1").expect(0).create();
        let report_path = dir.path().join("report.json");

        let err = run(args(
            &server.url(),
            dir.path(),
            &["--report", report_path.to_str().unwrap()],
        )).unwrap_err();

        let stopped = err.downcast_ref::<UploadStopped>().unwrap();
        assert!(matches!(stopped.error, UploadError::Status { status: 500, .. }));
        ok.assert();
        failing.assert();
        never.assert();

        let json = read_report(&report_path);
        let blocks: Option<&Vec<JsonValue>> = json["blocks"].get();
        assert_eq!(blocks.map(Vec::len), Some(2));
        let failed: Option<&f64> = json["failed"].get();
        assert_eq!(failed, Some(&1.0));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(run(args("http://127.0.0.1:9", &missing, &[])).is_err());
    }
}
