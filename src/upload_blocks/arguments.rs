use std::{path::PathBuf, time::Duration};

use clap::Parser;

use dvidblocks::{endpoint::Endpoint, errors::EndpointError, scan::MalformedPolicy, upload::UploadOptions};

/// Uploads `<z>.z/<y>-<numblocks>.blocks` payloads to a DVID block endpoint.
#[derive(Parser, Debug)]
#[command(name = "upload-blocks", version)]
pub struct Args {
    /// DVID server base URL, e.g. http://emdata:8000
    pub server: String,

    /// UUID of the version node
    pub uuid: String,

    /// Name of the data instance
    pub name: String,

    /// Directory holding the `<z>.z` slab directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Number of concurrent uploads
    #[arg(long, short = 'j', env = "DVID_UPLOAD_JOBS", default_value_t = 1)]
    pub jobs: usize,

    /// Fail on block files that do not match `<y>-<numblocks>.blocks` instead of skipping them
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Record failed uploads and continue with the remaining blocks
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,

    /// Print the requests that would be sent without sending them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "DVID_UPLOAD_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub struct Parameters {
    pub root: PathBuf,
    pub endpoint: Endpoint,
    pub policy: MalformedPolicy,
    pub options: UploadOptions,
    pub timeout: Duration,
    pub report: Option<PathBuf>,
}

impl Args {
    pub fn into_parameters(self) -> Result<Parameters, EndpointError> {
        let endpoint = Endpoint::new(&self.server, &self.uuid, &self.name)?;
        let policy = if self.strict {
            MalformedPolicy::Strict
        } else {
            MalformedPolicy::Skip
        };

        return Ok(Parameters {
            root: self.root,
            endpoint,
            policy,
            options: UploadOptions {
                jobs: self.jobs.max(1),
                keep_going: self.keep_going,
                dry_run: self.dry_run,
            },
            timeout: Duration::from_secs(self.timeout_secs),
            report: self.report,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments_and_defaults() {
        let args = Args::try_parse_from(["upload-blocks", "emdata:8000", "abc", "labels"]).unwrap();
        let params = args.into_parameters().unwrap();
        assert_eq!(params.endpoint.server, "http://emdata:8000");
        assert_eq!(params.root, PathBuf::from("."));
        assert_eq!(params.policy, MalformedPolicy::Skip);
        assert!(!params.options.dry_run);
        assert!(params.report.is_none());
    }

    #[test]
    fn flags_map_to_parameters() {
        let args = Args::try_parse_from([
            "upload-blocks", "http://h:1", "u", "n",
            "--root", "/data", "--jobs", "8", "--strict", "--keep-going", "--report", "r.json",
        ]).unwrap();
        let params = args.into_parameters().unwrap();
        assert_eq!(params.options.jobs, 8);
        assert!(params.options.keep_going);
        assert_eq!(params.policy, MalformedPolicy::Strict);
        assert_eq!(params.report, Some(PathBuf::from("r.json")));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = Args::try_parse_from(["upload-blocks", "h", "u", "n", "--timeout-secs", "0"]);
        assert!(result.is_err());

        let args = Args::try_parse_from(["upload-blocks", "h", "u", "n", "--timeout-secs", "1"]).unwrap();
        assert_eq!(args.into_parameters().unwrap().timeout, Duration::from_secs(1));
    }

    #[test]
    fn missing_positional_is_rejected() {
        assert!(Args::try_parse_from(["upload-blocks", "h", "u"]).is_err());
    }
}
