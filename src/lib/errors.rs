use std::path::PathBuf;

use thiserror::Error;

use crate::report::UploadReport;


#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("File name is not valid UTF-8: `{0}`")]
    NotUtf8(PathBuf),
    #[error("File name `{0}` does not end with `.blocks`")]
    MissingSuffix(String),
    #[error("File name `{0}` has no `-` between y and block count")]
    MissingHyphen(String),
    #[error("Invalid digit group `{1}` for {0}")]
    InvalidDigits(&'static str, String),
    #[error("Path `{0}` does not end in a file name")]
    NoFileName(PathBuf),
    #[error("Block file `{0}` has no parent directory")]
    NoParent(PathBuf),
    #[error("Parent directory of `{0}` is not a `<z>.z` slab directory")]
    BadSlabDir(PathBuf)
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Block root does not exist or is not a directory: `{0}`")]
    RootNotFound(PathBuf),
    #[error("Cannot walk block root: `{0}`")]
    Walk(#[source] walkdir::Error),
    #[error("Malformed block file `{0}`: `{1}`")]
    Malformed(PathBuf, #[source] DecodeError)
}

#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("DVID endpoint field `{0}` must not be empty")]
    Empty(&'static str)
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Cannot read block file `{0}`: `{1}`")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("Request to `{0}` failed: `{1}`")]
    Transport(String, #[source] reqwest::Error),
    #[error("Server rejected `{url}` with status {status}: `{body}`")]
    Status {
        url: String,
        status: u16,
        body: String
    },
    #[error("Cannot build HTTP client: `{0}`")]
    ClientBuild(#[source] reqwest::Error),
    #[error("Upload worker panicked")]
    WorkerPanicked
}

/// A run that stopped at a failure, with the report of everything done
/// up to that point.
#[derive(Error, Debug)]
#[error("Upload stopped early")]
pub struct UploadStopped {
    pub report: UploadReport,
    #[source]
    pub error: UploadError
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Error creating report JSON: `{0}`")]
    Serialize(String),
    #[error("Cannot write report `{0}`: `{1}`")]
    Write(PathBuf, #[source] std::io::Error)
}
