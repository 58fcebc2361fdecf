use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::errors::UploadError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Thin wrapper around a blocking HTTP client that posts block payloads.
/// Clones share one connection pool.
#[derive(Clone)]
pub struct BlockClient {
    client: Client
}

impl BlockClient {
    pub fn new(timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UploadError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Posts `body` to `url` once. Any status outside 2xx is an error.
    /// Returns the status code on success.
    pub fn post_block(&self, url: &str, body: Vec<u8>) -> Result<u16, UploadError> {
        let response = self.client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .map_err(|e| UploadError::Transport(url.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(UploadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: body.trim().to_string()
            });
        }

        Ok(status.as_u16())
    }
}
