use std::{collections::HashMap, fs, path::Path, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use tinyjson::JsonValue;
use xxhash_rust::xxh3;

use crate::{block::BlockRef, endpoint::Endpoint, errors::ReportError, scan::Skipped};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Server accepted the payload with this status code.
    Posted(u16),
    /// Nothing was sent.
    DryRun,
    Failed(String)
}

#[derive(Clone, Debug)]
pub struct UploadOutcome {
    pub block: BlockRef,
    pub url: String,
    pub bytes: usize,
    pub xxh3: u64,
    pub status: OutcomeStatus,
    pub elapsed: Duration
}

impl UploadOutcome {
    pub fn new(block: BlockRef, url: String, payload: &[u8], status: OutcomeStatus, elapsed: Duration) -> Self {
        return Self {
            block,
            url,
            bytes: payload.len(),
            xxh3: xxh3::xxh3_64(payload),
            status,
            elapsed
        };
    }

    /// Outcome for a block whose payload could not even be read.
    pub fn unreadable(block: BlockRef, url: String, error: String) -> Self {
        return Self {
            block,
            url,
            bytes: 0,
            xxh3: 0,
            status: OutcomeStatus::Failed(error),
            elapsed: Duration::ZERO
        };
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }

    pub fn to_json(&self) -> JsonValue {
        let mut hm: HashMap<String, JsonValue> = HashMap::new();
        hm.insert("path".to_string(), self.block.path.to_string_lossy().to_string().into());
        hm.insert("coord".to_string(), self.block.coord().to_json());
        hm.insert("numBlocks".to_string(), (self.block.num_blocks as f64).into());
        hm.insert("url".to_string(), self.url.clone().into());
        hm.insert("bytes".to_string(), (self.bytes as f64).into());
        hm.insert("xxh3".to_string(), format!("{:016x}", self.xxh3).into());
        hm.insert("elapsedMs".to_string(), (self.elapsed.as_millis() as f64).into());
        match &self.status {
            OutcomeStatus::Posted(code) => {
                hm.insert("status".to_string(), (*code as f64).into());
            },
            OutcomeStatus::DryRun => {
                hm.insert("status".to_string(), "dry-run".to_string().into());
            },
            OutcomeStatus::Failed(e) => {
                hm.insert("error".to_string(), e.clone().into());
            }
        }
        return hm.into();
    }
}

/// Everything that happened during one upload run.
#[derive(Debug)]
pub struct UploadReport {
    pub endpoint: Endpoint,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<UploadOutcome>,
    pub skipped: Vec<Skipped>
}

impl UploadReport {
    pub fn new(endpoint: Endpoint) -> Self {
        return Self {
            endpoint,
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
            skipped: Vec::new()
        };
    }

    pub fn push(&mut self, outcome: UploadOutcome) {
        self.outcomes.push(outcome);
    }

    /// Stamps the finish time and puts outcomes in grid order.
    pub fn finish(&mut self) {
        self.outcomes.sort_by_key(|o| (o.block.coord().zyx(), o.block.num_blocks));
        self.finished_at = Some(Utc::now());
    }

    pub fn uploaded(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o.status, OutcomeStatus::Posted(_))).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn total_bytes(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failed()).map(|o| o.bytes).sum()
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ReportError> {
        let mut endpoint: HashMap<String, JsonValue> = HashMap::new();
        endpoint.insert("server".to_string(), JsonValue::from(self.endpoint.server.clone()));
        endpoint.insert("uuid".to_string(), JsonValue::from(self.endpoint.uuid.clone()));
        endpoint.insert("instance".to_string(), JsonValue::from(self.endpoint.instance.clone()));

        let blocks: Vec<JsonValue> = self.outcomes.iter().map(|o| o.to_json()).collect();
        let skipped: Vec<JsonValue> = self.skipped.iter().map(|s| {
            let mut hm = HashMap::new();
            hm.insert("path".to_string(), JsonValue::from(s.path.to_string_lossy().to_string()));
            hm.insert("reason".to_string(), JsonValue::from(s.reason.clone()));
            JsonValue::from(hm)
        }).collect();

        let mut report: HashMap<String, JsonValue> = HashMap::new();
        report.insert("endpoint".to_string(), endpoint.into());
        report.insert("startedAt".to_string(), self.started_at.to_rfc3339_opts(SecondsFormat::Millis, true).into());
        if let Some(finished_at) = self.finished_at {
            report.insert("finishedAt".to_string(), finished_at.to_rfc3339_opts(SecondsFormat::Millis, true).into());
        }
        report.insert("uploaded".to_string(), (self.uploaded() as f64).into());
        report.insert("failed".to_string(), (self.failed() as f64).into());
        report.insert("bytes".to_string(), (self.total_bytes() as f64).into());
        report.insert("blocks".to_string(), blocks.into());
        report.insert("skipped".to_string(), skipped.into());

        let v = JsonValue::from(report);
        let content = v.stringify().map_err(|e| ReportError::Serialize(e.to_string()))?;
        return Ok(content.into_bytes());
    }

    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let content = self.to_json()?;
        fs::write(path, content).map_err(|e| ReportError::Write(path.to_path_buf(), e))
    }
}
