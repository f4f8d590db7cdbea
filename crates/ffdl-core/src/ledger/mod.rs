//! Ledger (`manifest.jsonl`): append-only record of per-meeting outcomes.
//!
//! One entry per processing attempt; nothing is ever rewritten. The latest entry
//! for a record decides whether a resumed run may skip it.

mod jsonl;
mod memory;

pub use jsonl::{JsonlLedger, MANIFEST_FILE_NAME};
pub use memory::MemoryLedger;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome recorded for one processing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    Downloaded,
    Exists,
    NoVideoUrl,
    Error,
    /// Any status string this build does not know; always retried.
    #[serde(other)]
    Unrecognized,
}

impl LedgerStatus {
    /// `downloaded` and `exists` mean the file is in place; reruns may skip the record.
    pub fn is_terminal(self) -> bool {
        matches!(self, LedgerStatus::Downloaded | LedgerStatus::Exists)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LedgerStatus::Downloaded => "downloaded",
            LedgerStatus::Exists => "exists",
            LedgerStatus::NoVideoUrl => "no_video_url",
            LedgerStatus::Error => "error",
            LedgerStatus::Unrecognized => "unrecognized",
        }
    }
}

/// One manifest line: `{transcript_id, status, file?, error?, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "transcript_id")]
    pub record_id: String,
    pub status: LedgerStatus,
    #[serde(rename = "file", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(alias = "ts")]
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    fn new(record_id: &str, status: LedgerStatus) -> Self {
        Self {
            record_id: record_id.to_string(),
            status,
            file_path: None,
            error_detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn downloaded(record_id: &str, file: &Path) -> Self {
        Self::new(record_id, LedgerStatus::Downloaded).with_file(file)
    }

    pub fn exists(record_id: &str, file: &Path) -> Self {
        Self::new(record_id, LedgerStatus::Exists).with_file(file)
    }

    pub fn no_video_url(record_id: &str) -> Self {
        Self::new(record_id, LedgerStatus::NoVideoUrl)
    }

    pub fn error(record_id: &str, file: Option<&Path>, detail: impl Into<String>) -> Self {
        let mut e = Self::new(record_id, LedgerStatus::Error);
        if let Some(f) = file {
            e = e.with_file(f);
        }
        e.error_detail = Some(detail.into());
        e
    }

    fn with_file(mut self, file: &Path) -> Self {
        self.file_path = Some(file.display().to_string());
        self
    }
}

/// Durable outcome store consulted and appended by the orchestrator.
pub trait Ledger {
    /// Most recent entry for `record_id`, if any.
    fn lookup_latest(&self, record_id: &str) -> Option<&LedgerEntry>;

    /// Append one entry. Must be durable when this returns.
    fn append(&mut self, entry: LedgerEntry) -> Result<()>;
}

/// Counts of latest statuses across all records in a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub records: usize,
    pub downloaded: usize,
    pub exists: usize,
    pub no_video_url: usize,
    pub error: usize,
    pub unrecognized: usize,
    /// Ids whose latest entry is `error`, in iteration order.
    pub errored_ids: Vec<String>,
}

impl LedgerSummary {
    pub fn from_latest<'a>(latest: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        let mut s = LedgerSummary::default();
        for entry in latest {
            s.records += 1;
            match entry.status {
                LedgerStatus::Downloaded => s.downloaded += 1,
                LedgerStatus::Exists => s.exists += 1,
                LedgerStatus::NoVideoUrl => s.no_video_url += 1,
                LedgerStatus::Error => {
                    s.error += 1;
                    s.errored_ids.push(entry.record_id.clone());
                }
                LedgerStatus::Unrecognized => s.unrecognized += 1,
            }
        }
        s
    }
}
