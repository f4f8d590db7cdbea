use std::fmt;
use std::path::PathBuf;

/// Terminal state of one record within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Latest ledger entry is terminal and resume is on; nothing was attempted.
    Skipped,
    Downloaded { path: PathBuf, bytes: u64 },
    Exists { path: PathBuf },
    NoVideoUrl,
    Error { detail: String },
    /// Dry run: a transfer to `path` would have been attempted.
    WouldDownload { path: PathBuf },
}

impl RecordOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RecordOutcome::Skipped => "skipped",
            RecordOutcome::Downloaded { .. } => "downloaded",
            RecordOutcome::Exists { .. } => "exists",
            RecordOutcome::NoVideoUrl => "no_video_url",
            RecordOutcome::Error { .. } => "error",
            RecordOutcome::WouldDownload { .. } => "would_download",
        }
    }
}

/// Counts per outcome for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub seen: u64,
    pub skipped: u64,
    pub downloaded: u64,
    pub exists: u64,
    pub no_video_url: u64,
    pub errors: u64,
    pub would_download: u64,
    pub bytes_transferred: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.seen += 1;
        match outcome {
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Downloaded { bytes, .. } => {
                self.downloaded += 1;
                self.bytes_transferred += bytes;
            }
            RecordOutcome::Exists { .. } => self.exists += 1,
            RecordOutcome::NoVideoUrl => self.no_video_url += 1,
            RecordOutcome::Error { .. } => self.errors += 1,
            RecordOutcome::WouldDownload { .. } => self.would_download += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seen={} skipped={} downloaded={} exists={} no_video_url={} error={}",
            self.seen, self.skipped, self.downloaded, self.exists, self.no_video_url, self.errors
        )?;
        if self.would_download > 0 {
            write!(f, " would_download={}", self.would_download)?;
        }
        write!(f, " bytes={}", self.bytes_transferred)
    }
}
