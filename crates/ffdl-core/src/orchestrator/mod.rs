//! Drives one download run:
//! record source → ledger check → link resolution → transfer → ledger append.
//!
//! Records are processed strictly one at a time in listing order. A failed
//! record is recorded in the ledger and the run moves on; only a failed page
//! fetch or a ledger that can no longer be written ends the run early.

mod outcome;

pub use outcome::{RecordOutcome, RunSummary};

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::ledger::{Ledger, LedgerEntry};
use crate::naming::destination_for;
use crate::record::MeetingRecord;
use crate::resolver::{redact_link, LinkResolver};
use crate::source::{PageFetcher, RecordSource, Throttle};
use crate::transfer::{Transfer, TransferOutcome, TransferRequest};

/// Per-run switches.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub out_dir: PathBuf,
    /// Resolve and name everything, but transfer nothing and append nothing.
    pub dry_run: bool,
    /// Skip records whose latest ledger entry is terminal; resume partial files.
    pub resume: bool,
    /// Re-transfer every record into a temp file and replace the destination.
    pub overwrite: bool,
    /// Stop after this many records (skipped ones included).
    pub limit: Option<u64>,
}

impl RunOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            dry_run: false,
            resume: true,
            overwrite: false,
            limit: None,
        }
    }
}

type Observer = Box<dyn FnMut(&MeetingRecord, &RecordOutcome)>;

pub struct Orchestrator<F, L, R, T> {
    source: RecordSource<F>,
    throttle: Throttle,
    ledger: L,
    resolver: R,
    transfer: T,
    options: RunOptions,
    observer: Option<Observer>,
}

impl<F, L, R, T> Orchestrator<F, L, R, T>
where
    F: PageFetcher,
    L: Ledger,
    R: LinkResolver,
    T: Transfer,
{
    pub fn new(
        source: RecordSource<F>,
        throttle: Throttle,
        ledger: L,
        resolver: R,
        transfer: T,
        options: RunOptions,
    ) -> Self {
        Self {
            source,
            throttle,
            ledger,
            resolver,
            transfer,
            options,
            observer: None,
        }
    }

    /// Called with every record and its outcome, after the ledger append.
    pub fn with_observer(
        mut self,
        observer: impl FnMut(&MeetingRecord, &RecordOutcome) + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        tracing::info!(
            out_dir = %self.options.out_dir.display(),
            dry_run = self.options.dry_run,
            resume = self.options.resume,
            overwrite = self.options.overwrite,
            filter = ?self.source.filter(),
            "starting run"
        );

        let mut summary = RunSummary::default();
        loop {
            if self.options.limit.is_some_and(|limit| summary.seen >= limit) {
                tracing::info!(limit = summary.seen, "record limit reached");
                break;
            }
            let record = match self.source.next_record(&mut self.throttle) {
                Ok(Some(r)) => r,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(
                        pages = self.source.pages_fetched(),
                        "run aborted: {}; so far: {}",
                        e,
                        summary
                    );
                    return Err(e).context("walk meeting records");
                }
            };

            let outcome = self.process(&record)?;
            log_outcome(&record, &outcome);
            summary.record(&outcome);
            if let Some(observer) = self.observer.as_mut() {
                observer(&record, &outcome);
            }
        }

        tracing::info!(pages = self.source.pages_fetched(), "run finished: {}", summary);
        Ok(summary)
    }

    /// One record through the state machine. `Err` only when the ledger append fails.
    fn process(&mut self, record: &MeetingRecord) -> Result<RecordOutcome> {
        let opts = &self.options;
        if opts.resume && !opts.overwrite {
            if let Some(latest) = self.ledger.lookup_latest(&record.id) {
                if latest.status.is_terminal() {
                    return Ok(RecordOutcome::Skipped);
                }
                tracing::debug!(
                    id = %record.id,
                    status = latest.status.as_str(),
                    "retrying record"
                );
            }
        }

        let Some(link) = self.resolver.resolve(record) else {
            if !opts.dry_run {
                self.append(LedgerEntry::no_video_url(&record.id))?;
            }
            return Ok(RecordOutcome::NoVideoUrl);
        };

        let path = destination_for(&opts.out_dir, record);
        if opts.dry_run {
            tracing::debug!(link = %redact_link(&link), "dry run: not transferring");
            return Ok(RecordOutcome::WouldDownload { path });
        }

        let request = TransferRequest {
            link: &link,
            destination: &path,
            resume: opts.resume,
            overwrite: opts.overwrite,
        };
        let (entry, outcome) = match self.transfer.download(&request) {
            Ok(TransferOutcome::Downloaded { bytes, .. }) => (
                LedgerEntry::downloaded(&record.id, &path),
                RecordOutcome::Downloaded {
                    path: path.clone(),
                    bytes,
                },
            ),
            Ok(TransferOutcome::Exists { .. }) => (
                LedgerEntry::exists(&record.id, &path),
                RecordOutcome::Exists { path: path.clone() },
            ),
            Err(e) => {
                let detail = e.to_string();
                (
                    LedgerEntry::error(&record.id, Some(&path), detail.clone()),
                    RecordOutcome::Error { detail },
                )
            }
        };
        self.append(entry)?;
        Ok(outcome)
    }

    fn append(&mut self, entry: LedgerEntry) -> Result<()> {
        let id = entry.record_id.clone();
        self.ledger
            .append(entry)
            .with_context(|| format!("record outcome for {}", id))
    }
}

fn log_outcome(record: &MeetingRecord, outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Skipped => {
            tracing::debug!(id = %record.id, "skipped (already complete)")
        }
        RecordOutcome::Downloaded { path, bytes } => tracing::info!(
            id = %record.id,
            bytes,
            "downloaded {}",
            path.display()
        ),
        RecordOutcome::Exists { path } => {
            tracing::info!(id = %record.id, "already complete: {}", path.display())
        }
        RecordOutcome::NoVideoUrl => {
            tracing::info!(id = %record.id, title = %record.title, "no video link")
        }
        RecordOutcome::Error { detail } => {
            tracing::warn!(id = %record.id, title = %record.title, "failed: {}", detail)
        }
        RecordOutcome::WouldDownload { path } => {
            tracing::info!(id = %record.id, "would download to {}", path.display())
        }
    }
}
