//! Transfer engine: one video link to one file on disk.
//!
//! Resume state is never persisted; it is read back from the filesystem on every
//! attempt. Algorithm per attempt:
//!
//! 1. `overwrite`: fetch from byte 0 into `<dest>.part`, fsync, rename over `dest`.
//! 2. `dest` size equals the remote size (or the server answered without a
//!    length and `dest` is non-empty): `Exists`, nothing transferred. A failed
//!    probe is an error of the attempt, not an unknown size.
//! 3. `resume` and `0 < size < total`: `Range: bytes=size-`, appended in place.
//!    A server that ignores the range restarts the file from byte 0 in the same
//!    request; a 416 triggers a full re-transfer.
//! 4. Otherwise a full transfer into `dest`.
//!
//! Bytes already written are never deleted on failure, so the next attempt (or
//! the next run) resumes from them.

mod fetch;
mod probe;
mod storage;

pub use probe::remote_size;
pub use storage::{on_disk_len, temp_path, FileSink, TEMP_SUFFIX};

use std::path::Path;

use crate::http::HttpTimeouts;
use crate::resolver::redact_link;
use crate::retry::{run_with_retry, HttpError, RetryPolicy};
use fetch::{fetch_into, Fetched};

/// What to transfer and how.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    pub link: &'a str,
    pub destination: &'a Path,
    pub resume: bool,
    pub overwrite: bool,
}

/// Successful transfer outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Bytes were transferred in this call. `resumed_from` is the offset the
    /// final response started at (0 for a full transfer).
    Downloaded { bytes: u64, resumed_from: u64 },
    /// The destination was already complete; nothing was transferred.
    Exists { size: u64 },
}

/// The transfer step of the orchestrator.
pub trait Transfer {
    fn download(&self, request: &TransferRequest<'_>) -> Result<TransferOutcome, HttpError>;
}

/// libcurl-backed transfer engine with retries on transient failures.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    timeouts: HttpTimeouts,
    retry: RetryPolicy,
}

impl HttpTransfer {
    pub fn new(timeouts: HttpTimeouts, retry: RetryPolicy) -> Self {
        Self { timeouts, retry }
    }

    fn attempt(&self, req: &TransferRequest<'_>) -> Result<TransferOutcome, HttpError> {
        if let Some(parent) = req.destination.parent() {
            std::fs::create_dir_all(parent).map_err(HttpError::Storage)?;
        }
        if req.overwrite {
            return self.replace(req);
        }

        // An unreachable or refusing host must not make a partial file look complete.
        let total = remote_size(req.link, &self.timeouts)?;
        let on_disk = on_disk_len(req.destination).map_err(HttpError::Storage)?;
        if let Some(size) = on_disk {
            let complete = match total {
                Some(t) => size == t,
                None => size > 0,
            };
            if complete {
                return Ok(TransferOutcome::Exists { size });
            }
        }

        let size = on_disk.unwrap_or(0);
        match total {
            Some(t) if req.resume && size > 0 && size < t => self.resume_from(req, size, total),
            _ => {
                if size > 0 {
                    tracing::debug!(
                        size,
                        ?total,
                        resume = req.resume,
                        "discarding {} and transferring from byte 0",
                        req.destination.display()
                    );
                }
                self.full(req, total)
            }
        }
    }

    fn full(
        &self,
        req: &TransferRequest<'_>,
        total: Option<u64>,
    ) -> Result<TransferOutcome, HttpError> {
        let sink = FileSink::create(req.destination).map_err(HttpError::Storage)?;
        match fetch_into(req.link, &sink, 0, &self.timeouts)? {
            Fetched::Body {
                base,
                written,
                head,
            } => {
                verify_size(head.total_size().or(total), base + written)?;
                sink.sync().map_err(HttpError::Storage)?;
                Ok(TransferOutcome::Downloaded {
                    bytes: written,
                    resumed_from: 0,
                })
            }
            Fetched::RangeNotSatisfiable => Err(HttpError::status(416)),
        }
    }

    fn resume_from(
        &self,
        req: &TransferRequest<'_>,
        size: u64,
        total: Option<u64>,
    ) -> Result<TransferOutcome, HttpError> {
        tracing::info!(
            offset = size,
            ?total,
            "resuming {}",
            req.destination.display()
        );
        let sink = FileSink::open_existing(req.destination).map_err(HttpError::Storage)?;
        match fetch_into(req.link, &sink, size, &self.timeouts)? {
            Fetched::Body {
                base,
                written,
                head,
            } => {
                verify_size(head.total_size().or(total), base + written)?;
                sink.sync().map_err(HttpError::Storage)?;
                Ok(TransferOutcome::Downloaded {
                    bytes: written,
                    resumed_from: base,
                })
            }
            Fetched::RangeNotSatisfiable => {
                tracing::info!(
                    offset = size,
                    "range not satisfiable; re-transferring {}",
                    req.destination.display()
                );
                drop(sink);
                self.full(req, total)
            }
        }
    }

    fn replace(&self, req: &TransferRequest<'_>) -> Result<TransferOutcome, HttpError> {
        let tmp = temp_path(req.destination);
        let sink = FileSink::create(&tmp).map_err(HttpError::Storage)?;
        match fetch_into(req.link, &sink, 0, &self.timeouts)? {
            Fetched::Body { written, head, .. } => {
                verify_size(head.total_size(), written)?;
                sink.sync().map_err(HttpError::Storage)?;
                sink.finalize(req.destination).map_err(HttpError::Storage)?;
                Ok(TransferOutcome::Downloaded {
                    bytes: written,
                    resumed_from: 0,
                })
            }
            Fetched::RangeNotSatisfiable => Err(HttpError::status(416)),
        }
    }
}

impl Transfer for HttpTransfer {
    fn download(&self, req: &TransferRequest<'_>) -> Result<TransferOutcome, HttpError> {
        tracing::debug!(
            link = %redact_link(req.link),
            dest = %req.destination.display(),
            resume = req.resume,
            overwrite = req.overwrite,
            "starting transfer"
        );
        run_with_retry(&self.retry, "video transfer", |_| self.attempt(req))
    }
}

fn verify_size(expected: Option<u64>, actual: u64) -> Result<(), HttpError> {
    match expected {
        Some(expected) if expected != actual => Err(HttpError::PartialTransfer {
            expected,
            received: actual,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_size_accepts_unknown_and_matching() {
        assert!(verify_size(None, 10).is_ok());
        assert!(verify_size(Some(10), 10).is_ok());
        assert!(matches!(
            verify_size(Some(10), 4),
            Err(HttpError::PartialTransfer {
                expected: 10,
                received: 4
            })
        ));
    }
}
