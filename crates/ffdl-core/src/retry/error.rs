//! Error type shared by API calls and transfers, kept concrete so it can be
//! classified for retries before it is turned into a ledger detail string.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status. `retry_after` comes from the `Retry-After` header.
    #[error("HTTP {code}")]
    Status {
        code: u32,
        retry_after: Option<Duration>,
    },
    /// Transfer completed but the body was shorter (or longer) than announced.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Disk write failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// The API answered 2xx but the payload was unusable (GraphQL errors, bad JSON).
    #[error("api: {0}")]
    Api(String),
}

impl HttpError {
    pub fn status(code: u32) -> Self {
        HttpError::Status {
            code,
            retry_after: None,
        }
    }
}
