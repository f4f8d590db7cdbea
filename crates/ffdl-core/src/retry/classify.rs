//! Classify HTTP status and curl errors into retry policy error kinds.

use super::error::HttpError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        401 | 403 => ErrorKind::Auth,
        429 | 503 => ErrorKind::Throttled { retry_after: None },
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify an `HttpError` into an ErrorKind.
pub fn classify(e: &HttpError) -> ErrorKind {
    match e {
        HttpError::Curl(ce) => classify_curl_error(ce),
        HttpError::Status { code, retry_after } => match classify_http_status(*code) {
            ErrorKind::Throttled { .. } => ErrorKind::Throttled {
                retry_after: *retry_after,
            },
            kind => kind,
        },
        HttpError::PartialTransfer { .. } => ErrorKind::Incomplete,
        HttpError::Storage(_) | HttpError::Api(_) => ErrorKind::Other,
    }
}
