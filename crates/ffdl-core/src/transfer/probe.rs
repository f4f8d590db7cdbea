//! Remote size probing.
//!
//! `HEAD` first; pre-signed links are often bound to GET, so a refused HEAD
//! falls back to a one-byte `Range: bytes=0-0` GET and reads the total from
//! `Content-Range`. A GET that answers without a length gives an unknown
//! size; a GET that fails (unreachable host, expired link) is an error.

use std::cell::RefCell;

use crate::http::{self, parse_response_head, HttpTimeouts, ResponseHead};
use crate::resolver::redact_link;
use crate::retry::HttpError;

/// Total size of the resource behind `link`. `Ok(None)` when the server
/// answered without revealing a length; the range probe's error otherwise.
pub fn remote_size(link: &str, timeouts: &HttpTimeouts) -> Result<Option<u64>, HttpError> {
    match head_probe(link, timeouts) {
        Ok(Some(n)) => return Ok(Some(n)),
        Ok(None) => tracing::debug!(link = %redact_link(link), "HEAD gave no Content-Length"),
        Err(e) => tracing::debug!(link = %redact_link(link), "HEAD probe failed: {}", e),
    }
    // The transfer itself is a GET, so a refused GET is never an unknown size.
    range_probe(link, timeouts)
}

fn status_error(code: u32, head: &ResponseHead) -> HttpError {
    HttpError::Status {
        code,
        retry_after: head.retry_after,
    }
}

pub(crate) fn head_probe(link: &str, timeouts: &HttpTimeouts) -> Result<Option<u64>, HttpError> {
    let mut easy = http::easy_for(link, timeouts, timeouts.request)?;
    easy.nobody(true)?;

    let mut lines: Vec<String> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = std::str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    let head = parse_response_head(&lines);
    if !(200..300).contains(&code) {
        return Err(status_error(code, &head));
    }
    Ok(head.content_length)
}

pub(crate) fn range_probe(link: &str, timeouts: &HttpTimeouts) -> Result<Option<u64>, HttpError> {
    let mut easy = http::easy_for(link, timeouts, timeouts.request)?;
    easy.range("0-0")?;

    let lines = RefCell::new(Vec::<String>::new());
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = std::str::from_utf8(data) {
                lines.borrow_mut().push(s.trim_end().to_string());
            }
            true
        })?;
        // Keep the one-byte body of a 206; abort anything else (a 200 would stream the whole file).
        transfer.write_function(|data| {
            let status = parse_response_head(&lines.borrow()).status;
            Ok(if status == Some(206) { data.len() } else { 0 })
        })?;
        if let Err(e) = transfer.perform() {
            if !e.is_write_error() {
                return Err(e.into());
            }
        }
    }

    let code = easy.response_code()?;
    let head = parse_response_head(&lines.borrow());
    match code {
        200 | 206 => Ok(head.total_size()),
        _ => Err(status_error(code, &head)),
    }
}
