//! One GET of a video body into a [`FileSink`], optionally starting at a byte offset.

use std::cell::RefCell;
use std::time::Duration;

use super::storage::FileSink;
use crate::http::{self, parse_response_head, HttpTimeouts, ResponseHead};
use crate::retry::HttpError;

/// What a single GET produced.
#[derive(Debug)]
pub(super) enum Fetched {
    /// Body written starting at `base`; `base` is 0 when the server ignored the range.
    Body {
        base: u64,
        written: u64,
        head: ResponseHead,
    },
    /// 416: the requested start lies beyond the resource.
    RangeNotSatisfiable,
}

#[derive(Default)]
struct WriteState {
    head: Option<ResponseHead>,
    base: u64,
    written: u64,
    storage_error: Option<std::io::Error>,
}

impl WriteState {
    /// Called once the headers of the final response are known.
    fn begin(&mut self, head: ResponseHead, start: u64, sink: &FileSink) -> std::io::Result<()> {
        match head.status {
            Some(206) => {
                // Rewriting a prefix we already hold is harmless; a gap is not.
                if let Some((s, _)) = head.content_range.and_then(|r| r.range) {
                    if s > start {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            format!("server resumed at byte {} but we asked for {}", s, start),
                        ));
                    }
                    self.base = s;
                }
            }
            Some(200) if start > 0 => {
                tracing::info!(
                    start,
                    "server ignored range request; restarting from byte 0"
                );
                sink.truncate()?;
                self.base = 0;
            }
            _ => {}
        }
        self.head = Some(head);
        Ok(())
    }

    fn accepts_body(&self) -> bool {
        matches!(
            self.head.as_ref().and_then(|h| h.status),
            Some(200) | Some(206)
        )
    }
}

/// GET `link` and write its body into `sink` from `start` (a `Range: bytes=start-`
/// request when `start > 0`). Bodies of non-200/206 responses are discarded.
pub(super) fn fetch_into(
    link: &str,
    sink: &FileSink,
    start: u64,
    timeouts: &HttpTimeouts,
) -> Result<Fetched, HttpError> {
    let mut easy = http::easy_for(link, timeouts, timeouts.transfer)?;
    // Abort if throughput drops below 1 KiB/s for 60s rather than relying on the hard timeout.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    if start > 0 {
        easy.range(&format!("{}-", start))?;
    }

    let header_lines = RefCell::new(Vec::<String>::new());
    let state = RefCell::new(WriteState {
        base: start,
        ..WriteState::default()
    });

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = std::str::from_utf8(data) {
                header_lines.borrow_mut().push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            let mut st = state.borrow_mut();
            if st.head.is_none() {
                let head = parse_response_head(&header_lines.borrow());
                if let Err(e) = st.begin(head, start, sink) {
                    st.storage_error = Some(e);
                    return Ok(0);
                }
            }
            if !st.accepts_body() {
                return Ok(data.len());
            }
            let off = st.base + st.written;
            match sink.write_at(off, data) {
                Ok(()) => {
                    st.written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("write to {} failed: {}", sink.path().display(), e);
                    st.storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        if let Err(e) = transfer.perform() {
            if e.is_write_error() {
                if let Some(io_err) = state.borrow_mut().storage_error.take() {
                    return Err(HttpError::Storage(io_err));
                }
            }
            return Err(HttpError::Curl(e));
        }
    }

    let code = easy.response_code()?;
    let mut st = state.into_inner();
    let head = match st.head.take() {
        Some(h) => h,
        None => {
            // Empty body: the write callback never ran.
            let head = parse_response_head(&header_lines.borrow());
            if code == 200 && start > 0 {
                sink.truncate().map_err(HttpError::Storage)?;
                st.base = 0;
            }
            head
        }
    };

    match code {
        200 | 206 => Ok(Fetched::Body {
            base: st.base,
            written: st.written,
            head,
        }),
        416 => Ok(Fetched::RangeNotSatisfiable),
        _ => Err(HttpError::Status {
            code,
            retry_after: head.retry_after,
        }),
    }
}
