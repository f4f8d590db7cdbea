//! libcurl plumbing shared by the API client and the transfer engine.
//!
//! Everything here is blocking and runs on the caller's thread.

mod headers;

pub use headers::{parse_response_head, ContentRange, ResponseHead};

use std::time::Duration;

/// Timeouts applied to every easy handle.
#[derive(Debug, Clone, Copy)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout.
    pub connect: Duration,
    /// Whole-request timeout for API calls and probes.
    pub request: Duration,
    /// Hard timeout for a body transfer (videos can be large).
    pub transfer: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            request: Duration::from_secs(60),
            transfer: Duration::from_secs(6 * 3600),
        }
    }
}

const USER_AGENT: &str = concat!("ffdl/", env!("CARGO_PKG_VERSION"));

/// New easy handle for `url` that follows redirects and has a connect timeout plus
/// the given hard timeout.
pub(crate) fn easy_for(
    url: &str,
    timeouts: &HttpTimeouts,
    timeout: Duration,
) -> Result<curl::easy::Easy, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.useragent(USER_AGENT)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(timeouts.connect)?;
    easy.timeout(timeout)?;
    Ok(easy)
}

/// Build a curl header list from `(name, value)` pairs.
pub(crate) fn header_list(headers: &[(&str, &str)]) -> Result<curl::easy::List, curl::Error> {
    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    Ok(list)
}
