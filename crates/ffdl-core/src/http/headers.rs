//! Parse HTTP response header lines into a ResponseHead.

use std::time::Duration;

/// Parsed `Content-Range` value (`bytes start-end/total` or `bytes */total`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// `(start, end_inclusive)` when the response carries a body range.
    pub range: Option<(u64, u64)>,
    /// Complete length, when the server knows it.
    pub total: Option<u64>,
}

/// Key headers of the final response in a (possibly redirected) exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// Status code from the last status line.
    pub status: Option<u32>,
    /// `Content-Length`, if present.
    pub content_length: Option<u64>,
    /// `Content-Range`, if present and parseable.
    pub content_range: Option<ContentRange>,
    /// `Retry-After` in delta-seconds form.
    pub retry_after: Option<Duration>,
}

impl ResponseHead {
    /// Total size of the resource: from `Content-Range` on a 206, else `Content-Length` on a 200.
    pub fn total_size(&self) -> Option<u64> {
        match self.status {
            Some(206) => self.content_range.and_then(|r| r.total),
            Some(200) => self.content_length,
            _ => None,
        }
    }
}

/// Parse collected header lines. A new status line (redirect, `100 Continue`)
/// discards everything collected before it.
pub fn parse_response_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead {
                status: line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|c| c.parse::<u32>().ok()),
                ..ResponseHead::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                head.content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("content-range") {
                head.content_range = parse_content_range(value);
            } else if name.eq_ignore_ascii_case("retry-after") {
                head.retry_after = value.parse::<u64>().ok().map(Duration::from_secs);
            }
        }
    }

    head
}

fn parse_content_range(value: &str) -> Option<ContentRange> {
    let rest = value.strip_prefix("bytes")?.trim();
    let (range, total) = rest.split_once('/')?;
    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse::<u64>().ok()?),
    };
    let range = match range.trim() {
        "*" => None,
        r => {
            let (a, b) = r.split_once('-')?;
            Some((a.trim().parse::<u64>().ok()?, b.trim().parse::<u64>().ok()?))
        }
    };
    Some(ContentRange { range, total })
}
