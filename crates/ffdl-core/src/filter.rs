//! Filter criteria for the record walk and the date parsing behind `--from`/`--to`.
//!
//! Date bounds are half-open: `from` is inclusive, `to` is exclusive. The same
//! predicate is applied client-side to every record the server returns, so the
//! convention holds whatever the server does at the edges.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::record::MeetingRecord;

#[derive(Debug, thiserror::Error)]
#[error("invalid date {input:?}: expected YYYY-MM-DD or an ISO 8601 timestamp")]
pub struct DateParseError {
    pub input: String,
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an ISO 8601 / RFC 3339 timestamp.
/// Timestamps without an offset are taken as UTC.
pub fn parse_date_like(s: &str) -> Result<DateTime<Utc>, DateParseError> {
    let s = s.trim();
    let err = || DateParseError {
        input: s.to_string(),
    };
    if s.is_empty() {
        return Err(err());
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = d.and_hms_opt(0, 0, 0).ok_or_else(err)?;
        return Ok(Utc.from_utc_datetime(&midnight));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(err())
}

/// Which records to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub to: Option<DateTime<Utc>>,
    pub channel_id: Option<String>,
    /// Only meetings organized by the API key owner (server-side only).
    pub mine: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            channel_id: None,
            mine: true,
        }
    }
}

impl FilterSpec {
    /// Client-side guard. Records with an unknown timestamp pass the date bounds.
    pub fn matches(&self, record: &MeetingRecord) -> bool {
        if let Some(at) = record.occurred_at {
            if self.from.is_some_and(|from| at < from) {
                return false;
            }
            if self.to.is_some_and(|to| at >= to) {
                return false;
            }
        }
        match &self.channel_id {
            Some(ch) => record.channel_ids.iter().any(|c| c == ch),
            None => true,
        }
    }
}
