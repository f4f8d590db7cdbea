//! GraphQL request body for the transcripts listing and decoding of its response.

use chrono::{SecondsFormat, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::Cursor;
use crate::filter::{parse_date_like, FilterSpec};
use crate::record::MeetingRecord;
use crate::retry::HttpError;

pub(crate) const TRANSCRIPTS_QUERY: &str = r#"
query Transcripts($limit: Int!, $skip: Int!, $mine: Boolean, $fromDate: DateTime, $toDate: DateTime, $channelId: String) {
  transcripts(limit: $limit, skip: $skip, mine: $mine, fromDate: $fromDate, toDate: $toDate, channel_id: $channelId) {
    id
    title
    date
    dateString
    organizer_email
    channels { id }
    video_url
  }
}
"#;

/// JSON body for one page of the transcripts query.
pub(crate) fn transcripts_request(filter: &FilterSpec, cursor: Cursor, limit: u32) -> Value {
    let iso = |d: &chrono::DateTime<Utc>| d.to_rfc3339_opts(SecondsFormat::Secs, true);
    json!({
        "query": TRANSCRIPTS_QUERY,
        "variables": {
            "limit": limit,
            "skip": cursor.skip,
            "mine": filter.mine,
            "fromDate": filter.from.as_ref().map(iso),
            "toDate": filter.to.as_ref().map(iso),
            "channelId": filter.channel_id,
        }
    })
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<TranscriptsData>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct TranscriptsData {
    transcripts: Option<Vec<RawTranscript>>,
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTranscript {
    id: Option<String>,
    title: Option<String>,
    /// Epoch milliseconds.
    date: Option<f64>,
    #[serde(rename = "dateString")]
    date_string: Option<String>,
    organizer_email: Option<String>,
    channels: Option<Vec<RawChannel>>,
    video_url: Option<String>,
}

impl RawTranscript {
    fn into_record(self) -> Option<MeetingRecord> {
        let id = self.id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
        let occurred_at = self
            .date
            .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single())
            .or_else(|| {
                self.date_string
                    .as_deref()
                    .and_then(|s| parse_date_like(s).ok())
            });
        Some(MeetingRecord {
            id,
            title: self.title.unwrap_or_default().trim().to_string(),
            occurred_at,
            organizer_email: self.organizer_email,
            channel_ids: self
                .channels
                .unwrap_or_default()
                .into_iter()
                .filter_map(|c| c.id)
                .collect(),
            video_link: self.video_url,
        })
    }
}

/// Records of one page plus the number of raw items the server returned
/// (drives pagination even when some items are unusable).
#[derive(Debug)]
pub(crate) struct Batch {
    pub records: Vec<MeetingRecord>,
    pub raw_len: usize,
}

/// Map GraphQL-level errors onto HTTP-like statuses so they classify for retries.
fn graphql_error(errors: &[Value]) -> HttpError {
    let codes: Vec<String> = errors
        .iter()
        .filter_map(|e| e.pointer("/extensions/code").and_then(Value::as_str))
        .map(str::to_ascii_lowercase)
        .collect();
    if codes.iter().any(|c| c.contains("too_many_requests") || c.contains("rate")) {
        return HttpError::status(429);
    }
    if codes
        .iter()
        .any(|c| c.contains("auth") || c.contains("forbidden"))
    {
        return HttpError::status(401);
    }
    let detail = serde_json::to_string(errors).unwrap_or_else(|_| "<unprintable>".into());
    HttpError::Api(format!("GraphQL errors: {}", detail))
}

pub(crate) fn decode_transcripts(body: &[u8]) -> Result<Batch, HttpError> {
    let resp: GraphqlResponse = serde_json::from_slice(body)
        .map_err(|e| HttpError::Api(format!("undecodable response: {}", e)))?;

    if let Some(errors) = resp.errors.filter(|e| !e.is_empty()) {
        return Err(graphql_error(&errors));
    }
    let data = resp
        .data
        .ok_or_else(|| HttpError::Api("response carried no data".into()))?;
    let raw = data.transcripts.unwrap_or_default();
    let raw_len = raw.len();
    let mut records = Vec::with_capacity(raw_len);
    for t in raw {
        match t.into_record() {
            Some(r) => records.push(r),
            None => tracing::warn!("dropping transcript without an id"),
        }
    }
    Ok(Batch { records, raw_len })
}
