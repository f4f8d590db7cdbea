//! Meeting records as yielded by the record source.

use chrono::{DateTime, Utc};

/// One meeting returned by the remote API. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingRecord {
    /// Opaque, stable identifier (the transcript id).
    pub id: String,
    pub title: String,
    /// When the meeting happened; `None` when the API omitted or mangled it.
    pub occurred_at: Option<DateTime<Utc>>,
    pub organizer_email: Option<String>,
    pub channel_ids: Vec<String>,
    /// Signed, time-limited video URL embedded in the listing.
    pub video_link: Option<String>,
}

impl MeetingRecord {
    /// Minimal record, used by tests and fakes.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            occurred_at: None,
            organizer_email: None,
            channel_ids: Vec::new(),
            video_link: None,
        }
    }

    pub fn with_occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(at);
        self
    }

    pub fn with_video_link(mut self, link: impl Into<String>) -> Self {
        self.video_link = Some(link.into());
        self
    }

    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_ids.push(channel_id.into());
        self
    }
}
