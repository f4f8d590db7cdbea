//! Link resolution: turning a fetched record into a direct download URL.
//!
//! The signed link travels inside the listing, so resolution is local. Links
//! expire, which is why they are never written to the ledger: every run works
//! from freshly fetched records.

use crate::record::MeetingRecord;

/// Yields the direct download link for a record, or `None` when it has no video.
pub trait LinkResolver {
    fn resolve(&self, record: &MeetingRecord) -> Option<String>;
}

/// Uses the `video_url` embedded in the record. Blank links count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLinkResolver;

impl LinkResolver for EmbeddedLinkResolver {
    fn resolve(&self, record: &MeetingRecord) -> Option<String> {
        record
            .video_link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Link safe to log: query string and fragment (where the signature lives) removed.
pub fn redact_link(link: &str) -> String {
    match url::Url::parse(link) {
        Ok(mut u) => {
            let signed = u.query().is_some();
            u.set_query(None);
            u.set_fragment(None);
            if signed {
                format!("{}?<redacted>", u)
            } else {
                u.to_string()
            }
        }
        Err(_) => "<unparseable link>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_embedded_link() {
        let r = MeetingRecord::new("a", "t").with_video_link(" https://cdn.example.com/a.mp4?sig=1 ");
        assert_eq!(
            EmbeddedLinkResolver.resolve(&r).as_deref(),
            Some("https://cdn.example.com/a.mp4?sig=1")
        );
    }

    #[test]
    fn missing_or_blank_link_is_absent() {
        assert!(EmbeddedLinkResolver
            .resolve(&MeetingRecord::new("a", "t"))
            .is_none());
        assert!(EmbeddedLinkResolver
            .resolve(&MeetingRecord::new("a", "t").with_video_link("   "))
            .is_none());
    }

    #[test]
    fn redaction_strips_signature() {
        assert_eq!(
            redact_link("https://cdn.example.com/v/a.mp4?X-Amz-Signature=abc&X-Amz-Expires=86400"),
            "https://cdn.example.com/v/a.mp4?<redacted>"
        );
        assert_eq!(
            redact_link("https://cdn.example.com/v/a.mp4"),
            "https://cdn.example.com/v/a.mp4"
        );
        assert_eq!(redact_link("not a url"), "<unparseable link>");
    }
}
