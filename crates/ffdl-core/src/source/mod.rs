//! Record source: a lazy, forward-only walk over the remote meeting listing.
//!
//! Pages are fetched on demand through a [`PageFetcher`]. Each page fetch is
//! spaced by the caller's [`Throttle`] and retried under the shared
//! [`RetryPolicy`]; running out of retries (or a rejected API key) ends the walk
//! with an error rather than skipping records.

mod graphql;
mod payload;
mod throttle;

pub use graphql::GraphqlClient;
pub use throttle::Throttle;

use std::collections::VecDeque;

use crate::filter::FilterSpec;
use crate::record::MeetingRecord;
use crate::retry::{classify, run_with_retry, ErrorKind, HttpError, RetryPolicy};

/// Position in the remote listing (skip/limit pagination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub skip: u32,
}

/// One page of records and where the next page starts (`None` = exhausted).
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<MeetingRecord>,
    pub next: Option<Cursor>,
}

impl Page {
    /// Build a page from a fetched batch. A short (or empty) batch is the last one.
    pub fn from_batch(
        records: Vec<MeetingRecord>,
        raw_len: usize,
        cursor: Cursor,
        limit: u32,
    ) -> Self {
        let next = if raw_len == 0 || raw_len < limit as usize {
            None
        } else {
            Some(Cursor {
                skip: cursor.skip.saturating_add(raw_len as u32),
            })
        };
        Page { records, next }
    }
}

/// A single page request against the remote API (one attempt, no retries).
pub trait PageFetcher {
    fn fetch_page(&mut self, filter: &FilterSpec, cursor: Cursor) -> Result<Page, HttpError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    fn fetch_page(&mut self, filter: &FilterSpec, cursor: Cursor) -> Result<Page, HttpError> {
        (**self).fetch_page(filter, cursor)
    }
}

/// Fatal failures of the record walk.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("API rejected the credentials (HTTP {code}); check the API key")]
    Auth { code: u32 },
    #[error("fetching records at offset {skip} failed after {attempts} attempt(s): {source}")]
    Page {
        skip: u32,
        attempts: u32,
        #[source]
        source: HttpError,
    },
}

pub struct RecordSource<F> {
    fetcher: F,
    filter: FilterSpec,
    retry: RetryPolicy,
    buffered: VecDeque<MeetingRecord>,
    next: Option<Cursor>,
    pages_fetched: u32,
}

impl<F: PageFetcher> RecordSource<F> {
    pub fn new(fetcher: F, filter: FilterSpec, retry: RetryPolicy) -> Self {
        Self {
            fetcher,
            filter,
            retry,
            buffered: VecDeque::new(),
            next: Some(Cursor::default()),
            pages_fetched: 0,
        }
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Next matching record, fetching (and throttling) a new page when the buffer
    /// runs dry. `Ok(None)` once the listing is exhausted.
    pub fn next_record(
        &mut self,
        throttle: &mut Throttle,
    ) -> Result<Option<MeetingRecord>, SourceError> {
        loop {
            if let Some(record) = self.buffered.pop_front() {
                return Ok(Some(record));
            }
            let Some(cursor) = self.next.take() else {
                return Ok(None);
            };

            throttle.wait();
            let page = self.fetch_with_retry(cursor)?;
            self.pages_fetched += 1;
            self.next = page.next;

            let fetched = page.records.len();
            let filter = &self.filter;
            self.buffered
                .extend(page.records.into_iter().filter(|r| filter.matches(r)));
            tracing::debug!(
                skip = cursor.skip,
                fetched,
                kept = self.buffered.len(),
                last_page = self.next.is_none(),
                "fetched record page"
            );
        }
    }

    fn fetch_with_retry(&mut self, cursor: Cursor) -> Result<Page, SourceError> {
        let mut attempts = 0u32;
        let fetcher = &mut self.fetcher;
        let filter = &self.filter;
        run_with_retry(&self.retry, "record page fetch", |attempt| {
            attempts = attempt;
            fetcher.fetch_page(filter, cursor)
        })
        .map_err(|source| {
            if let (ErrorKind::Auth, HttpError::Status { code, .. }) = (classify(&source), &source) {
                return SourceError::Auth { code: *code };
            }
            SourceError::Page {
                skip: cursor.skip,
                attempts,
                source,
            }
        })
    }
}
