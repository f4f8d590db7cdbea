//! Page fetcher backed by the Fireflies GraphQL API over libcurl.

use std::cell::RefCell;

use super::payload::{decode_transcripts, transcripts_request};
use super::{Cursor, Page, PageFetcher};
use crate::filter::FilterSpec;
use crate::http::{self, parse_response_head, HttpTimeouts};
use crate::retry::HttpError;

/// Authenticated client for the transcripts listing. One attempt per call;
/// retries belong to [`super::RecordSource`].
pub struct GraphqlClient {
    endpoint: String,
    api_key: String,
    page_size: u32,
    timeouts: HttpTimeouts,
}

impl GraphqlClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        page_size: u32,
        timeouts: HttpTimeouts,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            page_size: page_size.max(1),
            timeouts,
        }
    }

    /// POST `body` as JSON; returns the response body of a 2xx answer.
    fn post_json(&self, body: &[u8]) -> Result<Vec<u8>, HttpError> {
        let mut easy = http::easy_for(&self.endpoint, &self.timeouts, self.timeouts.request)?;
        easy.post(true)?;
        easy.post_fields_copy(body)?;

        let auth = format!("Bearer {}", self.api_key);
        let mut list = http::header_list(&[
            ("Authorization", auth.as_str()),
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
        ])?;
        // Suppress `Expect: 100-continue`; some gateways stall on it.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        let header_lines = RefCell::new(Vec::new());
        let mut response = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = std::str::from_utf8(data) {
                    header_lines.borrow_mut().push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            let head = parse_response_head(&header_lines.borrow());
            return Err(HttpError::Status {
                code,
                retry_after: head.retry_after,
            });
        }
        Ok(response)
    }
}

impl PageFetcher for GraphqlClient {
    fn fetch_page(&mut self, filter: &FilterSpec, cursor: Cursor) -> Result<Page, HttpError> {
        let request = transcripts_request(filter, cursor, self.page_size);
        let body = serde_json::to_vec(&request)
            .map_err(|e| HttpError::Api(format!("encode request: {}", e)))?;
        let raw = self.post_json(&body)?;
        let batch = decode_transcripts(&raw)?;
        Ok(Page::from_batch(batch.records, batch.raw_len, cursor, self.page_size))
    }
}
