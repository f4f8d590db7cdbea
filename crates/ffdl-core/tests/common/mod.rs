#![allow(dead_code)]

pub mod api_server;
pub mod range_server;

use ffdl_core::retry::RetryPolicy;
use std::time::Duration;

/// Retry policy with millisecond backoff so retry tests stay fast.
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

/// Deterministic, non-repeating-looking body of `len` bytes.
pub fn video_body(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}
