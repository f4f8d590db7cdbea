//! Integration test: transfer engine against a local range-capable server.
//!
//! Covers full transfers, completed-file detection, resume from a partial file,
//! servers that ignore ranges or refuse HEAD, retry after an interruption, and
//! partial files kept intact when the host cannot be reached.

mod common;

use common::range_server::{self, RangeServerOptions};
use common::{fast_retry, video_body};
use ffdl_core::http::HttpTimeouts;
use ffdl_core::retry::{HttpError, RetryPolicy};
use ffdl_core::transfer::{
    remote_size, temp_path, HttpTransfer, Transfer, TransferOutcome, TransferRequest,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn engine(retry: RetryPolicy) -> HttpTransfer {
    HttpTransfer::new(HttpTimeouts::default(), retry)
}

fn request<'a>(link: &'a str, dest: &'a Path) -> TransferRequest<'a> {
    TransferRequest {
        link,
        destination: dest,
        resume: true,
        overwrite: false,
    }
}

#[test]
fn full_transfer_then_exists() {
    let body = video_body(64 * 1024);
    let server = range_server::start(body.clone());
    let link = server.link("a.mp4");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("nested").join("a.mp4");

    let out = engine(RetryPolicy::none())
        .download(&request(&link, &dest))
        .unwrap();
    assert_eq!(
        out,
        TransferOutcome::Downloaded {
            bytes: body.len() as u64,
            resumed_from: 0
        }
    );
    assert_eq!(fs::read(&dest).unwrap(), body);

    let served = server.stats.body_bytes();
    let again = engine(RetryPolicy::none())
        .download(&request(&link, &dest))
        .unwrap();
    assert_eq!(
        again,
        TransferOutcome::Exists {
            size: body.len() as u64
        }
    );
    assert_eq!(server.stats.body_bytes(), served, "no body bytes on rerun");
}

#[test]
fn resumes_partial_file_with_range_request() {
    let body = video_body(50_000);
    let server = range_server::start(body.clone());
    let link = server.link("b.mp4");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("b.mp4");
    fs::write(&dest, &body[..12_345]).unwrap();

    let out = engine(RetryPolicy::none())
        .download(&request(&link, &dest))
        .unwrap();
    assert_eq!(
        out,
        TransferOutcome::Downloaded {
            bytes: (50_000 - 12_345) as u64,
            resumed_from: 12_345
        }
    );
    assert_eq!(fs::read(&dest).unwrap(), body);
    assert_eq!(server.stats.body_bytes(), (50_000 - 12_345) as u64);
}

#[test]
fn server_ignoring_range_restarts_from_zero() {
    let body = video_body(20_000);
    let server = range_server::start_with_options(
        body.clone(),
        RangeServerOptions {
            support_ranges: false,
            ..RangeServerOptions::default()
        },
    );
    let link = server.link("c.mp4");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("c.mp4");
    // Prefix that does not match the body: must not survive.
    fs::write(&dest, vec![0xAAu8; 5_000]).unwrap();

    let out = engine(RetryPolicy::none())
        .download(&request(&link, &dest))
        .unwrap();
    assert_eq!(
        out,
        TransferOutcome::Downloaded {
            bytes: 20_000,
            resumed_from: 0
        }
    );
    assert_eq!(fs::read(&dest).unwrap(), body);
}

#[test]
fn head_refused_falls_back_to_range_probe() {
    let body = video_body(9_000);
    let server = range_server::start_with_options(
        body.clone(),
        RangeServerOptions {
            head_allowed: false,
            ..RangeServerOptions::default()
        },
    );
    let link = server.link("d.mp4");
    assert_eq!(
        remote_size(&link, &HttpTimeouts::default()).unwrap(),
        Some(9_000)
    );

    let dir = tempdir().unwrap();
    let dest = dir.path().join("d.mp4");
    fs::write(&dest, &body[..4_000]).unwrap();
    let out = engine(RetryPolicy::none())
        .download(&request(&link, &dest))
        .unwrap();
    assert!(matches!(
        out,
        TransferOutcome::Downloaded {
            resumed_from: 4_000,
            ..
        }
    ));
    assert_eq!(fs::read(&dest).unwrap(), body);

    let again = engine(RetryPolicy::none())
        .download(&request(&link, &dest))
        .unwrap();
    assert_eq!(again, TransferOutcome::Exists { size: 9_000 });
}

#[test]
fn interrupted_transfer_is_retried_from_disk() {
    let body = video_body(40_000);
    let server = range_server::start_with_options(
        body.clone(),
        RangeServerOptions {
            cut_first_get_after: Some(8_192),
            ..RangeServerOptions::default()
        },
    );
    let link = server.link("e.mp4");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("e.mp4");

    let out = engine(fast_retry(3))
        .download(&request(&link, &dest))
        .unwrap();
    assert!(matches!(out, TransferOutcome::Downloaded { .. }));
    assert_eq!(fs::read(&dest).unwrap(), body);
    assert_eq!(server.stats.gets(), 2);
}

#[test]
fn resume_disabled_discards_partial_file() {
    let body = video_body(10_000);
    let server = range_server::start(body.clone());
    let link = server.link("f.mp4");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("f.mp4");
    fs::write(&dest, &body[..3_000]).unwrap();

    let mut req = request(&link, &dest);
    req.resume = false;
    let out = engine(RetryPolicy::none()).download(&req).unwrap();
    assert_eq!(
        out,
        TransferOutcome::Downloaded {
            bytes: 10_000,
            resumed_from: 0
        }
    );
    assert_eq!(fs::read(&dest).unwrap(), body);
}

#[test]
fn overwrite_replaces_complete_file_via_temp() {
    let body = video_body(10_000);
    let server = range_server::start(body.clone());
    let link = server.link("g.mp4");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("g.mp4");
    fs::write(&dest, vec![0u8; 10_000]).unwrap();

    let mut req = request(&link, &dest);
    req.overwrite = true;
    let out = engine(RetryPolicy::none()).download(&req).unwrap();
    assert!(matches!(out, TransferOutcome::Downloaded { bytes: 10_000, .. }));
    assert_eq!(fs::read(&dest).unwrap(), body);
    assert!(!temp_path(&dest).exists());
}

#[test]
fn unreachable_host_fails_after_retries() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("h.mp4");
    // Nothing listens on the discard port; connection errors retry until exhausted.
    let err = engine(fast_retry(2))
        .download(&request("http://127.0.0.1:9/v/h.mp4", &dest))
        .unwrap_err();
    assert!(matches!(err, HttpError::Curl(_)));
}

#[test]
fn partial_file_with_unreachable_host_is_an_error() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("i.mp4");
    let partial = video_body(1_000);
    fs::write(&dest, &partial).unwrap();

    let link = "http://127.0.0.1:9/v/i.mp4";
    assert!(remote_size(link, &HttpTimeouts::default()).is_err());
    let err = engine(fast_retry(2))
        .download(&request(link, &dest))
        .unwrap_err();
    assert!(matches!(err, HttpError::Curl(_)));
    assert_eq!(fs::read(&dest).unwrap(), partial);
}

#[test]
fn partial_file_with_expired_link_is_an_error() {
    let body = video_body(6_000);
    let server = range_server::start_with_options(
        body.clone(),
        RangeServerOptions {
            forbidden: true,
            ..RangeServerOptions::default()
        },
    );
    let link = server.link("j.mp4");
    let dir = tempdir().unwrap();
    let dest = dir.path().join("j.mp4");
    fs::write(&dest, &body[..2_500]).unwrap();

    let err = engine(fast_retry(3))
        .download(&request(&link, &dest))
        .unwrap_err();
    assert!(matches!(err, HttpError::Status { code: 403, .. }));
    assert_eq!(server.stats.gets(), 1, "auth failures are not retried");
    assert_eq!(fs::read(&dest).unwrap(), &body[..2_500]);
}
