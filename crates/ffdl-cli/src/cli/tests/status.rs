//! Tests for the status subcommand.

use super::parse;
use crate::cli::commands::render_status;
use crate::cli::{CliCommand, DEFAULT_OUT_DIR};
use ffdl_core::ledger::{JsonlLedger, Ledger, LedgerEntry, LedgerSummary};
use std::path::Path;

#[test]
fn cli_parse_status() {
    match parse(&["ffdl", "status"]) {
        CliCommand::Status { out } => assert_eq!(out, Path::new(DEFAULT_OUT_DIR)),
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_status_out() {
    match parse(&["ffdl", "status", "--out", "/data/ff"]) {
        CliCommand::Status { out } => assert_eq!(out, Path::new("/data/ff")),
        _ => panic!("expected Status with --out"),
    }
}

#[test]
fn status_reports_latest_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = JsonlLedger::open_in_dir(dir.path()).unwrap();
    ledger
        .append(LedgerEntry::error("A", None, "HTTP 500"))
        .unwrap();
    ledger
        .append(LedgerEntry::downloaded("A", Path::new("a.mp4")))
        .unwrap();
    ledger
        .append(LedgerEntry::error("B", None, "HTTP 403"))
        .unwrap();
    ledger.append(LedgerEntry::no_video_url("C")).unwrap();

    let reopened = JsonlLedger::open_in_dir(dir.path()).unwrap();
    let text = render_status(&LedgerSummary::from_latest(reopened.latest_entries()));
    assert!(text.contains("downloaded     1"));
    assert!(text.contains("error          1"));
    assert!(text.contains("no_video_url   1"));
    assert!(text.contains("total          3"));
    assert!(text.ends_with("  B\n"));
}

#[test]
fn status_without_manifest_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    crate::cli::commands::run_status(&dir.path().join("missing")).unwrap();
    assert!(!dir.path().join("missing").exists());
}
