//! `ffdl status` – latest outcome per record, from the manifest.

use anyhow::Result;
use ffdl_core::ledger::{JsonlLedger, LedgerSummary};
use std::path::Path;

pub fn run_status(out_dir: &Path) -> Result<()> {
    let ledger = JsonlLedger::open_in_dir(out_dir)?;
    if !ledger.path().exists() {
        println!("No manifest at {}.", ledger.path().display());
        return Ok(());
    }
    let summary = LedgerSummary::from_latest(ledger.latest_entries());
    print!("{}", render_status(&summary));
    if ledger.skipped_lines() > 0 {
        println!("unreadable lines: {}", ledger.skipped_lines());
    }
    Ok(())
}

pub(crate) fn render_status(s: &LedgerSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<14} {}\n", "STATUS", "RECORDS"));
    for (label, n) in [
        ("downloaded", s.downloaded),
        ("exists", s.exists),
        ("no_video_url", s.no_video_url),
        ("error", s.error),
        ("unrecognized", s.unrecognized),
    ] {
        out.push_str(&format!("{:<14} {}\n", label, n));
    }
    out.push_str(&format!("{:<14} {}\n", "total", s.records));
    if !s.errored_ids.is_empty() {
        out.push_str("\nFailing records (retried on next run):\n");
        for id in &s.errored_ids {
            out.push_str(&format!("  {}\n", id));
        }
    }
    out
}
