//! In-memory ledger for tests and dry runs.

use anyhow::Result;

use super::{Ledger, LedgerEntry};

#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    /// Every entry in append order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

impl Ledger for MemoryLedger {
    fn lookup_latest(&self, record_id: &str) -> Option<&LedgerEntry> {
        self.entries.iter().rev().find(|e| e.record_id == record_id)
    }

    fn append(&mut self, entry: LedgerEntry) -> Result<()> {
        self.entries.push(entry);
        Ok(())
    }
}
