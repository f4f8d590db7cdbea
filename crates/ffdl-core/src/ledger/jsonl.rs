//! File-backed ledger: one JSON object per line, appended and fsynced.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Ledger, LedgerEntry};

pub const MANIFEST_FILE_NAME: &str = "manifest.jsonl";

/// Append-only JSONL ledger. The file is created lazily on the first append, so
/// opening a ledger (e.g. for a dry run) never touches the output directory.
pub struct JsonlLedger {
    path: PathBuf,
    latest: BTreeMap<String, LedgerEntry>,
    file: Option<File>,
    /// Last byte on disk is not `\n` (a torn final line); terminate it before appending.
    needs_newline: bool,
    skipped_lines: usize,
}

impl JsonlLedger {
    /// Ledger at `<dir>/manifest.jsonl`.
    pub fn open_in_dir(dir: &Path) -> Result<Self> {
        Self::open(dir.join(MANIFEST_FILE_NAME))
    }

    /// Load every parseable line of `path` (if it exists). Unparseable lines,
    /// including a final line cut short by a crash, are skipped with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read ledger: {}", path.display()))
            }
        };

        let mut latest = BTreeMap::new();
        let mut skipped_lines = 0usize;
        for (n, line) in bytes.split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<LedgerEntry>(line) {
                Ok(entry) => {
                    latest.insert(entry.record_id.clone(), entry);
                }
                Err(e) => {
                    skipped_lines += 1;
                    tracing::warn!(
                        line = n + 1,
                        "skipping unreadable ledger line in {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        let needs_newline = bytes.last().is_some_and(|b| *b != b'\n');
        tracing::debug!(
            records = latest.len(),
            skipped_lines,
            "loaded ledger {}",
            path.display()
        );

        Ok(Self {
            path,
            latest,
            file: None,
            needs_newline,
            skipped_lines,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines that could not be parsed on open.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Latest entry per record, ordered by record id.
    pub fn latest_entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.latest.values()
    }

    fn file(&mut self) -> Result<&mut File> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create dir: {}", parent.display()))?;
            }
            let f = File::options()
                .create(true)
                .append(true)
                .open(&self.path)
                .with_context(|| format!("open ledger for append: {}", self.path.display()))?;
            self.file = Some(f);
        }
        self.file
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("ledger file not open"))
    }
}

impl Ledger for JsonlLedger {
    fn lookup_latest(&self, record_id: &str) -> Option<&LedgerEntry> {
        self.latest.get(record_id)
    }

    fn append(&mut self, entry: LedgerEntry) -> Result<()> {
        let mut line = Vec::with_capacity(160);
        if self.needs_newline {
            line.push(b'\n');
        }
        serde_json::to_writer(&mut line, &entry).context("serialize ledger entry")?;
        line.push(b'\n');

        let path = self.path.clone();
        let file = self.file()?;
        file.write_all(&line)
            .with_context(|| format!("append to ledger: {}", path.display()))?;
        file.sync_data()
            .with_context(|| format!("sync ledger: {}", path.display()))?;

        self.needs_newline = false;
        self.latest.insert(entry.record_id.clone(), entry);
        Ok(())
    }
}
