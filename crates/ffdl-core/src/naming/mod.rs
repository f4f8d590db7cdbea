//! Destination filenames for meeting videos.
//!
//! Names are `<date>__<title>__<id>.mp4`. An id that is already a safe file
//! name component is used verbatim; any other id is sanitized and suffixed with
//! a short SHA-256 digest of the raw id, so `a/b` and `a:b` stay distinct. The
//! date prefix keeps a directory listing in chronological order.

mod sanitize;

pub use sanitize::sanitize_component;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::record::MeetingRecord;

const TITLE_MAX: usize = 140;
const DATE_MAX: usize = 40;
const ID_MAX: usize = 100;
/// Hex characters of the id digest kept in the name.
const ID_DIGEST_LEN: usize = 12;
const EXTENSION: &str = "mp4";

/// Deterministic, sanitized file name for a record.
pub fn file_name_for(record: &MeetingRecord) -> String {
    let date = record
        .occurred_at
        .map(|at| sanitize_component(&at.format("%Y-%m-%dT%H-%M-%S").to_string(), DATE_MAX))
        .unwrap_or_else(|| "unknown_date".to_string());
    let title = if record.title.trim().is_empty() {
        "meeting".to_string()
    } else {
        sanitize_component(&record.title, TITLE_MAX)
    };
    let id = id_component(&record.id);
    format!("{}__{}__{}.{}", date, title, id, EXTENSION)
}

fn id_component(id: &str) -> String {
    let safe = sanitize_component(id, ID_MAX);
    if safe == id {
        return safe;
    }
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", safe, &digest[..ID_DIGEST_LEN])
}

/// Full destination path of a record inside `out_dir`.
pub fn destination_for(out_dir: &Path, record: &MeetingRecord) -> PathBuf {
    out_dir.join(file_name_for(record))
}
