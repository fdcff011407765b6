//! History Store: an append-only JSON array of past run summaries, kept in
//! the log directory and pruned to a 30-day retention window on save.
//!
//! There is no interprocess lock: concurrent runs against the same log
//! directory race on this file and the last writer wins. Callers treat the
//! store as advisory trend data, so the race is documented rather than
//! guarded against.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::model::HistoryEntry;

pub const HISTORY_FILE: &str = "e2e-history.json";
pub const RETENTION_DAYS: i64 = 30;

pub fn history_path(dir: &Path) -> PathBuf {
    dir.join(HISTORY_FILE)
}

/// Load all stored entries. An absent or corrupt file is "no history",
/// never an error.
pub fn load(dir: &Path) -> Vec<HistoryEntry> {
    let path = history_path(dir);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("history store unreadable, treating as empty ({}): {err}", path.display());
            Vec::new()
        }
    }
}

/// Append `entry`, drop everything older than the retention window relative
/// to `now`, rewrite the file, and return the retained entries so the
/// caller does not have to re-read. Creates `dir` if absent.
pub fn save(dir: &Path, entry: HistoryEntry, now: DateTime<Utc>) -> anyhow::Result<Vec<HistoryEntry>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating history directory {}", dir.display()))?;

    let mut entries = load(dir);
    entries.push(entry);
    let cutoff = now - Duration::days(RETENTION_DAYS);
    entries.retain(|e| e.timestamp > cutoff);

    let path = history_path(dir);
    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(&path, json).with_context(|| format!("writing history store {}", path.display()))?;
    Ok(entries)
}
