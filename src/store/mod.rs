//! Durable stores
//!
//! All persisted state lives as JSON files under the configured data
//! directory:
//!
//! ```text
//! data/
//!   symbolData/{SYMBOL}.json      intraday metrics series, newest-first
//!   eodData/{SYMBOL}-eod.json     EOD PCR records, date-descending
//!   favorites.json                tracked-symbol list
//! ```
//!
//! Writes go through a temp-file-then-rename cycle so a concurrent
//! reader observes either the old or the new content, never a partial
//! write. Corrupt files are treated as empty, not as errors; the next
//! accepted write replaces them.

pub mod eod;
pub mod series;
pub mod tracked;

pub use eod::{EodRecord, EodStore};
pub use series::SeriesStore;
pub use tracked::{TrackedStore, TRACKED_CAP};

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Read a JSON array file; missing or unreadable content yields an empty vec
pub(crate) fn read_json_array<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return Vec::new(),
    };

    match serde_json::from_slice(&bytes) {
        Ok(records) => records,
        Err(e) => {
            warn!("Unreadable store {:?}, treating as empty: {}", path, e);
            Vec::new()
        }
    }
}

/// Atomically replace a JSON file via a temp file in the same directory
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
