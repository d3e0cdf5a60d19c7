//! Per-symbol intraday series store
//!
//! One JSON array file per symbol, newest-first, capacity-bounded by the
//! engine cap. Missing and corrupt files read as empty series so the
//! engine self-heals on the next accepted write.

use crate::engine::SERIES_CAP;
use crate::error::Result;
use crate::metrics::MetricsRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable per-symbol metrics series
#[derive(Debug, Clone)]
pub struct SeriesStore {
    dir: PathBuf,
}

impl SeriesStore {
    /// Open (creating if needed) the series directory under the data dir
    pub fn new(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("symbolData");
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol))
    }

    /// Full series for a symbol, newest-first; empty if no store exists
    pub fn read_all(&self, symbol: &str) -> Vec<MetricsRecord> {
        super::read_json_array(&self.path(symbol))
    }

    /// Replace the full series for a symbol
    pub fn write_all(&self, symbol: &str, records: &[MetricsRecord]) -> Result<()> {
        super::write_json_atomic(&self.path(symbol), &records)
    }

    /// Remove a symbol's store; no error if it is already absent
    pub fn delete(&self, symbol: &str) -> Result<()> {
        match std::fs::remove_file(self.path(symbol)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Symbols that currently have an on-disk store
    pub fn symbols(&self) -> Result<Vec<String>> {
        let mut symbols = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }
        Ok(symbols)
    }

    /// Truncate every existing store to the series cap.
    ///
    /// Defends against the cap shrinking between releases or files grown
    /// by external writers. Returns the number of stores rewritten.
    pub fn compact_all(&self) -> Result<usize> {
        let mut rewritten = 0;
        for symbol in self.symbols()? {
            let mut records = self.read_all(&symbol);
            if records.len() > SERIES_CAP {
                records.truncate(SERIES_CAP);
                self.write_all(&symbol, &records)?;
                rewritten += 1;
                debug!("Compacted series for {} to {} entries", symbol, SERIES_CAP);
            }
        }
        if rewritten > 0 {
            info!("Compacted {} series stores", rewritten);
        }
        Ok(rewritten)
    }
}
