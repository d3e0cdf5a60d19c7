//! Per-symbol end-of-day PCR store
//!
//! One JSON array file per universe symbol, ordered descending by date,
//! at most one record per trading day. Stores are pre-provisioned empty
//! for the whole universe at startup so the EOD pass never has to guess
//! whether a missing file means "new symbol" or "lost data". Growth is
//! unbounded; only the intraday series carry a retention cap.

use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// One end-of-day observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EodRecord {
    /// Trading date (calendar date, no time component)
    pub datestamp: NaiveDate,
    /// Closing put-call ratio
    pub pcr: f64,
}

/// Outcome of provisioning the universe's EOD stores
#[derive(Debug, Default, Serialize)]
pub struct ProvisionOutcome {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Durable per-symbol EOD record store
#[derive(Debug, Clone)]
pub struct EodStore {
    dir: PathBuf,
}

impl EodStore {
    /// Open (creating if needed) the EOD directory under the data dir
    pub fn new(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("eodData");
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}-eod.json", symbol))
    }

    /// Full EOD history for a symbol, date-descending
    pub fn read_all(&self, symbol: &str) -> Vec<EodRecord> {
        super::read_json_array(&self.path(symbol))
    }

    /// Insert one record for a trading date.
    ///
    /// Returns `Ok(false)` without mutating anything when a record for
    /// that date already exists; this is a rejection result, not an error.
    pub fn insert(&self, symbol: &str, datestamp: NaiveDate, pcr: f64) -> Result<bool> {
        let mut records = self.read_all(symbol);
        if records.iter().any(|r| r.datestamp == datestamp) {
            return Ok(false);
        }

        records.push(EodRecord { datestamp, pcr });
        records.sort_by(|a, b| b.datestamp.cmp(&a.datestamp));
        super::write_json_atomic(&self.path(symbol), &records)?;
        Ok(true)
    }

    /// Create empty stores for every symbol that does not have one yet
    pub fn provision_all<'a>(
        &self,
        symbols: impl Iterator<Item = &'a str>,
    ) -> Result<ProvisionOutcome> {
        let mut outcome = ProvisionOutcome::default();
        for symbol in symbols {
            let path = self.path(symbol);
            if path.exists() {
                outcome.skipped.push(symbol.to_string());
                continue;
            }
            super::write_json_atomic(&path, &Vec::<EodRecord>::new())?;
            outcome.created.push(symbol.to_string());
        }
        if !outcome.created.is_empty() {
            info!(
                "Provisioned {} EOD stores ({} already present)",
                outcome.created.len(),
                outcome.skipped.len()
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_insert_rejects_duplicate_date() {
        let dir = TempDir::new().unwrap();
        let store = EodStore::new(dir.path()).unwrap();

        assert!(store.insert("NIFTY", date("2025-01-06"), 1.12).unwrap());
        assert!(!store.insert("NIFTY", date("2025-01-06"), 1.99).unwrap());

        let records = store.read_all("NIFTY");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pcr, 1.12);
    }

    #[test]
    fn test_records_are_kept_date_descending() {
        let dir = TempDir::new().unwrap();
        let store = EodStore::new(dir.path()).unwrap();

        store.insert("NIFTY", date("2025-01-06"), 1.1).unwrap();
        store.insert("NIFTY", date("2025-01-08"), 1.3).unwrap();
        store.insert("NIFTY", date("2025-01-07"), 1.2).unwrap();

        let dates: Vec<NaiveDate> = store
            .read_all("NIFTY")
            .into_iter()
            .map(|r| r.datestamp)
            .collect();
        assert_eq!(
            dates,
            vec![date("2025-01-08"), date("2025-01-07"), date("2025-01-06")]
        );
    }

    #[test]
    fn test_provision_all_skips_existing_stores() {
        let dir = TempDir::new().unwrap();
        let store = EodStore::new(dir.path()).unwrap();

        store.insert("NIFTY", date("2025-01-06"), 1.1).unwrap();

        let outcome = store.provision_all(["NIFTY", "BANKNIFTY"].into_iter()).unwrap();
        assert_eq!(outcome.created, vec!["BANKNIFTY".to_string()]);
        assert_eq!(outcome.skipped, vec!["NIFTY".to_string()]);

        // Existing data survives provisioning
        assert_eq!(store.read_all("NIFTY").len(), 1);
        assert!(store.read_all("BANKNIFTY").is_empty());
    }
}
