//! Tracked-symbol set store
//!
//! A small capacity-bounded list of symbols the poll loop actively
//! follows (the favorites set). Persisted as a single JSON array;
//! mutations are serialised behind an internal lock.

use crate::error::{AppError, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Maximum number of tracked symbols
pub const TRACKED_CAP: usize = 10;

/// Durable tracked-symbol set
#[derive(Debug)]
pub struct TrackedStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TrackedStore {
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join("favorites.json"),
            write_lock: Mutex::new(()),
        })
    }

    /// Current tracked symbols, in insertion order
    pub fn list(&self) -> Vec<String> {
        super::read_json_array(&self.path)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.list().iter().any(|s| s == symbol)
    }

    /// Add a symbol to the set.
    ///
    /// Fails with [`AppError::AlreadyTracked`] or
    /// [`AppError::CapacityExceeded`]; no partial mutation occurs.
    pub fn add(&self, symbol: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut symbols = self.list();

        if symbols.iter().any(|s| s == symbol) {
            return Err(AppError::AlreadyTracked(symbol.to_string()));
        }
        if symbols.len() >= TRACKED_CAP {
            return Err(AppError::CapacityExceeded);
        }

        symbols.push(symbol.to_string());
        super::write_json_atomic(&self.path, &symbols)
    }

    /// Remove a symbol from the set, failing with [`AppError::NotTracked`]
    /// if it is absent
    pub fn remove(&self, symbol: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut symbols = self.list();

        let before = symbols.len();
        symbols.retain(|s| s != symbol);
        if symbols.len() == before {
            return Err(AppError::NotTracked(symbol.to_string()));
        }

        super::write_json_atomic(&self.path, &symbols)
    }
}
