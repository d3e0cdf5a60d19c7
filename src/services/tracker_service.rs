//! Tracker service
//!
//! Manages the tracked-symbol set and keeps the on-disk series stores
//! consistent with it.

use crate::error::{AppError, Result};
use crate::services::UpdateService;
use crate::state::AppState;
use crate::symbols;
use tracing::{info, warn};

/// Tracked-symbol set management
pub struct TrackerService;

impl TrackerService {
    /// Current tracked symbols
    pub fn list(state: &AppState) -> Vec<String> {
        state.tracked.list()
    }

    /// Track a universe symbol and provision its series store.
    ///
    /// Set membership is committed first; a provisioning failure leaves
    /// the symbol tracked and the store is populated by the next poll
    /// cycle instead.
    pub async fn add(state: &AppState, symbol: &str) -> Result<()> {
        if symbols::category_of(symbol).is_none() {
            return Err(AppError::UnknownSymbol(symbol.to_string()));
        }

        state.tracked.add(symbol)?;
        info!("Now tracking {}", symbol);

        if let Err(e) = UpdateService::provision_symbol(state, symbol).await {
            warn!(
                "Initial provisioning for {} failed ({}); next poll cycle will populate it",
                symbol, e
            );
        }
        Ok(())
    }

    /// Stop tracking a symbol and purge its series store
    pub fn remove(state: &AppState, symbol: &str) -> Result<()> {
        state.tracked.remove(symbol)?;
        state.series.delete(symbol)?;
        state.poll.clear(symbol);
        info!("Stopped tracking {}", symbol);
        Ok(())
    }

    /// Delete any series store whose symbol is no longer tracked.
    ///
    /// Handles stores orphaned by a crash between removing a symbol from
    /// the set and deleting its store. Returns the number purged.
    pub fn reconcile(state: &AppState) -> Result<usize> {
        let tracked = state.tracked.list();
        let mut purged = 0;

        for symbol in state.series.symbols()? {
            if !tracked.contains(&symbol) {
                state.series.delete(&symbol)?;
                purged += 1;
                info!("Purged orphaned series store for {}", symbol);
            }
        }
        Ok(purged)
    }
}
