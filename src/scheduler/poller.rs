//! Poll loop and background tickers
//!
//! One cooperative loop drives fetch-extract-decide-persist across all
//! tracked symbols, strictly sequentially, with a fixed delay between
//! symbols to bound the outbound request rate. Separate tickers handle
//! session refresh and store compaction/reconciliation; the core logic
//! stays directly callable in tests without any timer running.

use crate::scheduler::market_hours;
use crate::services::{TrackerService, UpdateService};
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Minimum gap between two poll cycle starts
pub const CYCLE_GATE: Duration = Duration::from_secs(10);

/// Fixed delay between symbols within one cycle, accept or reject
pub const INTER_SYMBOL_DELAY: Duration = Duration::from_secs(5);

/// How often the loop wakes up; the cycle gate absorbs extra wakeups
const POLL_TICK: Duration = Duration::from_secs(10);

/// How often stores are compacted and reconciled
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Scheduled poll driver
pub struct Poller {
    state: Arc<AppState>,
}

impl Poller {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Spawn the repeating poll loop
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Poll loop started");
            let mut tick = tokio::time::interval(POLL_TICK);
            loop {
                tick.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// One poll cycle. Invoking this more often than the cadence is a
    /// no-op thanks to the cycle gate.
    pub async fn run_cycle(&self) {
        if !self.state.poll.try_begin_cycle(CYCLE_GATE) {
            debug!("Cycle throttled");
            return;
        }

        let now = market_hours::now_ist();

        if market_hours::is_market_open(&now) {
            self.poll_tracked_symbols().await;
        } else {
            debug!("Market closed; skipping intraday fetches");
        }

        // The EOD insert dedups per trading date, so running this every
        // cycle inside the window is safe.
        if market_hours::can_update_eod(&now) {
            let pcr_data = UpdateService::latest_pcr_by_symbol(&self.state);
            UpdateService::update_all_eod(&self.state, &pcr_data);
        }
    }

    async fn poll_tracked_symbols(&self) {
        let symbols = self.state.tracked.list();

        for (i, symbol) in symbols.iter().enumerate() {
            // Delay between symbols only; the last one pays no trailing wait
            if i > 0 {
                tokio::time::sleep(INTER_SYMBOL_DELAY).await;
            }
            match UpdateService::refresh_symbol(&self.state, symbol).await {
                Ok(decision) => debug!("Poll {}: {:?}", symbol, decision),
                // One symbol's failure never aborts the rest of the cycle
                Err(e) => warn!("Poll {} failed: {}", symbol, e),
            }
        }
    }
}

/// Spawn the session-refresh ticker: one immediate acquisition, then a
/// fixed-interval refresh independent of the poll loop
pub fn spawn_session_refresh(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(crate::provider::REFRESH_INTERVAL);
        loop {
            tick.tick().await;
            if let Err(e) = state.session.refresh().await {
                warn!("Scheduled session refresh failed: {}", e);
            }
        }
    })
}

/// Spawn the maintenance ticker: series compaction plus tracked-set
/// reconciliation
pub fn spawn_maintenance(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(MAINTENANCE_INTERVAL);
        loop {
            tick.tick().await;
            if let Err(e) = state.series.compact_all() {
                warn!("Series compaction failed: {}", e);
            }
            if let Err(e) = TrackerService::reconcile(&state) {
                warn!("Store reconciliation failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::provider::{SessionManager, SnapshotSource};
    use crate::symbols::InstrumentCategory;
    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;

    struct FakeSource;

    #[async_trait]
    impl SnapshotSource for FakeSource {
        async fn fetch_option_chain(
            &self,
            _category: InstrumentCategory,
            _symbol: &str,
        ) -> crate::error::Result<serde_json::Value> {
            Ok(json!({
                "filtered": {"data": [
                    {"strikePrice": 100.0, "underlyingValue": 100.0,
                     "CE": {"openInterest": 10}, "PE": {"openInterest": 20}}
                ]}
            }))
        }
    }

    fn test_state() -> (TempDir, Arc<AppState>) {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::default().with_data_dir(dir.path());
        let session = Arc::new(SessionManager::new().unwrap());
        let state = AppState::with_provider(config, session, Arc::new(FakeSource)).unwrap();
        (dir, Arc::new(state))
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_runs_between_symbols_not_after_the_last() {
        let (_dir, state) = test_state();
        state.tracked.add("NIFTY").unwrap();
        state.tracked.add("BANKNIFTY").unwrap();

        let poller = Poller::new(state.clone());
        let started = tokio::time::Instant::now();
        poller.poll_tracked_symbols().await;

        // Two symbols: exactly one inter-symbol gap, no trailing wait
        assert_eq!(started.elapsed(), INTER_SYMBOL_DELAY);
        assert_eq!(state.series.read_all("NIFTY").len(), 1);
        assert_eq!(state.series.read_all("BANKNIFTY").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_symbol_cycle_has_no_delay() {
        let (_dir, state) = test_state();
        state.tracked.add("NIFTY").unwrap();

        let poller = Poller::new(state.clone());
        let started = tokio::time::Instant::now();
        poller.poll_tracked_symbols().await;

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(state.series.read_all("NIFTY").len(), 1);
    }
}
