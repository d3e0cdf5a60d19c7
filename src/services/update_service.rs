//! Update service
//!
//! Owns the per-symbol read-decide-write cycle against the series store
//! and the end-of-day batch update. The cycle for one symbol runs under
//! that symbol's lock so the scheduled poll path and the on-demand
//! refresh path can never double-append.

use crate::engine::{self, UpdateDecision};
use crate::error::Result;
use crate::metrics::MetricsRecord;
use crate::scheduler::market_hours;
use crate::services::ChainService;
use crate::state::AppState;
use crate::symbols;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Per-symbol accounting for one EOD batch pass
#[derive(Debug, Default, Serialize)]
pub struct EodBatchOutcome {
    pub success: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Persisted-series update orchestration
pub struct UpdateService;

impl UpdateService {
    /// Fetch a fresh snapshot for a tracked symbol and run it through
    /// the decision engine. Returns the decision outcome.
    pub async fn refresh_symbol(state: &AppState, symbol: &str) -> Result<UpdateDecision> {
        let snapshot = ChainService::fetch_snapshot(state, symbol).await?;
        Self::apply_candidate(state, symbol, snapshot.metrics).await
    }

    /// Run one candidate through the engine and persist on acceptance.
    ///
    /// The read-decide-write sequence is a critical section per symbol.
    pub async fn apply_candidate(
        state: &AppState,
        symbol: &str,
        candidate: MetricsRecord,
    ) -> Result<UpdateDecision> {
        let lock = state.symbol_lock(symbol);
        let _guard = lock.lock().await;

        let mut series = state.series.read_all(symbol);
        let now_ms = Utc::now().timestamp_millis();
        let decision = engine::evaluate(
            &series,
            &candidate,
            state.poll.last_accepted_ms(symbol),
            now_ms,
        );

        match decision {
            UpdateDecision::Accepted => {
                engine::apply(&mut series, candidate);
                state.series.write_all(symbol, &series)?;
                state.poll.mark_accepted(symbol, now_ms);
                info!("Accepted update for {} ({} entries)", symbol, series.len());
            }
            UpdateDecision::Duplicate | UpdateDecision::TooSoon => {
                debug!("Rejected update for {}: {:?}", symbol, decision);
            }
        }

        Ok(decision)
    }

    /// Provision the initial series entry for a newly tracked symbol:
    /// one fetch-extract-accept cycle, bypassing the engine's gates.
    pub async fn provision_symbol(state: &AppState, symbol: &str) -> Result<()> {
        let snapshot = ChainService::fetch_snapshot(state, symbol).await?;

        let lock = state.symbol_lock(symbol);
        let _guard = lock.lock().await;

        let mut series = state.series.read_all(symbol);
        engine::apply(&mut series, snapshot.metrics);
        state.series.write_all(symbol, &series)?;
        state
            .poll
            .mark_accepted(symbol, Utc::now().timestamp_millis());

        info!("Provisioned series store for {}", symbol);
        Ok(())
    }

    /// EOD batch update across the whole universe.
    ///
    /// Only runs inside the EOD window (weekday, at/after market close);
    /// outside it the pass is a no-op. Symbols without a PCR value are
    /// skipped, as are symbols that already have a record for the
    /// resolved trading date.
    pub fn update_all_eod(state: &AppState, pcr_data: &HashMap<String, f64>) -> EodBatchOutcome {
        let now = market_hours::now_ist();
        let mut outcome = EodBatchOutcome::default();

        if !market_hours::can_update_eod(&now) {
            return outcome;
        }
        let trading_date = market_hours::last_trading_date(&now);

        for symbol in symbols::universe() {
            let Some(&pcr) = pcr_data.get(symbol) else {
                outcome.skipped.push(symbol.to_string());
                continue;
            };

            match state.eod.insert(symbol, trading_date, pcr) {
                Ok(true) => outcome.success.push(symbol.to_string()),
                Ok(false) => outcome.skipped.push(symbol.to_string()),
                Err(e) => {
                    tracing::error!("EOD update failed for {}: {}", symbol, e);
                    outcome.failed.push(symbol.to_string());
                }
            }
        }

        if !outcome.success.is_empty() {
            info!(
                "EOD pass for {}: {} updated, {} skipped, {} failed",
                trading_date,
                outcome.success.len(),
                outcome.skipped.len(),
                outcome.failed.len()
            );
        }
        outcome
    }

    /// PCR values for the EOD pass, taken from the newest intraday entry
    /// of each tracked symbol
    pub fn latest_pcr_by_symbol(state: &AppState) -> HashMap<String, f64> {
        let mut pcr_data = HashMap::new();
        for symbol in state.tracked.list() {
            if let Some(latest) = state.series.read_all(&symbol).first() {
                pcr_data.insert(symbol, latest.pcr_value());
            }
        }
        pcr_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::engine::SERIES_CAP;
    use crate::error::AppError;
    use crate::provider::{SessionManager, SnapshotSource};
    use crate::symbols::InstrumentCategory;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Snapshot source serving a configurable in-memory payload
    struct FakeSource {
        payload: Mutex<serde_json::Value>,
    }

    impl FakeSource {
        fn new(spot: f64, call_oi: i64, put_oi: i64) -> Self {
            Self {
                payload: Mutex::new(Self::payload_for(spot, call_oi, put_oi)),
            }
        }

        fn payload_for(spot: f64, call_oi: i64, put_oi: i64) -> serde_json::Value {
            json!({
                "filtered": {"data": [
                    {"strikePrice": 100.0, "underlyingValue": spot,
                     "expiryDate": "30-Jan-2025",
                     "CE": {"openInterest": call_oi},
                     "PE": {"openInterest": put_oi}}
                ]}
            })
        }

        fn set(&self, spot: f64, call_oi: i64, put_oi: i64) {
            *self.payload.lock() = Self::payload_for(spot, call_oi, put_oi);
        }
    }

    #[async_trait]
    impl SnapshotSource for FakeSource {
        async fn fetch_option_chain(
            &self,
            _category: InstrumentCategory,
            _symbol: &str,
        ) -> crate::error::Result<serde_json::Value> {
            Ok(self.payload.lock().clone())
        }
    }

    fn test_state(source: Arc<FakeSource>) -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::default().with_data_dir(dir.path());
        let session = Arc::new(SessionManager::new().unwrap());
        let state = AppState::with_provider(config, session, source).unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn test_first_refresh_accepts_and_persists() {
        let source = Arc::new(FakeSource::new(100.0, 1000, 1500));
        let (_dir, state) = test_state(source);

        let decision = UpdateService::refresh_symbol(&state, "NIFTY").await.unwrap();
        assert_eq!(decision, UpdateDecision::Accepted);

        let series = state.series.read_all("NIFTY");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].pcr, "1.50");
    }

    #[tokio::test]
    async fn test_identical_snapshot_is_rejected_as_duplicate() {
        let source = Arc::new(FakeSource::new(100.0, 1000, 1500));
        let (_dir, state) = test_state(source);

        UpdateService::refresh_symbol(&state, "NIFTY").await.unwrap();
        let decision = UpdateService::refresh_symbol(&state, "NIFTY").await.unwrap();

        assert_eq!(decision, UpdateDecision::Duplicate);
        assert_eq!(state.series.read_all("NIFTY").len(), 1);
    }

    #[tokio::test]
    async fn test_changed_snapshot_within_window_is_too_soon() {
        let source = Arc::new(FakeSource::new(100.0, 1000, 1500));
        let (_dir, state) = test_state(source.clone());

        UpdateService::refresh_symbol(&state, "NIFTY").await.unwrap();
        source.set(105.0, 1200, 1500);

        let decision = UpdateService::refresh_symbol(&state, "NIFTY").await.unwrap();
        assert_eq!(decision, UpdateDecision::TooSoon);
        assert_eq!(state.series.read_all("NIFTY").len(), 1);
    }

    #[tokio::test]
    async fn test_spacing_lost_on_restart_admits_changed_snapshot() {
        let source = Arc::new(FakeSource::new(100.0, 1000, 1500));
        let (_dir, state) = test_state(source.clone());

        UpdateService::refresh_symbol(&state, "NIFTY").await.unwrap();

        // Simulate restart: timing state is in-memory only
        state.poll.clear("NIFTY");
        source.set(105.0, 1200, 1500);

        let decision = UpdateService::refresh_symbol(&state, "NIFTY").await.unwrap();
        assert_eq!(decision, UpdateDecision::Accepted);

        let series = state.series.read_all("NIFTY");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].spot_price, 105.0);
    }

    #[tokio::test]
    async fn test_provision_bypasses_gates_and_caps_series() {
        let source = Arc::new(FakeSource::new(100.0, 1000, 1500));
        let (_dir, state) = test_state(source);

        // Pre-seed a full series; provisioning still lands the new entry
        let seed: Vec<_> = (0..SERIES_CAP)
            .map(|i| {
                crate::metrics::MetricsRecord {
                    timestamp: format!("t{}", i),
                    total_call_oi: i as u64,
                    total_put_oi: 0,
                    pcr: "0.00".to_string(),
                    atm_strike: 0.0,
                    atm_call_oi: 0,
                    atm_put_oi: 0,
                    change_pcr: "0.00".to_string(),
                    market_status: crate::metrics::MarketStatus::StrongBearish,
                    spot_price: i as f64,
                }
            })
            .collect();
        state.series.write_all("NIFTY", &seed).unwrap();

        UpdateService::provision_symbol(&state, "NIFTY").await.unwrap();

        let series = state.series.read_all("NIFTY");
        assert_eq!(series.len(), SERIES_CAP);
        assert_eq!(series[0].spot_price, 100.0);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_rejected() {
        let source = Arc::new(FakeSource::new(100.0, 1, 1));
        let (_dir, state) = test_state(source);

        let err = UpdateService::refresh_symbol(&state, "NOSUCH").await.unwrap_err();
        assert!(matches!(err, AppError::UnknownSymbol(_)));
    }

    #[test]
    fn test_latest_pcr_by_symbol_reads_newest_entries() {
        let source = Arc::new(FakeSource::new(100.0, 1, 1));
        let (_dir, state) = test_state(source);

        state.tracked.add("NIFTY").unwrap();
        state.tracked.add("BANKNIFTY").unwrap();

        let record = crate::metrics::MetricsRecord {
            timestamp: "t".to_string(),
            total_call_oi: 1000,
            total_put_oi: 1120,
            pcr: "1.12".to_string(),
            atm_strike: 100.0,
            atm_call_oi: 1,
            atm_put_oi: 1,
            change_pcr: "1.00".to_string(),
            market_status: crate::metrics::MarketStatus::Bullish,
            spot_price: 100.0,
        };
        state.series.write_all("NIFTY", &[record]).unwrap();

        let pcr_data = UpdateService::latest_pcr_by_symbol(&state);
        assert_eq!(pcr_data.get("NIFTY"), Some(&1.12));
        // Tracked but without data yet: absent, so the EOD pass skips it
        assert!(!pcr_data.contains_key("BANKNIFTY"));
    }
}
