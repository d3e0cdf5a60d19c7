//! Application state

use crate::config::AppConfig;
use crate::error::Result;
use crate::provider::{NseClient, SessionManager, SnapshotSource};
use crate::store::{EodStore, SeriesStore, TrackedStore};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-symbol poll timing state.
///
/// In-memory only: lost on restart, which at worst allows one immediate
/// update per symbol that would otherwise have waited out the spacing
/// window.
#[derive(Debug, Default)]
pub struct PollState {
    last_accepted: DashMap<String, i64>,
    last_cycle_start: Mutex<Option<Instant>>,
}

impl PollState {
    /// Epoch millis of the last accepted update for a symbol
    pub fn last_accepted_ms(&self, symbol: &str) -> Option<i64> {
        self.last_accepted.get(symbol).map(|v| *v)
    }

    pub fn mark_accepted(&self, symbol: &str, now_ms: i64) {
        self.last_accepted.insert(symbol.to_string(), now_ms);
    }

    pub fn clear(&self, symbol: &str) {
        self.last_accepted.remove(symbol);
    }

    /// Cycle throttle: marks a new cycle start and returns true, or
    /// returns false when the previous cycle started less than `gate` ago
    pub fn try_begin_cycle(&self, gate: Duration) -> bool {
        let mut last = self.last_cycle_start.lock();
        let now = Instant::now();
        if let Some(previous) = *last {
            if now.duration_since(previous) < gate {
                return false;
            }
        }
        *last = Some(now);
        true
    }
}

/// Application state shared across the scheduler and API handlers
pub struct AppState {
    pub config: AppConfig,
    pub session: Arc<SessionManager>,
    pub provider: Arc<dyn SnapshotSource>,
    pub series: SeriesStore,
    pub eod: EodStore,
    pub tracked: TrackedStore,
    pub poll: PollState,
    symbol_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl AppState {
    /// Build production state: stores under the configured data dir, the
    /// NSE client as the snapshot source
    pub fn new(config: AppConfig) -> Result<Self> {
        let session = Arc::new(SessionManager::new()?);
        let provider: Arc<dyn SnapshotSource> = Arc::new(NseClient::new(session.clone())?);
        Self::with_provider(config, session, provider)
    }

    /// Build state with an injected snapshot source (used by tests)
    pub fn with_provider(
        config: AppConfig,
        session: Arc<SessionManager>,
        provider: Arc<dyn SnapshotSource>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let series = SeriesStore::new(&config.data_dir)?;
        let eod = EodStore::new(&config.data_dir)?;
        let tracked = TrackedStore::new(&config.data_dir)?;

        Ok(Self {
            config,
            session,
            provider,
            series,
            eod,
            tracked,
            poll: PollState::default(),
            symbol_locks: DashMap::new(),
        })
    }

    /// Per-symbol write lock guarding the read-decide-write cycle.
    ///
    /// Shared by the scheduled poll path and the on-demand refresh path
    /// so two near-simultaneous triggers cannot both pass the identity
    /// check against a stale "latest" and double-append.
    pub fn symbol_lock(&self, symbol: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.symbol_locks
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_gate_throttles_back_to_back_cycles() {
        let poll = PollState::default();
        assert!(poll.try_begin_cycle(Duration::from_secs(10)));
        assert!(!poll.try_begin_cycle(Duration::from_secs(10)));
        // A zero gate always admits the next cycle
        assert!(poll.try_begin_cycle(Duration::ZERO));
    }

    #[test]
    fn test_poll_state_tracks_acceptance_per_symbol() {
        let poll = PollState::default();
        assert_eq!(poll.last_accepted_ms("NIFTY"), None);

        poll.mark_accepted("NIFTY", 1_000);
        assert_eq!(poll.last_accepted_ms("NIFTY"), Some(1_000));
        assert_eq!(poll.last_accepted_ms("BANKNIFTY"), None);

        poll.clear("NIFTY");
        assert_eq!(poll.last_accepted_ms("NIFTY"), None);
    }
}
