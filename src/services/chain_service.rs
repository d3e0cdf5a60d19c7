//! Chain service
//!
//! Fetches the current option-chain snapshot for a symbol and extracts
//! its metrics record. No persistence happens here; callers decide what
//! to do with the result.

use crate::chain::{self, ChainRow};
use crate::error::{AppError, Result};
use crate::metrics::{self, MetricsRecord, OiExtremes};
use crate::state::AppState;
use crate::symbols;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

/// One fetched snapshot: extracted metrics plus the pass-through chain rows
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResult {
    pub symbol: String,
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,
    #[serde(rename = "spotPrice")]
    pub spot_price: f64,
    pub metrics: MetricsRecord,
    #[serde(rename = "oiExtremes")]
    pub extremes: OiExtremes,
    #[serde(rename = "optionChain")]
    pub chain: Vec<ChainRow>,
}

/// Snapshot fetch + extraction
pub struct ChainService;

impl ChainService {
    /// Fetch and extract the current snapshot for a universe symbol.
    ///
    /// An unauthorized response invalidates the session and kicks off a
    /// background refresh; the triggering request is reported as failed
    /// and the caller may retry.
    pub async fn fetch_snapshot(state: &AppState, symbol: &str) -> Result<SnapshotResult> {
        let category = symbols::category_of(symbol)
            .ok_or_else(|| AppError::UnknownSymbol(symbol.to_string()))?;

        let payload = match state.provider.fetch_option_chain(category, symbol).await {
            Ok(payload) => payload,
            Err(AppError::SessionExpired) => {
                warn!("Session rejected while fetching {}; scheduling refresh", symbol);
                let session = state.session.clone();
                tokio::spawn(async move {
                    if let Err(e) = session.refresh().await {
                        warn!("Reactive session refresh failed: {}", e);
                    }
                });
                return Err(AppError::SessionExpired);
            }
            Err(e) => return Err(e),
        };

        let chain = chain::parse_payload(payload)?;
        let metrics = metrics::extract(&chain, metrics::format_timestamp(Utc::now()));
        let extremes = metrics::extremes(&chain);

        debug!(
            "Snapshot for {}: spot {}, PCR {}, {} strikes",
            symbol,
            chain.spot_price,
            metrics.pcr,
            chain.rows.len()
        );

        Ok(SnapshotResult {
            symbol: symbol.to_string(),
            expiry_date: chain.expiry_date,
            spot_price: chain.spot_price,
            metrics,
            extremes,
            chain: chain.rows,
        })
    }
}
