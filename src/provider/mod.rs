//! Market-data provider
//!
//! The [`SnapshotSource`] trait is the seam between the engine and the
//! external data source; [`NseClient`] is the production implementation
//! against the NSE option-chain API. Tests inject fakes through the
//! trait.

pub mod session;

pub use session::{SessionCredential, SessionManager, REFRESH_INTERVAL};

use crate::error::{AppError, Result};
use crate::symbols::InstrumentCategory;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const INDICES_URL: &str = "https://www.nseindia.com/api/option-chain-indices";
const EQUITIES_URL: &str = "https://www.nseindia.com/api/option-chain-equities";

/// Browser-like headers the upstream requires
pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

/// Source of raw option-chain snapshots
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the raw option-chain payload for a symbol
    async fn fetch_option_chain(
        &self,
        category: InstrumentCategory,
        symbol: &str,
    ) -> Result<serde_json::Value>;
}

/// NSE option-chain client
pub struct NseClient {
    client: Client,
    session: Arc<SessionManager>,
}

impl NseClient {
    pub fn new(session: Arc<SessionManager>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .default_headers(default_headers())
            .build()?;

        Ok(Self { client, session })
    }
}

#[async_trait]
impl SnapshotSource for NseClient {
    async fn fetch_option_chain(
        &self,
        category: InstrumentCategory,
        symbol: &str,
    ) -> Result<serde_json::Value> {
        let cookie = self.session.cookie().ok_or(AppError::SessionExpired)?;

        let url = match category {
            InstrumentCategory::Indices => INDICES_URL,
            InstrumentCategory::Equities => EQUITIES_URL,
        };

        debug!("Fetching option chain for {} ({})", symbol, category.as_str());

        let response = self
            .client
            .get(url)
            .query(&[("symbol", symbol)])
            .header(COOKIE, cookie)
            .send()
            .await?;

        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                // Stale credential: drop it so the next refresh re-acquires
                self.session.invalidate();
                Err(AppError::SessionExpired)
            }
            status if !status.is_success() => Err(AppError::Upstream(format!(
                "option-chain endpoint returned {} for {}",
                status, symbol
            ))),
            _ => Ok(response.json().await?),
        }
    }
}
