//! Upstream session management
//!
//! The option-chain endpoints require session cookies issued by the
//! exchange's landing page. The credential is process-wide shared state:
//! refreshed on a fixed timer, and reactively whenever a fetch comes
//! back unauthorized. A refresh mid-cycle never blocks in-flight
//! requests that already captured the old value.

use crate::error::{AppError, Result};
use crate::provider::default_headers;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::header::SET_COOKIE;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// How often the credential is proactively refreshed
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Bounded retry budget for one refresh
const MAX_ATTEMPTS: u32 = 5;

/// Base delay for exponential backoff between attempts
const BACKOFF_BASE: Duration = Duration::from_secs(1);

const LANDING_URL: &str = "https://www.nseindia.com";

/// A usable upstream session credential
#[derive(Debug, Clone)]
pub struct SessionCredential {
    /// `Cookie` header value for subsequent requests
    pub cookie: String,
    pub acquired_at: DateTime<Utc>,
}

/// Owner of the process-wide session credential
pub struct SessionManager {
    client: Client,
    credential: RwLock<Option<SessionCredential>>,
}

impl SessionManager {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .default_headers(default_headers())
            .build()?;

        Ok(Self {
            client,
            credential: RwLock::new(None),
        })
    }

    /// Current cookie value, if a credential is held
    pub fn cookie(&self) -> Option<String> {
        self.credential.read().as_ref().map(|c| c.cookie.clone())
    }

    /// Whether a credential is currently held; surfaced via /health
    pub fn is_ready(&self) -> bool {
        self.credential.read().is_some()
    }

    /// Drop the held credential, forcing the next refresh to re-acquire
    pub fn invalidate(&self) {
        *self.credential.write() = None;
    }

    /// Acquire a fresh credential with bounded exponential backoff.
    ///
    /// Exhaustion is reported to the caller and reflected in the health
    /// signal, never treated as fatal: fetches keep failing until a
    /// later refresh succeeds.
    pub async fn refresh(&self) -> Result<()> {
        let mut delay = BACKOFF_BASE;
        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.acquire().await {
                Ok(credential) => {
                    info!("Session credential acquired (attempt {})", attempt);
                    *self.credential.write() = Some(credential);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Session acquisition attempt {} failed: {}", attempt, e);
                    last_err = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            AppError::Internal("session refresh failed without an error".to_string())
        }))
    }

    async fn acquire(&self) -> Result<SessionCredential> {
        let response = self.client.get(LANDING_URL).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "landing page returned {}",
                response.status()
            )));
        }

        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect::<Vec<_>>()
            .join("; ");

        if cookie.is_empty() {
            return Err(AppError::Upstream("no session cookies issued".to_string()));
        }

        Ok(SessionCredential {
            cookie,
            acquired_at: Utc::now(),
        })
    }
}
