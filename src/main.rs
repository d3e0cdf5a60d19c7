use anyhow::Context;
use chainwatch::config::AppConfig;
use chainwatch::scheduler::poller::{self, Poller};
use chainwatch::state::AppState;
use chainwatch::symbols;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chainwatch=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting chainwatch...");

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = Arc::new(AppState::new(config).context("failed to initialize state")?);

    // EOD stores exist for the whole universe up front
    state
        .eod
        .provision_all(symbols::universe())
        .context("failed to provision EOD stores")?;

    poller::spawn_session_refresh(state.clone());
    poller::spawn_maintenance(state.clone());
    Poller::new(state.clone()).spawn();

    chainwatch::api::serve(state).await.context("API server failed")?;

    Ok(())
}
