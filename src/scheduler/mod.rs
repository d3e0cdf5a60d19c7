//! Scheduling
//!
//! - `market_hours` - IST trading-calendar gates
//! - `poller` - the poll loop and the session/maintenance tickers

pub mod market_hours;
pub mod poller;

pub use poller::{Poller, CYCLE_GATE, INTER_SYMBOL_DELAY};
