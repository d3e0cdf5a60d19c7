//! chainwatch - NSE option-chain PCR tracking service
//!
//! A headless backend that polls option-chain snapshots for a curated
//! set of NSE symbols, maintains bounded per-symbol PCR time series and
//! end-of-day records on disk, and serves them over a small REST API.

pub mod api;
pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod store;
pub mod symbols;
