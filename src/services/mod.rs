//! Services layer
//!
//! Business logic shared between the scheduler and the REST API
//! handlers. Services are stateless method bundles over [`AppState`]:
//!
//! - `ChainService` - fetch + extract the latest snapshot for a symbol
//! - `UpdateService` - the per-symbol read-decide-write cycle and the
//!   EOD batch update
//! - `TrackerService` - tracked-symbol set management and store
//!   reconciliation
//!
//! [`AppState`]: crate::state::AppState

pub mod chain_service;
pub mod tracker_service;
pub mod update_service;

pub use chain_service::{ChainService, SnapshotResult};
pub use tracker_service::TrackerService;
pub use update_service::{EodBatchOutcome, UpdateService};
