//! Update decision engine
//!
//! The single gate deciding whether a freshly extracted metrics record
//! becomes a new persisted entry for a symbol. Rules are evaluated in a
//! fixed order: identity against the newest stored entry first, then
//! minimum spacing since the last acceptance. Rejections are expected,
//! frequent outcomes of normal operation, not errors.
//!
//! The engine is pure: callers inject the current time and the
//! last-acceptance time, so it is directly testable without any clock
//! or timer running.

use crate::metrics::MetricsRecord;
use serde::Serialize;

/// Maximum number of retained entries per symbol series
pub const SERIES_CAP: usize = 700;

/// Minimum wall-clock gap between two accepted updates for one symbol
pub const MIN_UPDATE_SPACING_MS: i64 = 60_000;

/// Outcome of evaluating one candidate record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateDecision {
    /// Candidate differs from the newest entry and spacing is satisfied
    Accepted,
    /// Candidate matches the newest entry field-for-field
    Duplicate,
    /// Candidate differs but arrived within the minimum spacing window
    TooSoon,
}

/// Evaluate a candidate against the current series and timing state.
///
/// `series` is newest-first. `last_accepted_ms` is the epoch-millis
/// acceptance time of the newest entry, absent for a fresh series (or
/// after a restart, in which case one immediate update may be accepted
/// that would otherwise have waited).
pub fn evaluate(
    series: &[MetricsRecord],
    candidate: &MetricsRecord,
    last_accepted_ms: Option<i64>,
    now_ms: i64,
) -> UpdateDecision {
    // An empty series always admits its first record, even when timing
    // state from a previous acceptance is still held (a corrupt store
    // reads as empty and must re-seed on the next candidate, not wait
    // out the spacing window).
    let Some(latest) = series.first() else {
        return UpdateDecision::Accepted;
    };

    // R1: identity against the newest entry, regardless of elapsed time
    if candidate.is_duplicate_of(latest) {
        return UpdateDecision::Duplicate;
    }

    // R2: minimum spacing since the last accepted update
    if let Some(last_ms) = last_accepted_ms {
        if now_ms - last_ms < MIN_UPDATE_SPACING_MS {
            return UpdateDecision::TooSoon;
        }
    }

    UpdateDecision::Accepted
}

/// Prepend an accepted candidate and truncate to capacity.
///
/// Only call after [`evaluate`] returned [`UpdateDecision::Accepted`];
/// the caller owns the read-decide-write critical section per symbol.
pub fn apply(series: &mut Vec<MetricsRecord>, candidate: MetricsRecord) {
    series.insert(0, candidate);
    series.truncate(SERIES_CAP);
}
