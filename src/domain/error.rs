//! Domain-level errors (no external dependencies)

use chrono::NaiveDate;
use thiserror::Error;

/// Domain errors represent violations of the hierarchy and window invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in partition '{partition}': {}", path.join(" -> "))]
    CycleDetected {
        partition: String,
        /// Ids along the cycle, first id repeated at the end
        path: Vec<String>,
    },

    #[error("invalid fiscal window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}
