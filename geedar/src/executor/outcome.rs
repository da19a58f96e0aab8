//! Batch execution results.

use chrono::NaiveDate;
use thiserror::Error;

use crate::compute::{ComputeError, Fragment};

/// A batch that produced data, possibly after degrading to per-date calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub fragment: Fragment,
    /// Dates whose single-date call failed during per-date fallback.
    pub missing_dates: Vec<NaiveDate>,
    /// Remote calls made, retries included.
    pub calls: u32,
    /// Whether the per-date fallback was used.
    pub degraded: bool,
}

/// A batch that produced nothing.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("batch of {} date(s) failed after {calls} call(s): {error}", .dates.len())]
pub struct BatchFailure {
    pub dates: Vec<NaiveDate>,
    pub calls: u32,
    pub error: ComputeError,
}
