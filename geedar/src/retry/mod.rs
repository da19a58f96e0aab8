//! Retry policy for reduction calls.
//!
//! The executor asks the policy what to do after each failed attempt. The
//! decision depends only on the failure class and the batch's own
//! [`RetryState`], so it is tested here without any network or clock.
//!
//! | Failure            | Action                                             |
//! |--------------------|----------------------------------------------------|
//! | timeout            | retry; per-date fallback on the Nth timeout        |
//! | payload too large  | retry with the tile scale multiplied               |
//! | anything else      | wait the backoff, retry                            |
//!
//! No action but [`RetryAction::GiveUp`] is returned once `max_attempts`
//! attempts have been made.

use std::time::Duration;

use crate::compute::ComputeError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUTS_BEFORE_FALLBACK: u32 = 2;
pub const DEFAULT_TILE_SCALE_FACTOR: u32 = 2;
pub const DEFAULT_BACKOFF_SECS: u64 = 30;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Try again immediately with the same parameters.
    Retry,
    /// Try again with this tile scale.
    RetryWithTileScale(u32),
    /// Wait, then try again.
    RetryAfter(Duration),
    /// Stop batching; request each date on its own.
    FallbackPerDate,
    /// The batch has failed.
    GiveUp,
}

/// Per-batch retry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Attempts made so far, including the one that just failed.
    pub attempts: u32,
    pub timeouts: u32,
    pub tile_scale: u32,
    /// Dates in the batch; per-date fallback only makes sense above one.
    pub batch_len: usize,
}

impl RetryState {
    pub fn new(batch_len: usize) -> Self {
        Self {
            attempts: 0,
            timeouts: 0,
            tile_scale: 1,
            batch_len,
        }
    }

    /// Records a failed attempt.
    pub fn record_failure(&mut self, error: &ComputeError) {
        self.attempts += 1;
        if matches!(error, ComputeError::Timeout) {
            self.timeouts += 1;
        }
    }
}

/// Tiered retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    timeouts_before_fallback: u32,
    tile_scale_factor: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeouts_before_fallback: DEFAULT_TIMEOUTS_BEFORE_FALLBACK,
            tile_scale_factor: DEFAULT_TILE_SCALE_FACTOR,
            backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_timeouts_before_fallback(mut self, timeouts: u32) -> Self {
        self.timeouts_before_fallback = timeouts.max(1);
        self
    }

    pub fn with_tile_scale_factor(mut self, factor: u32) -> Self {
        self.tile_scale_factor = factor.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn timeouts_before_fallback(&self) -> u32 {
        self.timeouts_before_fallback
    }

    pub fn tile_scale_factor(&self) -> u32 {
        self.tile_scale_factor
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Decides the next step after `error`.
    ///
    /// `state` must already include the failed attempt (see
    /// [`RetryState::record_failure`]).
    pub fn next_action(&self, state: &RetryState, error: &ComputeError) -> RetryAction {
        if matches!(error, ComputeError::Timeout)
            && state.timeouts >= self.timeouts_before_fallback
            && state.batch_len > 1
        {
            return RetryAction::FallbackPerDate;
        }

        if state.attempts >= self.max_attempts {
            return RetryAction::GiveUp;
        }

        match error {
            ComputeError::Timeout => RetryAction::Retry,
            ComputeError::PayloadTooLarge => RetryAction::RetryWithTileScale(
                state.tile_scale.saturating_mul(self.tile_scale_factor),
            ),
            ComputeError::Transient(_) => RetryAction::RetryAfter(self.backoff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(state: &mut RetryState, error: &ComputeError) -> RetryAction {
        state.record_failure(error);
        RetryPolicy::default().next_action(state, error)
    }

    #[test]
    fn test_second_timeout_falls_back_for_multi_date_batches() {
        let mut state = RetryState::new(3);
        assert_eq!(failed(&mut state, &ComputeError::Timeout), RetryAction::Retry);
        assert_eq!(
            failed(&mut state, &ComputeError::Timeout),
            RetryAction::FallbackPerDate
        );
    }

    #[test]
    fn test_single_date_batch_keeps_retrying_then_gives_up() {
        let mut state = RetryState::new(1);
        assert_eq!(failed(&mut state, &ComputeError::Timeout), RetryAction::Retry);
        assert_eq!(failed(&mut state, &ComputeError::Timeout), RetryAction::Retry);
        assert_eq!(failed(&mut state, &ComputeError::Timeout), RetryAction::GiveUp);
    }

    #[test]
    fn test_payload_too_large_doubles_tile_scale() {
        let mut state = RetryState::new(5);
        assert_eq!(
            failed(&mut state, &ComputeError::PayloadTooLarge),
            RetryAction::RetryWithTileScale(2)
        );
        state.tile_scale = 2;
        assert_eq!(
            failed(&mut state, &ComputeError::PayloadTooLarge),
            RetryAction::RetryWithTileScale(4)
        );
        assert_eq!(
            failed(&mut state, &ComputeError::PayloadTooLarge),
            RetryAction::GiveUp
        );
    }

    #[test]
    fn test_transient_errors_back_off() {
        let mut state = RetryState::new(2);
        let error = ComputeError::Transient("quota".into());
        assert_eq!(
            failed(&mut state, &error),
            RetryAction::RetryAfter(Duration::from_secs(30))
        );
        assert_eq!(
            failed(&mut state, &error),
            RetryAction::RetryAfter(Duration::from_secs(30))
        );
        assert_eq!(failed(&mut state, &error), RetryAction::GiveUp);
    }

    #[test]
    fn test_mixed_failures_count_timeouts_separately() {
        let mut state = RetryState::new(4);
        assert_eq!(failed(&mut state, &ComputeError::Timeout), RetryAction::Retry);
        assert!(matches!(
            failed(&mut state, &ComputeError::Transient("x".into())),
            RetryAction::RetryAfter(_)
        ));
        // Second timeout on the last attempt still triggers the fallback.
        assert_eq!(
            failed(&mut state, &ComputeError::Timeout),
            RetryAction::FallbackPerDate
        );
    }

    #[test]
    fn test_builder_clamps_to_sane_values() {
        let policy = RetryPolicy::new()
            .with_max_attempts(0)
            .with_timeouts_before_fallback(0)
            .with_tile_scale_factor(0)
            .with_backoff(Duration::from_millis(5));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.timeouts_before_fallback(), 1);
        assert_eq!(policy.tile_scale_factor(), 1);
        assert_eq!(policy.backoff(), Duration::from_millis(5));
    }
}
