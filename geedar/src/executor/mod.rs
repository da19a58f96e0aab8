//! Resilient batch execution.
//!
//! [`ResilientExecutor`] sends one batch to the compute service and drives
//! the [`RetryPolicy`](crate::retry::RetryPolicy) until the batch succeeds,
//! degrades to per-date calls, or fails. A failed batch is reported, never
//! raised: the run always continues with the next batch.
//!
//! Calls per batch are bounded by `max_attempts + batch.len()`.

mod outcome;

pub use outcome::{BatchFailure, BatchOutcome};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::compute::{ComputeError, ComputeService, Fragment};
use crate::context::RetrievalContext;
use crate::planner::Batch;
use crate::retry::{RetryAction, RetryPolicy, RetryState};

/// Executes batches against a compute service.
pub struct ResilientExecutor<'a, S: ComputeService> {
    service: &'a S,
    policy: RetryPolicy,
}

impl<'a, S: ComputeService> ResilientExecutor<'a, S> {
    pub fn new(service: &'a S, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs one batch to completion.
    pub async fn execute(
        &self,
        ctx: &RetrievalContext,
        batch: &Batch,
    ) -> Result<BatchOutcome, BatchFailure> {
        if batch.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let code = ctx.plan().code();
        let mut state = RetryState::new(batch.len());
        loop {
            let request = ctx.reduce_request(&batch.dates, state.tile_scale);
            let error = match self.service.reduce(&request).await {
                Ok(fragment) => {
                    debug!(
                        site = ctx.site_id(),
                        code,
                        dates = batch.len(),
                        returned = fragment.len(),
                        attempts = state.attempts + 1,
                        "Batch retrieved"
                    );
                    return Ok(BatchOutcome {
                        fragment: finish(ctx, fragment),
                        missing_dates: Vec::new(),
                        calls: state.attempts + 1,
                        degraded: false,
                    });
                }
                Err(e) => e,
            };

            state.record_failure(&error);
            let action = self.policy.next_action(&state, &error);
            warn!(
                site = ctx.site_id(),
                code,
                attempt = state.attempts,
                error = %error,
                action = ?action,
                "Reduction failed"
            );

            match action {
                RetryAction::Retry => {}
                RetryAction::RetryWithTileScale(scale) => state.tile_scale = scale,
                RetryAction::RetryAfter(delay) => tokio::time::sleep(delay).await,
                RetryAction::FallbackPerDate => {
                    return self.per_date(ctx, batch, &state, error).await;
                }
                RetryAction::GiveUp => {
                    return Err(BatchFailure {
                        dates: batch.dates.clone(),
                        calls: state.attempts,
                        error,
                    });
                }
            }
        }
    }

    /// Requests each date on its own, keeping whatever succeeds.
    async fn per_date(
        &self,
        ctx: &RetrievalContext,
        batch: &Batch,
        state: &RetryState,
        mut last_error: ComputeError,
    ) -> Result<BatchOutcome, BatchFailure> {
        info!(
            site = ctx.site_id(),
            code = ctx.plan().code(),
            dates = batch.len(),
            "Processing images one by one"
        );

        let mut fragment = Fragment::new();
        let mut missing: Vec<NaiveDate> = Vec::new();
        let mut succeeded = 0usize;
        let mut calls = state.attempts;
        for date in &batch.dates {
            let request = ctx.reduce_request(std::slice::from_ref(date), state.tile_scale);
            calls += 1;
            match self.service.reduce(&request).await {
                Ok(single) => {
                    succeeded += 1;
                    fragment.merge(single);
                }
                Err(e) => {
                    warn!(site = ctx.site_id(), %date, error = %e, "Single-date retrieval failed");
                    missing.push(*date);
                    last_error = e;
                }
            }
        }

        if succeeded == 0 {
            return Err(BatchFailure {
                dates: batch.dates.clone(),
                calls,
                error: last_error,
            });
        }

        Ok(BatchOutcome {
            fragment: finish(ctx, fragment),
            missing_dates: missing,
            calls,
            degraded: true,
        })
    }
}

/// Applies the reducer's suffix to reduced names.
fn finish(ctx: &RetrievalContext, mut fragment: Fragment) -> Fragment {
    if let Some(suffix) = ctx.plan().reducer().client_suffix() {
        fragment.suffix_names(ctx.reduced_names(), suffix);
    }
    fragment
}
