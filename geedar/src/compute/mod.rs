//! Remote compute collaborator.
//!
//! The geospatial engine does all the image science; this module only
//! describes what a reduction request looks like, what comes back, and how
//! failures are classified so the executor can pick a retry strategy.
//!
//! [`ComputeService`] is the seam: the executor and orchestrator are generic
//! over it, [`HttpComputeService`] talks to a JSON gateway in front of the
//! engine, and tests script their own implementations.

mod error;
mod http;
mod types;

pub use error::{ComputeError, PAYLOAD_TOO_LARGE_MESSAGE, TIMEOUT_MESSAGE};
pub use http::{AsyncHttpClient, AsyncReqwestClient, GatewayError, HttpComputeService};
pub use types::{ExpressionSpec, Fragment, ReduceRequest, Value};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

use chrono::NaiveDate;
use std::future::Future;

use crate::geo::Region;

/// Operations the remote engine offers to the orchestration layer.
pub trait ComputeService: Send + Sync {
    /// Reduces the plan's image expression over a region for a set of dates.
    ///
    /// The returned fragment may hold fewer dates than requested when no
    /// qualifying image exists for some of them.
    fn reduce(
        &self,
        request: &ReduceRequest,
    ) -> impl Future<Output = Result<Fragment, ComputeError>> + Send;

    /// Returns which of `dates` have at least one image of `product`
    /// intersecting `region`.
    fn list_available_dates(
        &self,
        product: u16,
        dates: &[NaiveDate],
        region: &Region,
    ) -> impl Future<Output = Result<Vec<NaiveDate>, ComputeError>> + Send;
}

#[cfg(test)]
pub(crate) mod scripted {
    //! Scripted compute service for unit tests.

    use super::*;
    use std::sync::Mutex;

    type Script = dyn Fn(usize, &ReduceRequest) -> Result<Fragment, ComputeError> + Send + Sync;

    /// Answers `reduce` calls from a closure given the call index and the
    /// request, and records every request.
    pub struct ScriptedComputeService {
        script: Box<Script>,
        available: Option<Vec<NaiveDate>>,
        calls: Mutex<Vec<ReduceRequest>>,
    }

    impl ScriptedComputeService {
        pub fn new(
            script: impl Fn(usize, &ReduceRequest) -> Result<Fragment, ComputeError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self {
                script: Box::new(script),
                available: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Restricts availability to `dates`; by default every date is available.
        pub fn with_available(mut self, dates: Vec<NaiveDate>) -> Self {
            self.available = Some(dates);
            self
        }

        pub fn calls(&self) -> Vec<ReduceRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ComputeService for ScriptedComputeService {
        async fn reduce(&self, request: &ReduceRequest) -> Result<Fragment, ComputeError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(request.clone());
                calls.len() - 1
            };
            (self.script)(index, request)
        }

        async fn list_available_dates(
            &self,
            _product: u16,
            dates: &[NaiveDate],
            _region: &Region,
        ) -> Result<Vec<NaiveDate>, ComputeError> {
            Ok(match &self.available {
                Some(available) => dates
                    .iter()
                    .filter(|d| available.contains(d))
                    .copied()
                    .collect(),
                None => dates.to_vec(),
            })
        }
    }

    /// A fragment with one numeric value per date, named `name`.
    pub fn fragment_for(dates: &[NaiveDate], name: &str, value: f64) -> Fragment {
        let mut fragment = Fragment::new();
        for date in dates {
            fragment.insert(*date, name, Value::Number(value));
        }
        fragment
    }
}
