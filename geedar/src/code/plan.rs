//! Decoded processing plan.

use std::fmt;

use crate::registry::{EstimationAlgoSpec, PixelAlgoSpec, ProductSpec, ReducerSpec};

/// A validated processing code with its registry entries resolved.
///
/// Plans are immutable and cheap to copy; every field is guaranteed to exist
/// in its registry because the only constructor is [`super::decode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingPlan {
    code: u64,
    product: &'static ProductSpec,
    pixel_algo: &'static PixelAlgoSpec,
    estimation_algo: &'static EstimationAlgoSpec,
    reducer: &'static ReducerSpec,
}

impl ProcessingPlan {
    pub(super) fn new(
        code: u64,
        product: &'static ProductSpec,
        pixel_algo: &'static PixelAlgoSpec,
        estimation_algo: &'static EstimationAlgoSpec,
        reducer: &'static ReducerSpec,
    ) -> Self {
        Self {
            code,
            product,
            pixel_algo,
            estimation_algo,
            reducer,
        }
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    pub fn product_id(&self) -> u16 {
        self.product.id
    }

    pub fn pixel_algo_id(&self) -> u8 {
        self.pixel_algo.id
    }

    pub fn estimation_algo_id(&self) -> u8 {
        self.estimation_algo.id
    }

    pub fn reducer_id(&self) -> u8 {
        self.reducer.id
    }

    pub fn product(&self) -> &'static ProductSpec {
        self.product
    }

    pub fn pixel_algo(&self) -> &'static PixelAlgoSpec {
        self.pixel_algo
    }

    pub fn estimation_algo(&self) -> &'static EstimationAlgoSpec {
        self.estimation_algo
    }

    pub fn reducer(&self) -> &'static ReducerSpec {
        self.reducer
    }

    /// Names the engine reduces for this plan: product bands followed by the
    /// estimation algorithm's parameters.
    pub fn reduced_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .product
            .reduced_bands()
            .into_iter()
            .map(str::to_string)
            .collect();
        for param in self.estimation_algo.param_names {
            if !names.iter().any(|n| n == param) {
                names.push((*param).to_string());
            }
        }
        names
    }
}

impl fmt::Display for ProcessingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
