//! Batch planning.
//!
//! Splits a site's available dates into batches small enough for one remote
//! call. Two limits apply:
//!
//! - the processing budget: images per batch × pixels per image should stay
//!   around `max_pixels_per_request`
//! - the pixel-selection algorithm's own cap on simultaneous images
//!
//! ```text
//! pixels_per_image = max(area / rough_scale², 1)
//! by_budget        = ceil(max_pixels_per_request / pixels_per_image)
//! batch_size       = max(1, min(by_budget, max_simultaneous_images))
//! ```

use chrono::NaiveDate;
use tracing::debug;

use crate::code::ProcessingPlan;
use crate::geo::Region;

/// A contiguous, ascending run of dates sent in one reduction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub dates: Vec<NaiveDate>,
}

impl Batch {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self { dates }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Approximate number of pixels a region covers at a given scale.
pub fn pixels_per_image(area_m2: f64, rough_scale_m: f64) -> f64 {
    if rough_scale_m <= 0.0 {
        return area_m2.max(1.0);
    }
    (area_m2 / (rough_scale_m * rough_scale_m)).max(1.0)
}

/// Partitions available dates into budget-bounded batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlanner {
    max_pixels_per_request: u64,
}

impl BatchPlanner {
    pub fn new(max_pixels_per_request: u64) -> Self {
        Self {
            max_pixels_per_request,
        }
    }

    pub fn max_pixels_per_request(&self) -> u64 {
        self.max_pixels_per_request
    }

    /// Number of dates per batch for a plan over a region.
    pub fn batch_size(&self, region: &Region, plan: &ProcessingPlan) -> usize {
        self.batch_size_for(
            region.area_m2(),
            plan.product().rough_scale_m,
            plan.pixel_algo().max_simultaneous_images,
        )
    }

    fn batch_size_for(&self, area_m2: f64, rough_scale_m: f64, max_images: usize) -> usize {
        let pixels = pixels_per_image(area_m2, rough_scale_m);
        let by_budget = (self.max_pixels_per_request as f64 / pixels).ceil();
        let by_budget = if by_budget.is_finite() && by_budget < usize::MAX as f64 {
            by_budget as usize
        } else {
            usize::MAX
        };
        by_budget.min(max_images).max(1)
    }

    /// Batches the demand dates that are also available, ascending.
    ///
    /// Batches are disjoint and together cover exactly the available demand
    /// dates.
    pub fn plan(
        &self,
        region: &Region,
        plan: &ProcessingPlan,
        demand: &[NaiveDate],
        available: &[NaiveDate],
    ) -> Vec<Batch> {
        let size = self.batch_size(region, plan);
        let batches = partition(demand, available, size);
        debug!(
            code = plan.code(),
            batch_size = size,
            available = batches.iter().map(Batch::len).sum::<usize>(),
            batches = batches.len(),
            "Planned batches"
        );
        batches
    }
}

fn partition(demand: &[NaiveDate], available: &[NaiveDate], size: usize) -> Vec<Batch> {
    let mut dates: Vec<NaiveDate> = demand
        .iter()
        .filter(|d| available.contains(d))
        .copied()
        .collect();
    dates.sort();
    dates.dedup();

    dates
        .chunks(size.max(1))
        .map(|chunk| Batch::new(chunk.to_vec()))
        .collect()
}
