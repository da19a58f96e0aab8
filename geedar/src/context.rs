//! Per (site, plan) retrieval context.

use chrono::NaiveDate;

use crate::code::ProcessingPlan;
use crate::compute::{ExpressionSpec, ReduceRequest};
use crate::geo::Region;

/// Everything one (site, plan) pair needs to build reduction requests.
///
/// Created by the orchestrator for each pair and passed by reference to the
/// planner and executor; nothing outlives the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalContext {
    site_id: String,
    region: Region,
    plan: ProcessingPlan,
    reduced_names: Vec<String>,
    best_effort: bool,
}

impl RetrievalContext {
    pub fn new(site_id: impl Into<String>, region: Region, plan: ProcessingPlan) -> Self {
        Self {
            site_id: site_id.into(),
            region,
            reduced_names: plan.reduced_names(),
            plan,
            best_effort: true,
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn plan(&self) -> &ProcessingPlan {
        &self.plan
    }

    /// Band and parameter names the reducer is applied to.
    pub fn reduced_names(&self) -> &[String] {
        &self.reduced_names
    }

    /// Builds the reduction request for `dates` at `tile_scale`.
    pub fn reduce_request(&self, dates: &[NaiveDate], tile_scale: u32) -> ReduceRequest {
        ReduceRequest {
            expression: ExpressionSpec {
                product: self.plan.product_id(),
                pixel_algo: self.plan.pixel_algo_id(),
                estimation_algo: self.plan.estimation_algo_id(),
                dates: dates.to_vec(),
            },
            region: self.region.clone(),
            reducer: self.plan.reducer_id(),
            scale_m: self.plan.product().rough_scale_m,
            tile_scale,
            best_effort: self.best_effort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::decode;

    #[test]
    fn test_reduce_request_carries_plan_fields() {
        let plan = decode(20109021).unwrap();
        let region = Region::buffered_point(-3.0, -60.0, 500.0).unwrap();
        let ctx = RetrievalContext::new("lake", region.clone(), plan);
        let date = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();

        let request = ctx.reduce_request(&[date], 4);
        assert_eq!(request.expression.product, 201);
        assert_eq!(request.expression.pixel_algo, 9);
        assert_eq!(request.expression.estimation_algo, 2);
        assert_eq!(request.expression.dates, vec![date]);
        assert_eq!(request.reducer, 1);
        assert_eq!(request.tile_scale, 4);
        assert_eq!(request.region, region);
        assert_eq!(ctx.site_id(), "lake");
        assert!(!ctx.reduced_names().is_empty());
    }
}
