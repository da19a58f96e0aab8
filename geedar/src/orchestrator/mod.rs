//! Retrieval orchestration.
//!
//! [`Retriever`] walks every (site, plan) pair of an expansion:
//!
//! | Step          | Failure handling                          |
//! |---------------|-------------------------------------------|
//! | applicability | warning + [`FailureRecord`], pair skipped |
//! | availability  | warning + [`FailureRecord`], pair skipped |
//! | planning      | none                                      |
//! | batches       | [`FailureRecord`] per failed batch/date   |
//!
//! Batches of one pair run with at most `max_in_flight_batches` in flight.
//! Their fragments are merged in batch order once all of them finished.

mod applicability;
mod failure;
mod stats;

pub use applicability::{check_applicability, ApplicabilityError};
pub use failure::{FailureKind, FailureRecord};
pub use stats::RunStats;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::code::ProcessingPlan;
use crate::compute::{ComputeService, Fragment};
use crate::config::RetrievalConfig;
use crate::context::RetrievalContext;
use crate::executor::ResilientExecutor;
use crate::input::{Expansion, Site};
use crate::planner::BatchPlanner;
use crate::result::{ResultConsolidator, ResultTable};

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RetrievalReport {
    /// `None` when nothing at all was retrieved.
    pub table: Option<ResultTable>,
    pub failures: Vec<FailureRecord>,
    pub stats: RunStats,
}

/// Drives a retrieval run against a compute service.
pub struct Retriever<S: ComputeService> {
    service: S,
    config: RetrievalConfig,
    planner: BatchPlanner,
}

impl<S: ComputeService> Retriever<S> {
    pub fn new(service: S, config: &RetrievalConfig) -> Self {
        Self {
            service,
            config: *config,
            planner: BatchPlanner::new(config.max_pixels_per_request()),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Retrieves every plan for every site of `expansion`.
    pub async fn run(&self, expansion: &Expansion, plans: &[ProcessingPlan]) -> RetrievalReport {
        let mut consolidator = ResultConsolidator::new(plans.to_vec(), self.config.append_mode());
        let mut failures: Vec<FailureRecord> = expansion
            .unresolved_sites
            .iter()
            .map(|site| {
                FailureRecord::new(
                    site.as_str(),
                    FailureKind::UnresolvedRegion,
                    "region could not be resolved",
                )
            })
            .collect();
        let mut stats = RunStats {
            sites: expansion.sites.len(),
            ..Default::default()
        };

        info!(
            sites = expansion.sites.len(),
            plans = plans.len(),
            mode = %expansion.template.mode,
            "Retrieval started"
        );

        for site in &expansion.sites {
            for plan in plans {
                let fragment = self
                    .retrieve_pair(site, plan, &mut failures, &mut stats)
                    .await;
                stats.dates_retrieved += fragment.len();
                consolidator.absorb(&site.id, plan, fragment);
            }
        }

        let table = consolidator
            .has_data()
            .then(|| consolidator.build(&expansion.template));
        info!(
            failures = failures.len(),
            retrieved = table.is_some(),
            stats = %stats,
            "Retrieval finished"
        );

        RetrievalReport {
            table,
            failures,
            stats,
        }
    }

    async fn retrieve_pair(
        &self,
        site: &Site,
        plan: &ProcessingPlan,
        failures: &mut Vec<FailureRecord>,
        stats: &mut RunStats,
    ) -> Fragment {
        let code = plan.code();
        if let Err(e) = check_applicability(plan) {
            warn!(site = %site.id, code, error = %e, "Processing code skipped");
            failures.push(
                FailureRecord::new(site.id.as_str(), FailureKind::NotApplicable, e.to_string())
                    .with_code(code),
            );
            return Fragment::new();
        }
        if site.dates.is_empty() {
            return Fragment::new();
        }

        stats.pairs += 1;
        let available = match self
            .service
            .list_available_dates(plan.product_id(), &site.dates, &site.region)
            .await
        {
            Ok(dates) => dates,
            Err(e) => {
                warn!(site = %site.id, code, error = %e, "Availability query failed");
                failures.push(
                    FailureRecord::new(site.id.as_str(), FailureKind::Availability, e.to_string())
                        .with_code(code),
                );
                return Fragment::new();
            }
        };

        let batches = self
            .planner
            .plan(&site.region, plan, &site.dates, &available);
        if batches.is_empty() {
            info!(site = %site.id, code, "No images available");
            return Fragment::new();
        }

        let ctx = RetrievalContext::new(site.id.as_str(), site.region.clone(), *plan);
        let executor = ResilientExecutor::new(&self.service, self.config.retry_policy());
        let results: Vec<_> = stream::iter(batches.iter())
            .map(|batch| executor.execute(&ctx, batch))
            .buffered(self.config.max_in_flight_batches())
            .collect()
            .await;

        let mut fragment = Fragment::new();
        for result in results {
            stats.batches += 1;
            match result {
                Ok(outcome) => {
                    stats.calls += u64::from(outcome.calls);
                    if outcome.degraded {
                        stats.degraded_batches += 1;
                    }
                    for date in outcome.missing_dates {
                        failures.push(
                            FailureRecord::new(
                                site.id.as_str(),
                                FailureKind::DateMissing,
                                "single-date retrieval failed",
                            )
                            .with_code(code)
                            .with_date(date),
                        );
                    }
                    fragment.merge(outcome.fragment);
                }
                Err(failure) => {
                    stats.calls += u64::from(failure.calls);
                    stats.failed_batches += 1;
                    warn!(site = %site.id, code, error = %failure, "Batch failed");
                    let message = failure.to_string();
                    failures.extend(failure.dates.iter().map(|date| {
                        FailureRecord::new(site.id.as_str(), FailureKind::BatchFailed, &message)
                            .with_code(code)
                            .with_date(*date)
                    }));
                }
            }
        }
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::decode;
    use crate::compute::scripted::{fragment_for, ScriptedComputeService};
    use crate::compute::ComputeError;
    use crate::geo::{PointBuffer, Region, RegionCatalog};
    use crate::input::{InputTable, RunningMode, SiteDateExpander};
    use crate::result::Cell;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, d).unwrap()
    }

    fn expansion(rows: &[&[&str]]) -> Expansion {
        let table = InputTable::from_strs(&["id", "lat", "long", "date"], rows).unwrap();
        SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&table, &PointBuffer::new(500.0))
            .unwrap()
    }

    fn echo_service() -> ScriptedComputeService {
        ScriptedComputeService::new(|_, req| Ok(fragment_for(&req.expression.dates, "red", 0.1)))
    }

    #[tokio::test]
    async fn test_run_fills_table() {
        let expansion = expansion(&[
            &["a", "-3.1", "-60.0", "2020-05-01"],
            &["a", "-3.1", "-60.0", "2020-05-02"],
            &["b", "-4.0", "-61.0", "2020-05-01"],
        ]);
        let plans = vec![decode(10101001).unwrap()];
        let retriever = Retriever::new(echo_service(), &RetrievalConfig::new());

        let report = retriever.run(&expansion, &plans).await;
        let table = report.table.unwrap();
        assert_eq!(table.len(), 3);
        assert!(report.failures.is_empty());
        assert_eq!(report.stats.sites, 2);
        assert_eq!(report.stats.pairs, 2);
        assert_eq!(report.stats.dates_retrieved, 3);
        assert!(table
            .columns()
            .iter()
            .any(|c| c.ends_with("_median") || c == "red"));
    }

    #[tokio::test]
    async fn test_nothing_retrieved_yields_no_table() {
        let expansion = expansion(&[&["a", "-3.1", "-60.0", "2020-05-01"]]);
        let plans = vec![decode(10101001).unwrap()];
        let service = ScriptedComputeService::new(|_, _| Ok(Fragment::new()));
        let report = Retriever::new(service, &RetrievalConfig::new())
            .run(&expansion, &plans)
            .await;
        assert!(report.table.is_none());
    }

    #[tokio::test]
    async fn test_inapplicable_plan_is_recorded_and_skipped() {
        let expansion = expansion(&[&["a", "-3.1", "-60.0", "2020-05-01"]]);
        // MOD3R on Sentinel-2.
        let plans = vec![decode(20102001).unwrap(), decode(10101001).unwrap()];
        let retriever = Retriever::new(echo_service(), &RetrievalConfig::new());

        let report = retriever.run(&expansion, &plans).await;
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::NotApplicable);
        assert_eq!(report.failures[0].proc_code, Some(20102001));
        assert!(retriever
            .service()
            .calls()
            .iter()
            .all(|r| r.expression.product == 101));
        assert!(report.table.is_some());
    }

    #[tokio::test]
    async fn test_unavailable_dates_are_not_requested() {
        let expansion = expansion(&[
            &["a", "-3.1", "-60.0", "2020-05-01"],
            &["a", "-3.1", "-60.0", "2020-05-02"],
        ]);
        let plans = vec![decode(10101001).unwrap()];
        let service = echo_service().with_available(vec![date(2)]);
        let retriever = Retriever::new(service, &RetrievalConfig::new());

        let report = retriever.run(&expansion, &plans).await;
        let calls = retriever.service().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].expression.dates, vec![date(2)]);

        let table = report.table.unwrap();
        assert_eq!(table.len(), 2);
        let value_col = table.columns().last().unwrap().clone();
        assert!(table.cell(0, &value_col).unwrap().is_missing());
        assert_eq!(table.cell(1, &value_col), Some(&Cell::Number(0.1)));
    }

    #[tokio::test]
    async fn test_failed_batch_becomes_failure_record() {
        let expansion = expansion(&[&["a", "-3.1", "-60.0", "2020-05-01"]]);
        let plans = vec![decode(10101001).unwrap()];
        let service = ScriptedComputeService::new(|_, _| Err(ComputeError::Timeout));
        let retriever = Retriever::new(service, &RetrievalConfig::new());

        let report = retriever.run(&expansion, &plans).await;
        assert!(report.table.is_none());
        assert_eq!(report.stats.failed_batches, 1);
        assert_eq!(report.stats.calls, 3);
        assert_eq!(report.failures[0].kind, FailureKind::BatchFailed);
        assert_eq!(report.failures[0].date, Some(date(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_records_every_date() {
        let expansion = expansion(&[
            &["a", "-3.1", "-60.0", "2020-05-01"],
            &["a", "-3.1", "-60.0", "2020-05-02"],
            &["a", "-3.1", "-60.0", "2020-05-03"],
        ]);
        let plans = vec![decode(10101001).unwrap()];
        let service =
            ScriptedComputeService::new(|_, _| Err(ComputeError::Transient("unavailable".into())));
        let retriever = Retriever::new(service, &RetrievalConfig::new());

        let report = retriever.run(&expansion, &plans).await;
        assert!(report.table.is_none());
        assert_eq!(report.stats.batches, 1);
        assert_eq!(report.stats.failed_batches, 1);

        let dates: Vec<_> = report.failures.iter().map(|f| f.date).collect();
        assert_eq!(dates, vec![Some(date(1)), Some(date(2)), Some(date(3))]);
        assert!(report
            .failures
            .iter()
            .all(|f| f.kind == FailureKind::BatchFailed && f.proc_code == Some(10101001)));
    }

    #[tokio::test]
    async fn test_unresolved_site_is_recorded() {
        let table = InputTable::from_strs(
            &["id", "lat", "long", "date"],
            &[
                &["known", "", "", "2020-05-01"],
                &["lost", "", "", "2020-05-01"],
            ],
        )
        .unwrap();
        let catalog = RegionCatalog::new()
            .with_region("known", Region::buffered_point(-3.0, -60.0, 100.0).unwrap());
        let expansion = SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&table, &catalog)
            .unwrap();
        let plans = vec![decode(10101001).unwrap()];

        let report = Retriever::new(echo_service(), &RetrievalConfig::new())
            .run(&expansion, &plans)
            .await;
        assert_eq!(report.stats.sites, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].site, "lost");
        assert_eq!(report.failures[0].kind, FailureKind::UnresolvedRegion);
    }

    #[tokio::test]
    async fn test_concurrent_batches_merge_in_order() {
        let rows: Vec<Vec<String>> = (1..=6)
            .map(|d| {
                vec![
                    "a".to_string(),
                    "-3.1".to_string(),
                    "-60.0".to_string(),
                    format!("2020-05-0{}", d),
                ]
            })
            .collect();
        let rows: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        let expansion = expansion(&rows);
        let plans = vec![decode(10101001).unwrap()];

        // A tiny pixel budget forces one date per batch.
        let config = RetrievalConfig::new()
            .with_max_pixels_per_request(1)
            .with_max_in_flight_batches(4);
        let retriever = Retriever::new(echo_service(), &config);
        let report = retriever.run(&expansion, &plans).await;

        assert_eq!(report.stats.batches, 6);
        assert_eq!(report.stats.dates_retrieved, 6);
        assert_eq!(report.table.unwrap().len(), 6);
    }
}
