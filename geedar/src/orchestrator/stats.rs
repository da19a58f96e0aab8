//! Run counters.

use std::fmt;

/// Counters collected over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Sites with a resolved region
    pub sites: usize,
    /// (site, plan) pairs that reached the availability query
    pub pairs: usize,
    pub batches: usize,
    pub failed_batches: usize,
    /// Batches that fell back to per-date calls
    pub degraded_batches: usize,
    /// Remote reduction calls, retries included
    pub calls: u64,
    /// Dates with at least one value
    pub dates_retrieved: usize,
}

impl RunStats {
    /// Share of batches that returned at least part of their dates.
    pub fn batch_success_rate(&self) -> f64 {
        if self.batches == 0 {
            return 1.0;
        }
        (self.batches - self.failed_batches) as f64 / self.batches as f64
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} site(s), {} batch(es) ({:.0}% succeeded, {} failed, {} degraded), {} call(s), {} date(s) retrieved",
            self.sites,
            self.batches,
            self.batch_success_rate() * 100.0,
            self.failed_batches,
            self.degraded_batches,
            self.calls,
            self.dates_retrieved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        assert_eq!(RunStats::default().batch_success_rate(), 1.0);
        let stats = RunStats {
            batches: 4,
            failed_batches: 1,
            ..Default::default()
        };
        assert_eq!(stats.batch_success_rate(), 0.75);
    }

    #[test]
    fn test_summary_line_reports_success_rate() {
        let stats = RunStats {
            sites: 2,
            batches: 4,
            failed_batches: 1,
            calls: 7,
            dates_retrieved: 9,
            ..Default::default()
        };
        assert_eq!(
            stats.to_string(),
            "2 site(s), 4 batch(es) (75% succeeded, 1 failed, 0 degraded), 7 call(s), 9 date(s) retrieved"
        );
    }
}
