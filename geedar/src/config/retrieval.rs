//! Retrieval run configuration.

use std::time::Duration;

use super::defaults::*;
use super::settings::ConfigFile;
use crate::code::CodecMode;
use crate::retry::RetryPolicy;

/// Parameters of one retrieval run.
///
/// # Example
///
/// ```
/// use geedar::config::RetrievalConfig;
///
/// let config = RetrievalConfig::default();
/// assert_eq!(config.aoi_radius_m(), 1000.0);
/// assert_eq!(config.max_in_flight_batches(), 1);
/// assert!(!config.append_mode());
///
/// let config = RetrievalConfig::new()
///     .with_max_pixels_per_request(100_000)
///     .with_max_in_flight_batches(4);
/// assert_eq!(config.max_pixels_per_request(), 100_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalConfig {
    max_pixels_per_request: u64,
    time_window: u32,
    aoi_radius_m: f64,
    append_mode: bool,
    max_in_flight_batches: usize,
    codec_mode: CodecMode,
    retry_policy: RetryPolicy,
}

impl RetrievalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processing budget of one request (images × pixels per image).
    pub fn with_max_pixels_per_request(mut self, pixels: u64) -> Self {
        self.max_pixels_per_request = pixels.max(1);
        self
    }

    /// Days queried before and after each explicit date, capped at 365.
    pub fn with_time_window(mut self, days: u32) -> Self {
        self.time_window = days.min(MAX_TIME_WINDOW);
        self
    }

    /// Radius of the buffer drawn around site coordinates.
    pub fn with_aoi_radius_m(mut self, radius: f64) -> Self {
        self.aoi_radius_m = radius;
        self
    }

    /// Stack plans under canonical band names instead of side by side.
    pub fn with_append_mode(mut self, append: bool) -> Self {
        self.append_mode = append;
        self
    }

    /// Concurrent batches per (site, plan), clamped to 1..=16.
    pub fn with_max_in_flight_batches(mut self, batches: usize) -> Self {
        self.max_in_flight_batches = batches.clamp(1, MAX_IN_FLIGHT_BATCHES);
        self
    }

    pub fn with_codec_mode(mut self, mode: CodecMode) -> Self {
        self.codec_mode = mode;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn max_pixels_per_request(&self) -> u64 {
        self.max_pixels_per_request
    }

    pub fn time_window(&self) -> u32 {
        self.time_window
    }

    pub fn aoi_radius_m(&self) -> f64 {
        self.aoi_radius_m
    }

    pub fn append_mode(&self) -> bool {
        self.append_mode
    }

    pub fn max_in_flight_batches(&self) -> usize {
        self.max_in_flight_batches
    }

    pub fn codec_mode(&self) -> CodecMode {
        self.codec_mode
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_pixels_per_request: DEFAULT_MAX_PIXELS_PER_REQUEST,
            time_window: DEFAULT_TIME_WINDOW,
            aoi_radius_m: DEFAULT_AOI_RADIUS_M,
            append_mode: false,
            max_in_flight_batches: DEFAULT_MAX_IN_FLIGHT_BATCHES,
            codec_mode: CodecMode::Strict,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl From<&ConfigFile> for RetrievalConfig {
    fn from(file: &ConfigFile) -> Self {
        let retry = &file.retry;
        let policy = RetryPolicy::new()
            .with_max_attempts(retry.max_attempts)
            .with_timeouts_before_fallback(retry.timeouts_before_fallback)
            .with_tile_scale_factor(retry.tile_scale_factor)
            .with_backoff(Duration::from_secs(retry.backoff_secs));

        let retrieval = &file.retrieval;
        Self::new()
            .with_max_pixels_per_request(retrieval.max_pixels_per_request)
            .with_time_window(retrieval.time_window)
            .with_aoi_radius_m(retrieval.aoi_radius_m)
            .with_append_mode(retrieval.append_mode)
            .with_max_in_flight_batches(retrieval.max_in_flight_batches)
            .with_codec_mode(retrieval.codec_mode)
            .with_retry_policy(policy)
    }
}
