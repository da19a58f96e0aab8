//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::code::CodecMode;
use crate::retry;

// =============================================================================
// Compute gateway
// =============================================================================

/// Default gateway endpoint.
pub const DEFAULT_COMPUTE_ENDPOINT: &str = "http://localhost:8080";

/// Default HTTP timeout in seconds; above the engine's own computation limit.
pub const DEFAULT_COMPUTE_TIMEOUT_SECS: u64 = 360;

// =============================================================================
// Retrieval
// =============================================================================

/// Default processing budget per request, in pixels.
pub const DEFAULT_MAX_PIXELS_PER_REQUEST: u64 = 25_000;

/// Default time window in days.
pub const DEFAULT_TIME_WINDOW: u32 = 0;

/// Upper bound on the time window, in days.
pub const MAX_TIME_WINDOW: u32 = 365;

/// Default buffer radius around site coordinates, in metres.
pub const DEFAULT_AOI_RADIUS_M: f64 = 1000.0;

/// Default in-flight batches per (site, plan); 1 keeps runs sequential.
pub const DEFAULT_MAX_IN_FLIGHT_BATCHES: usize = 1;

/// Upper bound on in-flight batches.
pub const MAX_IN_FLIGHT_BATCHES: usize = 16;

// =============================================================================
// Logging
// =============================================================================

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "geedar.log";

/// Default failure log file name, written next to the working directory.
pub const DEFAULT_FAILURE_LOG_FILE: &str = "GEEDaR_log.txt";

/// Default log directory (~/.geedar/logs).
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            compute: ComputeSettings {
                endpoint: DEFAULT_COMPUTE_ENDPOINT.to_string(),
                token: None,
                timeout_secs: DEFAULT_COMPUTE_TIMEOUT_SECS,
            },
            retrieval: RetrievalSettings {
                max_pixels_per_request: DEFAULT_MAX_PIXELS_PER_REQUEST,
                time_window: DEFAULT_TIME_WINDOW,
                aoi_radius_m: DEFAULT_AOI_RADIUS_M,
                append_mode: false,
                max_in_flight_batches: DEFAULT_MAX_IN_FLIGHT_BATCHES,
                codec_mode: CodecMode::Strict,
            },
            retry: RetrySettings {
                max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
                timeouts_before_fallback: retry::DEFAULT_TIMEOUTS_BEFORE_FALLBACK,
                tile_scale_factor: retry::DEFAULT_TILE_SCALE_FACTOR,
                backoff_secs: retry::DEFAULT_BACKOFF_SECS,
            },
            logging: LoggingSettings {
                directory: default_log_directory(),
                file: DEFAULT_LOG_FILE.to_string(),
                failure_log: PathBuf::from(DEFAULT_FAILURE_LOG_FILE),
            },
        }
    }
}
