//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

use crate::code::CodecMode;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub compute: ComputeSettings,
    pub retrieval: RetrievalSettings,
    pub retry: RetrySettings,
    pub logging: LoggingSettings,
}

/// Compute gateway connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeSettings {
    /// Base URL of the JSON gateway
    pub endpoint: String,
    /// Bearer token, if the gateway requires one
    pub token: Option<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

/// Retrieval defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSettings {
    pub max_pixels_per_request: u64,
    pub time_window: u32,
    pub aoi_radius_m: f64,
    pub append_mode: bool,
    pub max_in_flight_batches: usize,
    /// How invalid processing codes are treated
    pub codec_mode: CodecMode,
}

/// Retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub timeouts_before_fallback: u32,
    pub tile_scale_factor: u32,
    pub backoff_secs: u64,
}

/// Logging destinations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory of the diagnostic log
    pub directory: PathBuf,
    /// Diagnostic log file name
    pub file: String,
    /// Failure log (one line per failed retrieval)
    pub failure_log: PathBuf,
}
