//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;
use crate::code::CodecMode;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let token = config.compute.token.as_deref().unwrap_or("");
    let codec_mode = match config.retrieval.codec_mode {
        CodecMode::Strict => "strict",
        CodecMode::Lenient => "lenient",
    };
    let append_mode = if config.retrieval.append_mode {
        "true"
    } else {
        "false"
    };

    format!(
        r#"[compute]
; Base URL of the JSON gateway in front of the compute engine
endpoint = {}
; Bearer token sent with every request (leave empty if not required)
token = {}
; HTTP timeout in seconds (default: 360); keep it above the engine's own limit
timeout_secs = {}

[retrieval]
; Processing budget per request: images x pixels per image (default: 25000)
max_pixels_per_request = {}
; Days queried before and after each explicit date (default: 0)
; Ignored when the input uses start_date/end_date ranges
time_window = {}
; Radius in metres of the region drawn around site coordinates (default: 1000)
aoi_radius = {}
; Stack processing codes under canonical band names (red, NIR, ...) (default: false)
append_mode = {}
; Batches of one site and code sent concurrently (default: 1, max: 16)
max_in_flight_batches = {}
; Invalid processing codes: strict (abort) or lenient (skip with a warning)
codec_mode = {}

[retry]
; Attempts per batch before giving up (default: 3)
max_attempts = {}
; Timeouts before a batch is split into single-date requests (default: 2)
timeouts_before_fallback = {}
; Tile scale multiplier when the output is too large (default: 2)
tile_scale_factor = {}
; Wait in seconds before retrying other errors (default: 30)
backoff_secs = {}

[logging]
; Directory of the diagnostic log (default: ~/.geedar/logs)
directory = {}
; Diagnostic log file name (default: geedar.log)
file = {}
; Failure log, one line per failed retrieval (default: GEEDaR_log.txt)
failure_log = {}
"#,
        config.compute.endpoint,
        token,
        config.compute.timeout_secs,
        config.retrieval.max_pixels_per_request,
        config.retrieval.time_window,
        config.retrieval.aoi_radius_m,
        append_mode,
        config.retrieval.max_in_flight_batches,
        codec_mode,
        config.retry.max_attempts,
        config.retry.timeouts_before_fallback,
        config.retry.tile_scale_factor,
        config.retry.backoff_secs,
        path_to_string(&config.logging.directory),
        config.logging.file,
        path_to_string(&config.logging.failure_log),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_file_is_commented_and_complete() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[compute]", "[retrieval]", "[retry]", "[logging]"] {
            assert!(content.contains(section), "missing {}", section);
        }
        assert!(content.contains("max_pixels_per_request = 25000"));
        assert!(content.contains("aoi_radius = 1000"));
        assert!(content.contains("codec_mode = strict"));
        assert!(content.lines().filter(|l| l.starts_with(';')).count() > 10);
    }
}
