//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{MAX_IN_FLIGHT_BATCHES, MAX_TIME_WINDOW};
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::code::CodecMode;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [compute] section
    if let Some(section) = ini.section(Some("compute")) {
        if let Some(v) = section.get("endpoint") {
            let v = v.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("compute", "endpoint", v, "must be an http:// or https:// URL"));
            }
            config.compute.endpoint = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = section.get("token") {
            let v = v.trim();
            config.compute.token = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = number::<u64>(section, "compute", "timeout_secs", "must be a positive integer (seconds)")? {
            if v == 0 {
                return Err(invalid("compute", "timeout_secs", "0", "must be greater than zero"));
            }
            config.compute.timeout_secs = v;
        }
    }

    // [retrieval] section
    if let Some(section) = ini.section(Some("retrieval")) {
        if let Some(v) = number::<u64>(section, "retrieval", "max_pixels_per_request", "must be a positive integer")? {
            if v == 0 {
                return Err(invalid("retrieval", "max_pixels_per_request", "0", "must be greater than zero"));
            }
            config.retrieval.max_pixels_per_request = v;
        }
        if let Some(v) = number::<u32>(section, "retrieval", "time_window", "must be an integer >= 0 (days)")? {
            if v > MAX_TIME_WINDOW {
                return Err(invalid(
                    "retrieval",
                    "time_window",
                    &v.to_string(),
                    &format!("must be between 0 and {} days", MAX_TIME_WINDOW),
                ));
            }
            config.retrieval.time_window = v;
        }
        if let Some(v) = number::<f64>(section, "retrieval", "aoi_radius", "must be a number (metres)")? {
            if !(v > 0.0 && v.is_finite()) {
                return Err(invalid("retrieval", "aoi_radius", &v.to_string(), "must be greater than zero"));
            }
            config.retrieval.aoi_radius_m = v;
        }
        if let Some(v) = section.get("append_mode") {
            config.retrieval.append_mode = parse_bool(v);
        }
        if let Some(v) = number::<usize>(section, "retrieval", "max_in_flight_batches", "must be a positive integer")? {
            if v == 0 || v > MAX_IN_FLIGHT_BATCHES {
                return Err(invalid(
                    "retrieval",
                    "max_in_flight_batches",
                    &v.to_string(),
                    &format!("must be between 1 and {}", MAX_IN_FLIGHT_BATCHES),
                ));
            }
            config.retrieval.max_in_flight_batches = v;
        }
        if let Some(v) = section.get("codec_mode") {
            config.retrieval.codec_mode = match v.trim().to_lowercase().as_str() {
                "strict" => CodecMode::Strict,
                "lenient" => CodecMode::Lenient,
                _ => return Err(invalid("retrieval", "codec_mode", v, "must be 'strict' or 'lenient'")),
            };
        }
    }

    // [retry] section
    if let Some(section) = ini.section(Some("retry")) {
        if let Some(v) = number::<u32>(section, "retry", "max_attempts", "must be a positive integer")? {
            if v == 0 {
                return Err(invalid("retry", "max_attempts", "0", "must be at least 1"));
            }
            config.retry.max_attempts = v;
        }
        if let Some(v) = number::<u32>(section, "retry", "timeouts_before_fallback", "must be a positive integer")? {
            if v == 0 {
                return Err(invalid("retry", "timeouts_before_fallback", "0", "must be at least 1"));
            }
            config.retry.timeouts_before_fallback = v;
        }
        if let Some(v) = number::<u32>(section, "retry", "tile_scale_factor", "must be an integer >= 2")? {
            if v < 2 {
                return Err(invalid("retry", "tile_scale_factor", &v.to_string(), "must be at least 2"));
            }
            config.retry.tile_scale_factor = v;
        }
        if let Some(v) = number::<u64>(section, "retry", "backoff_secs", "must be an integer >= 0 (seconds)")? {
            config.retry.backoff_secs = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
        if let Some(v) = section.get("failure_log") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.failure_log = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses an optional numeric key.
fn number<T: FromStr>(
    section: &Properties,
    name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(name, key, v, reason)),
    }
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[retrieval]
time_window = 2
append_mode = yes

[compute]
endpoint = https://gw.example/api/
token = secret
"#,
        )
        .unwrap();

        assert_eq!(config.retrieval.time_window, 2);
        assert!(config.retrieval.append_mode);
        assert_eq!(config.retrieval.max_pixels_per_request, DEFAULT_MAX_PIXELS_PER_REQUEST);
        assert_eq!(config.compute.endpoint, "https://gw.example/api");
        assert_eq!(config.compute.token.as_deref(), Some("secret"));
        assert_eq!(config.compute.timeout_secs, DEFAULT_COMPUTE_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_number() {
        let err = load("[retrieval]\ntime_window = -1\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, value, .. } => {
                assert_eq!(section, "retrieval");
                assert_eq!(key, "time_window");
                assert_eq!(value, "-1");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_time_window_upper_bound() {
        let config = load(&format!("[retrieval]\ntime_window = {}\n", MAX_TIME_WINDOW)).unwrap();
        assert_eq!(config.retrieval.time_window, MAX_TIME_WINDOW);

        let err = load("[retrieval]\ntime_window = 100000000\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "time_window");
                assert_eq!(value, "100000000");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_radius() {
        assert!(matches!(
            load("[retrieval]\naoi_radius = 0\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            load("[compute]\nendpoint = ftp://nope\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_codec_mode() {
        let config = load("[retrieval]\ncodec_mode = Lenient\n").unwrap();
        assert_eq!(config.retrieval.codec_mode, CodecMode::Lenient);
        assert!(load("[retrieval]\ncodec_mode = loose\n").is_err());
    }

    #[test]
    fn test_retry_section() {
        let config = load(
            "[retry]\nmax_attempts = 5\ntimeouts_before_fallback = 3\ntile_scale_factor = 4\nbackoff_secs = 0\n",
        )
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.timeouts_before_fallback, 3);
        assert_eq!(config.retry.tile_scale_factor, 4);
        assert_eq!(config.retry.backoff_secs, 0);

        assert!(load("[retry]\ntile_scale_factor = 1\n").is_err());
        assert!(load("[retry]\nmax_attempts = 0\n").is_err());
    }

    #[test]
    fn test_in_flight_bounds() {
        assert!(load("[retrieval]\nmax_in_flight_batches = 0\n").is_err());
        assert!(load("[retrieval]\nmax_in_flight_batches = 99\n").is_err());
        let config = load("[retrieval]\nmax_in_flight_batches = 4\n").unwrap();
        assert_eq!(config.retrieval.max_in_flight_batches, 4);
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_parse_bool() {
        for v in ["true", "YES", "1", "on"] {
            assert!(parse_bool(v));
        }
        for v in ["false", "no", "0", "off", "maybe"] {
            assert!(!parse_bool(v));
        }
    }
}
