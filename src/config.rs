use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::BenchError;
use crate::types::BenchmarkConfig;

const CONFIG_FILE: &str = "opbench.toml";

/// Partial overlay read from a config file; absent keys keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    iterations: Option<u32>,
    warmup_iterations: Option<u32>,
    timeout_ms: Option<u64>,
    memory_tracking: Option<bool>,
}

/// Locate the config file: `./opbench.toml` first, then the user config
/// directory. `None` when neither exists.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("opbench").join("config.toml");
    user.is_file().then_some(user)
}

/// Defaults overlaid with the config file, if one exists.
///
/// A missing file is not an error; an unreadable or malformed one is.
pub fn load_default() -> Result<BenchmarkConfig, BenchError> {
    match find_config_file() {
        Some(path) => load_from(&path),
        None => Ok(BenchmarkConfig::default()),
    }
}

/// Read a specific config file and apply it over the defaults.
pub fn load_from(path: &Path) -> Result<BenchmarkConfig, BenchError> {
    let raw = std::fs::read_to_string(path).map_err(|source| BenchError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: FileConfig = toml::from_str(&raw).map_err(|e| BenchError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut config = BenchmarkConfig::default();
    if let Some(iterations) = file.iterations {
        config.iterations = iterations;
    }
    if let Some(warmup) = file.warmup_iterations {
        config.warmup_iterations = warmup;
    }
    if let Some(timeout_ms) = file.timeout_ms {
        config.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(memory_tracking) = file.memory_tracking {
        config.memory_tracking = memory_tracking;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn full_file_overrides_every_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "iterations = 50\nwarmup_iterations = 5\ntimeout_ms = 2000\nmemory_tracking = true\n",
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.iterations, 50);
        assert_eq!(config.warmup_iterations, 5);
        assert_eq!(config.timeout, Duration::from_millis(2000));
        assert!(config.memory_tracking);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "iterations = 7\n").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.iterations, 7);
        assert_eq!(config.warmup_iterations, 100);
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert!(!config.memory_tracking);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.toml");

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, BenchError::ConfigRead { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "iterations = \"lots\"\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, BenchError::ConfigParse { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "iterations = 5\nretries = 3\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, BenchError::ConfigParse { .. }));
    }
}
