//! YAML configuration loading
//!
//! Two flavors: [`load_config`] never fails and falls back to defaults, for
//! settings files that may or may not exist; [`read_config`] reports every
//! problem, for files the user named explicitly.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: Config file doesn't exist, using defaults");
        return T::default();
    }

    match read_config(path) {
        Ok(config) => {
            log::info!("load_config: Successfully loaded config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("load_config: {:#}, using defaults", e);
            T::default()
        }
    }
}

/// Read configuration from a YAML file, failing on any error
pub fn read_config<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    // An empty file is an empty mapping, so every field takes its default
    let contents = if contents.trim().is_empty() { "{}" } else { contents.as_str() };

    serde_yaml::from_str(contents).with_context(|| format!("Failed to parse config file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompressorConfig;

    #[test]
    fn test_load_nonexistent_returns_default() {
        let config: CompressorConfig = load_config(Path::new("/nonexistent/path/config.yaml"));
        assert_eq!(config, CompressorConfig::default());
    }

    #[test]
    fn test_load_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compressor.yaml");
        std::fs::write(&path, "params:\n  ratio: 2.5\n  mix: 0.75\nsmoothing_time: 0.0\n").unwrap();

        let loaded: CompressorConfig = load_config(&path);
        assert_eq!(loaded.params.ratio, 2.5);
        assert_eq!(loaded.params.mix, 0.75);
        assert_eq!(loaded.smoothing_time, 0.0);

        let read: CompressorConfig = read_config(&path).unwrap();
        assert_eq!(read, loaded);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "params: [not, a, mapping\n").unwrap();

        // Lenient loader falls back, strict reader reports the path
        let loaded: CompressorConfig = load_config(&path);
        assert_eq!(loaded, CompressorConfig::default());

        let err = read_config::<CompressorConfig>(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.yaml"));
    }

    #[test]
    fn test_read_missing_file_fails() {
        assert!(read_config::<CompressorConfig>(Path::new("/nonexistent/compressor.yaml")).is_err());
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();

        let read: CompressorConfig = read_config(&path).unwrap();
        assert_eq!(read, CompressorConfig::default());
    }
}
