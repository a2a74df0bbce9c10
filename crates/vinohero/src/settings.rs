use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use heroconfig::{HeroConfig, PowerPreference};
use renderer::{GpuOptions, GpuPowerPreference};

use crate::paths::AppPaths;

/// Configuration together with the file it came from, if any.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: HeroConfig,
    pub source: Option<PathBuf>,
}

/// Loads `explicit` when given, otherwise the file in the config directory.
///
/// A missing default file yields the built-in defaults; a missing explicit
/// file is an error.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    match explicit {
        Some(path) => {
            let loaded = load_file(path)?;
            if loaded.source.is_none() {
                anyhow::bail!("configuration file {} does not exist", path.display());
            }
            Ok(loaded)
        }
        None => load_file(&AppPaths::discover()?.config_file()),
    }
}

pub fn load_file(path: &Path) -> Result<LoadedConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no configuration file; using defaults");
            return Ok(LoadedConfig {
                config: HeroConfig::default(),
                source: None,
            });
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read configuration at {}", path.display()))
        }
    };
    let config = HeroConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load configuration at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(LoadedConfig {
        config,
        source: Some(path.to_path_buf()),
    })
}

pub fn default_toml() -> Result<String> {
    HeroConfig::default()
        .to_toml_string()
        .context("failed to render default configuration")
}

pub fn gpu_options(config: &HeroConfig) -> GpuOptions {
    GpuOptions {
        power: match config.gpu.power {
            PowerPreference::Low => GpuPowerPreference::Low,
            PowerPreference::High => GpuPowerPreference::High,
        },
        vsync: config.gpu.vsync,
        frame_latency: config.gpu.frame_latency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = load_file(&dir.path().join("vinohero.toml")).unwrap();
        assert!(loaded.source.is_none());
        assert_eq!(loaded.config, HeroConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vinohero.toml");
        fs::write(&path, "version = 1\n[gpu]\npower = \"high\"\nvsync = false\n").unwrap();

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        let gpu = gpu_options(&loaded.config);
        assert_eq!(gpu.power, GpuPowerPreference::High);
        assert!(!gpu.vsync);
        assert_eq!(gpu.frame_latency, 2);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vinohero.toml");
        fs::write(&path, "version = 7\n").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("vinohero.toml"));
    }

    #[test]
    fn default_toml_round_trips() {
        let rendered = default_toml().unwrap();
        assert_eq!(
            HeroConfig::from_toml_str(&rendered).unwrap(),
            HeroConfig::default()
        );
    }
}
