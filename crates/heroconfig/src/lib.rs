use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerPreference {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HeroConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub gpu: GpuSettings,
    #[serde(default)]
    pub still: StillSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GpuSettings {
    pub power: PowerPreference,
    pub vsync: bool,
    pub frame_latency: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StillSettings {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub time: Duration,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

fn default_version() -> u32 {
    1
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            window: WindowSettings::default(),
            gpu: GpuSettings::default(),
            still: StillSettings::default(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "VinoCEO".to_string(),
            width: 1280,
            height: 800,
            fullscreen: false,
        }
    }
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            power: PowerPreference::default(),
            vsync: true,
            frame_latency: 2,
        }
    }
}

impl Default for StillSettings {
    fn default() -> Self {
        Self {
            time: Duration::from_secs(4),
            width: 1920,
            height: 1080,
            pixel_ratio: 1.0,
        }
    }
}

/// Parses a duration given either as seconds (`4`, `2.5`) or a humantime string (`1500ms`).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    if let Ok(seconds) = trimmed.parse::<f64>() {
        return seconds_to_duration(seconds).map_err(|err| format!("duration '{trimmed}' {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

fn seconds_to_duration(seconds: f64) -> Result<Duration, String> {
    if seconds.is_nan() || seconds.is_sign_negative() {
        return Err("must be non-negative".to_string());
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| "is out of range".to_string())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(v).map_err(E::custom)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            seconds_to_duration(v).map_err(|err| E::custom(format!("duration {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

impl HeroConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: HeroConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.window.title.trim().is_empty() {
            return Err(ConfigError::Invalid("window.title must not be empty".into()));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be greater than zero (got {}x{})",
                self.window.width, self.window.height
            )));
        }

        if !(1..=3).contains(&self.gpu.frame_latency) {
            return Err(ConfigError::Invalid(format!(
                "gpu.frame_latency must be between 1 and 3 (got {})",
                self.gpu.frame_latency
            )));
        }

        if self.still.width == 0 || self.still.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "still size must be greater than zero (got {}x{})",
                self.still.width, self.still.height
            )));
        }

        if !self.still.pixel_ratio.is_finite() || self.still.pixel_ratio <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "still.pixel_ratio must be a positive number (got {})",
                self.still.pixel_ratio
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[window]
title = "Cellar"
width = 1440
height = 900
fullscreen = true

[gpu]
power = "high"
vsync = false
frame_latency = 1

[still]
time = "2500ms"
width = 800
height = 600
pixel_ratio = 2.0
"#;

    #[test]
    fn parses_sample_config() {
        let config = HeroConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.window.title, "Cellar");
        assert_eq!((config.window.width, config.window.height), (1440, 900));
        assert!(config.window.fullscreen);
        assert_eq!(config.gpu.power, PowerPreference::High);
        assert!(!config.gpu.vsync);
        assert_eq!(config.still.time, Duration::from_millis(2500));
        assert_eq!(config.still.pixel_ratio, 2.0);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = HeroConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, HeroConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = HeroConfig::from_toml_str(
            r#"
[window]
width = 640

[still]
time = 7
"#,
        )
        .unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.window.title, "VinoCEO");
        assert_eq!(config.still.time, Duration::from_secs(7));
        assert_eq!(config.gpu.frame_latency, 2);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = HeroConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_window() {
        let err = HeroConfig::from_toml_str("[window]\nheight = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_latency() {
        let err = HeroConfig::from_toml_str("[gpu]\nframe_latency = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_still_time() {
        let err = HeroConfig::from_toml_str("[still]\ntime = -1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let rendered = HeroConfig::default().to_toml_string().unwrap();
        let parsed = HeroConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, HeroConfig::default());
    }

    #[test]
    fn parse_duration_accepts_seconds_and_humantime() {
        assert_eq!(parse_duration("1.5"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert!(parse_duration("-3").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_duration_rejects_out_of_range_seconds() {
        assert!(parse_duration("1e30").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("NaN").is_err());
    }

    #[test]
    fn out_of_range_still_time_is_a_parse_error() {
        for document in ["[still]\ntime = inf\n", "[still]\ntime = 1e30\n", "[still]\ntime = nan\n"] {
            let err = HeroConfig::from_toml_str(document).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{document}: {err}");
        }
    }
}
