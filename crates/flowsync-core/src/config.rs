//! Runtime configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/flowsync/config/flowsync.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, FixedOffset};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::utc_offset;
use crate::source::DataSourceKind;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/flowsync.toml");

/// Thresholds used by the insight rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightConfig {
    /// Meetings separated by less than this are back-to-back
    pub back_to_back_gap: Duration,
    /// A day with more meetings than this is meeting-heavy
    pub meeting_heavy_threshold: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            back_to_back_gap: Duration::minutes(15),
            meeting_heavy_threshold: 4,
        }
    }
}

/// Calendar and booking settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Reference time zone, minutes east of UTC
    pub utc_offset_minutes: i32,
    pub workday_start_hour: u32,
    pub workday_end_hour: u32,
    pub slot_minutes: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            workday_start_hour: 9,
            workday_end_hour: 17,
            slot_minutes: 30,
        }
    }
}

impl CalendarConfig {
    pub fn offset(&self) -> Result<FixedOffset> {
        utc_offset(self.utc_offset_minutes)
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub insights: InsightConfig,
    pub calendar: CalendarConfig,
    pub data_source: DataSourceKind,
}

impl Config {
    /// Load from an explicit path, the data-dir override, or embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    fs::read_to_string(&default_path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", default_path.display(), e))
                    })?
                }
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        let config = parse_config(&content)?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("flowsync").join("config").join("flowsync.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    insights: Option<RawInsights>,
    calendar: Option<RawCalendar>,
    data: Option<RawData>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    back_to_back_gap_minutes: Option<u32>,
    meeting_heavy_threshold: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawCalendar {
    utc_offset_minutes: Option<i32>,
    workday_start_hour: Option<u32>,
    workday_end_hour: Option<u32>,
    slot_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    source: Option<String>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(insights) = raw.insights {
        if let Some(gap) = insights.back_to_back_gap_minutes {
            config.insights.back_to_back_gap = Duration::minutes(gap as i64);
        }
        if let Some(threshold) = insights.meeting_heavy_threshold {
            config.insights.meeting_heavy_threshold = threshold;
        }
    }

    if let Some(calendar) = raw.calendar {
        if let Some(offset) = calendar.utc_offset_minutes {
            config.calendar.utc_offset_minutes = offset;
        }
        if let Some(start) = calendar.workday_start_hour {
            config.calendar.workday_start_hour = start;
        }
        if let Some(end) = calendar.workday_end_hour {
            config.calendar.workday_end_hour = end;
        }
        if let Some(slot) = calendar.slot_minutes {
            config.calendar.slot_minutes = slot;
        }
    }

    if let Some(source) = raw.data.and_then(|d| d.source) {
        config.data_source = source.parse().map_err(Error::Config)?;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let cal = &config.calendar;
    cal.offset()
        .map_err(|_| Error::Config(format!("utc_offset_minutes out of range: {}", cal.utc_offset_minutes)))?;
    if cal.workday_start_hour >= cal.workday_end_hour || cal.workday_end_hour > 24 {
        return Err(Error::Config(format!(
            "Invalid workday hours: {}..{}",
            cal.workday_start_hour, cal.workday_end_hour
        )));
    }
    if cal.slot_minutes == 0 {
        return Err(Error::Config("slot_minutes must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.insights.back_to_back_gap, Duration::minutes(15));
        assert_eq!(config.insights.meeting_heavy_threshold, 4);
        assert_eq!(config.data_source, DataSourceKind::Live);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
            [insights]
            meeting_heavy_threshold = 6

            [calendar]
            utc_offset_minutes = -300
            "#,
        )
        .unwrap();
        assert_eq!(config.insights.meeting_heavy_threshold, 6);
        assert_eq!(config.insights.back_to_back_gap, Duration::minutes(15));
        assert_eq!(config.calendar.utc_offset_minutes, -300);
        assert_eq!(config.calendar.slot_minutes, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("[calendar]\nworkday_start_hour = 18\n").is_err());
        assert!(parse_config("[calendar]\nslot_minutes = 0\n").is_err());
        assert!(parse_config("[calendar]\nutc_offset_minutes = 2000\n").is_err());
        assert!(matches!(
            parse_config("[calendar]\nutc_offset_minutes = 40000000\n"),
            Err(Error::Config(_))
        ));
        assert!(parse_config("[calendar]\nutc_offset_minutes = -40000000\n").is_err());
        assert!(parse_config("[data]\nsource = \"carrier-pigeon\"\n").is_err());
        assert!(parse_config("not toml at all [").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[insights]\nback_to_back_gap_minutes = 5\n[data]\nsource = \"fixture\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.insights.back_to_back_gap, Duration::minutes(5));
        assert_eq!(config.data_source, DataSourceKind::Fixture);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/flowsync.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
