//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jayzone_core::CalendarConfig;
use jayzone_types::PeriodKind;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{UtcOffset, Weekday};
use tracing::warn;

use crate::cli::{Cli, ConfigKey, OutputFormat};
use crate::format::FormatOptions;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// First day of the week (e.g. "sunday", "monday")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_weekday: Option<String>,

    /// UTC offset used for day boundaries ("+02:00", "UTC" or "local")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,

    /// Database file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Default output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Default summary period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

impl Config {
    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jayzone")
            .join("config.toml")
    }

    /// Load config from `path`, or return the default if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => warn!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => warn!("Failed to read config {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Calendar built from `first_weekday` and `utc_offset`
    pub fn calendar(&self) -> Result<CalendarConfig> {
        let first = match &self.first_weekday {
            Some(name) => parse_weekday(name)?,
            None => Weekday::Sunday,
        };
        let calendar = match self.utc_offset.as_deref() {
            None => CalendarConfig::default().with_first_weekday(first),
            Some(value) => match parse_utc_offset(value)? {
                Some(offset) => CalendarConfig::new(first, offset),
                None => CalendarConfig::local(first),
            },
        };
        Ok(calendar)
    }

    /// Configured default period, daily if unset
    pub fn default_period(&self) -> Result<PeriodKind> {
        match &self.period {
            Some(name) => name
                .parse()
                .with_context(|| format!("Invalid period in config: {}", name)),
            None => Ok(PeriodKind::Daily),
        }
    }

    /// Configured output format, text if unset
    pub fn output_format(&self) -> Result<OutputFormat> {
        match self.format.as_deref() {
            Some(name) => parse_format(name),
            None => Ok(OutputFormat::Text),
        }
    }

    /// Current value of `key`, if set
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::FirstWeekday => self.first_weekday.clone(),
            ConfigKey::UtcOffset => self.utc_offset.clone(),
            ConfigKey::Database => self.database.as_ref().map(|p| p.display().to_string()),
            ConfigKey::Format => self.format.clone(),
            ConfigKey::Period => self.period.clone(),
            ConfigKey::NoColor => Some(self.no_color.to_string()),
        }
    }

    /// Validate and set `key`
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::FirstWeekday => {
                let weekday = parse_weekday(value)?;
                self.first_weekday = Some(weekday.to_string().to_ascii_lowercase());
            }
            ConfigKey::UtcOffset => {
                parse_utc_offset(value)?;
                self.utc_offset = Some(value.trim().to_string());
            }
            ConfigKey::Database => self.database = Some(PathBuf::from(value)),
            ConfigKey::Format => {
                parse_format(value)?;
                self.format = Some(value.to_ascii_lowercase());
            }
            ConfigKey::Period => {
                let period: PeriodKind = value
                    .parse()
                    .with_context(|| format!("Invalid period: {}", value))?;
                self.period = Some(period.as_str().to_string());
            }
            ConfigKey::NoColor => {
                self.no_color = value
                    .parse()
                    .with_context(|| format!("Expected true or false, got '{}'", value))?;
            }
        }
        Ok(())
    }

    /// Reset `key` to its default
    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::FirstWeekday => self.first_weekday = None,
            ConfigKey::UtcOffset => self.utc_offset = None,
            ConfigKey::Database => self.database = None,
            ConfigKey::Format => self.format = None,
            ConfigKey::Period => self.period = None,
            ConfigKey::NoColor => self.no_color = false,
        }
    }
}

/// Parse a weekday name or three-letter abbreviation
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    let weekday = match s.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Weekday::Monday,
        "tuesday" | "tue" => Weekday::Tuesday,
        "wednesday" | "wed" => Weekday::Wednesday,
        "thursday" | "thu" => Weekday::Thursday,
        "friday" | "fri" => Weekday::Friday,
        "saturday" | "sat" => Weekday::Saturday,
        "sunday" | "sun" => Weekday::Sunday,
        _ => bail!("Unknown weekday: '{}'", s),
    };
    Ok(weekday)
}

/// Parse `+HH:MM`, `UTC` or `local` (returned as `None`)
pub fn parse_utc_offset(s: &str) -> Result<Option<UtcOffset>> {
    let value = s.trim();
    if value.eq_ignore_ascii_case("local") {
        return Ok(None);
    }
    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return Ok(Some(UtcOffset::UTC));
    }
    let offset = UtcOffset::parse(
        value,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("Invalid UTC offset '{}', expected e.g. +02:00", value))?;
    Ok(Some(offset))
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    match s.trim().to_ascii_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => bail!("Unknown output format '{}', expected text or json", s),
    }
}

/// Resolved settings shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub calendar: CalendarConfig,
    pub period: PeriodKind,
    pub format: OutputFormat,
    pub opts: FormatOptions,
    pub quiet: bool,
    pub output: Option<PathBuf>,
}

impl Settings {
    /// Combine flags, environment and config; flags win.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let db_path = cli
            .db
            .clone()
            .or_else(|| config.database.clone())
            .unwrap_or_else(jayzone_store::default_db_path);
        let format = if cli.json {
            OutputFormat::Json
        } else {
            config.output_format()?
        };
        Ok(Self {
            db_path,
            calendar: config.calendar()?,
            period: config.default_period()?,
            format,
            opts: FormatOptions {
                no_color: cli.no_color || config.no_color,
                compact: cli.compact,
            },
            quiet: cli.quiet,
            output: cli.output.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::offset;

    #[test]
    fn test_default_calendar_is_sunday_utc() {
        let calendar = Config::default().calendar().unwrap();
        assert_eq!(calendar, CalendarConfig::default());
    }

    #[test]
    fn test_calendar_from_config() {
        let config = Config {
            first_weekday: Some("Mon".to_string()),
            utc_offset: Some("-05:30".to_string()),
            ..Default::default()
        };
        let calendar = config.calendar().unwrap();
        assert_eq!(calendar.first_weekday, Weekday::Monday);
        assert_eq!(calendar.utc_offset, offset!(-5:30));
    }

    #[test]
    fn test_invalid_calendar_values() {
        let config = Config {
            first_weekday: Some("someday".to_string()),
            ..Default::default()
        };
        assert!(config.calendar().is_err());
        assert!(parse_utc_offset("2 hours").is_err());
        assert_eq!(parse_utc_offset("local").unwrap(), None);
        assert_eq!(parse_utc_offset("utc").unwrap(), Some(UtcOffset::UTC));
    }

    #[test]
    fn test_set_normalizes_values() {
        let mut config = Config::default();
        config.set(ConfigKey::FirstWeekday, "MON").unwrap();
        config.set(ConfigKey::Period, "This Week").unwrap();
        config.set(ConfigKey::Format, "JSON").unwrap();
        config.set(ConfigKey::NoColor, "true").unwrap();

        assert_eq!(config.get(ConfigKey::FirstWeekday).as_deref(), Some("monday"));
        assert_eq!(config.get(ConfigKey::Period).as_deref(), Some("weekly"));
        assert_eq!(config.output_format().unwrap(), OutputFormat::Json);
        assert!(config.no_color);

        assert!(config.set(ConfigKey::Format, "xml").is_err());
        assert!(config.set(ConfigKey::NoColor, "maybe").is_err());
        assert_eq!(config.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_unset() {
        let mut config = Config::default();
        config.set(ConfigKey::UtcOffset, "+01:00").unwrap();
        config.unset(ConfigKey::UtcOffset);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jayzone").join("config.toml");

        let mut config = Config::default();
        config.set(ConfigKey::FirstWeekday, "monday").unwrap();
        config.set(ConfigKey::Database, "/tmp/hr.db").unwrap();
        config.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("first_weekday = \"monday\""));
        assert!(!content.contains("utc_offset"));

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "first_weekday = [").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        assert_eq!(Config::load_from(&dir.path().join("missing.toml")), Config::default());
    }
}
