//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. environment variables
//! 2. the `pimctl.toml` file (`$PIMCTL_CONFIG`, then the working directory)
//! 3. defaults
//!
//! `${VAR_NAME}` inside the file is replaced with the environment value.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default calendar used when a command omits one.
pub const ENV_DEFAULT_CALENDAR: &str = "PIMCTL_CALENDAR";
/// Explicit path to the config file.
pub const ENV_CONFIG_PATH: &str = "PIMCTL_CONFIG";
/// How many years either side of today a title lookup may reach.
pub const ENV_LOOKUP_HORIZON: &str = "PIMCTL_LOOKUP_HORIZON_YEARS";
/// Log filter directive.
pub const ENV_LOG_LEVEL: &str = "PIMCTL_LOG";

const DEFAULT_CONFIG_FILE: &str = "pimctl.toml";

/// Calendar command defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Calendar used when a command does not name one
    #[serde(default)]
    pub default_calendar: Option<String>,

    /// Years either side of today searched by `details` and `delete`
    #[serde(default = "default_lookup_horizon_years")]
    pub lookup_horizon_years: u32,

    /// Window of `calendar events`
    #[serde(default = "default_events_days")]
    pub events_days: u32,

    /// Window of `calendar search`
    #[serde(default = "default_search_days")]
    pub search_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_calendar: None,
            lookup_horizon_years: default_lookup_horizon_years(),
            events_days: default_events_days(),
            search_days: default_search_days(),
        }
    }
}

fn default_lookup_horizon_years() -> u32 {
    5
}

fn default_events_days() -> u32 {
    7
}

fn default_search_days() -> u32 {
    90
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Main configuration for pimctl
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load from the config file if one exists, otherwise from the environment.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::from_toml_file(path),
            None => Self::from_env(),
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a TOML file, expanding `${VAR}` first, then apply env overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut config = Self::from_toml_str(&Self::expand_env_vars(&content))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn from_toml_str(content: &str) -> Result<Self> {
        let toml: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let calendar = toml.calendar.unwrap_or_default();
        let log = toml.log.unwrap_or_default();

        Ok(Config {
            calendar: CalendarConfig {
                default_calendar: calendar.default_calendar.filter(|name| !name.is_empty()),
                lookup_horizon_years: calendar
                    .lookup_horizon_years
                    .unwrap_or_else(default_lookup_horizon_years),
                events_days: calendar.events_days.unwrap_or_else(default_events_days),
                search_days: calendar.search_days.unwrap_or_else(default_search_days),
            },
            log: LogConfig {
                level: log.level.unwrap_or_else(default_log_level),
            },
        })
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(calendar) = lookup(ENV_DEFAULT_CALENDAR) {
            if !calendar.is_empty() {
                self.calendar.default_calendar = Some(calendar);
            }
        }

        if let Some(horizon) = lookup(ENV_LOOKUP_HORIZON) {
            match horizon.parse() {
                Ok(years) => self.calendar.lookup_horizon_years = years,
                Err(_) => tracing::warn!("Ignoring {}={}: not a number", ENV_LOOKUP_HORIZON, horizon),
            }
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            if !level.is_empty() {
                self.log.level = level;
            }
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Replace `${VAR_NAME}` with the environment value (empty when unset).
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }
}

// ============================================================================
// TOML file layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    calendar: Option<TomlCalendarConfig>,
    log: Option<TomlLogConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlCalendarConfig {
    #[serde(default)]
    default_calendar: Option<String>,
    #[serde(default)]
    lookup_horizon_years: Option<u32>,
    #[serde(default)]
    events_days: Option<u32>,
    #[serde(default)]
    search_days: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLogConfig {
    #[serde(default)]
    level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_calendar_config_default() {
        let config = CalendarConfig::default();
        assert!(config.default_calendar.is_none());
        assert_eq!(config.lookup_horizon_years, 5);
        assert_eq!(config.events_days, 7);
        assert_eq!(config.search_days, 90);
    }

    #[test]
    fn test_log_config_default() {
        assert_eq!(LogConfig::default().level, "warn");
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(
            r#"
            [calendar]
            default_calendar = "Work"
            search_days = 30

            [log]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.calendar.default_calendar.as_deref(), Some("Work"));
        assert_eq!(config.calendar.search_days, 30);
        assert_eq!(config.calendar.events_days, 7);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_from_toml_str_empty() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = Config::from_toml_str("[calendar\n").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Failed to parse TOML"));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[calendar]").unwrap();
        writeln!(file, "lookup_horizon_years = 3").unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.calendar.lookup_horizon_years, 3);
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = Config::from_toml_file("/nonexistent/pimctl.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml_str("[calendar]\ndefault_calendar = \"Home\"\n").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DEFAULT_CALENDAR, "Work"),
            (ENV_LOOKUP_HORIZON, "2"),
            (ENV_LOG_LEVEL, "pimctl=debug"),
        ]);

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.calendar.default_calendar.as_deref(), Some("Work"));
        assert_eq!(config.calendar.lookup_horizon_years, 2);
        assert_eq!(config.log.level, "pimctl=debug");
    }

    #[test]
    fn test_env_overrides_ignore_bad_values() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DEFAULT_CALENDAR, ""), (ENV_LOOKUP_HORIZON, "many")]);

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert!(config.calendar.default_calendar.is_none());
        assert_eq!(config.calendar.lookup_horizon_years, 5);
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("PIMCTL_TEST_EXPAND_VAR", "Family");
        }

        let result = Config::expand_env_vars("default_calendar = \"${PIMCTL_TEST_EXPAND_VAR}\"");
        assert_eq!(result, "default_calendar = \"Family\"");

        let result = Config::expand_env_vars("prefix_${PIMCTL_TEST_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("PIMCTL_TEST_EXPAND_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("cost = $5"), "cost = $5");
    }
}
