//! Logging setup
//!
//! Logs go to stderr so stdout stays a single JSON document.

use pim_core::config::ENV_LOG_LEVEL;
use pim_core::{Config, Error, Result};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` when set, else from the configured level.
pub fn filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter> {
    match rust_log.filter(|directives| !directives.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| Error::Config(format!("Invalid RUST_LOG value {directives:?}: {e}"))),
        None => EnvFilter::try_new(level)
            .map_err(|e| Error::Config(format!("Invalid {ENV_LOG_LEVEL} value {level:?}: {e}"))),
    }
}

pub fn init(config: &Config) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = filter(&config.log.level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Outcome;
    use crate::error::CliError;

    #[test]
    fn test_filter_from_level() {
        assert!(filter("warn", None).is_ok());
        assert!(filter("pim_calendar=debug,warn", Some("")).is_ok());
    }

    #[test]
    fn test_rust_log_wins() {
        assert!(filter("pimctl=[bad", Some("info")).is_ok());
        assert!(filter("warn", Some("pimctl=[bad")).is_err());
    }

    #[test]
    fn test_bad_level_is_a_json_error() {
        let err = filter("pimctl=[bad", None).unwrap_err();
        let outcome = Outcome::failure(&CliError::from(err));

        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.stdout.is_none());
        let doc: serde_json::Value = serde_json::from_str(outcome.stderr.as_deref().unwrap()).unwrap();
        let message = doc["error"].as_str().unwrap();
        assert!(message.starts_with("Configuration error: Invalid PIMCTL_LOG value \"pimctl=[bad\""));
    }
}
