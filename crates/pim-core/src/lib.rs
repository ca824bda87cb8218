//! pim-core: shared plumbing for pimctl
//!
//! Holds the pieces both store adapters need:
//!
//! - configuration loading (`pimctl.toml` + environment overrides)
//! - the CLI date grammar and the ISO-8601 local output format
//! - date windows used to build host queries
//! - JSON rendering of results and error documents
//! - Foundation bridging helpers (macOS only)

pub mod config;
pub mod datetime;
pub mod error;
#[cfg(target_os = "macos")]
pub mod foundation;
pub mod output;

pub use config::{CalendarConfig, Config, LogConfig};
pub use datetime::DateWindow;
pub use error::{Error, Result};
