//! Error type for pimctl

use pim_calendar::CalendarError;
use pim_contacts::ContactsError;
use thiserror::Error;

/// Everything that can end a pimctl run
///
/// `Display` is the text written to stderr (`Usage`) or placed in the
/// `{"error": ...}` document (everything else).
#[derive(Error, Debug)]
pub enum CliError {
    /// Unknown command or wrong argument count; carries the usage text
    #[error("{0}")]
    Usage(String),

    #[error("Invalid number of days: {0}")]
    InvalidDays(String),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Contacts(#[from] ContactsError),

    #[error(transparent)]
    Core(#[from] pim_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CliError>;
