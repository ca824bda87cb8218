//! Error types for pim-calendar

use thiserror::Error;

/// pim-calendar error type
///
/// `Display` is the message shown to the user.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Calendar access denied. Grant access in System Settings > Privacy & Security > Calendars.")]
    AccessDenied,

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Invalid date format. Expected: MM/DD/YYYY HH:MM:SS")]
    InvalidDate(String),

    #[error("End date must be after start date")]
    InvalidRange,

    #[error("Calendar is read-only: {0}")]
    ReadOnlyCalendar(String),

    /// Failure reported by the host store, passed through verbatim.
    #[error("{0}")]
    Store(String),
}

impl From<pim_core::Error> for CalendarError {
    fn from(e: pim_core::Error) -> Self {
        match e {
            pim_core::Error::InvalidDate(input) => Self::InvalidDate(input),
            other => Self::Store(other.to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CalendarError>;
