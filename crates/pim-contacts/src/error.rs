//! Error types for pim-contacts

use thiserror::Error;

/// pim-contacts error type
///
/// `Display` is the message shown to the user.
#[derive(Error, Debug)]
pub enum ContactsError {
    #[error("Contacts access denied. Grant access in System Settings > Privacy & Security > Contacts.")]
    AccessDenied,

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    #[error("Invalid birthday format. Expected: YYYY-MM-DD, MM/DD/YYYY or Month D, YYYY")]
    InvalidBirthday(String),

    #[error("Contact name must not be empty")]
    EmptyName,

    /// Failure reported by the host store, passed through verbatim.
    #[error("{0}")]
    Store(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ContactsError>;
