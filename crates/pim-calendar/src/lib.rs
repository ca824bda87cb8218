//! pim-calendar: calendar store access for pimctl
//!
//! This crate wraps the host calendar database behind [`CalendarStore`] and
//! layers the command semantics on top in [`CalendarClient`].
//!
//! ## Backends
//!
//! - `EventKitStore` (macOS): the system calendar database via EventKit
//! - [`MemoryCalendarStore`]: an in-process store with the same query rules
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pim_calendar::{CalendarClient, NewEvent};
//! use pim_core::CalendarConfig;
//!
//! let client = CalendarClient::new(pim_calendar::system_store()?, CalendarConfig::default());
//!
//! // Events for the next week
//! let events = client.list_events(None, None).await?;
//!
//! // Create event
//! let start = pim_calendar::parse_date("01/01/2030 09:00:00")?;
//! let end = pim_calendar::parse_date("01/01/2030 10:00:00")?;
//! client.create_event(NewEvent::new("Work", "Planning", start, end)).await?;
//! ```

pub mod client;
pub mod error;
#[cfg(target_os = "macos")]
pub mod eventkit;
pub mod memory;
pub mod models;
pub mod store;

pub use client::{CalendarClient, parse_date};
pub use error::{CalendarError, Result};
#[cfg(target_os = "macos")]
pub use eventkit::EventKitStore;
pub use memory::MemoryCalendarStore;
pub use models::{CalendarEvent, CalendarInfo, CalendarKind, EventQuery, NewEvent};
pub use store::CalendarStore;

/// The host calendar database for this platform.
#[cfg(target_os = "macos")]
pub fn system_store() -> Result<Box<dyn CalendarStore>> {
    Ok(Box::new(EventKitStore::new()?))
}

/// The host calendar database for this platform.
#[cfg(not(target_os = "macos"))]
pub fn system_store() -> Result<Box<dyn CalendarStore>> {
    Err(CalendarError::Store("Calendar access requires macOS".to_string()))
}
