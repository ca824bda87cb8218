//! pim-contacts: contacts store access for pimctl
//!
//! This crate wraps the host address book behind [`ContactStore`] and layers
//! the command semantics on top in [`ContactsClient`].
//!
//! ## Backends
//!
//! - `ContactsFrameworkStore` (macOS): the system address book via Contacts
//! - [`MemoryContactStore`]: an in-process store with similar name matching
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pim_contacts::{ContactsClient, NewContact};
//!
//! let client = ContactsClient::new(pim_contacts::system_store()?);
//!
//! // Name or organization search
//! let contacts = client.search("acme").await?;
//!
//! // Add contact
//! let contact = NewContact::from_full_name("John Doe")?
//!     .with_email("john@example.com")
//!     .with_birthday(pim_contacts::parse_birthday("1990-04-12")?);
//! client.create_contact(contact).await?;
//! ```

pub mod client;
#[cfg(target_os = "macos")]
pub mod cnstore;
pub mod error;
pub mod memory;
pub mod models;
pub mod store;

pub use client::ContactsClient;
#[cfg(target_os = "macos")]
pub use cnstore::ContactsFrameworkStore;
pub use error::{ContactsError, Result};
pub use memory::MemoryContactStore;
pub use models::{Birthday, Contact, NewContact, parse_birthday};
pub use store::ContactStore;

/// The host address book for this platform.
#[cfg(target_os = "macos")]
pub fn system_store() -> Result<Box<dyn ContactStore>> {
    Ok(Box::new(ContactsFrameworkStore::new()?))
}

/// The host address book for this platform.
#[cfg(not(target_os = "macos"))]
pub fn system_store() -> Result<Box<dyn ContactStore>> {
    Err(ContactsError::Store("Contacts access requires macOS".to_string()))
}
