//! In-process contact store
//!
//! Name matching approximates the host predicate: a case-insensitive
//! substring of the display name.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;

use crate::error::{ContactsError, Result};
use crate::models::{Contact, NewContact};
use crate::store::ContactStore;

/// Contact store held in memory
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    contacts: RefCell<Vec<Contact>>,
    denied: bool,
    access_requests: Cell<usize>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contact, assigning an identifier if it has none
    pub fn with_contact(self, mut contact: Contact) -> Self {
        if contact.identifier.is_none() {
            contact.identifier = Some(uuid::Uuid::new_v4().to_string());
        }
        self.contacts.borrow_mut().push(contact);
        self
    }

    /// Refuse every access request
    pub fn denying_access(mut self) -> Self {
        self.denied = true;
        self
    }

    /// How many times access was requested
    pub fn access_requests(&self) -> usize {
        self.access_requests.get()
    }

    pub fn len(&self) -> usize {
        self.contacts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.borrow().is_empty()
    }
}

#[async_trait(?Send)]
impl ContactStore for MemoryContactStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn request_access(&self) -> Result<()> {
        self.access_requests.set(self.access_requests.get() + 1);
        if self.denied {
            return Err(ContactsError::AccessDenied);
        }
        Ok(())
    }

    fn contacts_matching_name(&self, name: &str) -> Result<Vec<Contact>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .contacts
            .borrow()
            .iter()
            .filter(|contact| contact.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn all_contacts(&self) -> Result<Vec<Contact>> {
        Ok(self.contacts.borrow().clone())
    }

    fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        let mut stored = Contact::new(&contact.given_name, &contact.family_name)
            .with_identifier(uuid::Uuid::new_v4().to_string());
        stored.emails.extend(contact.email.clone());
        stored.phones.extend(contact.phone.clone());
        stored.organization = contact.organization.clone();
        stored.birthday = contact.birthday;

        self.contacts.borrow_mut().push(stored.clone());
        Ok(stored)
    }
}
