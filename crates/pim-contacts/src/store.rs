//! Host contact store abstraction

use std::rc::Rc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Contact, NewContact};

/// An address book owned by someone else.
///
/// Name matching is whatever the host's name predicate does; organization
/// matching and ordering live in [`crate::ContactsClient`].
#[async_trait(?Send)]
pub trait ContactStore {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Obtain access, prompting the user if the host requires it.
    ///
    /// Returns [`crate::ContactsError::AccessDenied`] when refused.
    async fn request_access(&self) -> Result<()>;

    /// Contacts the host considers a match for `name`
    fn contacts_matching_name(&self, name: &str) -> Result<Vec<Contact>>;

    /// Every contact, each once
    fn all_contacts(&self) -> Result<Vec<Contact>>;

    /// Save a new contact and return it as stored
    fn create_contact(&self, contact: &NewContact) -> Result<Contact>;
}

/// Lets several owners hold one store.
#[async_trait(?Send)]
impl<S: ContactStore + ?Sized> ContactStore for Rc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn request_access(&self) -> Result<()> {
        (**self).request_access().await
    }

    fn contacts_matching_name(&self, name: &str) -> Result<Vec<Contact>> {
        (**self).contacts_matching_name(name)
    }

    fn all_contacts(&self) -> Result<Vec<Contact>> {
        (**self).all_contacts()
    }

    fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        (**self).create_contact(contact)
    }
}
