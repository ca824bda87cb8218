//! Contact commands on top of a [`ContactStore`]

use std::collections::HashSet;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{ContactsError, Result};
use crate::models::{Contact, NewContact};
use crate::store::ContactStore;

/// Contacts client
///
/// Asks the store for access once, on the first operation.
pub struct ContactsClient {
    store: Box<dyn ContactStore>,
    access: OnceCell<()>,
}

impl ContactsClient {
    pub fn new(store: Box<dyn ContactStore>) -> Self {
        debug!("Contacts client using {} store", store.name());
        Self {
            store,
            access: OnceCell::new(),
        }
    }

    async fn ensure_access(&self) -> Result<()> {
        self.access
            .get_or_try_init(|| async {
                self.store.request_access().await.inspect_err(|e| {
                    if matches!(e, ContactsError::AccessDenied) {
                        warn!("Contacts access was denied");
                    }
                })
            })
            .await?;
        Ok(())
    }

    /// Contacts whose name matches `query` (host rules) or whose organization
    /// contains it, ignoring case. Each contact appears once, name matches first.
    /// A blank query matches nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<Contact>> {
        self.ensure_access().await?;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            debug!("Blank contact search");
            return Ok(Vec::new());
        }
        let by_name = self.store.contacts_matching_name(query)?;
        let by_organization = self
            .store
            .all_contacts()?
            .into_iter()
            .filter(|contact| contact.works_at(&needle));

        let mut seen = HashSet::new();
        let contacts: Vec<Contact> = by_name
            .into_iter()
            .chain(by_organization)
            .filter(|contact| match &contact.identifier {
                Some(identifier) => seen.insert(identifier.clone()),
                None => true,
            })
            .collect();

        debug!("Search for {:?} matched {} contacts", query, contacts.len());
        Ok(contacts)
    }

    /// First contact whose display name equals `name`, ignoring case
    pub async fn get(&self, name: &str) -> Result<Contact> {
        self.ensure_access().await?;

        let wanted = name.trim().to_lowercase();
        self.store
            .contacts_matching_name(name)?
            .into_iter()
            .find(|contact| contact.name.to_lowercase() == wanted)
            .ok_or_else(|| ContactsError::ContactNotFound(name.to_string()))
    }

    /// Every contact, ordered by family name then given name
    pub async fn list(&self) -> Result<Vec<Contact>> {
        self.ensure_access().await?;

        let mut contacts = self.store.all_contacts()?;
        contacts.sort_by_cached_key(|contact| {
            (contact.family_name.to_lowercase(), contact.given_name.to_lowercase())
        });
        Ok(contacts)
    }

    /// Save a new contact
    pub async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        self.ensure_access().await?;

        let created = self.store.create_contact(&contact)?;
        info!("Created contact {:?}", created.name);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryContactStore;
    use crate::models::parse_birthday;

    fn store() -> MemoryContactStore {
        MemoryContactStore::new()
            .with_contact(
                Contact::new("Ada", "Lovelace")
                    .with_email("ada@example.com")
                    .with_organization("Analytical Engines"),
            )
            .with_contact(Contact::new("Charles", "Babbage").with_organization("Analytical Engines"))
            .with_contact(Contact::new("Grace", "Hopper").with_organization("US Navy"))
            .with_contact(Contact::new("Alan", "Turing"))
    }

    fn client() -> ContactsClient {
        ContactsClient::new(Box::new(store()))
    }

    fn names(contacts: &[Contact]) -> Vec<&str> {
        contacts.iter().map(|c| c.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_by_organization_only() {
        let contacts = client().search("navy").await.unwrap();
        assert_eq!(names(&contacts), vec!["Grace Hopper"]);
    }

    #[tokio::test]
    async fn test_search_name_and_organization_match_once() {
        let store = MemoryContactStore::new()
            .with_contact(Contact::new("Acme", "Support").with_organization("Acme"));
        let client = ContactsClient::new(Box::new(store));

        let contacts = client.search("acme").await.unwrap();
        assert_eq!(contacts.len(), 1);
    }

    #[tokio::test]
    async fn test_search_name_matches_first() {
        let store = store().with_contact(Contact::new("Engines", "Fan"));
        let client = ContactsClient::new(Box::new(store));

        let contacts = client.search("engines").await.unwrap();
        assert_eq!(names(&contacts), vec!["Engines Fan", "Ada Lovelace", "Charles Babbage"]);
    }

    #[tokio::test]
    async fn test_search_blank_query_matches_nothing() {
        let client = client();
        assert!(client.search("").await.unwrap().is_empty());
        assert!(client.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_no_match() {
        assert!(client().search("Hamilton").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_exact_name() {
        let client = client();
        let contact = client.get("ada lovelace").await.unwrap();
        assert_eq!(contact.emails, vec!["ada@example.com"]);

        let err = client.get("Ada").await.unwrap_err();
        assert_eq!(err.to_string(), "Contact not found: Ada");
    }

    #[tokio::test]
    async fn test_list_sorted_by_family_name() {
        let contacts = client().list().await.unwrap();
        assert_eq!(
            names(&contacts),
            vec!["Charles Babbage", "Grace Hopper", "Ada Lovelace", "Alan Turing"]
        );
    }

    #[tokio::test]
    async fn test_create_contact() {
        let client = client();
        let new = NewContact::from_full_name("Katherine Johnson")
            .unwrap()
            .with_phone("555-0100")
            .with_organization("NASA")
            .with_birthday(parse_birthday("August 26, 1918").unwrap());

        let created = client.create_contact(new).await.unwrap();
        assert_eq!(created.name, "Katherine Johnson");
        assert_eq!(created.birthday.map(|b| b.to_string()).as_deref(), Some("1918-08-26"));

        let found = client.search("nasa").await.unwrap();
        assert_eq!(names(&found), vec!["Katherine Johnson"]);
    }

    #[tokio::test]
    async fn test_access_denied() {
        let client = ContactsClient::new(Box::new(MemoryContactStore::new().denying_access()));
        let err = client.list().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Contacts access denied. Grant access in System Settings > Privacy & Security > Contacts."
        );
    }
}
