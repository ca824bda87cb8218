//! Data models for contacts

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use crate::error::{ContactsError, Result};

/// Birthday patterns, tried in this order
const BIRTHDAY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y"];

/// Parse a birthday argument, keeping the first pattern that matches.
pub fn parse_birthday(input: &str) -> Result<Birthday> {
    let trimmed = input.trim();
    BIRTHDAY_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(Birthday::from)
        .ok_or_else(|| ContactsError::InvalidBirthday(input.to_string()))
}

/// Month and day, with the year when known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Birthday {
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
}

impl Birthday {
    pub fn new(month: u32, day: u32, year: Option<i32>) -> Self {
        Self { month, day, year }
    }
}

impl From<NaiveDate> for Birthday {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.month(), date.day(), Some(date.year()))
    }
}

/// `YYYY-MM-DD`, or `--MM-DD` without a year
impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{:04}-{:02}-{:02}", year, self.month, self.day),
            None => write!(f, "--{:02}-{:02}", self.month, self.day),
        }
    }
}

impl Serialize for Birthday {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Contact information
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Contact {
    /// Host identifier, used only to de-duplicate results
    #[serde(skip)]
    pub identifier: Option<String>,
    #[serde(skip)]
    pub given_name: String,
    #[serde(skip)]
    pub family_name: String,
    /// Given and family name joined by a space
    pub name: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub organization: Option<String>,
    pub birthday: Option<Birthday>,
}

impl Contact {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        let given_name = given_name.into();
        let family_name = family_name.into();
        Self {
            identifier: None,
            name: display_name(&given_name, &family_name),
            given_name,
            family_name,
            emails: Vec::new(),
            phones: Vec::new(),
            organization: None,
            birthday: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Add an email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(email.into());
        self
    }

    /// Add a phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phones.push(phone.into());
        self
    }

    /// Set organization; empty strings clear it
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        let organization = organization.into();
        self.organization = (!organization.is_empty()).then_some(organization);
        self
    }

    pub fn with_birthday(mut self, birthday: Birthday) -> Self {
        self.birthday = Some(birthday);
        self
    }

    /// Case-insensitive substring match on the organization.
    ///
    /// `needle` must already be lowercase.
    pub fn works_at(&self, needle: &str) -> bool {
        self.organization
            .as_deref()
            .is_some_and(|org| org.to_lowercase().contains(needle))
    }
}

fn display_name(given_name: &str, family_name: &str) -> String {
    [given_name.trim(), family_name.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fields for a new contact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    pub given_name: String,
    pub family_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub birthday: Option<Birthday>,
}

impl NewContact {
    /// Split `name` at the first whitespace into given and family name.
    pub fn from_full_name(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactsError::EmptyName);
        }

        let (given_name, family_name) = match name.split_once(char::is_whitespace) {
            Some((given, family)) => (given.to_string(), family.trim().to_string()),
            None => (name.to_string(), String::new()),
        };

        Ok(Self {
            given_name,
            family_name,
            ..Default::default()
        })
    }

    /// Set email; empty strings are ignored
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = non_empty(email.into());
        self
    }

    /// Set phone; empty strings are ignored
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = non_empty(phone.into());
        self
    }

    /// Set organization; empty strings are ignored
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = non_empty(organization.into());
        self
    }

    pub fn with_birthday(mut self, birthday: Birthday) -> Self {
        self.birthday = Some(birthday);
        self
    }

    pub fn display_name(&self) -> String {
        display_name(&self.given_name, &self.family_name)
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_birthday_patterns() {
        assert_eq!(parse_birthday("1990-04-12").unwrap(), Birthday::new(4, 12, Some(1990)));
        assert_eq!(parse_birthday("04/12/1990").unwrap(), Birthday::new(4, 12, Some(1990)));
        assert_eq!(parse_birthday("April 12, 1990").unwrap(), Birthday::new(4, 12, Some(1990)));
        assert_eq!(parse_birthday(" April 2, 1990 ").unwrap(), Birthday::new(4, 2, Some(1990)));
    }

    #[test]
    fn test_parse_birthday_order() {
        // Month/day ambiguity resolves by pattern order, not by guessing.
        assert_eq!(parse_birthday("2020-01-02").unwrap(), Birthday::new(1, 2, Some(2020)));
        assert_eq!(parse_birthday("01/02/2020").unwrap(), Birthday::new(1, 2, Some(2020)));
    }

    #[test]
    fn test_parse_birthday_invalid() {
        for bad in ["12.04.1990", "1990/04/12", "Smarch 1, 1990", "13/01/1990", ""] {
            let err = parse_birthday(bad).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid birthday format. Expected: YYYY-MM-DD, MM/DD/YYYY or Month D, YYYY"
            );
        }
    }

    #[test]
    fn test_birthday_display() {
        assert_eq!(Birthday::new(4, 2, Some(1990)).to_string(), "1990-04-02");
        assert_eq!(Birthday::new(12, 25, None).to_string(), "--12-25");
    }

    #[test]
    fn test_contact_json_schema() {
        let contact = Contact::new("Ada", "Lovelace")
            .with_identifier("abc")
            .with_email("ada@example.com")
            .with_phone("+44 20 0000")
            .with_organization("Analytical Engines")
            .with_birthday(Birthday::new(12, 10, Some(1815)));

        assert_eq!(
            serde_json::to_value(contact).unwrap(),
            json!({
                "name": "Ada Lovelace",
                "emails": ["ada@example.com"],
                "phones": ["+44 20 0000"],
                "organization": "Analytical Engines",
                "birthday": "1815-12-10"
            })
        );
    }

    #[test]
    fn test_display_name_skips_empty_parts() {
        assert_eq!(Contact::new("Cher", "").name, "Cher");
        assert_eq!(Contact::new("", "Acme Support").name, "Acme Support");
    }

    #[test]
    fn test_works_at() {
        let contact = Contact::new("Bob", "Builder").with_organization("ACME Corp");
        assert!(contact.works_at("acme"));
        assert!(!contact.works_at("globex"));
        assert!(!Contact::new("No", "Org").works_at("acme"));
    }

    #[test]
    fn test_new_contact_from_full_name() {
        let contact = NewContact::from_full_name("Mary Anne  Evans").unwrap();
        assert_eq!(contact.given_name, "Mary");
        assert_eq!(contact.family_name, "Anne  Evans");

        let single = NewContact::from_full_name("Prince").unwrap();
        assert_eq!(single.given_name, "Prince");
        assert!(single.family_name.is_empty());

        assert!(matches!(NewContact::from_full_name("  "), Err(ContactsError::EmptyName)));
    }

    #[test]
    fn test_new_contact_ignores_empty_optionals() {
        let contact = NewContact::from_full_name("Ada Lovelace")
            .unwrap()
            .with_email("")
            .with_phone(" ")
            .with_organization("Analytical Engines");
        assert!(contact.email.is_none());
        assert!(contact.phone.is_none());
        assert_eq!(contact.organization.as_deref(), Some("Analytical Engines"));
    }
}
