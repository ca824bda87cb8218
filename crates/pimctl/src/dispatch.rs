//! Command execution
//!
//! Turns a parsed [`Command`] into the document pimctl prints and the exit
//! code it returns. Store backends are only opened once the arguments have
//! been validated.

use pim_calendar::{CalendarClient, CalendarEvent, NewEvent, parse_date};
use pim_contacts::{Contact, ContactsClient, NewContact, parse_birthday};
use pim_core::Config;
use pim_core::output::{Message, error_document, render};
use serde::Serialize;
use tracing::debug;

use crate::cli::{CalendarCommand, Command, ContactsCommand, USAGE};
use crate::error::{CliError, Result};

/// Opens the clients a command runs against
pub trait Backends {
    fn calendar(&self) -> Result<CalendarClient>;
    fn contacts(&self) -> Result<ContactsClient>;
}

/// The host databases of this machine
pub struct SystemBackends {
    config: Config,
}

impl SystemBackends {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Backends for SystemBackends {
    fn calendar(&self) -> Result<CalendarClient> {
        let store = pim_calendar::system_store()?;
        Ok(CalendarClient::new(store, self.config.calendar.clone()))
    }

    fn contacts(&self) -> Result<ContactsClient> {
        Ok(ContactsClient::new(pim_contacts::system_store()?))
    }
}

#[derive(Debug, Serialize)]
struct EventResult {
    message: &'static str,
    event: CalendarEvent,
}

#[derive(Debug, Serialize)]
struct ContactResult {
    message: &'static str,
    contact: Contact,
}

/// What a run writes and how it exits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: u8,
}

impl Outcome {
    pub fn success(document: String) -> Self {
        Self {
            stdout: Some(document),
            stderr: None,
            exit_code: 0,
        }
    }

    /// Usage text goes out as is; every other error as `{"error": ...}`.
    pub fn failure(error: &CliError) -> Self {
        let stderr = match error {
            CliError::Usage(text) => text.clone(),
            other => error_document(&other.to_string()),
        };
        Self {
            stdout: None,
            stderr: Some(stderr),
            exit_code: 1,
        }
    }

    pub fn emit(&self) {
        if let Some(out) = &self.stdout {
            println!("{out}");
        }
        if let Some(err) = &self.stderr {
            eprintln!("{err}");
        }
    }
}

/// Run `command` and capture its output.
pub async fn execute(command: Command, backends: &dyn Backends) -> Outcome {
    match run(command, backends).await {
        Ok(document) => Outcome::success(document),
        Err(e) => {
            debug!("Command failed: {}", e);
            Outcome::failure(&e)
        }
    }
}

async fn run(command: Command, backends: &dyn Backends) -> Result<String> {
    match command {
        Command::Help => Ok(USAGE.to_string()),
        Command::Version => Ok(version()),
        Command::Calendar(command) => run_calendar(command, backends).await,
        Command::Contacts(command) => run_contacts(command, backends).await,
    }
}

pub fn version() -> String {
    format!("pimctl {}", env!("CARGO_PKG_VERSION"))
}

async fn run_calendar(command: CalendarCommand, backends: &dyn Backends) -> Result<String> {
    match command {
        CalendarCommand::Calendars => {
            let calendars = backends.calendar()?.list_calendars().await?;
            Ok(render(&calendars)?)
        }
        CalendarCommand::Events { days, calendar } => {
            let events = backends
                .calendar()?
                .list_events(days, calendar.as_deref())
                .await?;
            Ok(render(&events)?)
        }
        CalendarCommand::Today { calendar } => {
            let events = backends.calendar()?.today(calendar.as_deref()).await?;
            Ok(render(&events)?)
        }
        CalendarCommand::Search {
            query,
            days,
            calendar,
        } => {
            let events = backends
                .calendar()?
                .search(&query, days, calendar.as_deref())
                .await?;
            Ok(render(&events)?)
        }
        CalendarCommand::Create {
            calendar,
            title,
            start,
            end,
            notes,
            location,
            url,
        } => {
            let start = parse_date(&start)?;
            let end = parse_date(&end)?;
            let mut event = NewEvent::new(calendar, title, start, end);
            if let Some(notes) = notes {
                event = event.with_notes(notes);
            }
            if let Some(location) = location {
                event = event.with_location(location);
            }
            if let Some(url) = url {
                event = event.with_url(url);
            }

            let event = backends.calendar()?.create_event(event).await?;
            Ok(render(&EventResult {
                message: "Event created successfully",
                event,
            })?)
        }
        CalendarCommand::Details { calendar, title } => {
            let event = backends.calendar()?.event_details(&calendar, &title).await?;
            Ok(render(&event)?)
        }
        CalendarCommand::Delete { calendar, title } => {
            match backends.calendar()?.delete_event(&calendar, &title).await? {
                Some(event) => Ok(render(&EventResult {
                    message: "Event deleted successfully",
                    event,
                })?),
                None => Ok(render(&Message::new(format!("Event not found: {title}")))?),
            }
        }
    }
}

async fn run_contacts(command: ContactsCommand, backends: &dyn Backends) -> Result<String> {
    match command {
        ContactsCommand::Search { query } => {
            let contacts = backends.contacts()?.search(&query).await?;
            Ok(render(&contacts)?)
        }
        ContactsCommand::Get { name } => {
            let contact = backends.contacts()?.get(&name).await?;
            Ok(render(&contact)?)
        }
        ContactsCommand::List => {
            let contacts = backends.contacts()?.list().await?;
            Ok(render(&contacts)?)
        }
        ContactsCommand::Create {
            name,
            email,
            phone,
            organization,
            birthday,
        } => {
            let birthday = birthday.as_deref().map(parse_birthday).transpose()?;
            let mut contact = NewContact::from_full_name(&name)?;
            if let Some(email) = email {
                contact = contact.with_email(email);
            }
            if let Some(phone) = phone {
                contact = contact.with_phone(phone);
            }
            if let Some(organization) = organization {
                contact = contact.with_organization(organization);
            }
            if let Some(birthday) = birthday {
                contact = contact.with_birthday(birthday);
            }

            let contact = backends.contacts()?.create_contact(contact).await?;
            Ok(render(&ContactResult {
                message: "Contact created successfully",
                contact,
            })?)
        }
    }
}
