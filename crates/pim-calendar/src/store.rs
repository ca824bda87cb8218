//! Host calendar store abstraction

use std::rc::Rc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CalendarEvent, CalendarInfo, EventQuery, NewEvent};

/// A calendar database owned by someone else.
///
/// Implementations translate calls into the host's own query objects and
/// return plain records. They do no filtering beyond what the host predicate
/// does; matching rules live in [`crate::CalendarClient`].
#[async_trait(?Send)]
pub trait CalendarStore {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Obtain read/write access, prompting the user if the host requires it.
    ///
    /// Returns [`crate::CalendarError::AccessDenied`] when refused.
    async fn request_access(&self) -> Result<()>;

    /// Every event calendar
    fn calendars(&self) -> Result<Vec<CalendarInfo>>;

    /// Events overlapping the query window, in host order
    fn events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>>;

    /// Save a new event and return it as stored
    fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent>;

    /// Remove the occurrence `event` was fetched as.
    ///
    /// Occurrences of a recurring event share an identifier; the start date
    /// picks the one to remove.
    fn remove_event(&self, event: &CalendarEvent) -> Result<()>;
}

/// Lets several owners hold one store.
#[async_trait(?Send)]
impl<S: CalendarStore + ?Sized> CalendarStore for Rc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn request_access(&self) -> Result<()> {
        (**self).request_access().await
    }

    fn calendars(&self) -> Result<Vec<CalendarInfo>> {
        (**self).calendars()
    }

    fn events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>> {
        (**self).events(query)
    }

    fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
        (**self).create_event(event)
    }

    fn remove_event(&self, event: &CalendarEvent) -> Result<()> {
        (**self).remove_event(event)
    }
}
