//! In-process calendar store
//!
//! Applies the same window and calendar filtering as an EventKit date
//! predicate. Used by the test suites and by anything that needs a calendar
//! without the host database.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CalendarError, Result};
use crate::models::{CalendarEvent, CalendarInfo, EventQuery, NewEvent};
use crate::store::CalendarStore;

/// Calendar store held in memory
#[derive(Debug, Default)]
pub struct MemoryCalendarStore {
    calendars: RefCell<Vec<CalendarInfo>>,
    events: RefCell<Vec<CalendarEvent>>,
    denied: bool,
    access_requests: Cell<usize>,
}

impl MemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a calendar
    pub fn with_calendar(self, calendar: CalendarInfo) -> Self {
        self.calendars.borrow_mut().push(calendar);
        self
    }

    /// Add a stored event, assigning an identifier if it has none.
    ///
    /// Events sharing an identifier act as occurrences of one recurring event.
    pub fn with_event(self, mut event: CalendarEvent) -> Self {
        if event.identifier.is_none() {
            event.identifier = Some(uuid::Uuid::new_v4().to_string());
        }
        self.events.borrow_mut().push(event);
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

    /// Number of stored events
    pub fn event_count(&self) -> usize {
        self.events.borrow().len()
    }
}

#[async_trait(?Send)]
impl CalendarStore for MemoryCalendarStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn request_access(&self) -> Result<()> {
        self.access_requests.set(self.access_requests.get() + 1);
        if self.denied {
            return Err(CalendarError::AccessDenied);
        }
        Ok(())
    }

    fn calendars(&self) -> Result<Vec<CalendarInfo>> {
        Ok(self.calendars.borrow().clone())
    }

    fn events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>> {
        let events: Vec<CalendarEvent> = self
            .events
            .borrow()
            .iter()
            .filter(|event| query.includes_calendar(&event.calendar))
            .filter(|event| query.window.overlaps(&event.start_date, &event.end_date))
            .cloned()
            .collect();
        debug!("memory store matched {} events", events.len());
        Ok(events)
    }

    fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
        let calendars = self.calendars.borrow();
        let calendar = calendars
            .iter()
            .find(|calendar| calendar.title == event.calendar)
            .ok_or_else(|| CalendarError::Store(format!("No calendar named {}", event.calendar)))?;
        if !calendar.writable {
            return Err(CalendarError::Store(
                "The calendar does not allow new events".to_string(),
            ));
        }

        let stored = CalendarEvent {
            identifier: Some(uuid::Uuid::new_v4().to_string()),
            title: event.title.clone(),
            start_date: event.start,
            end_date: event.end,
            notes: event.notes.clone(),
            location: event.location.clone(),
            calendar: calendar.title.clone(),
            all_day: event.all_day,
            url: event.url.clone(),
        };
        self.events.borrow_mut().push(stored.clone());
        Ok(stored)
    }

    fn remove_event(&self, event: &CalendarEvent) -> Result<()> {
        let mut events = self.events.borrow_mut();
        let position = events
            .iter()
            .position(|stored| {
                stored.identifier.is_some()
                    && stored.identifier == event.identifier
                    && stored.start_date == event.start_date
            })
            .ok_or_else(|| CalendarError::Store("The event does not exist".to_string()))?;
        events.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pim_core::DateWindow;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn store() -> MemoryCalendarStore {
        MemoryCalendarStore::new()
            .with_calendar(CalendarInfo::new("Work"))
            .with_calendar(CalendarInfo::new("Home"))
            .with_calendar(CalendarInfo::new("Holidays").read_only())
    }

    #[tokio::test]
    async fn test_access_is_counted() {
        let store = store();
        store.request_access().await.unwrap();
        assert_eq!(store.access_requests(), 1);

        let denied = MemoryCalendarStore::new().denying_access();
        assert!(matches!(denied.request_access().await, Err(CalendarError::AccessDenied)));
    }

    #[test]
    fn test_events_filter_by_window_and_calendar() {
        let store = store();
        store.create_event(&NewEvent::new("Work", "A", at(1, 9), at(1, 10))).unwrap();
        store.create_event(&NewEvent::new("Home", "B", at(1, 12), at(1, 13))).unwrap();
        store.create_event(&NewEvent::new("Work", "C", at(3, 9), at(3, 10))).unwrap();

        let day_one = DateWindow::new(at(1, 0), at(2, 0));
        assert_eq!(store.events(&EventQuery::new(day_one)).unwrap().len(), 2);

        let work_only = EventQuery::new(day_one).in_calendars(Some(vec!["Work".to_string()]));
        let events = store.events(&work_only).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "A");
    }

    #[test]
    fn test_create_rejects_unknown_and_read_only_calendars() {
        let store = store();
        let err = store.create_event(&NewEvent::new("Gym", "A", at(1, 9), at(1, 10))).unwrap_err();
        assert_eq!(err.to_string(), "No calendar named Gym");

        let err = store
            .create_event(&NewEvent::new("Holidays", "A", at(1, 9), at(1, 10)))
            .unwrap_err();
        assert!(matches!(err, CalendarError::Store(_)));
        assert_eq!(store.event_count(), 0);
    }

    #[test]
    fn test_remove_event() {
        let store = store();
        let event = store.create_event(&NewEvent::new("Work", "A", at(1, 9), at(1, 10))).unwrap();
        store.remove_event(&event).unwrap();
        assert_eq!(store.event_count(), 0);
        assert!(store.remove_event(&event).is_err());
    }

    #[test]
    fn test_remove_one_occurrence() {
        let occurrence = |day: u32| CalendarEvent {
            identifier: Some("series".to_string()),
            title: "Standup".to_string(),
            start_date: at(day, 9),
            end_date: at(day, 10),
            notes: None,
            location: None,
            calendar: "Work".to_string(),
            all_day: false,
            url: None,
        };
        let store = store().with_event(occurrence(1)).with_event(occurrence(8));

        store.remove_event(&occurrence(8)).unwrap();
        let left = store.events(&EventQuery::new(DateWindow::new(at(1, 0), at(20, 0)))).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].start_date, at(1, 9));
    }
}
