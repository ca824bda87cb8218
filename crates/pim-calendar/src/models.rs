//! Data models for calendar access

use chrono::NaiveDateTime;
use pim_core::DateWindow;
use pim_core::datetime::iso_local;
use serde::{Deserialize, Serialize};

/// Kind of account backing a calendar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    Local,
    Caldav,
    Exchange,
    Subscription,
    Birthday,
    Unknown,
}

impl CalendarKind {
    /// Map an `EKCalendarType` raw value.
    pub fn from_raw(raw: isize) -> Self {
        match raw {
            0 => Self::Local,
            1 => Self::Caldav,
            2 => Self::Exchange,
            3 => Self::Subscription,
            4 => Self::Birthday,
            _ => Self::Unknown,
        }
    }
}

/// A calendar as listed by `calendar calendars`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarInfo {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CalendarKind,
    /// Account name, e.g. "iCloud" or "On My Mac"
    pub source: String,
    /// Whether events can be added or removed
    pub writable: bool,
}

impl CalendarInfo {
    /// A writable local calendar
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: CalendarKind::Local,
            source: "Default".to_string(),
            writable: true,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn with_kind(mut self, kind: CalendarKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Calendar event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Host identifier, kept only to address the event for removal
    #[serde(skip)]
    pub identifier: Option<String>,
    pub title: String,
    #[serde(with = "iso_local")]
    pub start_date: NaiveDateTime,
    #[serde(with = "iso_local")]
    pub end_date: NaiveDateTime,
    pub notes: Option<String>,
    pub location: Option<String>,
    /// Owning calendar title
    pub calendar: String,
    pub all_day: bool,
    pub url: Option<String>,
}

impl CalendarEvent {
    /// Case-insensitive substring match on title or notes.
    ///
    /// `needle` must already be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(needle))
    }
}

/// Fields for a new event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub calendar: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub all_day: bool,
}

impl NewEvent {
    pub fn new(
        calendar: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            calendar: calendar.into(),
            title: title.into(),
            start,
            end,
            notes: None,
            location: None,
            url: None,
            all_day: false,
        }
    }

    /// Set the notes; empty strings are ignored
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = non_empty(notes.into());
        self
    }

    /// Set the location; empty strings are ignored
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_empty(location.into());
        self
    }

    /// Set the URL; empty strings are ignored
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = non_empty(url.into());
        self
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Host date predicate: a window plus an optional calendar filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub window: DateWindow,
    /// Calendar titles to search; `None` searches every calendar
    pub calendars: Option<Vec<String>>,
}

impl EventQuery {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            calendars: None,
        }
    }

    pub fn in_calendars(mut self, calendars: Option<Vec<String>>) -> Self {
        self.calendars = calendars;
        self
    }

    /// Whether `calendar` passes the calendar filter
    pub fn includes_calendar(&self, calendar: &str) -> bool {
        self.calendars
            .as_ref()
            .is_none_or(|names| names.iter().any(|name| name == calendar))
    }

    /// The first of `calendars` carrying each requested title, in host order.
    ///
    /// Duplicate titles resolve to the same calendar a lookup by name finds.
    /// `None` when the query is not filtered.
    pub fn select_calendars<T: Copy + PartialEq>(
        &self,
        calendars: &[T],
        title: impl Fn(T) -> String,
    ) -> Option<Vec<T>> {
        let names = self.calendars.as_ref()?;
        let mut selected = Vec::new();
        for name in names {
            let first = calendars.iter().copied().find(|calendar| title(*calendar) == *name);
            if let Some(calendar) = first {
                if !selected.contains(&calendar) {
                    selected.push(calendar);
                }
            }
        }
        Some(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn event() -> CalendarEvent {
        let day = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        CalendarEvent {
            identifier: Some("abc".to_string()),
            title: "Quarterly Review".to_string(),
            start_date: day.and_hms_opt(9, 0, 0).unwrap(),
            end_date: day.and_hms_opt(10, 0, 0).unwrap(),
            notes: Some("Bring the Budget".to_string()),
            location: None,
            calendar: "Work".to_string(),
            all_day: false,
            url: None,
        }
    }

    #[test]
    fn test_event_json_schema() {
        let value = serde_json::to_value(event()).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Quarterly Review",
                "start_date": "2030-01-01T09:00:00",
                "end_date": "2030-01-01T10:00:00",
                "notes": "Bring the Budget",
                "location": null,
                "calendar": "Work",
                "all_day": false,
                "url": null
            })
        );
    }

    #[test]
    fn test_calendar_json_schema() {
        let info = CalendarInfo::new("Holidays")
            .with_kind(CalendarKind::Subscription)
            .with_source("Other")
            .read_only();
        let value = serde_json::to_value(info).unwrap();
        assert_eq!(
            value,
            json!({"title": "Holidays", "type": "subscription", "source": "Other", "writable": false})
        );
    }

    #[test]
    fn test_calendar_kind_from_raw() {
        assert_eq!(CalendarKind::from_raw(1), CalendarKind::Caldav);
        assert_eq!(CalendarKind::from_raw(4), CalendarKind::Birthday);
        assert_eq!(CalendarKind::from_raw(42), CalendarKind::Unknown);
    }

    #[test]
    fn test_select_calendars_takes_first_of_duplicates() {
        let calendars = [(1, "Work"), (2, "Work"), (3, "Home"), (4, "Gym")];
        let window = DateWindow::new(event().start_date, event().end_date);
        let title = |calendar: (u8, &str)| calendar.1.to_string();

        let query = EventQuery::new(window).in_calendars(Some(vec![
            "Work".to_string(),
            "Home".to_string(),
            "Missing".to_string(),
        ]));
        assert_eq!(query.select_calendars(&calendars, title), Some(vec![(1, "Work"), (3, "Home")]));

        let none = EventQuery::new(window).in_calendars(Some(vec!["Missing".to_string()]));
        assert_eq!(none.select_calendars(&calendars, title), Some(vec![]));

        assert_eq!(EventQuery::new(window).select_calendars(&calendars, title), None);
    }

    #[test]
    fn test_mentions() {
        let event = event();
        assert!(event.mentions("quarterly"));
        assert!(event.mentions("budget"));
        assert!(!event.mentions("standup"));
    }

    #[test]
    fn test_new_event_ignores_empty_optionals() {
        let e = event();
        let new = NewEvent::new("Work", "T", e.start_date, e.end_date)
            .with_notes("")
            .with_location("Room 4")
            .with_url("");
        assert!(new.notes.is_none());
        assert_eq!(new.location.as_deref(), Some("Room 4"));
        assert!(new.url.is_none());
    }

    #[test]
    fn test_query_calendar_filter() {
        let e = event();
        let window = DateWindow::new(e.start_date, e.end_date);
        assert!(EventQuery::new(window).includes_calendar("Home"));

        let query = EventQuery::new(window).in_calendars(Some(vec!["Work".to_string()]));
        assert!(query.includes_calendar("Work"));
        assert!(!query.includes_calendar("Home"));
    }
}
