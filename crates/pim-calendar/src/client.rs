//! Calendar commands on top of a [`CalendarStore`]

use chrono::NaiveDateTime;
use pim_core::datetime::{self, lookup_windows};
use pim_core::{CalendarConfig, DateWindow};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{CalendarError, Result};
use crate::models::{CalendarEvent, CalendarInfo, EventQuery, NewEvent};
use crate::store::CalendarStore;

/// Parse a `MM/DD/YYYY HH:MM:SS` argument.
pub fn parse_date(value: &str) -> Result<NaiveDateTime> {
    Ok(datetime::parse_input(value)?)
}

/// Calendar client
///
/// Asks the store for access once, on the first operation that needs it.
pub struct CalendarClient {
    store: Box<dyn CalendarStore>,
    config: CalendarConfig,
    access: OnceCell<()>,
    reference_time: Option<NaiveDateTime>,
}

impl CalendarClient {
    pub fn new(store: Box<dyn CalendarStore>, config: CalendarConfig) -> Self {
        debug!("Calendar client using {} store", store.name());
        Self {
            store,
            config,
            access: OnceCell::new(),
            reference_time: None,
        }
    }

    /// Pin "now" instead of reading the clock.
    pub fn with_reference_time(mut self, now: NaiveDateTime) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn now(&self) -> NaiveDateTime {
        self.reference_time.unwrap_or_else(datetime::now_local)
    }

    async fn ensure_access(&self) -> Result<()> {
        self.access
            .get_or_try_init(|| async {
                self.store.request_access().await.inspect_err(|e| {
                    if matches!(e, CalendarError::AccessDenied) {
                        warn!("Calendar access was denied");
                    }
                })
            })
            .await?;
        Ok(())
    }

    /// All event calendars
    pub async fn list_calendars(&self) -> Result<Vec<CalendarInfo>> {
        self.ensure_access().await?;
        let calendars = self.store.calendars()?;
        debug!("Found {} calendars", calendars.len());
        Ok(calendars)
    }

    /// Events from the start of today for `days` days (config default 7)
    pub async fn list_events(
        &self,
        days: Option<u32>,
        calendar: Option<&str>,
    ) -> Result<Vec<CalendarEvent>> {
        let days = days.unwrap_or(self.config.events_days);
        let window = DateWindow::days_from_midnight(self.now(), days);
        self.events_in(window, calendar).await
    }

    /// Events of the current day
    pub async fn today(&self, calendar: Option<&str>) -> Result<Vec<CalendarEvent>> {
        let window = DateWindow::days_from_midnight(self.now(), 1);
        self.events_in(window, calendar).await
    }

    /// Events whose title or notes contain `query`, ignoring case,
    /// from the start of today for `days` days (config default 90)
    pub async fn search(
        &self,
        query: &str,
        days: Option<u32>,
        calendar: Option<&str>,
    ) -> Result<Vec<CalendarEvent>> {
        let days = days.unwrap_or(self.config.search_days);
        let window = DateWindow::days_from_midnight(self.now(), days);
        let needle = query.to_lowercase();

        let events: Vec<CalendarEvent> = self
            .events_in(window, calendar)
            .await?
            .into_iter()
            .filter(|event| event.mentions(&needle))
            .collect();

        debug!("Search for {:?} matched {} events", query, events.len());
        Ok(events)
    }

    /// Save a new event
    pub async fn create_event(&self, event: NewEvent) -> Result<CalendarEvent> {
        if event.end <= event.start {
            return Err(CalendarError::InvalidRange);
        }

        self.ensure_access().await?;
        let calendar = self.find_calendar(&event.calendar)?;
        if !calendar.writable {
            return Err(CalendarError::ReadOnlyCalendar(calendar.title));
        }

        let created = self.store.create_event(&event)?;
        info!("Created event {:?} in {}", created.title, created.calendar);
        Ok(created)
    }

    /// First event in `calendar` titled exactly `title`
    pub async fn event_details(&self, calendar: &str, title: &str) -> Result<CalendarEvent> {
        self.ensure_access().await?;
        self.find_event(calendar, title)?
            .ok_or_else(|| CalendarError::EventNotFound(title.to_string()))
    }

    /// Remove the first event in `calendar` titled exactly `title`.
    ///
    /// Returns `None` when there is no such event.
    pub async fn delete_event(&self, calendar: &str, title: &str) -> Result<Option<CalendarEvent>> {
        self.ensure_access().await?;
        let Some(event) = self.find_event(calendar, title)? else {
            debug!("Nothing to delete for {:?} in {}", title, calendar);
            return Ok(None);
        };

        self.store.remove_event(&event)?;
        info!("Deleted event {:?} from {}", event.title, event.calendar);
        Ok(Some(event))
    }

    async fn events_in(&self, window: DateWindow, calendar: Option<&str>) -> Result<Vec<CalendarEvent>> {
        self.ensure_access().await?;
        let calendars = self.calendar_filter(calendar)?;
        let query = EventQuery::new(window).in_calendars(calendars);

        debug!("Querying events from {} to {}", window.start, window.end);
        let mut events = self.store.events(&query)?;
        sort_events(&mut events);
        Ok(events)
    }

    /// Explicit calendar, else the configured default, else every calendar.
    fn calendar_filter(&self, calendar: Option<&str>) -> Result<Option<Vec<String>>> {
        let name = calendar
            .filter(|name| !name.is_empty())
            .or(self.config.default_calendar.as_deref());

        match name {
            Some(name) => Ok(Some(vec![self.find_calendar(name)?.title])),
            None => Ok(None),
        }
    }

    fn find_calendar(&self, name: &str) -> Result<CalendarInfo> {
        self.store
            .calendars()?
            .into_iter()
            .find(|calendar| calendar.title == name)
            .ok_or_else(|| CalendarError::CalendarNotFound(name.to_string()))
    }

    fn find_event(&self, calendar: &str, title: &str) -> Result<Option<CalendarEvent>> {
        let calendar = self.find_calendar(calendar)?;
        let calendars = Some(vec![calendar.title]);

        for window in lookup_windows(self.now(), self.config.lookup_horizon_years) {
            let query = EventQuery::new(window).in_calendars(calendars.clone());
            let mut events = self.store.events(&query)?;
            sort_events(&mut events);

            if let Some(event) = events.into_iter().find(|event| event.title == title) {
                return Ok(Some(event));
            }
        }

        Ok(None)
    }
}

fn sort_events(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.title.cmp(&b.title))
    });
}
