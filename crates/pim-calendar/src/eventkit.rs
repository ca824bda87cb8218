//! EventKit-backed calendar store (macOS)

use std::ptr;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;
use block2::RcBlock;
use objc2::rc::{Retained, autoreleasepool};
use objc2::runtime::{AnyObject, Bool};
use objc2::{class, msg_send, msg_send_id, sel};
use pim_core::DateWindow;
use pim_core::foundation::{
    nsarray_from, nsarray_items, nsdate_from_local, nsdate_to_local, nserror_message,
    nsstring_to_optional, nsstring_to_string, nsurl_from_string, nsurl_to_string,
    string_to_nsstring,
};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::error::{CalendarError, Result};
use crate::models::{CalendarEvent, CalendarInfo, CalendarKind, EventQuery, NewEvent};
use crate::store::CalendarStore;

#[link(name = "EventKit", kind = "framework")]
unsafe extern "C" {}

/// `EKEntityTypeEvent`
const ENTITY_TYPE_EVENT: usize = 0;
/// `EKSpanThisEvent`
const SPAN_THIS_EVENT: isize = 0;

// EKAuthorizationStatus
const STATUS_RESTRICTED: isize = 1;
const STATUS_DENIED: isize = 2;
const STATUS_FULL_ACCESS: isize = 3;

/// The system calendar database
pub struct EventKitStore {
    store: Retained<AnyObject>,
}

impl EventKitStore {
    pub fn new() -> Result<Self> {
        let store: Option<Retained<AnyObject>> = unsafe { msg_send_id![class!(EKEventStore), new] };
        store
            .map(|store| Self { store })
            .ok_or_else(|| CalendarError::Store("Failed to open the calendar store".to_string()))
    }

    fn raw_calendars(&self) -> Vec<*mut AnyObject> {
        let calendars: *mut AnyObject =
            unsafe { msg_send![&*self.store, calendarsForEntityType: ENTITY_TYPE_EVENT] };
        nsarray_items(calendars)
    }

    fn raw_calendar(&self, title: &str) -> Option<*mut AnyObject> {
        self.raw_calendars()
            .into_iter()
            .find(|calendar| calendar_title(*calendar) == title)
    }

    /// Native events overlapping `window`; nil `calendars` means all.
    fn raw_events(&self, window: &DateWindow, calendars: *mut AnyObject) -> Result<Vec<*mut AnyObject>> {
        let start = nsdate_from_local(&window.start);
        let end = nsdate_from_local(&window.end);
        let predicate: *mut AnyObject = unsafe {
            msg_send![
                &*self.store,
                predicateForEventsWithStartDate: start,
                endDate: end,
                calendars: calendars
            ]
        };
        if predicate.is_null() {
            return Err(CalendarError::Store("Failed to build the event query".to_string()));
        }

        let events: *mut AnyObject =
            unsafe { msg_send![&*self.store, eventsMatchingPredicate: predicate] };
        Ok(nsarray_items(events))
    }

    /// The occurrence `event` was read from.
    ///
    /// Occurrences of a recurring event share one identifier, so the match
    /// is on identifier and start date.
    fn raw_occurrence(&self, event: &CalendarEvent, identifier: &str) -> Result<Option<*mut AnyObject>> {
        let calendar = self
            .raw_calendar(&event.calendar)
            .ok_or_else(|| CalendarError::CalendarNotFound(event.calendar.clone()))?;
        let nudged = event
            .start_date
            .checked_add_signed(Duration::seconds(1))
            .unwrap_or(event.start_date);
        let end = event.end_date.max(nudged);
        let window = DateWindow::new(event.start_date, end);

        let occurrence = self
            .raw_events(&window, nsarray_from(&[calendar]))?
            .into_iter()
            .find(|native| {
                let id = nsstring_to_optional(unsafe { msg_send![*native, eventIdentifier] });
                let start = nsdate_to_local(unsafe { msg_send![*native, startDate] });
                id.as_deref() == Some(identifier) && start == Some(event.start_date)
            });
        Ok(occurrence)
    }
}

#[async_trait(?Send)]
impl CalendarStore for EventKitStore {
    fn name(&self) -> &str {
        "eventkit"
    }

    async fn request_access(&self) -> Result<()> {
        let status: isize = unsafe {
            msg_send![class!(EKEventStore), authorizationStatusForEntityType: ENTITY_TYPE_EVENT]
        };
        match status {
            STATUS_FULL_ACCESS => return Ok(()),
            STATUS_RESTRICTED | STATUS_DENIED => return Err(CalendarError::AccessDenied),
            _ => {}
        }

        debug!("Requesting calendar access (status {})", status);

        let (tx, rx) = oneshot::channel::<bool>();
        let tx = Mutex::new(Some(tx));
        let completion = RcBlock::new(move |granted: Bool, _error: *mut AnyObject| {
            if let Some(tx) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                let _ = tx.send(granted.as_bool());
            }
        });

        // macOS 14 split calendar access into full and write-only grants.
        let full_access: Bool = unsafe {
            msg_send![
                &*self.store,
                respondsToSelector: sel!(requestFullAccessToEventsWithCompletion:)
            ]
        };
        if full_access.as_bool() {
            let _: () = unsafe {
                msg_send![&*self.store, requestFullAccessToEventsWithCompletion: &*completion]
            };
        } else {
            let _: () = unsafe {
                msg_send![
                    &*self.store,
                    requestAccessToEntityType: ENTITY_TYPE_EVENT,
                    completion: &*completion
                ]
            };
        }

        match rx.await {
            Ok(true) => Ok(()),
            _ => Err(CalendarError::AccessDenied),
        }
    }

    fn calendars(&self) -> Result<Vec<CalendarInfo>> {
        autoreleasepool(|_| Ok(self.raw_calendars().into_iter().map(calendar_info).collect()))
    }

    fn events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>> {
        autoreleasepool(|_| {
            let calendars = match query.select_calendars(&self.raw_calendars(), calendar_title) {
                None => ptr::null_mut(),
                // A nil calendar list means "all calendars" to EventKit.
                Some(selected) if selected.is_empty() => return Ok(Vec::new()),
                Some(selected) => nsarray_from(&selected),
            };

            let events = self.raw_events(&query.window, calendars)?;
            Ok(events.into_iter().filter_map(event_record).collect())
        })
    }

    fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
        autoreleasepool(|_| {
            let calendar = self
                .raw_calendar(&event.calendar)
                .ok_or_else(|| CalendarError::CalendarNotFound(event.calendar.clone()))?;

            let native: *mut AnyObject =
                unsafe { msg_send![class!(EKEvent), eventWithEventStore: &*self.store] };
            if native.is_null() {
                return Err(CalendarError::Store("Failed to create the event".to_string()));
            }

            unsafe {
                let _: () = msg_send![native, setTitle: string_to_nsstring(&event.title)];
                let _: () = msg_send![native, setStartDate: nsdate_from_local(&event.start)];
                let _: () = msg_send![native, setEndDate: nsdate_from_local(&event.end)];
                let _: () = msg_send![native, setAllDay: Bool::new(event.all_day)];
                let _: () = msg_send![native, setCalendar: calendar];
                if let Some(notes) = &event.notes {
                    let _: () = msg_send![native, setNotes: string_to_nsstring(notes)];
                }
                if let Some(location) = &event.location {
                    let _: () = msg_send![native, setLocation: string_to_nsstring(location)];
                }
                if let Some(url) = &event.url {
                    let _: () = msg_send![native, setURL: nsurl_from_string(url)];
                }
            }

            let mut error: *mut AnyObject = ptr::null_mut();
            let saved: Bool = unsafe {
                msg_send![
                    &*self.store,
                    saveEvent: native,
                    span: SPAN_THIS_EVENT,
                    error: &mut error
                ]
            };
            if !saved.as_bool() {
                let message = nserror_message(error, "Failed to save the event");
                error!("EventKit save failed: {}", message);
                return Err(CalendarError::Store(message));
            }

            event_record(native)
                .ok_or_else(|| CalendarError::Store("Saved event could not be read back".to_string()))
        })
    }

    fn remove_event(&self, event: &CalendarEvent) -> Result<()> {
        let identifier = event
            .identifier
            .as_deref()
            .ok_or_else(|| CalendarError::Store("The event has no identifier".to_string()))?;

        autoreleasepool(|_| {
            let native = self
                .raw_occurrence(event, identifier)?
                .ok_or_else(|| CalendarError::EventNotFound(event.title.clone()))?;

            let mut error: *mut AnyObject = ptr::null_mut();
            let removed: Bool = unsafe {
                msg_send![
                    &*self.store,
                    removeEvent: native,
                    span: SPAN_THIS_EVENT,
                    error: &mut error
                ]
            };
            if !removed.as_bool() {
                let message = nserror_message(error, "Failed to delete the event");
                error!("EventKit remove failed: {}", message);
                return Err(CalendarError::Store(message));
            }
            Ok(())
        })
    }
}

fn calendar_title(calendar: *mut AnyObject) -> String {
    nsstring_to_string(unsafe { msg_send![calendar, title] }).unwrap_or_default()
}

fn calendar_info(calendar: *mut AnyObject) -> CalendarInfo {
    // `type` is a Rust keyword, so read it through key-value coding.
    let kind: *mut AnyObject =
        unsafe { msg_send![calendar, valueForKey: string_to_nsstring("type")] };
    let kind: isize = if kind.is_null() {
        -1
    } else {
        unsafe { msg_send![kind, integerValue] }
    };

    let source: *mut AnyObject = unsafe { msg_send![calendar, source] };
    let source = if source.is_null() {
        String::new()
    } else {
        nsstring_to_string(unsafe { msg_send![source, title] }).unwrap_or_default()
    };
    let writable: Bool = unsafe { msg_send![calendar, allowsContentModifications] };

    CalendarInfo {
        title: calendar_title(calendar),
        kind: CalendarKind::from_raw(kind),
        source,
        writable: writable.as_bool(),
    }
}

fn event_record(event: *mut AnyObject) -> Option<CalendarEvent> {
    let start_date = nsdate_to_local(unsafe { msg_send![event, startDate] })?;
    let end_date = nsdate_to_local(unsafe { msg_send![event, endDate] }).unwrap_or(start_date);

    let calendar: *mut AnyObject = unsafe { msg_send![event, calendar] };
    let calendar = if calendar.is_null() {
        String::new()
    } else {
        calendar_title(calendar)
    };
    let all_day: Bool = unsafe { msg_send![event, isAllDay] };

    Some(CalendarEvent {
        identifier: nsstring_to_optional(unsafe { msg_send![event, eventIdentifier] }),
        title: nsstring_to_string(unsafe { msg_send![event, title] }).unwrap_or_default(),
        start_date,
        end_date,
        notes: nsstring_to_optional(unsafe { msg_send![event, notes] }),
        location: nsstring_to_optional(unsafe { msg_send![event, location] }),
        calendar,
        all_day: all_day.as_bool(),
        url: nsurl_to_string(unsafe { msg_send![event, URL] }),
    })
}
