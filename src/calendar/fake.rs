//! In-memory `CalendarApi` that records every call, for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::google::gcal::{
    CalendarApi, CalendarError, CalendarResult, CalendarSummary, EventRecord, FreeBusyCalendar,
    FreeBusyItem, FreeBusyResult, NewEvent, TimePoint,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCalendars(u32),
    ListEvents {
        calendar_id: String,
        max_results: u32,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    },
    CreateCalendar(String, String),
    CreateEvent(String, NewEvent),
    UpdateEvent(String, String, NewEvent),
    DeleteEvent(String, String),
    FreeBusy(Vec<String>),
}

impl Call {
    /// Calendars the call was addressed to.
    pub fn calendar_ids(&self) -> Vec<String> {
        match self {
            Call::ListEvents { calendar_id, .. }
            | Call::CreateEvent(calendar_id, _)
            | Call::UpdateEvent(calendar_id, _, _)
            | Call::DeleteEvent(calendar_id, _) => vec![calendar_id.clone()],
            Call::FreeBusy(ids) => ids.clone(),
            Call::ListCalendars(_) | Call::CreateCalendar(_, _) => vec![],
        }
    }
}

pub fn calendar(id: &str, summary: &str) -> CalendarSummary {
    CalendarSummary {
        id: id.to_string(),
        summary: summary.to_string(),
        description: None,
        time_zone: String::from("UTC"),
    }
}

pub fn event(id: &str, summary: Option<&str>) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        summary: summary.map(|s| s.to_string()),
        start: Some(TimePoint::Instant {
            date_time: String::from("2025-01-02T09:00:00Z"),
            time_zone: None,
        }),
        end: Some(TimePoint::Instant {
            date_time: String::from("2025-01-02T09:15:00Z"),
            time_zone: None,
        }),
        description: None,
        location: None,
        attendees: vec![],
        status: Some(String::from("confirmed")),
        html_link: None,
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    calls: Mutex<Vec<Call>>,
    calendars: Mutex<Vec<CalendarSummary>>,
    events: Vec<EventRecord>,
    failing: AtomicBool,
}

impl FakeCalendar {
    pub fn with_calendars(calendars: Vec<CalendarSummary>) -> Self {
        Self {
            calendars: Mutex::new(calendars),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let fake = Self::default();
        fake.set_failing(true);
        fake
    }

    pub fn with_events(mut self, events: Vec<EventRecord>) -> Self {
        self.events = events;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> CalendarResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CalendarError::Status {
                status: 503,
                body: String::from("backend unavailable"),
            });
        }
        Ok(())
    }
}

fn created_record(id: &str, event: &NewEvent) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        summary: Some(event.summary.clone()),
        start: Some(TimePoint::Instant {
            date_time: event.start.date_time.clone(),
            time_zone: Some(event.start.time_zone.clone()),
        }),
        end: Some(TimePoint::Instant {
            date_time: event.end.date_time.clone(),
            time_zone: Some(event.end.time_zone.clone()),
        }),
        description: Some(event.description.clone()),
        location: Some(event.location.clone()),
        attendees: event.attendees.clone(),
        status: Some(String::from("confirmed")),
        html_link: Some(format!("https://www.google.com/calendar/event?eid={}", id)),
    }
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn list_calendars(&self, max_results: u32) -> CalendarResult<Vec<CalendarSummary>> {
        self.record(Call::ListCalendars(max_results))?;
        Ok(self.calendars.lock().unwrap().clone())
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        max_results: u32,
        time_min: Option<DateTime<Utc>>,
        time_max: Option<DateTime<Utc>>,
    ) -> CalendarResult<Vec<EventRecord>> {
        let now = Utc::now();
        self.record(Call::ListEvents {
            calendar_id: calendar_id.to_string(),
            max_results,
            time_min: time_min.unwrap_or(now),
            time_max: time_max.unwrap_or(now),
        })?;
        Ok(self
            .events
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn create_calendar(
        &self,
        summary: &str,
        description: &str,
    ) -> CalendarResult<CalendarSummary> {
        self.record(Call::CreateCalendar(
            summary.to_string(),
            description.to_string(),
        ))?;
        let created = CalendarSummary {
            id: format!("{}@group.calendar.google.com", summary.to_lowercase()),
            summary: summary.to_string(),
            description: Some(description.to_string()),
            time_zone: String::from("UTC"),
        };
        self.calendars.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn create_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> CalendarResult<EventRecord> {
        self.record(Call::CreateEvent(calendar_id.to_string(), event.clone()))?;
        Ok(created_record("created1", event))
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &NewEvent,
    ) -> CalendarResult<EventRecord> {
        self.record(Call::UpdateEvent(
            calendar_id.to_string(),
            event_id.to_string(),
            event.clone(),
        ))?;
        Ok(created_record(event_id, event))
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalendarResult<()> {
        self.record(Call::DeleteEvent(
            calendar_id.to_string(),
            event_id.to_string(),
        ))
    }

    async fn query_free_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        items: &[FreeBusyItem],
    ) -> CalendarResult<FreeBusyResult> {
        self.record(Call::FreeBusy(items.iter().map(|i| i.id.clone()).collect()))?;
        Ok(FreeBusyResult {
            time_min: time_min.to_rfc3339(),
            time_max: time_max.to_rfc3339(),
            calendars: items
                .iter()
                .map(|i| (i.id.clone(), FreeBusyCalendar::default()))
                .collect(),
        })
    }
}
