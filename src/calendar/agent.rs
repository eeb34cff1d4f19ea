//! Stateful facade over the calendar client. Holds the calendar
//! roster and which calendar operations default to.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::models::{CalendarSnapshot, EventSummary};
pub use crate::google::gcal::DEFAULT_DAYS_AHEAD;
use crate::google::gcal::{
    CalendarApi, CalendarError, CalendarResult, CalendarSummary, EventRecord, FreeBusyItem,
    FreeBusyResult, NewEvent, Sentinel,
};

pub const PRIMARY_CALENDAR: &str = "primary";
pub const DEFAULT_MAX_CALENDARS: u32 = 50;
pub const DEFAULT_MAX_EVENTS: u32 = 20;
pub const SNAPSHOT_MAX_EVENTS: u32 = 5;

pub struct CalendarAgent {
    client: Arc<dyn CalendarApi>,
    calendars: Vec<CalendarSummary>,
    current_calendar_id: String,
    last_refreshed: Option<DateTime<Utc>>,
}

impl CalendarAgent {
    /// Create an agent and load the calendar roster. A failed load is
    /// logged and leaves the roster empty.
    pub async fn new(client: Arc<dyn CalendarApi>) -> Self {
        let mut agent = Self::without_roster(client);
        if let Err(e) = agent.refresh_calendars(DEFAULT_MAX_CALENDARS).await {
            tracing::warn!("Failed to load calendar list: {}", e);
        }
        agent
    }

    /// Create an agent without fetching the roster.
    pub fn without_roster(client: Arc<dyn CalendarApi>) -> Self {
        Self {
            client,
            calendars: Vec::new(),
            current_calendar_id: PRIMARY_CALENDAR.to_string(),
            last_refreshed: None,
        }
    }

    pub fn calendars(&self) -> &[CalendarSummary] {
        &self.calendars
    }

    pub fn current_calendar_id(&self) -> &str {
        &self.current_calendar_id
    }

    pub fn set_current_calendar(&mut self, calendar_id: &str) {
        self.current_calendar_id = calendar_id.to_string();
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    fn resolve<'a>(&'a self, calendar_id: Option<&'a str>) -> &'a str {
        calendar_id
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.current_calendar_id)
    }

    /// Replace the cached roster. On failure the previous roster is
    /// kept and the refresh marker is not moved.
    pub async fn refresh_calendars(&mut self, max_results: u32) -> CalendarResult<&[CalendarSummary]> {
        let calendars = self.client.list_calendars(max_results).await?;
        self.calendars = calendars;
        self.last_refreshed = Some(Utc::now());
        Ok(&self.calendars)
    }

    pub async fn list_events(
        &self,
        calendar_id: Option<&str>,
        max_results: u32,
        days_ahead: i64,
    ) -> CalendarResult<Vec<EventSummary>> {
        let calendar_id = self.resolve(calendar_id);
        let time_min = Utc::now();
        let time_max = Duration::try_days(days_ahead)
            .and_then(|ahead| time_min.checked_add_signed(ahead))
            .ok_or_else(|| {
                CalendarError::InvalidWindow(format!("{} days ahead is out of range", days_ahead))
            })?;

        let events = self
            .client
            .list_events(calendar_id, max_results, Some(time_min), Some(time_max))
            .await?;

        Ok(events.into_iter().map(EventSummary::from).collect())
    }

    pub async fn create_calendar(
        &mut self,
        summary: &str,
        description: &str,
    ) -> CalendarResult<CalendarSummary> {
        let created = self.client.create_calendar(summary, description).await?;
        if let Err(e) = self.refresh_calendars(DEFAULT_MAX_CALENDARS).await {
            tracing::warn!("Created calendar {} but refreshing the roster failed: {}", created.id, e);
        }
        Ok(created)
    }

    pub async fn add_event(
        &self,
        details: &NewEvent,
        calendar_id: Option<&str>,
    ) -> CalendarResult<EventRecord> {
        self.client
            .create_event(self.resolve(calendar_id), details)
            .await
    }

    pub async fn modify_event(
        &self,
        event_id: &str,
        details: &NewEvent,
        calendar_id: Option<&str>,
    ) -> CalendarResult<EventRecord> {
        self.client
            .update_event(self.resolve(calendar_id), event_id, details)
            .await
    }

    pub async fn remove_event(&self, event_id: &str, calendar_id: Option<&str>) -> CalendarResult<()> {
        self.client
            .delete_event(self.resolve(calendar_id), event_id)
            .await
    }

    /// Free/busy across calendars, defaulting to the current calendar
    /// when none are given.
    pub async fn check_availability(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        calendar_ids: Option<&[String]>,
    ) -> CalendarResult<FreeBusyResult> {
        let items: Vec<FreeBusyItem> = match calendar_ids {
            Some(ids) if !ids.is_empty() => ids
                .iter()
                .map(|id| FreeBusyItem { id: id.clone() })
                .collect(),
            _ => vec![FreeBusyItem {
                id: self.current_calendar_id.clone(),
            }],
        };
        self.client.query_free_busy(time_min, time_max, &items).await
    }

    /// Exact match on the calendar name as cached in the roster.
    pub fn find_calendar_by_name(&self, name: &str) -> Option<&CalendarSummary> {
        self.calendars.iter().find(|cal| cal.summary == name)
    }

    pub async fn snapshot(&self) -> CalendarSnapshot {
        let upcoming_events = self
            .list_events(None, SNAPSHOT_MAX_EVENTS, DEFAULT_DAYS_AHEAD)
            .await
            .or_sentinel("list_events");
        let available_calendars = self.calendars.iter().map(|c| c.summary.clone()).collect();
        CalendarSnapshot {
            upcoming_events,
            available_calendars,
        }
    }
}
