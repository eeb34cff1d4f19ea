//! Google Calendar v3 REST client covering calendar list, event CRUD
//! and free/busy queries.
//!
//! Every call returns a `CalendarResult` so callers can tell an empty
//! calendar apart from a failed request. Call sites that only want a
//! best-effort value use `Sentinel::or_sentinel`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::oauth::TokenProvider;

pub const DEFAULT_DAYS_AHEAD: i64 = 30;
// Zone used for calendars created by the assistant and free/busy queries
pub const UTC_TIME_ZONE: &str = "UTC";

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Calendar API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from the calendar API: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid time window: {0}")]
    InvalidWindow(String),
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Collapse a failed calendar call into an empty value after logging
/// it: empty list, `None` or `false` depending on the type.
pub trait Sentinel<T> {
    fn or_sentinel(self, operation: &str) -> T;
}

impl<T: Default> Sentinel<T> for CalendarResult<T> {
    fn or_sentinel(self, operation: &str) -> T {
        self.unwrap_or_else(|e| {
            tracing::error!("Calendar operation {} failed: {}", operation, e);
            T::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub time_zone: String,
}

/// Start or end of an event. Timed events carry `dateTime`, all-day
/// events only carry `date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TimePoint {
    Instant {
        #[serde(rename = "dateTime")]
        date_time: String,
        #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    AllDay {
        date: String,
    },
}

impl TimePoint {
    pub fn as_str(&self) -> &str {
        match self {
            TimePoint::Instant { date_time, .. } => date_time,
            TimePoint::AllDay { date } => date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            display_name: None,
            response_status: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<TimePoint>,
    #[serde(default)]
    pub end: Option<TimePoint>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

/// Request body for inserting or replacing an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: EventTime,
    pub end: EventTime,
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreeBusyItem {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusyInterval {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreeBusyError {
    pub domain: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FreeBusyError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyResult {
    #[serde(default)]
    pub time_min: String,
    #[serde(default)]
    pub time_max: String,
    #[serde(default)]
    pub calendars: BTreeMap<String, FreeBusyCalendar>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest<'a> {
    time_min: String,
    time_max: String,
    time_zone: &'a str,
    items: &'a [FreeBusyItem],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCalendar<'a> {
    summary: &'a str,
    description: &'a str,
    time_zone: &'a str,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    // Google omits `items` on an empty page
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Format a timestamp the way the API expects query bounds,
/// e.g. `2025-01-28T10:00:00Z`.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Remote calendar operations. Each performs a single request.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_calendars(&self, max_results: u32) -> CalendarResult<Vec<CalendarSummary>>;

    /// Lists single instances ordered by start time. Omitted bounds
    /// default to the next 30 days.
    async fn list_events(
        &self,
        calendar_id: &str,
        max_results: u32,
        time_min: Option<DateTime<Utc>>,
        time_max: Option<DateTime<Utc>>,
    ) -> CalendarResult<Vec<EventRecord>>;

    async fn create_calendar(
        &self,
        summary: &str,
        description: &str,
    ) -> CalendarResult<CalendarSummary>;

    async fn create_event(&self, calendar_id: &str, event: &NewEvent)
    -> CalendarResult<EventRecord>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &NewEvent,
    ) -> CalendarResult<EventRecord>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalendarResult<()>;

    async fn query_free_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        items: &[FreeBusyItem],
    ) -> CalendarResult<FreeBusyResult>;
}

pub struct GoogleCalendarClient {
    http: Client,
    api_url: String,
    tokens: TokenProvider,
}

impl GoogleCalendarClient {
    pub fn new(api_url: &str, tokens: TokenProvider) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn calendar_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendar/v3/calendars/{}",
            self.api_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/events", self.calendar_url(calendar_id))
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }

    async fn request(&self, method: Method, url: &str) -> CalendarResult<RequestBuilder> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| CalendarError::Auth(e.to_string()))?;
        tracing::debug!("{} {}", method, url);
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
    }

    async fn send(req: RequestBuilder) -> CalendarResult<String> {
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(CalendarError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> CalendarResult<T> {
        let text = Self::send(req).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_calendars(&self, max_results: u32) -> CalendarResult<Vec<CalendarSummary>> {
        let url = format!("{}/calendar/v3/users/me/calendarList", self.api_url);
        let req = self
            .request(Method::GET, &url)
            .await?
            .query(&[("maxResults", max_results.to_string())]);
        let resp: ListResponse<CalendarSummary> = Self::send_json(req).await?;
        Ok(resp.items)
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        max_results: u32,
        time_min: Option<DateTime<Utc>>,
        time_max: Option<DateTime<Utc>>,
    ) -> CalendarResult<Vec<EventRecord>> {
        let now = Utc::now();
        let time_min = time_min.unwrap_or(now);
        let time_max = time_max.unwrap_or(now + ChronoDuration::days(DEFAULT_DAYS_AHEAD));

        let req = self
            .request(Method::GET, &self.events_url(calendar_id))
            .await?
            .query(&[
                ("timeMin", format_time(time_min)),
                ("timeMax", format_time(time_max)),
                ("maxResults", max_results.to_string()),
                ("singleEvents", String::from("true")),
                ("orderBy", String::from("startTime")),
            ]);
        let resp: ListResponse<EventRecord> = Self::send_json(req).await?;
        Ok(resp.items)
    }

    async fn create_calendar(
        &self,
        summary: &str,
        description: &str,
    ) -> CalendarResult<CalendarSummary> {
        let url = format!("{}/calendar/v3/calendars", self.api_url);
        let body = NewCalendar {
            summary,
            description,
            time_zone: UTC_TIME_ZONE,
        };
        let req = self.request(Method::POST, &url).await?.json(&body);
        Self::send_json(req).await
    }

    async fn create_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> CalendarResult<EventRecord> {
        let req = self
            .request(Method::POST, &self.events_url(calendar_id))
            .await?
            .json(event);
        Self::send_json(req).await
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &NewEvent,
    ) -> CalendarResult<EventRecord> {
        let req = self
            .request(Method::PUT, &self.event_url(calendar_id, event_id))
            .await?
            .json(event);
        Self::send_json(req).await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalendarResult<()> {
        let req = self
            .request(Method::DELETE, &self.event_url(calendar_id, event_id))
            .await?;
        Self::send(req).await?;
        Ok(())
    }

    async fn query_free_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        items: &[FreeBusyItem],
    ) -> CalendarResult<FreeBusyResult> {
        let url = format!("{}/calendar/v3/freeBusy", self.api_url);
        let body = FreeBusyRequest {
            time_min: format_time(time_min),
            time_max: format_time(time_max),
            time_zone: UTC_TIME_ZONE,
            items,
        };
        let req = self.request(Method::POST, &url).await?.json(&body);
        Self::send_json(req).await
    }
}
