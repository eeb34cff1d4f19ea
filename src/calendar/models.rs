//! Display-friendly views of calendar state handed to the language
//! model and printed by the CLI.
use serde::{Deserialize, Serialize};

use crate::google::gcal::{EventRecord, TimePoint};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventSummary {
    pub id: String,
    pub summary: String,
    pub start: String,
    pub end: String,
    pub status: Option<String>,
}

fn time_point_str(tp: &Option<TimePoint>) -> String {
    tp.as_ref().map(|t| t.as_str().to_string()).unwrap_or_default()
}

impl From<EventRecord> for EventSummary {
    fn from(event: EventRecord) -> Self {
        Self {
            start: time_point_str(&event.start),
            end: time_point_str(&event.end),
            summary: event.summary.unwrap_or_else(|| "No title".to_string()),
            id: event.id,
            status: event.status,
        }
    }
}

/// Point-in-time read of the calendar passed to the model as context.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CalendarSnapshot {
    pub upcoming_events: Vec<EventSummary>,
    pub available_calendars: Vec<String>,
}
