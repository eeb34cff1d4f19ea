//! Structured extraction of a calendar event from a chat message and
//! mapping of the result onto the calendar API's event body.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::llm::StructuredSchema;
use super::prompt::{Prompt, render};
use crate::google::gcal::{Attendee, EventTime, NewEvent};
use crate::openai::{ArrayProperty, ItemsType, Parameters, Property};

pub const DEFAULT_EVENT_TITLE: &str = "New Event";

#[derive(Serialize)]
pub struct EventProps {
    pub summary: Property,
    pub start_time: Property,
    pub end_time: Property,
    pub description: Property,
    pub location: Property,
    pub attendees: ArrayProperty,
}

fn string_property(description: &str) -> Property {
    Property {
        r#type: String::from("string"),
        description: description.to_string(),
    }
}

/// Fields the model is asked to fill in. Nothing here is validated;
/// missing values fall back to defaults when mapped.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExtractedEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
}

impl ExtractedEvent {
    pub fn into_new_event(self, time_zone: &str) -> NewEvent {
        let time = |date_time: Option<String>| EventTime {
            date_time: date_time.unwrap_or_default(),
            time_zone: time_zone.to_string(),
        };
        let summary = self
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string());

        NewEvent {
            summary,
            description: self.description.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            start: time(self.start_time),
            end: time(self.end_time),
            attendees: self
                .attendees
                .unwrap_or_default()
                .iter()
                .map(|email| Attendee::new(email))
                .collect(),
        }
    }
}

pub fn event_parameters() -> Parameters<EventProps> {
    Parameters {
        r#type: String::from("object"),
        properties: EventProps {
            summary: string_property("Short title of the event"),
            start_time: string_property("Start as an ISO 8601 local date and time"),
            end_time: string_property("End as an ISO 8601 local date and time"),
            description: string_property("Extra details about the event, or an empty string"),
            location: string_property("Where the event takes place, or an empty string"),
            attendees: ArrayProperty {
                r#type: String::from("array"),
                description: String::from("Email addresses of the people to invite"),
                items: ItemsType {
                    r#type: String::from("string"),
                },
            },
        },
        required: vec![
            String::from("summary"),
            String::from("start_time"),
            String::from("end_time"),
            String::from("description"),
            String::from("location"),
            String::from("attendees"),
        ],
        additional_properties: false,
    }
}

/// The extraction contract for a calendar event, with the current
/// time so relative dates can be resolved.
pub fn event_schema(now: DateTime<Utc>, time_zone: &str) -> Result<StructuredSchema> {
    let instructions = render(
        Prompt::EventExtraction,
        &json!({"now": now.to_rfc3339(), "time_zone": time_zone}),
    )?;
    Ok(StructuredSchema {
        name: String::from("calendar_event"),
        instructions,
        schema: serde_json::to_value(event_parameters())?,
    })
}
