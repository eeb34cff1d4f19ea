//! Routes one chat message either to event creation or to a general
//! answer from the language model.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::json;

use super::extract::{ExtractedEvent, event_schema};
use super::intent::{Intent, IntentClassifier, KeywordClassifier};
use super::llm::{LanguageModel, extract_as};
use super::prompt::{Prompt, render};
use crate::calendar::{CalendarAgent, CalendarSnapshot};
use crate::core::config::DEFAULT_TIME_ZONE;
use crate::google::gcal::{EventRecord, NewEvent};

const START_DISPLAY_FORMAT: &str = "%A, %B %d, %Y at %I:%M %p";

pub struct AssistantRouter {
    classifier: Box<dyn IntentClassifier>,
    model: Arc<dyn LanguageModel>,
    time_zone: String,
}

impl AssistantRouter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            classifier: Box::new(KeywordClassifier::default()),
            model,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
        }
    }

    pub fn classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn time_zone(mut self, time_zone: &str) -> Self {
        self.time_zone = time_zone.to_string();
        self
    }

    /// Produce the assistant reply for `message`. Never fails: model
    /// and calendar errors are turned into reply text.
    pub async fn respond(
        &self,
        agent: &CalendarAgent,
        message: &str,
        snapshot: &CalendarSnapshot,
    ) -> String {
        if self.classifier.classify(message) == Intent::CreateEvent {
            match self.extract_event(message).await {
                Ok(extracted) => return self.create_event(agent, extracted).await,
                Err(e) => {
                    tracing::warn!("Event extraction failed, answering as a general query: {}", e)
                }
            }
        }

        self.general_query(message, snapshot).await
    }

    async fn extract_event(&self, message: &str) -> Result<ExtractedEvent> {
        let schema = event_schema(Utc::now(), &self.time_zone)?;
        extract_as(self.model.as_ref(), &schema, message).await
    }

    async fn create_event(&self, agent: &CalendarAgent, extracted: ExtractedEvent) -> String {
        let event = extracted.into_new_event(&self.time_zone);
        match agent.add_event(&event, None).await {
            Ok(created) => event_created_reply(&event, &created),
            Err(e) => format!("❌ **Failed to create event:** {}", e),
        }
    }

    async fn general_query(&self, message: &str, snapshot: &CalendarSnapshot) -> String {
        let system_prompt = match calendar_system_prompt(snapshot) {
            Ok(prompt) => prompt,
            Err(e) => return format!("Error building the calendar prompt: {}", e),
        };
        match self.model.chat(&system_prompt, message).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => format!("Error getting response from the language model: {}", e),
        }
    }
}

pub fn calendar_system_prompt(snapshot: &CalendarSnapshot) -> Result<String> {
    let events = serde_json::to_string_pretty(&snapshot.upcoming_events)?;
    let calendars = snapshot.available_calendars.join(", ");
    render(
        Prompt::CalendarAssistant,
        &json!({"events": events, "calendars": calendars}),
    )
}

/// Human readable start time. Falls back to the raw value when it
/// isn't a date-time we recognize.
pub fn format_start(start: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return dt.format(START_DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(start, "%Y-%m-%dT%H:%M:%S") {
        return dt.format(START_DISPLAY_FORMAT).to_string();
    }
    start.to_string()
}

fn event_created_reply(event: &NewEvent, created: &EventRecord) -> String {
    let data = json!({
        "summary": event.summary,
        "start": format_start(&event.start.date_time),
        "location": event.location,
        "description": event.description,
        "link": created.html_link.clone().unwrap_or_default(),
    });
    render(Prompt::EventCreated, &data).unwrap_or_else(|e| {
        tracing::error!("Failed to render event confirmation: {}", e);
        format!("✅ **Event created successfully!** {}", event.summary)
    })
}
