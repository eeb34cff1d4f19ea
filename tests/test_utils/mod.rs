//! Test utilities for integration tests
use std::sync::Arc;

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};

use calendar_assistant::ai::chat::Conversation;
use calendar_assistant::ai::llm::OpenAIModel;
use calendar_assistant::ai::router::AssistantRouter;
use calendar_assistant::calendar::CalendarAgent;
use calendar_assistant::google::gcal::GoogleCalendarClient;
use calendar_assistant::google::oauth::TokenProvider;

pub const TEST_TOKEN: &str = "test-token";

/// Body of an OpenAI compatible chat completion with a single choice.
pub fn completion_body(content: &str) -> String {
    json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]})
        .to_string()
}

/// Mock the calendar list with a single primary calendar.
pub async fn mock_calendar_list(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/calendar/v3/users/me/calendarList")
        .match_query(Matcher::Any)
        .match_header("authorization", format!("Bearer {}", TEST_TOKEN).as_str())
        .with_status(200)
        .with_body(
            json!({"items": [
                {"id": "me@example.com", "summary": "Personal", "timeZone": "America/Los_Angeles"}
            ]})
            .to_string(),
        )
        .create_async()
        .await
}

/// Mock upcoming events on the primary calendar.
pub async fn mock_upcoming_events(server: &mut ServerGuard, items: Value) -> Mock {
    server
        .mock("GET", "/calendar/v3/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"items": items}).to_string())
        .create_async()
        .await
}

/// Mock the structured extraction call to the model.
pub async fn mock_extraction(
    server: &mut ServerGuard,
    status: usize,
    extracted: Value,
    hits: usize,
) -> Mock {
    server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "temperature": 0.3,
            "response_format": {"type": "json_schema", "json_schema": {"name": "calendar_event"}}
        })))
        .with_status(status)
        .with_body(completion_body(&extracted.to_string()))
        .expect(hits)
        .create_async()
        .await
}

/// Mock the free-form chat call to the model.
pub async fn mock_chat(server: &mut ServerGuard, reply: &str, hits: usize) -> Mock {
    server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({"temperature": 0.7})))
        .with_status(200)
        .with_body(completion_body(reply))
        .expect(hits)
        .create_async()
        .await
}

/// An agent talking to a mock Google API with a fixed access token.
pub async fn test_agent(google_url: &str) -> CalendarAgent {
    let client = GoogleCalendarClient::new(google_url, TokenProvider::fixed(TEST_TOKEN));
    CalendarAgent::new(Arc::new(client)).await
}

/// A conversation without the greeting using a model at `llm_url`.
pub fn test_conversation(llm_url: &str) -> Conversation {
    let model = Arc::new(OpenAIModel::new(llm_url, "test-key", "gpt-4-turbo"));
    let router = AssistantRouter::new(model).time_zone("America/Los_Angeles");
    Conversation::builder(router).greeting(false).build()
}
