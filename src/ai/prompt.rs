//! Reusable prompts using Handlebars for templating. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers. This is ideal since output
//! from LLMs should be considered untrusted and Handlebars forces you
//! to add only what you need.

use std::fmt;

use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub enum Prompt {
    CalendarAssistant,
    EventExtraction,
    EventCreated,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

const CALENDAR_ASSISTANT_PROMPT: &str = r"You are a helpful assistant that helps manage Google Calendar.
You can view, create, and modify calendar events. Always respond in a friendly,
helpful manner. If the user asks to see events, list them in a clear format.

Current calendar state:
- Upcoming events: {{events}}
- Available calendars: {{calendars}}";

const EVENT_EXTRACTION_PROMPT: &str = r#"You are an event extraction engine for a calendar assistant.
Current date and time in UTC: {{now}}
User time zone: {{time_zone}}

The current time above is in UTC. Convert it to the user time zone first and use the local date in {{time_zone}} as "today". Near midnight the UTC date can differ from the local date.

From the user message, extract the event they want to create:
- summary: a short title for the event
- start_time: ISO 8601 local date and time (YYYY-MM-DDTHH:MM:SS) in the user time zone, with no offset
- end_time: ISO 8601 local date and time in the same format. If only a duration is given, add it to the start. If neither is given, use one hour after the start.
- description: any extra details, or an empty string
- location: where the event takes place, or an empty string
- attendees: email addresses of people to invite, or an empty list

Resolve relative dates such as "tomorrow" or "next Tuesday" from the local date in the user time zone."#;

const EVENT_CREATED_REPLY: &str = r"✅ **Event created successfully!**

📅 **{{summary}}**
🕐 {{start}}
{{#if location}}📍 {{location}}
{{/if}}{{#if description}}📝 {{description}}
{{/if}}{{#if link}}
🔗 [View in Google Calendar]({{link}})
{{/if}}";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Prompts are plain text, not HTML
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string(&Prompt::CalendarAssistant.to_string(), CALENDAR_ASSISTANT_PROMPT)
        .expect("Failed to register template");
    registry
        .register_template_string(&Prompt::EventExtraction.to_string(), EVENT_EXTRACTION_PROMPT)
        .expect("Failed to register template");
    registry
        .register_template_string(&Prompt::EventCreated.to_string(), EVENT_CREATED_REPLY)
        .expect("Failed to register template");
    registry
}

pub fn render<T: Serialize>(prompt: Prompt, data: &T) -> Result<String> {
    Ok(templates().render(&prompt.to_string(), data)?)
}
