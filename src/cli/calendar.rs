//! One-shot calendar commands that skip the language model.
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::calendar::{CalendarAgent, EventSummary};
use crate::google::gcal::{CalendarSummary, FreeBusyResult};

/// Accept either a calendar name from the roster or a raw id.
fn resolve_calendar<'a>(agent: &'a CalendarAgent, name_or_id: &'a str) -> &'a str {
    agent
        .find_calendar_by_name(name_or_id)
        .map(|cal| cal.id.as_str())
        .unwrap_or(name_or_id)
}

pub fn format_calendars(calendars: &[CalendarSummary]) -> String {
    if calendars.is_empty() {
        return String::from("No calendars found.");
    }
    calendars
        .iter()
        .map(|cal| format!("- {} ({})", cal.summary, cal.id))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn format_events(events: &[EventSummary]) -> String {
    if events.is_empty() {
        return String::from("No upcoming events.");
    }
    events
        .iter()
        .map(|e| format!("- {}: {} -> {} [{}]", e.summary, e.start, e.end, e.id))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn format_free_busy(result: &FreeBusyResult) -> String {
    let mut lines = Vec::new();
    for (calendar_id, cal) in &result.calendars {
        lines.push(format!("{}:", calendar_id));
        for err in &cal.errors {
            lines.push(format!("  error: {} ({})", err.reason, err.domain));
        }
        if cal.busy.is_empty() && cal.errors.is_empty() {
            lines.push(String::from("  free"));
        }
        for busy in &cal.busy {
            lines.push(format!("  busy {} -> {}", busy.start, busy.end));
        }
    }
    lines.join("\n")
}

pub fn calendars(agent: &CalendarAgent) {
    println!("{}", format_calendars(agent.calendars()));
}

pub async fn events(
    agent: &CalendarAgent,
    calendar: Option<&str>,
    max_results: u32,
    days_ahead: i64,
) -> Result<()> {
    let calendar_id = calendar.map(|c| resolve_calendar(agent, c));
    let events = agent.list_events(calendar_id, max_results, days_ahead).await?;
    println!("{}", format_events(&events));
    Ok(())
}

pub async fn create_calendar(
    agent: &mut CalendarAgent,
    summary: &str,
    description: &str,
) -> Result<()> {
    let created = agent.create_calendar(summary, description).await?;
    println!("Created calendar {} ({})", created.summary, created.id);
    Ok(())
}

pub async fn availability(
    agent: &CalendarAgent,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
    calendars: &[String],
) -> Result<()> {
    let calendar_ids: Vec<String> = calendars
        .iter()
        .map(|c| resolve_calendar(agent, c).to_string())
        .collect();
    let result = agent
        .check_availability(time_min, time_max, Some(calendar_ids.as_slice()))
        .await?;
    println!("{}", format_free_busy(&result));
    Ok(())
}

pub async fn delete_event(
    agent: &CalendarAgent,
    event_id: &str,
    calendar: Option<&str>,
) -> Result<()> {
    let calendar_id = calendar.map(|c| resolve_calendar(agent, c));
    agent.remove_event(event_id, calendar_id).await?;
    println!("Deleted event {}", event_id);
    Ok(())
}
