use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod auth;
pub mod calendar;
pub mod chat;

use crate::calendar::CalendarAgent;
use crate::calendar::agent::{DEFAULT_DAYS_AHEAD, DEFAULT_MAX_EVENTS};
use crate::core::AppConfig;
use crate::google::gcal::GoogleCalendarClient;
use crate::google::oauth::{Credentials, TokenProvider};

const MAX_DAYS_AHEAD: i64 = 3650;

#[derive(Subcommand)]
enum Command {
    /// Start a chat session with the calendar assistant
    Chat {},
    /// List the calendars on the account
    Calendars {},
    /// List upcoming events
    Events {
        #[arg(
            long,
            default_value_t = DEFAULT_DAYS_AHEAD,
            value_parser = clap::value_parser!(i64).range(1..=MAX_DAYS_AHEAD)
        )]
        days_ahead: i64,
        #[arg(long, default_value_t = DEFAULT_MAX_EVENTS)]
        max_results: u32,
        /// Calendar name or id, defaults to the primary calendar
        #[arg(long)]
        calendar: Option<String>,
    },
    /// Create a new secondary calendar
    CreateCalendar {
        #[arg(long)]
        summary: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show busy times between two RFC 3339 timestamps
    Availability {
        #[arg(long)]
        time_min: DateTime<Utc>,
        #[arg(long)]
        time_max: DateTime<Utc>,
        /// Calendar names or ids, repeat for more than one
        #[arg(long)]
        calendar: Vec<String>,
    },
    /// Delete an event
    DeleteEvent {
        #[arg(long)]
        event_id: String,
        #[arg(long)]
        calendar: Option<String>,
    },
    /// Perform OAuth authentication and save the refresh token
    Auth {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build an agent backed by the Google Calendar API using the
/// credentials file from the config.
pub async fn calendar_agent(config: &AppConfig) -> Result<CalendarAgent> {
    let credentials = Credentials::from_file(&config.credentials_path)?;
    let client = GoogleCalendarClient::new(
        &config.google_api_url,
        TokenProvider::from_credentials(credentials),
    );
    Ok(CalendarAgent::new(Arc::new(client)).await)
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_tracing();
    let config = AppConfig::load();

    // Handle each sub command
    match args.command.unwrap_or(Command::Chat {}) {
        Command::Chat {} => {
            chat::run(&config).await?;
        }
        Command::Calendars {} => {
            let agent = calendar_agent(&config).await?;
            calendar::calendars(&agent);
        }
        Command::Events {
            days_ahead,
            max_results,
            calendar,
        } => {
            let agent = calendar_agent(&config).await?;
            calendar::events(&agent, calendar.as_deref(), max_results, days_ahead).await?;
        }
        Command::CreateCalendar {
            summary,
            description,
        } => {
            let mut agent = calendar_agent(&config).await?;
            calendar::create_calendar(&mut agent, &summary, &description).await?;
        }
        Command::Availability {
            time_min,
            time_max,
            calendar,
        } => {
            let agent = calendar_agent(&config).await?;
            calendar::availability(&agent, time_min, time_max, &calendar).await?;
        }
        Command::DeleteEvent { event_id, calendar } => {
            let agent = calendar_agent(&config).await?;
            calendar::delete_event(&agent, &event_id, calendar.as_deref()).await?;
        }
        Command::Auth {} => {
            auth::run(&config).await?;
        }
    }

    Ok(())
}
