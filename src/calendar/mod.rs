pub mod agent;
pub use agent::CalendarAgent;

pub mod models;
pub use models::{CalendarSnapshot, EventSummary};

#[cfg(test)]
pub mod fake;
