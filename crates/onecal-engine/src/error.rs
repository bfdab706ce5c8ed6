//! Error types for onecal-engine operations.
//!
//! The view engine and the quick-add parser are total and never fail. Errors
//! only arise at the edges: settings, timezone names, date keys and the event
//! store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Event cannot be deleted: {0}")]
    ImmutableEvent(String),

    #[error("Calendar already exists: {0}")]
    DuplicateCalendar(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
