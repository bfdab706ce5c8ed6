//! Calendar events and calendar sources.
//!
//! These types are owned by the caller (the event store); the view engine and
//! the quick-add parser only read or produce them.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

// ── Identifiers ─────────────────────────────────────────────────────────────

/// Event identifier: integers for user events, strings for generated ones
/// such as holidays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Int(u64),
    Str(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EventId {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Str(value.to_string()),
        }
    }
}

// ── Notification ────────────────────────────────────────────────────────────

/// Reminder setting: none, or a number of minutes before the start.
///
/// Serialized as `"none"` or an integer. Numeric strings (`"30"`) are
/// accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "NotificationRepr", into = "NotificationRepr")]
pub enum Notification {
    #[default]
    None,
    MinutesBefore(u32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum NotificationRepr {
    Minutes(u32),
    Text(String),
}

impl TryFrom<NotificationRepr> for Notification {
    type Error = String;

    fn try_from(value: NotificationRepr) -> std::result::Result<Self, Self::Error> {
        match value {
            NotificationRepr::Minutes(n) => Ok(Self::MinutesBefore(n)),
            NotificationRepr::Text(s) if s.eq_ignore_ascii_case("none") => Ok(Self::None),
            NotificationRepr::Text(s) => s
                .trim()
                .parse::<u32>()
                .map(Self::MinutesBefore)
                .map_err(|_| format!("notification must be \"none\" or minutes, got '{s}'")),
        }
    }
}

impl From<Notification> for NotificationRepr {
    fn from(value: Notification) -> Self {
        match value {
            Notification::None => Self::Text("none".to_string()),
            Notification::MinutesBefore(n) => Self::Minutes(n),
        }
    }
}

// ── Repeat ──────────────────────────────────────────────────────────────────

/// Recurrence marker. Stored only; instances are materialized by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

// ── CalendarEvent ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    /// Id of the [`CalendarSource`] this event belongs to.
    pub calendar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<String>,
    #[serde(default)]
    pub notification: Notification,
    #[serde(default)]
    pub repeat: Repeat,
    /// Index into the fixed event palette.
    #[serde(default)]
    pub color: u8,
    #[serde(default)]
    pub is_holiday: bool,
}

impl CalendarEvent {
    /// Check the title and the `start_date < end_date` invariant.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, self.start_date, self.end_date)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_date - self.start_date
    }

    /// The instant the reminder fires, if any.
    pub fn reminder_at(&self) -> Option<NaiveDateTime> {
        match self.notification {
            Notification::None => None,
            Notification::MinutesBefore(m) => {
                self.start_date
                    .checked_sub_signed(TimeDelta::minutes(i64::from(m)))
            }
        }
    }

    /// A copy starting at `new_start` with the same duration.
    pub fn moved_to(&self, new_start: NaiveDateTime) -> Self {
        Self {
            start_date: new_start,
            end_date: new_start + self.duration(),
            ..self.clone()
        }
    }

    /// Case-insensitive match of an already lowercased query against the
    /// title, description and location.
    pub fn matches_query(&self, lowered_query: &str) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(lowered_query);
        contains(&self.title)
            || self.description.as_deref().is_some_and(contains)
            || self.location.as_deref().is_some_and(contains)
    }
}

/// An event before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub calendar: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub guests: Option<String>,
    pub notification: Notification,
    pub repeat: Repeat,
    pub color: u8,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, self.start_date, self.end_date)
    }

    pub fn with_id(self, id: EventId) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            start_date: self.start_date,
            end_date: self.end_date,
            calendar: self.calendar,
            location: self.location,
            description: self.description,
            guests: self.guests,
            notification: self.notification,
            repeat: self.repeat,
            color: self.color,
            is_holiday: false,
        }
    }
}

fn validate_fields(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    if title.trim().is_empty() {
        return Err(CalendarError::InvalidEvent("title must not be empty".to_string()));
    }
    if start >= end {
        return Err(CalendarError::InvalidEvent(format!(
            "end {end} must be after start {start}"
        )));
    }
    Ok(())
}

// ── CalendarSource ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Local,
    Caldav,
    Exchange,
    Google,
    Outlook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    pub id: String,
    pub name: String,
    /// Palette index given to events created in this calendar.
    pub color: u8,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl CalendarSource {
    pub fn local(id: &str, name: &str, color: u8) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color,
            visible: true,
            kind: SourceKind::Local,
            description: None,
        }
    }

    /// The Work / Personal / Family calendars every new store starts with.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::local("work", "Work", 1),
            Self::local("personal", "Personal", 2),
            Self::local("family", "Family", 3),
        ]
    }
}
