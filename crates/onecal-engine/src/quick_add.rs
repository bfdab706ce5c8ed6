//! Turning a parsed draft into a concrete event.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use tracing::debug;

use crate::event::{CalendarSource, NewEvent, Repeat};
use crate::parser::{parse_event_text, ParsedEventDraft};
use crate::settings::Settings;

/// Palette index used when the target calendar is unknown.
pub const FALLBACK_COLOR: u8 = 2;

/// Length of a quick-added event.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Parses quick-add text against a set of calendars and materializes drafts
/// into [`NewEvent`]s using the user's settings.
#[derive(Debug, Clone, Copy)]
pub struct QuickAdd<'a> {
    sources: &'a [CalendarSource],
    settings: &'a Settings,
}

impl<'a> QuickAdd<'a> {
    pub fn new(sources: &'a [CalendarSource], settings: &'a Settings) -> Self {
        Self { sources, settings }
    }

    /// Parse `text` using the names of the known calendars.
    pub fn parse(&self, text: &str, now: NaiveDateTime) -> ParsedEventDraft {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name.as_str()).collect();
        parse_event_text(text, &names, now)
    }

    /// Parse and materialize in one step. `None` when the text yields no title.
    pub fn create(&self, text: &str, now: NaiveDateTime) -> Option<NewEvent> {
        let draft = self.parse(text, now);
        self.materialize(&draft, text, now)
    }

    /// Build the event for a usable draft.
    ///
    /// The date defaults to today. Without a parsed time the start is the next
    /// half hour (`hh:30` before half past, else the following `hh:00`). The
    /// event lasts one hour and lands in the named calendar, or the default
    /// calendar from settings.
    pub fn materialize(
        &self,
        draft: &ParsedEventDraft,
        input: &str,
        now: NaiveDateTime,
    ) -> Option<NewEvent> {
        let title = draft.title.clone()?;
        let date = draft.date.unwrap_or(now.date());

        let start = match draft.time {
            Some(time) => date.and_time(time),
            None => {
                let hour_start = date.and_time(NaiveTime::from_hms_opt(now.hour(), 0, 0)?);
                let offset = if now.minute() < 30 { 30 } else { 60 };
                hour_start.checked_add_signed(TimeDelta::minutes(offset))?
            }
        };
        let end = start.checked_add_signed(TimeDelta::minutes(DEFAULT_DURATION_MINUTES))?;

        let source = draft
            .calendar
            .as_deref()
            .and_then(|name| {
                self.sources
                    .iter()
                    .find(|s| s.name.to_lowercase() == name.to_lowercase())
            })
            .or_else(|| {
                self.sources
                    .iter()
                    .find(|s| s.id == self.settings.default_calendar)
            });
        let calendar = source.map_or_else(
            || self.settings.default_calendar.clone(),
            |s| s.id.clone(),
        );
        let color = source.map_or(FALLBACK_COLOR, |s| s.color);

        debug!(%title, %start, %calendar, "materialized quick-add draft");
        Some(NewEvent {
            title,
            start_date: start,
            end_date: end,
            calendar,
            location: draft.location.clone(),
            description: Some(format!("Created from: \"{}\"", input.trim())),
            guests: None,
            notification: self.settings.default_reminder,
            repeat: Repeat::None,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Notification;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        d(2026, 2, 18).and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_create_with_time_and_calendar() {
        let sources = CalendarSource::defaults();
        let settings = Settings::default();
        let quick = QuickAdd::new(&sources, &settings);
        let event = quick
            .create("Soccer practice tomorrow at 5pm for Family", at(9, 0))
            .unwrap();
        assert_eq!(event.title, "Soccer practice");
        assert_eq!(event.start_date, d(2026, 2, 19).and_hms_opt(17, 0, 0).unwrap());
        assert_eq!(event.end_date, d(2026, 2, 19).and_hms_opt(18, 0, 0).unwrap());
        assert_eq!(event.calendar, "family");
        assert_eq!(event.color, 3);
        assert_eq!(event.notification, Notification::MinutesBefore(30));
        assert_eq!(
            event.description.as_deref(),
            Some("Created from: \"Soccer practice tomorrow at 5pm for Family\"")
        );
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_default_start_rounds_to_half_hour() {
        let sources = CalendarSource::defaults();
        let settings = Settings::default();
        let quick = QuickAdd::new(&sources, &settings);

        let early = quick.create("Write report", at(10, 12)).unwrap();
        assert_eq!(early.start_date, at(10, 30));

        let late = quick.create("Write report", at(10, 45)).unwrap();
        assert_eq!(late.start_date, at(11, 0));
        assert_eq!(late.calendar, "personal");
        assert_eq!(late.color, 2);
    }

    #[test]
    fn test_default_start_rolls_past_midnight() {
        let sources = CalendarSource::defaults();
        let settings = Settings::default();
        let quick = QuickAdd::new(&sources, &settings);
        let event = quick.create("Stargazing", at(23, 40)).unwrap();
        assert_eq!(event.start_date, d(2026, 2, 19).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_unknown_default_calendar_uses_fallback_color() {
        let sources = CalendarSource::defaults();
        let settings = Settings {
            default_calendar: "inbox".to_string(),
            default_reminder: Notification::None,
            ..Settings::default()
        };
        let quick = QuickAdd::new(&sources, &settings);
        let event = quick.create("Triage", at(8, 0)).unwrap();
        assert_eq!(event.calendar, "inbox");
        assert_eq!(event.color, FALLBACK_COLOR);
        assert_eq!(event.notification, Notification::None);
    }

    #[test]
    fn test_no_event_past_last_representable_day() {
        let sources = CalendarSource::defaults();
        let settings = Settings::default();
        let quick = QuickAdd::new(&sources, &settings);
        let last = NaiveDate::MAX.and_hms_opt(23, 40, 0).unwrap();
        assert!(quick.create("Countdown", last).is_none());
        assert!(quick.create("Countdown", last - chrono::TimeDelta::hours(3)).is_some());
    }

    #[test]
    fn test_blank_text_creates_nothing() {
        let sources = CalendarSource::defaults();
        let settings = Settings::default();
        assert!(QuickAdd::new(&sources, &settings).create("  ", at(8, 0)).is_none());
    }
}
