//! Event selection for views, search and reminders.
//!
//! All functions borrow the caller's events and take the calendar visibility
//! check as a predicate over the event's calendar id.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::event::CalendarEvent;
use crate::range::{ViewKind, ViewRange};

/// Shortest search query that produces results.
pub const MIN_QUERY_LEN: usize = 2;

/// Events starting in the half-open interval `[start, end)` on a visible
/// calendar, sorted by start.
pub fn filter_events_in_range<'a, F>(
    events: &'a [CalendarEvent],
    start: NaiveDateTime,
    end: NaiveDateTime,
    is_visible: F,
) -> Vec<&'a CalendarEvent>
where
    F: Fn(&str) -> bool,
{
    let mut selected: Vec<&CalendarEvent> = events
        .iter()
        .filter(|e| start <= e.start_date && e.start_date < end && is_visible(&e.calendar))
        .collect();
    selected.sort_by_key(|e| e.start_date);
    selected
}

/// Visible events starting on the calendar day `date`, sorted by start.
pub fn events_on_day<'a, F>(
    events: &'a [CalendarEvent],
    date: NaiveDate,
    is_visible: F,
) -> Vec<&'a CalendarEvent>
where
    F: Fn(&str) -> bool,
{
    let start = date.and_time(chrono::NaiveTime::MIN);
    let end = date
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |next| next.and_time(chrono::NaiveTime::MIN));
    filter_events_in_range(events, start, end, is_visible)
}

/// Visible events shown by a view: same calendar day as the anchor for the
/// day view, the range window otherwise.
pub fn events_for_view<'a, F>(
    events: &'a [CalendarEvent],
    range: &ViewRange,
    is_visible: F,
) -> Vec<&'a CalendarEvent>
where
    F: Fn(&str) -> bool,
{
    match range.view_kind {
        ViewKind::Day => events_on_day(events, range.anchor_date, is_visible),
        _ => {
            let (start, end) = range.window();
            filter_events_in_range(events, start, end, is_visible)
        }
    }
}

/// Whether any visible event starts on `date` (mini-calendar indicator).
pub fn has_events_on<F>(events: &[CalendarEvent], date: NaiveDate, is_visible: F) -> bool
where
    F: Fn(&str) -> bool,
{
    events
        .iter()
        .any(|e| e.start_date.date() == date && is_visible(&e.calendar))
}

/// Events of one calendar day in the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a CalendarEvent>,
}

/// Group events by start day, days ascending and events by start within a
/// day. Events with equal starts keep their input order.
pub fn group_by_day<'a>(events: &[&'a CalendarEvent]) -> Vec<DayGroup<'a>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&'a CalendarEvent>> = BTreeMap::new();
    for event in events {
        by_day.entry(event.start_date.date()).or_default().push(*event);
    }
    by_day
        .into_iter()
        .map(|(date, mut events)| {
            events.sort_by_key(|e| e.start_date);
            DayGroup { date, events }
        })
        .collect()
}

/// Case-insensitive search over title, description and location.
///
/// Queries shorter than [`MIN_QUERY_LEN`] characters return nothing.
pub fn search_events<'a>(events: &'a [CalendarEvent], query: &str) -> Vec<&'a CalendarEvent> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    events.iter().filter(|e| e.matches_query(&query)).collect()
}

/// Events whose reminder instant lies within one minute of `now`.
///
/// Intended for a once-a-minute sweep; consecutive sweeps exactly one minute
/// apart never report the same reminder twice.
pub fn due_notifications(events: &[CalendarEvent], now: NaiveDateTime) -> Vec<&CalendarEvent> {
    let window = TimeDelta::minutes(1);
    events
        .iter()
        .filter(|e| {
            e.reminder_at()
                .is_some_and(|at| (now - at).abs() < window)
        })
        .collect()
}
