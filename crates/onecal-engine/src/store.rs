//! In-memory event store with calendar sources and deletion guards.
//!
//! The store owns the events and sources the engines read. Persistence is
//! the caller's concern: [`EventStore::to_json`] and [`EventStore::from_json`]
//! produce and accept a snapshot blob.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CalendarError, Result};
use crate::event::{CalendarEvent, CalendarSource, EventId, NewEvent};
use crate::filter::{due_notifications, search_events};

// ── Deletion guards ─────────────────────────────────────────────────────────

/// A check consulted, in registration order, before an event is deleted.
/// The first guard that returns an error vetoes the deletion.
pub trait DeleteGuard: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, event: &CalendarEvent) -> Result<()>;
}

/// Refuses to delete holiday events.
#[derive(Debug, Clone, Copy, Default)]
pub struct HolidayGuard;

impl DeleteGuard for HolidayGuard {
    fn name(&self) -> &str {
        "holiday"
    }

    fn check(&self, event: &CalendarEvent) -> Result<()> {
        if event.is_holiday {
            return Err(CalendarError::ImmutableEvent(format!(
                "'{}' is a holiday",
                event.title
            )));
        }
        Ok(())
    }
}

// ── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    events: Vec<CalendarEvent>,
    sources: Vec<CalendarSource>,
}

pub struct EventStore {
    events: Vec<CalendarEvent>,
    sources: Vec<CalendarSource>,
    delete_guards: Vec<Box<dyn DeleteGuard>>,
}

impl fmt::Debug for EventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guards: Vec<&str> = self.delete_guards.iter().map(|g| g.name()).collect();
        f.debug_struct("EventStore")
            .field("events", &self.events.len())
            .field("sources", &self.sources)
            .field("delete_guards", &guards)
            .finish()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(CalendarSource::defaults())
    }
}

impl EventStore {
    /// An empty store over `sources`, guarded by [`HolidayGuard`].
    pub fn new(sources: Vec<CalendarSource>) -> Self {
        Self {
            events: Vec::new(),
            sources,
            delete_guards: vec![Box::new(HolidayGuard)],
        }
    }

    /// Append a deletion guard; guards run in the order they were added.
    pub fn with_delete_guard(mut self, guard: impl DeleteGuard + 'static) -> Self {
        self.delete_guards.push(Box::new(guard));
        self
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn sources(&self) -> &[CalendarSource] {
        &self.sources
    }

    pub fn get(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Next integer id: one past the largest integer id in use.
    pub fn next_id(&self) -> EventId {
        let max = self
            .events
            .iter()
            .filter_map(|e| match e.id {
                EventId::Int(n) => Some(n),
                EventId::Str(_) => None,
            })
            .max()
            .unwrap_or(0);
        EventId::Int(max + 1)
    }

    /// Validate and insert a new event, returning its assigned id.
    pub fn add(&mut self, event: NewEvent) -> Result<EventId> {
        event.validate()?;
        let id = self.next_id();
        debug!(%id, title = %event.title, "adding event");
        self.events.push(event.with_id(id.clone()));
        Ok(id)
    }

    /// Replace the event with the same id.
    pub fn update(&mut self, event: CalendarEvent) -> Result<()> {
        event.validate()?;
        let slot = self
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| CalendarError::EventNotFound(event.id.to_string()))?;
        debug!(id = %event.id, "updating event");
        *slot = event;
        Ok(())
    }

    /// Delete an event after every guard has approved it.
    pub fn delete(&mut self, id: &EventId) -> Result<CalendarEvent> {
        let index = self
            .events
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;
        for guard in &self.delete_guards {
            if let Err(err) = guard.check(&self.events[index]) {
                warn!(%id, guard = guard.name(), "deletion refused");
                return Err(err);
            }
        }
        info!(%id, "deleted event");
        Ok(self.events.remove(index))
    }

    /// Reschedule an event to `date` at `hour:minute`, keeping its duration.
    pub fn move_event(
        &mut self,
        id: &EventId,
        date: NaiveDate,
        hour: u32,
        minute: u32,
    ) -> Result<&CalendarEvent> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            CalendarError::InvalidDate(format!("invalid time {hour}:{minute:02}"))
        })?;
        let slot = self
            .events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;
        *slot = slot.moved_to(date.and_time(time));
        debug!(%id, start = %slot.start_date, "moved event");
        Ok(slot)
    }

    /// Add holiday events, skipping ids already present. Registers the source
    /// if it is new. Returns how many events were added.
    pub fn merge_holidays(
        &mut self,
        source: CalendarSource,
        holidays: Vec<CalendarEvent>,
    ) -> usize {
        if !self.sources.iter().any(|s| s.id == source.id) {
            self.sources.push(source);
        }
        let mut added = 0;
        for holiday in holidays {
            if self.get(&holiday.id).is_none() {
                self.events.push(holiday);
                added += 1;
            }
        }
        debug!(added, "merged holidays");
        added
    }

    // ── Sources ─────────────────────────────────────────────────────────

    /// Register a calendar. The id is derived from the name
    /// ("Side Project" → "side-project").
    pub fn add_source(&mut self, mut source: CalendarSource) -> Result<&CalendarSource> {
        if source.name.trim().is_empty() {
            return Err(CalendarError::InvalidEvent(
                "calendar name must not be empty".to_string(),
            ));
        }
        source.id = slug(&source.name);
        if self.sources.iter().any(|s| s.id == source.id) {
            return Err(CalendarError::DuplicateCalendar(source.id));
        }
        self.sources.push(source);
        Ok(&self.sources[self.sources.len() - 1])
    }

    pub fn set_visibility(&mut self, source_id: &str, visible: bool) -> bool {
        match self.sources.iter_mut().find(|s| s.id == source_id) {
            Some(source) => {
                source.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Unknown calendars count as visible.
    pub fn is_calendar_visible(&self, source_id: &str) -> bool {
        self.sources
            .iter()
            .find(|s| s.id == source_id)
            .is_none_or(|s| s.visible)
    }

    pub fn calendar_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn search(&self, query: &str) -> Vec<&CalendarEvent> {
        search_events(&self.events, query)
    }

    pub fn due_notifications(&self, now: NaiveDateTime) -> Vec<&CalendarEvent> {
        due_notifications(&self.events, now)
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String> {
        let snapshot = Snapshot {
            events: self.events.clone(),
            sources: self.sources.clone(),
        };
        serde_json::to_string_pretty(&snapshot).map_err(|e| CalendarError::Snapshot(e.to_string()))
    }

    /// Restore a snapshot. Missing sources fall back to the defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(s).map_err(|e| CalendarError::Snapshot(e.to_string()))?;
        let sources = if snapshot.sources.is_empty() {
            CalendarSource::defaults()
        } else {
            snapshot.sources
        };
        let mut store = Self::new(sources);
        store.events = snapshot.events;
        Ok(store)
    }
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Notification, Repeat};
    use chrono::TimeDelta;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn new_event(title: &str, start: NaiveDateTime) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            start_date: start,
            end_date: start + TimeDelta::minutes(90),
            calendar: "work".to_string(),
            location: None,
            description: Some("quarterly planning".to_string()),
            guests: None,
            notification: Notification::MinutesBefore(10),
            repeat: Repeat::None,
            color: 1,
        }
    }

    struct TitleLock(&'static str);

    impl DeleteGuard for TitleLock {
        fn name(&self) -> &str {
            "title-lock"
        }

        fn check(&self, event: &CalendarEvent) -> Result<()> {
            if event.title == self.0 {
                return Err(CalendarError::ImmutableEvent(event.title.clone()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_add_assigns_incrementing_ids() {
        let mut store = EventStore::default();
        assert_eq!(store.add(new_event("A", at(18, 9, 0))).unwrap(), EventId::Int(1));
        assert_eq!(store.add(new_event("B", at(18, 10, 0))).unwrap(), EventId::Int(2));
        assert_eq!(store.events().len(), 2);
    }

    #[test]
    fn test_add_rejects_invalid_event() {
        let mut store = EventStore::default();
        let mut bad = new_event("A", at(18, 9, 0));
        bad.end_date = bad.start_date - TimeDelta::minutes(1);
        assert!(store.add(bad).is_err());
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_update_and_missing() {
        let mut store = EventStore::default();
        let id = store.add(new_event("A", at(18, 9, 0))).unwrap();
        let mut event = store.get(&id).unwrap().clone();
        event.title = "Renamed".to_string();
        store.update(event.clone()).unwrap();
        assert_eq!(store.get(&id).unwrap().title, "Renamed");

        event.id = EventId::Int(99);
        let err = store.update(event).unwrap_err().to_string();
        assert!(err.contains("Event not found"), "got: {err}");
    }

    #[test]
    fn test_move_event_keeps_duration() {
        let mut store = EventStore::default();
        let id = store.add(new_event("A", at(18, 9, 0))).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let moved = store.move_event(&id, target, 14, 15).unwrap();
        assert_eq!(moved.start_date, at(20, 14, 15));
        assert_eq!(moved.end_date, at(20, 15, 45));
        assert!(store.move_event(&id, target, 24, 0).is_err());
    }

    #[test]
    fn test_delete_guards_run_in_order() {
        let mut store = EventStore::default().with_delete_guard(TitleLock("Locked"));
        let locked = store.add(new_event("Locked", at(18, 9, 0))).unwrap();
        let free = store.add(new_event("Free", at(18, 11, 0))).unwrap();

        assert!(matches!(
            store.delete(&locked),
            Err(CalendarError::ImmutableEvent(_))
        ));
        assert_eq!(store.delete(&free).unwrap().title, "Free");
        assert!(matches!(
            store.delete(&free),
            Err(CalendarError::EventNotFound(_))
        ));
    }

    #[test]
    fn test_holiday_cannot_be_deleted() {
        let mut store = EventStore::default();
        let (source, holidays) = crate::holidays::bangladesh(2026);
        let count = holidays.len();
        assert_eq!(store.merge_holidays(source.clone(), holidays.clone()), count);
        // Merging twice adds nothing
        assert_eq!(store.merge_holidays(source, holidays), 0);

        let id = store.events()[0].id.clone();
        let err = store.delete(&id).unwrap_err().to_string();
        assert!(err.contains("cannot be deleted"), "got: {err}");
    }

    #[test]
    fn test_next_id_ignores_string_ids() {
        let mut store = EventStore::default();
        let (source, holidays) = crate::holidays::bangladesh(2026);
        store.merge_holidays(source, holidays);
        assert_eq!(store.next_id(), EventId::Int(1));
    }

    #[test]
    fn test_sources_and_visibility() {
        let mut store = EventStore::default();
        let added = store
            .add_source(CalendarSource::local("", "Side Project", 5))
            .unwrap();
        assert_eq!(added.id, "side-project");
        assert!(matches!(
            store.add_source(CalendarSource::local("", "side   project", 6)),
            Err(CalendarError::DuplicateCalendar(_))
        ));

        assert!(store.set_visibility("work", false));
        assert!(!store.is_calendar_visible("work"));
        assert!(store.is_calendar_visible("personal"));
        assert!(store.is_calendar_visible("unknown"));
        assert!(!store.set_visibility("unknown", false));
    }

    #[test]
    fn test_search_and_notifications() {
        let mut store = EventStore::default();
        store.add(new_event("Planning", at(18, 9, 0))).unwrap();
        assert_eq!(store.search("QUARTERLY").len(), 1);
        assert_eq!(store.due_notifications(at(18, 8, 50)).len(), 1);
        assert!(store.due_notifications(at(18, 9, 0)).is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = EventStore::default();
        store.add(new_event("A", at(18, 9, 0))).unwrap();
        store.set_visibility("family", false);
        let json = store.to_json().unwrap();

        let restored = EventStore::from_json(&json).unwrap();
        assert_eq!(restored.events(), store.events());
        assert!(!restored.is_calendar_visible("family"));
    }

    #[test]
    fn test_snapshot_without_sources_uses_defaults() {
        let restored = EventStore::from_json(r#"{"events": [], "sources": []}"#).unwrap();
        assert_eq!(restored.calendar_names(), vec!["Work", "Personal", "Family"]);
        assert!(EventStore::from_json("not json").is_err());
    }
}
