//! # onecal-engine
//!
//! Calendar view computation and natural-language event entry.
//!
//! The engine turns an anchor date and user settings into the exact set of
//! days a day, week, month, year or list view shows, and turns free text such
//! as "Lunch with Sam tomorrow at 1pm" into an event draft. Everything here is
//! deterministic: callers pass the current time in.
//!
//! ## Modules
//!
//! - [`range`] — week starts, 6×7 month grids, ISO week numbers, view ranges, navigation
//! - [`filter`] — range filtering, day grouping, search, due reminders
//! - [`format`] — locale-aware date, time and range-title strings
//! - [`parser`] — free text → [`ParsedEventDraft`]
//! - [`quick_add`] — draft → storable [`NewEvent`] with settings-driven defaults
//! - [`store`] — in-memory events and calendars with deletion guards
//! - [`holidays`] — Bangladesh public holiday calendar
//! - [`settings`] — user settings loaded from TOML or JSON
//! - [`event`] — event and calendar data model
//! - [`error`] — Error types

pub mod error;
pub mod event;
pub mod filter;
pub mod format;
pub mod holidays;
pub mod parser;
pub mod quick_add;
pub mod range;
pub mod settings;
pub mod store;

pub use error::{CalendarError, Result};
pub use event::{
    CalendarEvent, CalendarSource, EventId, NewEvent, Notification, Repeat, SourceKind,
};
pub use filter::{
    due_notifications, events_for_view, events_on_day, filter_events_in_range, group_by_day,
    has_events_on, search_events, DayGroup,
};
pub use format::{format_date_attribute, parse_date_attribute, DateFormatter, Locale};
pub use parser::{parse_event_text, ParsedEventDraft};
pub use quick_add::QuickAdd;
pub use range::{
    day_slots, iso_week_number, month_grid, month_grid_cells, navigate, start_of_week,
    try_start_of_week, view_range, week_columns, year_grids, CellDescriptor, Direction, HourSlot,
    MonthGrid, ViewKind, ViewRange,
};
pub use settings::{Settings, TimeFormat, WeekStartDay};
pub use store::{DeleteGuard, EventStore, HolidayGuard};
