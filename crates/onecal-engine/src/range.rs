//! Deterministic view-range computation.
//!
//! Every function here is pure: the caller supplies the anchor date, the
//! injected "today" and the week-start preference. Nothing reads the system
//! clock, so the same inputs always produce the same grid.
//!
//! # Functions
//!
//! - [`start_of_week`] — first day of the week containing a date
//! - [`week_columns`] — the 7 dates of a week view
//! - [`month_grid_cells`] — the fixed 42-cell (6×7) month grid
//! - [`year_grids`] — twelve month grids for the year view
//! - [`day_slots`] — the 24 hour slots of the day and week views
//! - [`iso_week_number`] — ISO-8601 week number
//! - [`view_range`] — the [`ViewRange`] for any [`ViewKind`]
//! - [`navigate`] — previous / next / today navigation

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::format::DateFormatter;
use crate::settings::{Settings, TimeFormat, WeekStartDay};

/// Cells in a month grid: six full weeks, whatever the month length.
pub const GRID_CELLS: usize = 42;

/// Days covered by the list view after today.
pub const LIST_VIEW_DAYS: i64 = 30;

// ── View kinds ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Day,
    #[default]
    Week,
    Month,
    Year,
    List,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

impl FromStr for ViewKind {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "list" | "agenda" => Ok(Self::List),
            other => Err(CalendarError::InvalidSettings(format!(
                "unknown view '{other}'"
            ))),
        }
    }
}

// ── Output types ────────────────────────────────────────────────────────────

/// One day of a grid or week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellDescriptor {
    pub date: NaiveDate,
    /// The cell belongs to the month (or week/day) being displayed.
    pub is_current_period: bool,
    pub is_today: bool,
    /// ISO week number, only on week-start cells when week numbers are shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u32>,
}

/// A 42-cell month grid, as rendered by the month view, the year view and
/// the mini-calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CellDescriptor>,
}

/// What a view displays for a given anchor date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRange {
    pub view_kind: ViewKind,
    pub anchor_date: NaiveDate,
    /// First displayed day (inclusive).
    pub range_start: NaiveDate,
    /// Last displayed day (inclusive).
    pub range_end: NaiveDate,
    /// Day cells: 1 for day, 7 for week, 42 for month, none for year and list.
    pub cells: Vec<CellDescriptor>,
    /// Twelve grids for the year view, empty otherwise.
    pub months: Vec<MonthGrid>,
}

impl ViewRange {
    /// Half-open datetime window `[range_start 00:00, range_end + 1 day 00:00)`.
    ///
    /// A range ending on the last representable day runs to
    /// [`NaiveDateTime::MAX`].
    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.range_start.and_time(NaiveTime::MIN);
        let end = shift_days(self.range_end, 1)
            .map_or(NaiveDateTime::MAX, |d| d.and_time(NaiveTime::MIN));
        (start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range_start <= date && date <= self.range_end
    }
}

/// An hour row of the day and week views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourSlot {
    pub hour: u32,
    pub label: String,
}

/// Navigation request from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
    Today,
}

// ── Week arithmetic ─────────────────────────────────────────────────────────

/// The date beginning the week that contains `date`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use onecal_engine::range::start_of_week;
/// use onecal_engine::WeekStartDay;
///
/// let wed = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap();
/// assert_eq!(start_of_week(wed, WeekStartDay::SUNDAY), NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());
/// assert_eq!(start_of_week(wed, WeekStartDay::MONDAY), NaiveDate::from_ymd_opt(2026, 2, 16).unwrap());
/// ```
///
/// Dates in the first week of chrono's range clamp to [`NaiveDate::MIN`].
pub fn start_of_week(date: NaiveDate, week_start: WeekStartDay) -> NaiveDate {
    try_start_of_week(date, week_start).unwrap_or(NaiveDate::MIN)
}

/// Like [`start_of_week`], but `None` when the week starts before
/// [`NaiveDate::MIN`].
pub fn try_start_of_week(date: NaiveDate, week_start: WeekStartDay) -> Option<NaiveDate> {
    shift_days(date, -week_start.days_since_start(date.weekday()))
}

/// The consecutive dates of the week containing `anchor`: 7 of them, fewer
/// only at the edges of chrono's date range.
pub fn week_columns(anchor: NaiveDate, week_start: WeekStartDay) -> Vec<NaiveDate> {
    let start = start_of_week(anchor, week_start);
    (0..7).map_while(|i| shift_days(start, i)).collect()
}

/// ISO-8601 week number.
///
/// The date is shifted to the Thursday of its ISO week (weeks run Monday to
/// Sunday); the week number is then the number of 7-day blocks from January 1
/// of that Thursday's year. Week 1 is the week holding the year's first
/// Thursday, so early January can belong to the previous year's last week and
/// late December to week 1.
pub fn iso_week_number(date: NaiveDate) -> u32 {
    let offset = 3 - date.weekday().num_days_from_monday() as i64;
    match shift_days(date, offset) {
        // ordinal0 is days since Jan 1; ceil((d + 1) / 7) == d / 7 + 1
        Some(thursday) => thursday.ordinal0() / 7 + 1,
        // Thursday lies outside chrono's range
        None => date.iso_week().week(),
    }
}

/// `date` moved by `days`, or `None` past either end of chrono's range.
fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}

// ── Grids ───────────────────────────────────────────────────────────────────

/// Normalize a possibly out-of-range month by rollover: month 13 is January
/// of the next year, month 0 is December of the previous year.
///
/// `None` when the rolled-over year does not fit in an `i32`.
pub fn normalize_year_month(year: i32, month: i32) -> Option<(i32, u32)> {
    let zero_based = i64::from(month) - 1;
    let year = i32::try_from(i64::from(year) + zero_based.div_euclid(12)).ok()?;
    let month = zero_based.rem_euclid(12) as u32 + 1;
    Some((year, month))
}

/// Exactly 42 consecutive cells starting at the week-start on or before the
/// first of the month.
///
/// `month` is 1-based and normalized with [`normalize_year_month`]. A month
/// whose grid does not fit in chrono's supported range yields an empty grid.
pub fn month_grid_cells(
    year: i32,
    month: i32,
    week_start: WeekStartDay,
    today: NaiveDate,
    show_week_numbers: bool,
) -> Vec<CellDescriptor> {
    let Some((year, month)) = normalize_year_month(year, month) else {
        return Vec::new();
    };
    let Some(start) = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| try_start_of_week(first, week_start))
    else {
        return Vec::new();
    };

    (0..GRID_CELLS as i64)
        .map(|i| {
            let date = shift_days(start, i)?;
            let week_number = (show_week_numbers && date.weekday() == week_start.weekday())
                .then(|| iso_week_number(date));
            Some(CellDescriptor {
                date,
                is_current_period: date.month() == month && date.year() == year,
                is_today: date == today,
                week_number,
            })
        })
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

/// A [`MonthGrid`] for the month containing `anchor`.
pub fn month_grid(
    anchor: NaiveDate,
    week_start: WeekStartDay,
    today: NaiveDate,
    show_week_numbers: bool,
) -> MonthGrid {
    MonthGrid {
        year: anchor.year(),
        month: anchor.month(),
        cells: month_grid_cells(
            anchor.year(),
            anchor.month() as i32,
            week_start,
            today,
            show_week_numbers,
        ),
    }
}

/// Twelve month grids for the year view.
pub fn year_grids(
    year: i32,
    week_start: WeekStartDay,
    today: NaiveDate,
    show_week_numbers: bool,
) -> Vec<MonthGrid> {
    (1..=12)
        .map(|month| MonthGrid {
            year,
            month,
            cells: month_grid_cells(year, month as i32, week_start, today, show_week_numbers),
        })
        .collect()
}

/// The 24 hour rows of the day and week views, labelled per `time_format`.
pub fn day_slots(time_format: TimeFormat) -> Vec<HourSlot> {
    let formatter = DateFormatter::english(time_format);
    (0..24)
        .map(|hour| HourSlot {
            hour,
            label: formatter.format_hour(hour),
        })
        .collect()
}

// ── Views ───────────────────────────────────────────────────────────────────

/// Compute what `view_kind` displays around `anchor`.
///
/// `now` only decides the `is_today` flags and the list view's window,
/// which always starts today regardless of the anchor.
pub fn view_range(
    view_kind: ViewKind,
    anchor: NaiveDate,
    now: NaiveDateTime,
    settings: &Settings,
) -> ViewRange {
    let today = now.date();
    let ws = settings.week_starts_on;
    let cell = |date: NaiveDate, is_current_period: bool| CellDescriptor {
        date,
        is_current_period,
        is_today: date == today,
        week_number: None,
    };

    match view_kind {
        ViewKind::Day => ViewRange {
            view_kind,
            anchor_date: anchor,
            range_start: anchor,
            range_end: anchor,
            cells: vec![cell(anchor, true)],
            months: Vec::new(),
        },
        ViewKind::Week => {
            let cells: Vec<CellDescriptor> = week_columns(anchor, ws)
                .into_iter()
                .map(|d| cell(d, true))
                .collect();
            let range_start = cells.first().map_or(anchor, |c| c.date);
            let range_end = cells.last().map_or(anchor, |c| c.date);
            ViewRange {
                view_kind,
                anchor_date: anchor,
                range_start,
                range_end,
                cells,
                months: Vec::new(),
            }
        }
        ViewKind::Month => {
            let cells = month_grid(anchor, ws, today, settings.show_week_numbers).cells;
            let range_start = cells.first().map_or(anchor, |c| c.date);
            let range_end = cells.last().map_or(anchor, |c| c.date);
            ViewRange {
                view_kind,
                anchor_date: anchor,
                range_start,
                range_end,
                cells,
                months: Vec::new(),
            }
        }
        ViewKind::Year => {
            let year = anchor.year();
            ViewRange {
                view_kind,
                anchor_date: anchor,
                range_start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(anchor),
                range_end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(anchor),
                cells: Vec::new(),
                months: year_grids(year, ws, today, settings.show_week_numbers),
            }
        }
        ViewKind::List => ViewRange {
            view_kind,
            anchor_date: anchor,
            range_start: today,
            range_end: shift_days(today, LIST_VIEW_DAYS).unwrap_or(NaiveDate::MAX),
            cells: Vec::new(),
            months: Vec::new(),
        },
    }
}

/// Move the anchor for a toolbar navigation.
///
/// Month and year steps clamp to the last day of the target month
/// (Jan 31 → Feb 28). The list view always shows the next 30 days, so
/// previous/next leave its anchor unchanged.
pub fn navigate(
    view_kind: ViewKind,
    anchor: NaiveDate,
    direction: Direction,
    today: NaiveDate,
) -> NaiveDate {
    let forward = match direction {
        Direction::Today => return today,
        Direction::Next => true,
        Direction::Previous => false,
    };

    let step = |days: i64| {
        let days = if forward { days } else { -days };
        shift_days(anchor, days).unwrap_or(anchor)
    };
    let step_months = |months: u32| {
        let shifted = if forward {
            anchor.checked_add_months(Months::new(months))
        } else {
            anchor.checked_sub_months(Months::new(months))
        };
        shifted.unwrap_or(anchor)
    };

    match view_kind {
        ViewKind::Day => step(1),
        ViewKind::Week => step(7),
        ViewKind::Month => step_months(1),
        ViewKind::Year => step_months(12),
        ViewKind::List => anchor,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
