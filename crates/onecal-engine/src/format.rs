//! Display formatting for dates, hours and clocks.
//!
//! Formatting operates on the naive (local) representation and never
//! converts timezones, except [`DateFormatter::format_clock_in_zone`] which
//! takes a UTC instant and an IANA zone name.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{CalendarError, Result};
use crate::range::{ViewKind, ViewRange};
use crate::settings::{TimeFormat, WeekStartDay};

/// Day and month name tables. Day tables are indexed from Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub day_names: [&'static str; 7],
    pub day_abbreviations: [&'static str; 7],
    pub day_initials: [&'static str; 7],
    pub month_names: [&'static str; 12],
    pub month_abbreviations: [&'static str; 12],
    /// Toolbar label of the list view.
    pub list_title: &'static str,
}

impl Locale {
    pub const ENGLISH: Self = Self {
        day_names: [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ],
        day_abbreviations: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        day_initials: ["S", "M", "T", "W", "T", "F", "S"],
        month_names: [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ],
        month_abbreviations: [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ],
        list_title: "Next 30 Days",
    };
}

impl Default for Locale {
    fn default() -> Self {
        Self::ENGLISH
    }
}

/// Formats dates and times for one time-format preference and locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    pub time_format: TimeFormat,
    pub locale: Locale,
}

impl DateFormatter {
    pub fn new(time_format: TimeFormat, locale: Locale) -> Self {
        Self {
            time_format,
            locale,
        }
    }

    pub fn english(time_format: TimeFormat) -> Self {
        Self::new(time_format, Locale::ENGLISH)
    }

    fn day_name(&self, date: NaiveDate) -> &'static str {
        self.locale.day_names[date.weekday().num_days_from_sunday() as usize]
    }

    fn month_name_of(&self, date: NaiveDate) -> &'static str {
        self.locale.month_names[date.month0() as usize]
    }

    /// "Wednesday, February 18, 2026"
    pub fn format_full_date(&self, date: NaiveDate) -> String {
        format!(
            "{}, {} {}, {}",
            self.day_name(date),
            self.month_name_of(date),
            date.day(),
            date.year()
        )
    }

    /// "February 2026"
    pub fn format_month_year(&self, date: NaiveDate) -> String {
        format!("{} {}", self.month_name_of(date), date.year())
    }

    /// "February"
    pub fn format_month_name(&self, date: NaiveDate) -> String {
        self.month_name_of(date).to_string()
    }

    /// "Feb 18"
    pub fn format_month_day(&self, date: NaiveDate) -> String {
        format!(
            "{} {}",
            self.locale.month_abbreviations[date.month0() as usize],
            date.day()
        )
    }

    /// "Wed 18"
    pub fn format_day_header(&self, date: NaiveDate) -> String {
        format!(
            "{} {}",
            self.locale.day_abbreviations[date.weekday().num_days_from_sunday() as usize],
            date.day()
        )
    }

    /// Hour row label: "12 AM", "1 PM" or "13:00".
    pub fn format_hour(&self, hour: u32) -> String {
        match self.time_format {
            TimeFormat::TwentyFourHour => format!("{hour}:00"),
            TimeFormat::TwelveHour => match hour {
                0 => "12 AM".to_string(),
                1..=11 => format!("{hour} AM"),
                12 => "12 PM".to_string(),
                h => format!("{} PM", h - 12),
            },
        }
    }

    /// "2:05 PM" or "14:05".
    pub fn format_time(&self, time: NaiveTime) -> String {
        let (h, m) = (time.hour(), time.minute());
        match self.time_format {
            TimeFormat::TwentyFourHour => format!("{h:02}:{m:02}"),
            TimeFormat::TwelveHour => {
                let (h12, period) = twelve_hour(h);
                format!("{h12}:{m:02} {period}")
            }
        }
    }

    /// Clock display with seconds: "2:05:09 PM" or "14:05:09".
    pub fn format_clock_local(&self, now: NaiveDateTime) -> String {
        let (h, m, s) = (now.hour(), now.minute(), now.second());
        match self.time_format {
            TimeFormat::TwentyFourHour => format!("{h:02}:{m:02}:{s:02}"),
            TimeFormat::TwelveHour => {
                let (h12, period) = twelve_hour(h);
                format!("{h12}:{m:02}:{s:02} {period}")
            }
        }
    }

    /// Clock display for an instant shown in an IANA timezone.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidTimezone`] if `timezone` is not a
    /// valid IANA name.
    pub fn format_clock_in_zone(&self, instant: DateTime<Utc>, timezone: &str) -> Result<String> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|_| CalendarError::InvalidTimezone(format!("'{timezone}'")))?;
        Ok(self.format_clock_local(instant.with_timezone(&tz).naive_local()))
    }

    /// Toolbar label for a view: full date, week span, month, year or the
    /// list title.
    pub fn format_range_title(&self, range: &ViewRange) -> String {
        match range.view_kind {
            ViewKind::Day => self.format_full_date(range.anchor_date),
            ViewKind::Week => format!(
                "{} - {}",
                self.format_month_day(range.range_start),
                self.format_month_day(range.range_end)
            ),
            ViewKind::Month => self.format_month_year(range.anchor_date),
            ViewKind::Year => range.anchor_date.year().to_string(),
            ViewKind::List => self.locale.list_title.to_string(),
        }
    }

    /// Weekday column initials in display order for a week-start day.
    pub fn weekday_initials(&self, week_start: WeekStartDay) -> Vec<&'static str> {
        let first = week_start.index() as usize;
        (0..7)
            .map(|i| self.locale.day_initials[(first + i) % 7])
            .collect()
    }
}

fn twelve_hour(hour: u32) -> (u32, &'static str) {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let h12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    (h12, period)
}

/// `YYYY-MM-DD` key used for day grouping and drop targets.
pub fn format_date_attribute(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` key.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] if the key is not a valid date.
pub fn parse_date_attribute(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CalendarError::InvalidDate(format!("'{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn twelve() -> DateFormatter {
        DateFormatter::english(TimeFormat::TwelveHour)
    }

    fn twenty_four() -> DateFormatter {
        DateFormatter::english(TimeFormat::TwentyFourHour)
    }

    #[test]
    fn test_format_full_date() {
        assert_eq!(
            twelve().format_full_date(d(2026, 2, 18)),
            "Wednesday, February 18, 2026"
        );
    }

    #[test]
    fn test_format_month_helpers() {
        let f = twelve();
        assert_eq!(f.format_month_year(d(2026, 2, 18)), "February 2026");
        assert_eq!(f.format_month_name(d(2026, 12, 1)), "December");
        assert_eq!(f.format_month_day(d(2026, 2, 18)), "Feb 18");
        assert_eq!(f.format_day_header(d(2026, 2, 18)), "Wed 18");
    }

    #[test]
    fn test_format_hour_both_formats() {
        assert_eq!(twelve().format_hour(0), "12 AM");
        assert_eq!(twelve().format_hour(9), "9 AM");
        assert_eq!(twelve().format_hour(12), "12 PM");
        assert_eq!(twelve().format_hour(23), "11 PM");
        assert_eq!(twenty_four().format_hour(7), "7:00");
        assert_eq!(twenty_four().format_hour(23), "23:00");
    }

    #[test]
    fn test_format_time_both_formats() {
        let t = NaiveTime::from_hms_opt(14, 5, 0).unwrap();
        assert_eq!(twelve().format_time(t), "2:05 PM");
        assert_eq!(twenty_four().format_time(t), "14:05");
        let midnight = NaiveTime::from_hms_opt(0, 30, 0).unwrap();
        assert_eq!(twelve().format_time(midnight), "12:30 AM");
        assert_eq!(twenty_four().format_time(midnight), "00:30");
    }

    #[test]
    fn test_format_clock_local() {
        let now = d(2026, 2, 18).and_hms_opt(9, 4, 7).unwrap();
        assert_eq!(twelve().format_clock_local(now), "9:04:07 AM");
        assert_eq!(twenty_four().format_clock_local(now), "09:04:07");
    }

    #[test]
    fn test_format_clock_in_zone() {
        let instant = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            twenty_four().format_clock_in_zone(instant, "Asia/Tokyo").unwrap(),
            "21:00:00"
        );
        // June in New York is EDT (UTC-4)
        assert_eq!(
            twelve()
                .format_clock_in_zone(instant, "America/New_York")
                .unwrap(),
            "8:00:00 AM"
        );
    }

    #[test]
    fn test_format_clock_in_zone_invalid() {
        let instant = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        let err = twelve()
            .format_clock_in_zone(instant, "Invalid/Zone")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_format_range_title() {
        let now = d(2026, 2, 18).and_hms_opt(10, 0, 0).unwrap();
        let settings = Settings::default();
        let f = twelve();
        let title = |kind| {
            f.format_range_title(&crate::range::view_range(kind, now.date(), now, &settings))
        };
        assert_eq!(title(ViewKind::Day), "Wednesday, February 18, 2026");
        assert_eq!(title(ViewKind::Week), "Feb 15 - Feb 21");
        assert_eq!(title(ViewKind::Month), "February 2026");
        assert_eq!(title(ViewKind::Year), "2026");
        assert_eq!(title(ViewKind::List), "Next 30 Days");
    }

    #[test]
    fn test_weekday_initials_rotate() {
        assert_eq!(
            twelve().weekday_initials(WeekStartDay::MONDAY),
            vec!["M", "T", "W", "T", "F", "S", "S"]
        );
        assert_eq!(twelve().weekday_initials(WeekStartDay::SUNDAY)[0], "S");
    }

    #[test]
    fn test_date_attribute_round_trip() {
        let date = d(2026, 3, 5);
        assert_eq!(format_date_attribute(date), "2026-03-05");
        assert_eq!(parse_date_attribute("2026-03-05").unwrap(), date);
        assert!(parse_date_attribute("2026-02-30").is_err());
    }
}
