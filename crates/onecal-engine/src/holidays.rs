//! Bangladesh public holiday calendar.
//!
//! Religious holidays follow the lunar calendar; the dates here are the
//! fixed approximations the app ships with and repeat every year.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::event::{CalendarEvent, CalendarSource, EventId, Notification, Repeat};

pub const SOURCE_ID: &str = "bd-holidays";
pub const HOLIDAY_COLOR: u8 = 4;
const FLAG: &str = "🇧🇩";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayKind {
    National,
    Religious,
    Cultural,
    International,
}

impl HolidayKind {
    fn label(self) -> &'static str {
        match self {
            Self::National => "National",
            Self::Religious => "Religious",
            Self::Cultural => "Cultural",
            Self::International => "International",
        }
    }
}

struct HolidayRule {
    name: &'static str,
    month: u32,
    day: u32,
    kind: HolidayKind,
    days: u64,
}

#[rustfmt::skip]
const RULES: &[HolidayRule] = &[
    HolidayRule { name: "New Year's Day", month: 1, day: 1, kind: HolidayKind::International, days: 1 },
    HolidayRule { name: "International Mother Language Day", month: 2, day: 21, kind: HolidayKind::National, days: 1 },
    HolidayRule { name: "Independence Day", month: 3, day: 26, kind: HolidayKind::National, days: 1 },
    HolidayRule { name: "Bengali New Year (Pohela Boishakh)", month: 4, day: 14, kind: HolidayKind::Cultural, days: 1 },
    HolidayRule { name: "Labor Day", month: 5, day: 1, kind: HolidayKind::International, days: 1 },
    HolidayRule { name: "Buddha Purnima", month: 5, day: 15, kind: HolidayKind::Religious, days: 1 },
    HolidayRule { name: "Eid-ul-Fitr", month: 5, day: 25, kind: HolidayKind::Religious, days: 3 },
    HolidayRule { name: "Eid-ul-Adha", month: 7, day: 31, kind: HolidayKind::Religious, days: 3 },
    HolidayRule { name: "National Mourning Day", month: 8, day: 15, kind: HolidayKind::National, days: 1 },
    HolidayRule { name: "Victory Day", month: 12, day: 16, kind: HolidayKind::National, days: 1 },
    HolidayRule { name: "Christmas Day", month: 12, day: 25, kind: HolidayKind::Religious, days: 1 },
];

/// The holiday calendar source.
pub fn source() -> CalendarSource {
    CalendarSource {
        description: Some("Official public holidays in Bangladesh".to_string()),
        ..CalendarSource::local(SOURCE_ID, "Bangladesh Holidays", HOLIDAY_COLOR)
    }
}

/// The holiday source and its events for `year`, sorted by date.
///
/// Multi-day holidays become one event spanning every day, ending at
/// 23:59:59.999 on the last day. Ids are stable per year so merging the
/// same year twice is idempotent.
pub fn bangladesh(year: i32) -> (CalendarSource, Vec<CalendarEvent>) {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999);
    let events = RULES
        .iter()
        .filter_map(|rule| {
            let first = NaiveDate::from_ymd_opt(year, rule.month, rule.day)?;
            let last = first.checked_add_days(Days::new(rule.days.saturating_sub(1)))?;
            Some(CalendarEvent {
                id: EventId::Str(holiday_id(rule.name, year)),
                title: format!("{FLAG} {}", rule.name),
                start_date: first.and_time(NaiveTime::MIN),
                end_date: last.and_time(end_of_day?),
                calendar: SOURCE_ID.to_string(),
                location: Some("Bangladesh".to_string()),
                description: Some(format!("{} holiday in Bangladesh", rule.kind.label())),
                guests: None,
                notification: Notification::None,
                repeat: Repeat::Yearly,
                color: HOLIDAY_COLOR,
                is_holiday: true,
            })
        })
        .collect();
    (source(), events)
}

fn holiday_id(name: &str, year: i32) -> String {
    let slug = name.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    format!("bd-holiday-{slug}-{year}")
}
