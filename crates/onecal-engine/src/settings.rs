//! User preferences consumed by the view engine and quick-add.
//!
//! Settings are plain data: the caller loads them (TOML or JSON) and passes
//! them explicitly to every computation that depends on them.

use std::fmt;
use std::path::Path;

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalendarError, Result};
use crate::event::Notification;
use crate::range::ViewKind;

/// Weekdays indexed the way settings store them (0 = Sunday).
const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

// ── Configurable week start ─────────────────────────────────────────────────

/// Which day begins a week for grids and week columns.
///
/// Serialized as an index, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekStartDay(Weekday);

impl WeekStartDay {
    /// US/Canada convention.
    pub const SUNDAY: Self = Self(Weekday::Sun);
    /// ISO 8601 convention.
    pub const MONDAY: Self = Self(Weekday::Mon);

    /// Build from a settings index (0 = Sunday … 6 = Saturday).
    pub fn from_index(index: u8) -> Option<Self> {
        WEEKDAYS_FROM_SUNDAY.get(index as usize).copied().map(Self)
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self(weekday)
    }

    pub fn index(self) -> u8 {
        self.0.num_days_from_sunday() as u8
    }

    pub fn weekday(self) -> Weekday {
        self.0
    }

    /// How many days `weekday` is past the start of its week.
    pub fn days_since_start(self, weekday: Weekday) -> i64 {
        (weekday.num_days_from_sunday() as i64 - self.index() as i64 + 7) % 7
    }
}

impl Default for WeekStartDay {
    fn default() -> Self {
        Self::SUNDAY
    }
}

impl TryFrom<u8> for WeekStartDay {
    type Error = CalendarError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_index(value).ok_or_else(|| {
            CalendarError::InvalidSettings(format!("week_starts_on must be 0-6, got {value}"))
        })
    }
}

impl From<WeekStartDay> for u8 {
    fn from(value: WeekStartDay) -> Self {
        value.index()
    }
}

// ── Time format ─────────────────────────────────────────────────────────────

/// 12-hour or 24-hour clock preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12")]
    TwelveHour,
    #[serde(rename = "24")]
    TwentyFourHour,
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwelveHour => f.write_str("12"),
            Self::TwentyFourHour => f.write_str("24"),
        }
    }
}

// ── Settings ────────────────────────────────────────────────────────────────

/// Timezone value meaning "use the caller's local representation".
pub const LOCAL_TIMEZONE: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_view: ViewKind,
    pub week_starts_on: WeekStartDay,
    pub time_format: TimeFormat,
    pub show_week_numbers: bool,
    pub default_reminder: Notification,
    /// `"local"` or an IANA zone name used for the clock display.
    pub default_timezone: String,
    /// Calendar source id that receives quick-added events with no calendar.
    pub default_calendar: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_view: ViewKind::Week,
            week_starts_on: WeekStartDay::SUNDAY,
            time_format: TimeFormat::TwelveHour,
            show_week_numbers: false,
            default_reminder: Notification::MinutesBefore(30),
            default_timezone: LOCAL_TIMEZONE.to_string(),
            default_calendar: "personal".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(s).map_err(|e| CalendarError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON document. Missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(s).map_err(|e| CalendarError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file, choosing JSON for `.json` and TOML otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CalendarError::InvalidSettings(format!("'{}': {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loading settings");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_toml_str(&raw),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_calendar.trim().is_empty() {
            return Err(CalendarError::InvalidSettings(
                "default_calendar must not be empty".to_string(),
            ));
        }
        self.clock_zone()?;
        Ok(())
    }

    /// The configured clock zone, or `None` for the local representation.
    pub fn clock_zone(&self) -> Result<Option<Tz>> {
        if self.default_timezone.eq_ignore_ascii_case(LOCAL_TIMEZONE) {
            return Ok(None);
        }
        self.default_timezone
            .parse::<Tz>()
            .map(Some)
            .map_err(|_| CalendarError::InvalidTimezone(format!("'{}'", self.default_timezone)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_start_from_index_covers_all_days() {
        for i in 0..7u8 {
            let ws = WeekStartDay::from_index(i).unwrap();
            assert_eq!(ws.index(), i);
        }
        assert!(WeekStartDay::from_index(7).is_none());
        assert_eq!(WeekStartDay::from_index(1), Some(WeekStartDay::MONDAY));
    }

    #[test]
    fn test_days_since_start() {
        assert_eq!(WeekStartDay::SUNDAY.days_since_start(Weekday::Sun), 0);
        assert_eq!(WeekStartDay::SUNDAY.days_since_start(Weekday::Sat), 6);
        assert_eq!(WeekStartDay::MONDAY.days_since_start(Weekday::Sun), 6);
        assert_eq!(WeekStartDay::MONDAY.days_since_start(Weekday::Wed), 2);
    }

    #[test]
    fn test_settings_toml_defaults_fill_missing_keys() {
        let settings = Settings::from_toml_str("week_starts_on = 1\ntime_format = \"24\"\n")
            .unwrap();
        assert_eq!(settings.week_starts_on, WeekStartDay::MONDAY);
        assert_eq!(settings.time_format, TimeFormat::TwentyFourHour);
        assert_eq!(settings.default_view, ViewKind::Week);
        assert_eq!(settings.default_reminder, Notification::MinutesBefore(30));
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = Settings {
            show_week_numbers: true,
            default_reminder: Notification::None,
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"default_reminder\":\"none\""), "got: {json}");
        assert_eq!(Settings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_settings_rejects_bad_week_start() {
        let err = Settings::from_toml_str("week_starts_on = 9").unwrap_err();
        assert!(err.to_string().contains("Invalid settings"), "got: {err}");
    }

    #[test]
    fn test_settings_rejects_unknown_timezone() {
        let err = Settings::from_toml_str("default_timezone = \"Mars/Olympus\"").unwrap_err();
        assert!(err.to_string().contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_clock_zone_local_is_none() {
        assert!(Settings::default().clock_zone().unwrap().is_none());
        let tokyo = Settings {
            default_timezone: "Asia/Tokyo".to_string(),
            ..Settings::default()
        };
        assert_eq!(tokyo.clock_zone().unwrap(), Some(chrono_tz::Asia::Tokyo));
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("settings.json");
        std::fs::write(&json_path, r#"{"show_week_numbers": true}"#).unwrap();
        assert!(Settings::load(&json_path).unwrap().show_week_numbers);

        let toml_path = dir.path().join("settings.toml");
        std::fs::write(&toml_path, "default_view = \"month\"\n").unwrap();
        assert_eq!(Settings::load(&toml_path).unwrap().default_view, ViewKind::Month);
    }
}
