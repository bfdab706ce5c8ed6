//! Natural-language quick-add parsing.
//!
//! [`parse_event_text`] turns a line such as
//! `"Team sync tomorrow at 9:30am at Room B for Work"` into a
//! [`ParsedEventDraft`]. Extraction runs in a fixed order (time, date,
//! location, calendar, title) and every successful pass removes its match
//! from the remaining text, so later passes never see consumed tokens.
//!
//! The parser is total: it never fails and never panics. Fields it cannot
//! find are left as `None` for the caller to default. "Now" is always passed
//! in; nothing here reads the system clock.
//!
//! # Hour ambiguity
//!
//! A time without `am`/`pm` keeps its hour as written and is read on a
//! 24-hour clock, so `"at 3"` is 03:00. The parser does not guess PM.
//!
//! # Weekdays
//!
//! Full names bind anywhere (`"Yoga monday"`). Abbreviations such as `mon`
//! or `sun` only bind after `on`, `this` or `next`, so `"Drinks at Sun Bar"`
//! keeps its location.
//!
//! # Titles
//!
//! Text in which no pass matched comes back unchanged as the title, spacing
//! and punctuation included. Once a pass consumed something, the leftover
//! words are tidied: whitespace collapsed, a trailing `with <name>` clause
//! and dangling connectors dropped.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `[at|@] <hour>[:<minute>][am|pm]`
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\bat\s+|@\s*)?\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\b")
        .expect("time pattern is valid")
});

static ANCHOR_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(today|tomorrow)\b").expect("day pattern is valid"));

/// `[on|this] [next] <weekday>`
static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(on|this)\s+)?(?:(next)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday|tues|thurs|mon|tue|wed|thu|fri|sat|sun)\b",
    )
    .expect("weekday pattern is valid")
});

/// `(at|in) <words>` up to a comma or the end of the text.
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:at|in)\s+([^,]+)").expect("location pattern is valid")
});

/// Clause that ends a location phrase.
static LOCATION_STOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:on|for|with)\s+").expect("location stop pattern is valid")
});

static BARE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}(?::\d{2})?\s*(?:am|pm)?$").expect("bare time pattern is valid")
});

static WITH_CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+with\s+.*$").expect("with pattern is valid"));

/// Words left dangling at the end of a title once their object was consumed.
const DANGLING_WORDS: &[&str] = &["at", "on", "in", "for", "with", "@", "-"];

/// The structured result of parsing one line of text.
///
/// Only `title` is required for the draft to be usable; the caller defaults
/// the rest (date to today, calendar to the default source).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEventDraft {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    /// A calendar name exactly as the caller spelled it.
    pub calendar: Option<String>,
}

impl ParsedEventDraft {
    pub fn is_usable(&self) -> bool {
        self.title.is_some()
    }
}

/// Parse free text into a [`ParsedEventDraft`].
///
/// # Arguments
///
/// * `text` — One line of user input
/// * `calendar_names` — Names of the known calendars; only these bind after
///   `in`/`on`/`for`
/// * `now` — The reference moment for `today`, `tomorrow` and weekdays
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use onecal_engine::parse_event_text;
///
/// // Wednesday, February 18, 2026
/// let now = NaiveDate::from_ymd_opt(2026, 2, 18).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let draft = parse_event_text("Meeting with Sarah tomorrow at 3pm", &["Work"], now);
/// assert_eq!(draft.title.as_deref(), Some("Meeting"));
/// assert_eq!(draft.date, NaiveDate::from_ymd_opt(2026, 2, 19));
/// assert_eq!(draft.time, NaiveTime::from_hms_opt(15, 0, 0));
/// ```
pub fn parse_event_text<S: AsRef<str>>(
    text: &str,
    calendar_names: &[S],
    now: NaiveDateTime,
) -> ParsedEventDraft {
    let original = text.trim();
    if original.is_empty() {
        return ParsedEventDraft::default();
    }

    let calendar_re = build_calendar_regex(calendar_names);
    let mut remaining = original.to_string();
    let mut consumed = false;
    let mut draft = ParsedEventDraft::default();

    if let Some((time, span)) = extract_time(&remaining) {
        draft.time = Some(time);
        remaining = cut(&remaining, span);
        consumed = true;
    }

    if let Some((date, span)) = extract_date(&remaining, draft.time, now) {
        draft.date = Some(date);
        remaining = cut(&remaining, span);
        consumed = true;
    } else if draft.time.is_some() {
        draft.date = Some(now.date());
    }

    if let Some((location, span)) = extract_location(&remaining, calendar_re.as_ref()) {
        draft.location = Some(location);
        remaining = cut(&remaining, span);
        consumed = true;
    }

    if let Some(re) = &calendar_re {
        if let Some((name, span)) = extract_calendar(&remaining, re, calendar_names) {
            draft.calendar = Some(name);
            remaining = cut(&remaining, span);
            consumed = true;
        }
    }

    let title = if consumed {
        clean_title(&remaining)
    } else {
        String::new()
    };
    draft.title = Some(if title.is_empty() {
        original.to_string()
    } else {
        title
    });

    debug!(
        title = ?draft.title,
        date = ?draft.date,
        time = ?draft.time,
        location = ?draft.location,
        calendar = ?draft.calendar,
        "parsed quick-add text"
    );
    draft
}

// ── Extraction passes ───────────────────────────────────────────────────────

/// First acceptable time token. A token without the `at`/`@` prefix must carry
/// minutes or a meridiem, so bare numbers ("Room 5") are not times.
fn extract_time(text: &str) -> Option<(NaiveTime, Range<usize>)> {
    TIME_RE.captures_iter(text).find_map(|caps| {
        let prefixed = caps.get(1).is_some();
        let minute_str = caps.get(3).map(|m| m.as_str());
        let meridiem = caps.get(4).map(|m| m.as_str().to_ascii_lowercase());
        if !prefixed && minute_str.is_none() && meridiem.is_none() {
            return None;
        }

        let hour: u32 = caps.get(2)?.as_str().parse().ok()?;
        let minute: u32 = match minute_str {
            Some(m) => m.parse().ok()?,
            None => 0,
        };
        let hour24 = match meridiem.as_deref() {
            Some("pm") if (1..12).contains(&hour) => hour + 12,
            Some("pm") if hour == 12 => 12,
            Some("am") if hour == 12 => 0,
            Some("am") if (1..12).contains(&hour) => hour,
            Some(_) => return None,
            None => hour,
        };
        let time = NaiveTime::from_hms_opt(hour24, minute, 0)?;
        Some((time, caps.get(0)?.range()))
    })
}

/// `today`/`tomorrow`, else a (possibly `next`) weekday.
fn extract_date(
    text: &str,
    time: Option<NaiveTime>,
    now: NaiveDateTime,
) -> Option<(NaiveDate, Range<usize>)> {
    let today = now.date();

    if let Some(caps) = ANCHOR_DAY_RE.captures(text) {
        let word = caps.get(1)?.as_str().to_ascii_lowercase();
        let date = if word == "tomorrow" {
            today.succ_opt()?
        } else {
            today
        };
        return Some((date, caps.get(0)?.range()));
    }

    // Abbreviations need a prefix
    let caps = WEEKDAY_RE.captures_iter(text).find(|caps| {
        let prefixed = caps.get(1).is_some() || caps.get(2).is_some();
        let full_name = caps
            .get(3)
            .is_some_and(|m| m.as_str().to_ascii_lowercase().ends_with("day"));
        prefixed || full_name
    })?;
    let is_next = caps.get(2).is_some();
    let target = parse_weekday(&caps.get(3)?.as_str().to_ascii_lowercase())?;

    let mut days_ahead = (target.num_days_from_sunday() as i64
        - today.weekday().num_days_from_sunday() as i64
        + 7)
        % 7;
    // Today only counts when an explicit time is still ahead of now.
    let later_today = time.is_some_and(|t| t > now.time());
    if (days_ahead == 0 && !later_today) || is_next {
        days_ahead += 7;
    }
    let date = today.checked_add_signed(TimeDelta::days(days_ahead))?;
    Some((date, caps.get(0)?.range()))
}

/// `(at|in) <words>`, truncated before an `on`/`for`/`with` clause or a
/// calendar clause. Bare time tokens and calendar names are not locations.
fn extract_location(
    text: &str,
    calendar_re: Option<&Regex>,
) -> Option<(String, Range<usize>)> {
    let mut search_from = 0;
    while let Some(caps) = LOCATION_RE.captures_at(text, search_from) {
        let whole = caps.get(0)?;
        let words = caps.get(1)?;
        let phrase = words.as_str();

        let mut end = phrase.len();
        if let Some(stop) = LOCATION_STOP_RE.find(phrase) {
            end = end.min(stop.start());
        }
        if let Some(stop) = calendar_re.and_then(|re| re.find(phrase)) {
            end = end.min(stop.start());
        }
        let candidate = collapse_whitespace(&phrase[..end]);

        let is_calendar = calendar_re.is_some_and(|re| {
            let phrase = format!("in {candidate}");
            re.find(&phrase)
                .is_some_and(|m| m.start() == 0 && m.end() == phrase.len())
        });
        if !candidate.is_empty() && !BARE_TIME_RE.is_match(&candidate) && !is_calendar {
            return Some((candidate, whole.start()..words.start() + end));
        }
        search_from = words.start();
    }
    None
}

/// `(in|on|for) <known calendar>`, returning the caller's spelling.
fn extract_calendar<S: AsRef<str>>(
    text: &str,
    re: &Regex,
    calendar_names: &[S],
) -> Option<(String, Range<usize>)> {
    let caps = re.captures(text)?;
    let matched = caps.get(1)?.as_str().to_lowercase();
    let name = calendar_names
        .iter()
        .map(AsRef::as_ref)
        .find(|name| name.trim().to_lowercase() == matched)?;
    Some((name.trim().to_string(), caps.get(0)?.range()))
}

/// Case-insensitive `(in|on|for) <name>` over the known names, longest first
/// so "Work Travel" wins over "Work".
fn build_calendar_regex<S: AsRef<str>>(calendar_names: &[S]) -> Option<Regex> {
    let mut names: Vec<&str> = calendar_names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let alternation = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&format!(r"\b(?:in|on|for)\s+({alternation})(?:\b|$)"))
        .case_insensitive(true)
        .build()
        .ok()
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Replace `span` with a single space.
fn cut(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push(' ');
    out.push_str(&text[span.end..]);
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace, drop a trailing `with <Name>` clause and any
/// connector words left dangling at the end.
fn clean_title(remaining: &str) -> String {
    let collapsed = collapse_whitespace(remaining);
    let without_with = WITH_CLAUSE_RE.replace(&collapsed, "");
    let mut words: Vec<&str> = without_with
        .split_whitespace()
        .map(|w| w.trim_end_matches(','))
        .filter(|w| !w.is_empty())
        .collect();
    while let Some(last) = words.last() {
        if DANGLING_WORDS.iter().any(|d| d.eq_ignore_ascii_case(last)) {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}

// ── Tests ───────────────────────────────────────────────────────────────────
