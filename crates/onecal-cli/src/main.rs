//! onecal CLI
//!
//! Renders calendar views and quick-adds events from plain text against a
//! JSON event file.

#![allow(clippy::print_stdout)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use onecal_engine::{
    events_for_view, group_by_day, holidays, iso_week_number, parse_date_attribute, view_range,
    CalendarEvent, DateFormatter, EventStore, QuickAdd, Settings, ViewKind, ViewRange,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// onecal CLI
#[derive(Parser)]
#[command(name = "onecal")]
#[command(author, version, about = "Calendar views and natural-language quick add", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Event store snapshot (JSON)
    #[arg(short, long, global = true)]
    events: Option<PathBuf>,

    /// Reference time, e.g. 2026-02-18T10:00 (default: the local clock)
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse quick-add text and print the draft as JSON
    Parse {
        /// Text such as "Lunch with Sam tomorrow at 1pm"
        text: String,
    },

    /// Print a calendar view and the events it shows
    View {
        /// day, week, month, year or list (default: from settings)
        #[arg(short, long)]
        kind: Option<ViewKind>,

        /// Anchor date, YYYY-MM-DD (default: today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Print the ISO-8601 week number of a date
    WeekNumber {
        /// Date, YYYY-MM-DD
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Create an event from quick-add text and save it to the event file
    Add {
        /// Text such as "Dentist friday at 9:30am for Personal"
        text: String,
    },

    /// Search events by title, description or location
    Search {
        /// At least two characters
        query: String,
    },

    /// Merge a year of Bangladesh public holidays into the event file
    Holidays {
        /// Calendar year (default: the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got '{s}'"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_date_attribute(s).map_err(|e| e.to_string())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let settings = Settings::load(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    Ok(settings)
}

/// A missing event file is an empty store.
fn load_store(path: Option<&Path>) -> anyhow::Result<EventStore> {
    match path {
        Some(path) if path.exists() => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            EventStore::from_json(&json)
                .with_context(|| format!("failed to parse {}", path.display()))
        },
        _ => Ok(EventStore::default()),
    }
}

fn save_store(store: &EventStore, path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        bail!("--events <FILE> is required to save events");
    };
    fs::write(path, store.to_json()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), events = store.events().len(), "saved event store");
    Ok(())
}

fn print_event(event: &CalendarEvent, formatter: &DateFormatter) {
    let location = event
        .location
        .as_deref()
        .map(|l| format!(" @ {l}"))
        .unwrap_or_default();
    println!(
        "  {} {}  {}{} [{}]",
        formatter.format_month_day(event.start_date.date()),
        formatter.format_time(event.start_date.time()),
        event.title,
        location,
        event.calendar
    );
}

fn print_grid(range: &ViewRange, settings: &Settings, formatter: &DateFormatter) {
    let initials = formatter.weekday_initials(settings.week_starts_on).join("  ");
    if settings.show_week_numbers {
        println!("     {initials}");
    } else {
        println!("{initials}");
    }
    for week in range.cells.chunks(7) {
        let days: Vec<String> = week
            .iter()
            .map(|cell| {
                let day = cell.date.day();
                match (cell.is_today, cell.is_current_period) {
                    (true, _) => format!("[{day}]"),
                    (false, true) => format!("{day:>2}"),
                    (false, false) => " .".to_string(),
                }
            })
            .collect();
        match week.first().and_then(|c| c.week_number) {
            Some(n) => println!("W{n:<2}  {}", days.join(" ")),
            None => println!("{}", days.join(" ")),
        }
    }
}

fn run_view(
    store: &EventStore,
    settings: &Settings,
    kind: ViewKind,
    anchor: NaiveDate,
    now: NaiveDateTime,
) {
    let formatter = DateFormatter::english(settings.time_format);
    let range = view_range(kind, anchor, now, settings);
    println!("{}", formatter.format_range_title(&range));

    match kind {
        ViewKind::Month => print_grid(&range, settings, &formatter),
        ViewKind::Year => {
            for grid in &range.months {
                println!("{}: {} days shown", grid.month, grid.cells.len());
            }
        },
        _ => {},
    }

    let events = events_for_view(store.events(), &range, |c| store.is_calendar_visible(c));
    if events.is_empty() {
        println!("No events");
        return;
    }
    for group in group_by_day(&events) {
        println!("{}", formatter.format_full_date(group.date));
        for event in group.events {
            print_event(event, &formatter);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(cli.verbose)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = load_settings(cli.config.as_deref())?;
    let now = cli.now.unwrap_or_else(|| Local::now().naive_local());
    let events_path = cli.events.as_deref();

    match cli.command {
        Commands::Parse { text } => {
            let store = load_store(events_path)?;
            let draft = QuickAdd::new(store.sources(), &settings).parse(&text, now);
            println!("{}", serde_json::to_string_pretty(&draft)?);
        },

        Commands::View { kind, date } => {
            let store = load_store(events_path)?;
            let kind = kind.unwrap_or(settings.default_view);
            run_view(&store, &settings, kind, date.unwrap_or(now.date()), now);
        },

        Commands::WeekNumber { date } => {
            println!("{}", iso_week_number(date));
        },

        Commands::Add { text } => {
            let mut store = load_store(events_path)?;
            let Some(new_event) = QuickAdd::new(store.sources(), &settings).create(&text, now)
            else {
                bail!("could not understand '{text}'");
            };
            let id = store.add(new_event)?;
            save_store(&store, events_path)?;

            let formatter = DateFormatter::english(settings.time_format);
            let event = store
                .get(&id)
                .context("event missing right after insert")?;
            println!("Added event {id}:");
            print_event(event, &formatter);
        },

        Commands::Search { query } => {
            let store = load_store(events_path)?;
            let formatter = DateFormatter::english(settings.time_format);
            let results = store.search(&query);
            if results.is_empty() {
                println!("No matches for '{query}'");
            }
            for event in results {
                print_event(event, &formatter);
            }
        },

        Commands::Holidays { year } => {
            let mut store = load_store(events_path)?;
            let (source, events) = holidays::bangladesh(year.unwrap_or(now.year()));
            let added = store.merge_holidays(source, events);
            save_store(&store, events_path)?;
            println!("Added {added} holidays");
        },
    }

    Ok(())
}
