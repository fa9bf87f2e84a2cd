//! Calendar command implementations

use anyhow::{Context, Result};
use chrono::FixedOffset;
use flowsync_core::db::Database;
use flowsync_core::models::{Event, EventCategory, NewEvent};
use flowsync_core::Config;

use super::{day_window, local_time, parse_instant, truncate};

fn category_icon(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Meeting => "👥",
        EventCategory::FocusTime => "🎯",
        EventCategory::TaskBlock => "🧱",
        EventCategory::Break => "☕",
        EventCategory::Appointment => "📅",
    }
}

/// One event per line, times in the configured offset
pub fn print_events(events: &[Event], offset: FixedOffset) {
    for event in events {
        let extra = match (&event.location, event.attendees) {
            (Some(loc), Some(n)) => format!("{} · {} attendees", loc, n),
            (Some(loc), None) => loc.clone(),
            (None, Some(n)) => format!("{} attendees", n),
            (None, None) => String::new(),
        };
        println!(
            "   {} {}-{} │ {:32} │ {}",
            category_icon(event.category),
            local_time(event.start, offset),
            local_time(event.end, offset),
            truncate(&event.title, 32),
            extra
        );
    }
}

pub fn cmd_events_list(
    db: &Database,
    user: &str,
    config: &Config,
    date: Option<&str>,
) -> Result<()> {
    let window = day_window(config, date)?;
    let events = db.list_events_for_day(user, &window)?;

    if events.is_empty() {
        println!("No events on {}.", window.date);
        return Ok(());
    }

    println!();
    println!("🗓️  Events on {}", window.date);
    println!("   ─────────────────────────────────────────────────────────────");
    print_events(&events, config.calendar.offset()?);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_events_add(
    db: &Database,
    user: &str,
    title: &str,
    start: &str,
    end: &str,
    category: &str,
    location: Option<String>,
    attendees: Option<u32>,
) -> Result<()> {
    let category = category
        .parse::<EventCategory>()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let new_event = NewEvent {
        title: title.to_string(),
        start: parse_instant("start", start)?,
        end: parse_instant("end", end)?,
        category,
        location,
        attendees,
        description: None,
    };

    let event = db
        .create_event(user, &new_event)
        .context("Failed to create event")?;
    db.log_audit(user, "create", Some("event"), Some(event.id), Some("cli"))?;

    println!(
        "✅ Added {} {} ({} - {})",
        event.category,
        event.id,
        event.start.to_rfc3339(),
        event.end.to_rfc3339()
    );

    Ok(())
}

pub fn cmd_events_delete(db: &Database, user: &str, id: i64) -> Result<()> {
    if !db.delete_event(user, id)? {
        anyhow::bail!("Event not found: {}", id);
    }
    db.log_audit(user, "delete", Some("event"), Some(id), Some("cli"))?;

    println!("🗑️  Event {} deleted", id);
    Ok(())
}
