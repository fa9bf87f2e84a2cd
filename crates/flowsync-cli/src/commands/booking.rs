//! Booking catalog and slot commands

use anyhow::Result;
use chrono::Utc;
use flowsync_core::booking::{available_slots, find_service, SERVICES};
use flowsync_core::db::Database;
use flowsync_core::Config;

use super::day_window;

pub fn cmd_services() -> Result<()> {
    println!();
    println!("🛎️  Services");
    println!("   ─────────────────────────────────────────────");

    for service in SERVICES {
        let price = match service.price {
            0 => "free".to_string(),
            p => format!("${}", p),
        };
        println!(
            "   {:14} │ {:24} │ {:>3} min │ {}",
            service.id, service.name, service.duration_minutes, price
        );
    }

    Ok(())
}

pub fn cmd_slots(
    db: &Database,
    user: &str,
    config: &Config,
    service: &str,
    date: Option<&str>,
) -> Result<()> {
    let service = find_service(service).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown service: {}. Run 'flowsync services' to see the catalog",
            service
        )
    })?;
    let window = day_window(config, date)?;
    let offset = config.calendar.offset()?;

    let events = db.list_events_for_day(user, &window)?;
    let slots = available_slots(
        &window,
        offset,
        service.duration_minutes,
        &events,
        &config.calendar,
        Utc::now(),
    );

    println!();
    println!(
        "🕘 {} ({} min) on {}",
        service.name, service.duration_minutes, window.date
    );
    println!("   ─────────────────────────────");

    if slots.is_empty() {
        println!("   No slots fit inside the workday.");
        return Ok(());
    }

    for slot in &slots {
        let marker = if slot.available { "🟢" } else { "⚪" };
        println!("   {} {}", marker, slot.label);
    }

    let open = slots.iter().filter(|s| s.available).count();
    println!();
    println!("   {} of {} slots available", open, slots.len());

    Ok(())
}
