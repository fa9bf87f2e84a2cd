//! Appointment command implementations

use anyhow::{Context, Result};
use flowsync_core::booking::find_service;
use flowsync_core::db::Database;
use flowsync_core::models::{AppointmentStatus, NewAppointment};

use super::{parse_instant, truncate};

pub fn cmd_appointments_list(db: &Database, user: &str, status: Option<&str>) -> Result<()> {
    let status = status
        .map(|s| {
            s.parse::<AppointmentStatus>()
                .map_err(|e: String| anyhow::anyhow!(e))
        })
        .transpose()?;
    let appointments = db.list_appointments(user, status)?;

    if appointments.is_empty() {
        println!("No appointment requests.");
        return Ok(());
    }

    println!();
    println!("📅 Appointments");
    println!("   ─────────────────────────────────────────────────────────────");

    for appt in appointments {
        let status_icon = match appt.status {
            AppointmentStatus::Pending => "⏳",
            AppointmentStatus::Confirmed => "✅",
            AppointmentStatus::Declined => "❌",
        };

        println!(
            "   {} {:>4} │ {:20} │ {:24} │ {}",
            status_icon,
            appt.id,
            truncate(&appt.client_name, 20),
            truncate(&appt.service, 24),
            appt.requested_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_appointments_request(
    db: &Database,
    user: &str,
    client: &str,
    service: &str,
    at: &str,
    duration: Option<u32>,
    email: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    // Catalog entries are stored under their display name
    let catalog = find_service(service);

    let new_appointment = NewAppointment {
        client_name: client.to_string(),
        client_email: email,
        client_phone: None,
        service: catalog
            .map(|s| s.name.to_string())
            .unwrap_or_else(|| service.to_string()),
        requested_at: parse_instant("at", at)?,
        duration_minutes: duration.or_else(|| catalog.map(|s| s.duration_minutes)),
        notes,
    };

    let appt = db
        .create_appointment(user, &new_appointment)
        .context("Failed to record appointment request")?;
    db.log_audit(
        user,
        "create",
        Some("appointment"),
        Some(appt.id),
        Some(&format!("service={}", appt.service)),
    )?;

    println!(
        "⏳ Request {} recorded: {} for {} at {}",
        appt.id,
        appt.service,
        appt.client_name,
        appt.requested_at.to_rfc3339()
    );

    Ok(())
}

pub fn cmd_appointments_confirm(db: &Database, user: &str, id: i64) -> Result<()> {
    let appt = db.confirm_appointment(user, id)?;
    db.log_audit(user, "confirm", Some("appointment"), Some(id), Some("cli"))?;

    match appt.event_id {
        Some(event_id) => println!(
            "✅ Appointment {} confirmed (calendar event {})",
            appt.id, event_id
        ),
        None => println!("✅ Appointment {} confirmed", appt.id),
    }
    Ok(())
}

pub fn cmd_appointments_decline(db: &Database, user: &str, id: i64) -> Result<()> {
    let appt = db.decline_appointment(user, id)?;
    db.log_audit(user, "decline", Some("appointment"), Some(id), Some("cli"))?;

    println!("❌ Appointment {} declined", appt.id);
    Ok(())
}
