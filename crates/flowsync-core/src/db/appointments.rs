//! Appointment booking operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tracing::info;

use super::events::insert_event;
use super::{format_datetime, parse_datetime, parse_enum, Database};
use crate::error::{Error, Result};
use crate::models::{Appointment, AppointmentStatus, EventCategory, NewAppointment, NewEvent};

const APPOINTMENT_COLUMNS: &str = "id, user_id, client_name, client_email, client_phone, \
     service, requested_at, duration_minutes, notes, status, event_id, created_at";

impl Database {
    /// Record a new booking request (always starts pending)
    pub fn create_appointment(&self, user_id: &str, appt: &NewAppointment) -> Result<Appointment> {
        appt.validate()?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO appointments (user_id, client_name, client_email, client_phone, service,
                                      requested_at, duration_minutes, notes, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
            params![
                user_id,
                appt.client_name.trim(),
                appt.client_email,
                appt.client_phone,
                appt.service.trim(),
                format_datetime(&appt.requested_at),
                appt.duration_minutes,
                appt.notes,
                format_datetime(&Utc::now())
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_appointment(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Appointment {} not found after insert", id)))
    }

    /// Get a single appointment owned by the user
    pub fn get_appointment(&self, user_id: &str, id: i64) -> Result<Option<Appointment>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM appointments WHERE user_id = ? AND id = ?",
            APPOINTMENT_COLUMNS
        );
        let appt = conn
            .query_row(&sql, params![user_id, id], row_to_appointment)
            .optional()?;
        Ok(appt)
    }

    /// List appointments ordered by requested time, optionally filtered by status
    pub fn list_appointments(
        &self,
        user_id: &str,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>> {
        let conn = self.conn()?;

        let appts = if let Some(s) = status {
            let sql = format!(
                "SELECT {} FROM appointments WHERE user_id = ? AND status = ? ORDER BY requested_at, id",
                APPOINTMENT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id, s.as_str()], row_to_appointment)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let sql = format!(
                "SELECT {} FROM appointments WHERE user_id = ? ORDER BY requested_at, id",
                APPOINTMENT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id], row_to_appointment)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(appts)
    }

    /// Pending booking requests awaiting review
    pub fn list_pending_appointments(&self, user_id: &str) -> Result<Vec<Appointment>> {
        self.list_appointments(user_id, Some(AppointmentStatus::Pending))
    }

    /// Confirm a pending appointment and place it on the calendar
    ///
    /// The status change and the derived event insert happen in one immediate
    /// transaction. The update only matches a pending row, so concurrent
    /// confirms or a racing decline cannot both win.
    pub fn confirm_appointment(&self, user_id: &str, id: i64) -> Result<Appointment> {
        let appt = self
            .get_appointment(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Appointment {}", id)))?;

        let event = NewEvent {
            title: format!("{} with {}", appt.service, appt.client_name),
            start: appt.requested_at,
            end: appt.end(),
            category: EventCategory::Appointment,
            location: None,
            attendees: Some(2),
            description: appt.notes.clone(),
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let claimed = tx.execute(
            "UPDATE appointments SET status = 'confirmed' \
             WHERE user_id = ? AND id = ? AND status = 'pending'",
            params![user_id, id],
        )?;
        if claimed == 0 {
            drop(tx);
            drop(conn);
            return Err(self.not_pending(user_id, id));
        }

        let event_id = insert_event(&tx, user_id, &event, Some(id))?;
        tx.execute(
            "UPDATE appointments SET event_id = ? WHERE user_id = ? AND id = ?",
            params![event_id, user_id, id],
        )?;
        tx.commit()?;
        drop(conn);

        info!(appointment_id = id, event_id, "Appointment confirmed");

        self.get_appointment(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Appointment {}", id)))
    }

    /// Decline a pending appointment
    pub fn decline_appointment(&self, user_id: &str, id: i64) -> Result<Appointment> {
        let conn = self.conn()?;
        let declined = conn.execute(
            "UPDATE appointments SET status = 'declined' \
             WHERE user_id = ? AND id = ? AND status = 'pending'",
            params![user_id, id],
        )?;
        drop(conn);

        if declined == 0 {
            return Err(self.not_pending(user_id, id));
        }

        self.get_appointment(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Appointment {}", id)))
    }

    /// Error for a status change that matched no pending row
    fn not_pending(&self, user_id: &str, id: i64) -> Error {
        match self.get_appointment(user_id, id) {
            Ok(Some(appt)) => {
                Error::Conflict(format!("Appointment {} is already {}", id, appt.status))
            }
            Ok(None) => Error::NotFound(format!("Appointment {}", id)),
            Err(e) => e,
        }
    }

    /// Delete an appointment; a derived event stays on the calendar
    pub fn delete_appointment(&self, user_id: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM appointments WHERE user_id = ? AND id = ?",
            params![user_id, id],
        )?;
        Ok(deleted > 0)
    }
}

fn row_to_appointment(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    let requested_at: String = row.get(6)?;
    let status: String = row.get(9)?;
    let created_at: String = row.get(11)?;

    Ok(Appointment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        client_name: row.get(2)?,
        client_email: row.get(3)?,
        client_phone: row.get(4)?,
        service: row.get(5)?,
        requested_at: parse_datetime(6, &requested_at)?,
        duration_minutes: row.get(7)?,
        notes: row.get(8)?,
        status: parse_enum(9, &status)?,
        event_id: row.get(10)?,
        created_at: parse_datetime(11, &created_at)?,
    })
}
