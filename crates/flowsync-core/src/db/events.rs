//! Calendar event operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_datetime, parse_datetime, parse_enum, Database};
use crate::error::{Error, Result};
use crate::models::{validate_span, DayWindow, Event, EventUpdate, NewEvent};

const EVENT_COLUMNS: &str = "id, user_id, title, start_at, end_at, category, location, \
     attendees, description, appointment_id, created_at";

impl Database {
    /// Create a calendar event for a user
    pub fn create_event(&self, user_id: &str, event: &NewEvent) -> Result<Event> {
        event.validate()?;
        let conn = self.conn()?;
        let id = insert_event(&conn, user_id, event, None)?;
        drop(conn);

        self.get_event(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Event {} not found after insert", id)))
    }

    /// Get a single event owned by the user
    pub fn get_event(&self, user_id: &str, id: i64) -> Result<Option<Event>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM events WHERE user_id = ? AND id = ?",
            EVENT_COLUMNS
        );
        let event = conn
            .query_row(&sql, params![user_id, id], row_to_event)
            .optional()?;
        Ok(event)
    }

    /// List events overlapping `[from, to)`, ordered by start time
    pub fn list_events_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM events
            WHERE user_id = ? AND start_at < ? AND end_at > ?
            ORDER BY start_at, id
            "#,
            EVENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![user_id, format_datetime(&to), format_datetime(&from)],
            row_to_event,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// List events overlapping one local day
    pub fn list_events_for_day(&self, user_id: &str, window: &DayWindow) -> Result<Vec<Event>> {
        self.list_events_between(user_id, window.start, window.end)
    }

    /// Apply a partial update to an event
    pub fn update_event(&self, user_id: &str, id: i64, update: &EventUpdate) -> Result<Event> {
        let mut event = self
            .get_event(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Event {}", id)))?;

        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidData("Event title cannot be empty".to_string()));
            }
            event.title = title.trim().to_string();
        }
        if let Some(start) = update.start {
            event.start = start;
        }
        if let Some(end) = update.end {
            event.end = end;
        }
        if let Some(category) = update.category {
            event.category = category;
        }
        if update.location.is_some() {
            event.location = update.location.clone();
        }
        if update.attendees.is_some() {
            event.attendees = update.attendees;
        }
        if update.description.is_some() {
            event.description = update.description.clone();
        }
        validate_span(event.start, event.end)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE events
            SET title = ?, start_at = ?, end_at = ?, category = ?, location = ?,
                attendees = ?, description = ?
            WHERE user_id = ? AND id = ?
            "#,
            params![
                event.title,
                format_datetime(&event.start),
                format_datetime(&event.end),
                event.category.as_str(),
                event.location,
                event.attendees,
                event.description,
                user_id,
                id
            ],
        )?;

        Ok(event)
    }

    /// Delete an event; returns false if it did not exist
    pub fn delete_event(&self, user_id: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM events WHERE user_id = ? AND id = ?",
            params![user_id, id],
        )?;
        Ok(deleted > 0)
    }
}

/// Insert an event on an existing connection (shared with appointment confirmation)
pub(super) fn insert_event(
    conn: &Connection,
    user_id: &str,
    event: &NewEvent,
    appointment_id: Option<i64>,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO events (user_id, title, start_at, end_at, category, location,
                            attendees, description, appointment_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            user_id,
            event.title.trim(),
            format_datetime(&event.start),
            format_datetime(&event.end),
            event.category.as_str(),
            event.location,
            event.attendees,
            event.description,
            appointment_id,
            format_datetime(&Utc::now())
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;
    let category: String = row.get(5)?;
    let created_at: String = row.get(10)?;

    Ok(Event {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        start: parse_datetime(3, &start)?,
        end: parse_datetime(4, &end)?,
        category: parse_enum(5, &category)?,
        location: row.get(6)?,
        attendees: row.get(7)?,
        description: row.get(8)?,
        appointment_id: row.get(9)?,
        created_at: parse_datetime(10, &created_at)?,
    })
}
