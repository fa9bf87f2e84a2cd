//! Task board operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_datetime, parse_enum, Database};
use crate::error::{Error, Result};
use crate::models::{BoardSummary, NewTask, Task, TaskStatus, TaskUpdate};

const TASK_COLUMNS: &str = "id, user_id, title, description, priority, status, due_at, \
     estimated_minutes, energy, category, created_at, updated_at";

/// Board order: column, then most pressing priority first
const TASK_ORDER: &str = r#"
    ORDER BY
        CASE status
            WHEN 'todo' THEN 1
            WHEN 'in_progress' THEN 2
            WHEN 'review' THEN 3
            ELSE 4
        END,
        CASE priority
            WHEN 'urgent' THEN 1
            WHEN 'high' THEN 2
            WHEN 'medium' THEN 3
            ELSE 4
        END,
        id
"#;

impl Database {
    /// Create a task for a user
    pub fn create_task(&self, user_id: &str, task: &NewTask) -> Result<Task> {
        task.validate()?;
        let conn = self.conn()?;
        let now = format_datetime(&Utc::now());

        conn.execute(
            r#"
            INSERT INTO tasks (user_id, title, description, priority, status, due_at,
                               estimated_minutes, energy, category, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                task.title.trim(),
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                task.due_at.as_ref().map(format_datetime),
                task.estimated_minutes,
                task.energy,
                task.category,
                now,
                now
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_task(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Task {} not found after insert", id)))
    }

    /// Get a single task owned by the user
    pub fn get_task(&self, user_id: &str, id: i64) -> Result<Option<Task>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = ? AND id = ?",
            TASK_COLUMNS
        );
        let task = conn
            .query_row(&sql, params![user_id, id], row_to_task)
            .optional()?;
        Ok(task)
    }

    /// List a user's tasks, optionally limited to one column
    pub fn list_tasks(&self, user_id: &str, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let conn = self.conn()?;

        let tasks = if let Some(s) = status {
            let sql = format!(
                "SELECT {} FROM tasks WHERE user_id = ? AND status = ? {}",
                TASK_COLUMNS, TASK_ORDER
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id, s.as_str()], row_to_task)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let sql = format!(
                "SELECT {} FROM tasks WHERE user_id = ? {}",
                TASK_COLUMNS, TASK_ORDER
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id], row_to_task)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(tasks)
    }

    /// List tasks that are not done
    pub fn list_open_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = ? AND status != 'done' {}",
            TASK_COLUMNS, TASK_ORDER
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], row_to_task)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Apply a partial update to a task
    pub fn update_task(&self, user_id: &str, id: i64, update: &TaskUpdate) -> Result<Task> {
        update.validate()?;
        let mut task = self
            .get_task(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Task {}", id)))?;

        if let Some(title) = &update.title {
            task.title = title.trim().to_string();
        }
        if update.description.is_some() {
            task.description = update.description.clone();
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if update.due_at.is_some() {
            task.due_at = update.due_at;
        }
        if update.estimated_minutes.is_some() {
            task.estimated_minutes = update.estimated_minutes;
        }
        if update.energy.is_some() {
            task.energy = update.energy;
        }
        if update.category.is_some() {
            task.category = update.category.clone();
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, priority = ?, status = ?, due_at = ?,
                estimated_minutes = ?, energy = ?, category = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
            params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                task.due_at.as_ref().map(format_datetime),
                task.estimated_minutes,
                task.energy,
                task.category,
                format_datetime(&Utc::now()),
                user_id,
                id
            ],
        )?;
        drop(conn);

        self.get_task(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Task {}", id)))
    }

    /// Move a task to another board column
    pub fn move_task(&self, user_id: &str, id: i64, status: TaskStatus) -> Result<Task> {
        self.update_task(
            user_id,
            id,
            &TaskUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    /// Delete a task; returns false if it did not exist
    pub fn delete_task(&self, user_id: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM tasks WHERE user_id = ? AND id = ?",
            params![user_id, id],
        )?;
        Ok(deleted > 0)
    }

    /// Count tasks per column for the board header
    pub fn board_summary(&self, user_id: &str) -> Result<BoardSummary> {
        let conn = self.conn()?;
        let mut summary = BoardSummary::default();

        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM tasks WHERE user_id = ? GROUP BY status")?;
        let rows = stmt.query_map(params![user_id], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;

        for row in rows {
            let (status, count) = row?;
            match status.parse::<TaskStatus>() {
                Ok(TaskStatus::Todo) => summary.todo = count,
                Ok(TaskStatus::InProgress) => summary.in_progress = count,
                Ok(TaskStatus::Review) => summary.review = count,
                Ok(TaskStatus::Done) => summary.done = count,
                Err(e) => tracing::warn!(error = %e, "Skipping unknown task status"),
            }
        }

        summary.open = summary.todo + summary.in_progress + summary.review;
        summary.open_high_priority = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ? AND status != 'done' AND priority = 'high'",
            params![user_id],
            |row| row.get(0),
        )?;

        Ok(summary)
    }
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let priority: String = row.get(4)?;
    let status: String = row.get(5)?;
    let due_at: Option<String> = row.get(6)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;

    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        priority: parse_enum(4, &priority)?,
        status: parse_enum(5, &status)?,
        due_at: due_at.map(|s| parse_datetime(6, &s)).transpose()?,
        estimated_minutes: row.get(7)?,
        energy: row.get(8)?,
        category: row.get(9)?,
        created_at: parse_datetime(10, &created_at)?,
        updated_at: parse_datetime(11, &updated_at)?,
    })
}
