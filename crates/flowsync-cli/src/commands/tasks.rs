//! Task board command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use flowsync_core::db::Database;
use flowsync_core::models::{DayWindow, NewTask, TaskPriority, TaskStatus};
use flowsync_core::Config;

use super::{parse_instant, truncate};

/// Optional fields for `tasks add`
#[derive(Debug, Default)]
pub struct TaskOptions {
    pub priority: String,
    pub due: Option<String>,
    pub estimate: Option<u32>,
    pub energy: Option<u8>,
    pub category: Option<String>,
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    s.parse::<TaskStatus>().map_err(|e: String| anyhow::anyhow!(e))
}

/// A bare date is due at the end of that local day
fn parse_due(config: &Config, value: &str) -> Result<DateTime<Utc>> {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(DayWindow::for_date(date, config.calendar.offset()?).end),
        Err(_) => parse_instant("due", value),
    }
}

fn priority_icon(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Urgent => "🔥",
        TaskPriority::High => "🔴",
        TaskPriority::Medium => "🟡",
        TaskPriority::Low => "🟢",
    }
}

pub fn cmd_tasks_list(db: &Database, user: &str, status: Option<&str>) -> Result<()> {
    let status = status.map(parse_status).transpose()?;
    let tasks = db.list_tasks(user, status)?;

    if tasks.is_empty() {
        println!("No tasks yet. Add one with:");
        println!("  flowsync tasks add \"Review Q4 budget\" --priority high");
        return Ok(());
    }

    let now = Utc::now();

    println!();
    println!("📋 Tasks");
    println!("   ─────────────────────────────────────────────────────────────");

    for task in tasks {
        let due = match task.due_at {
            Some(due) if task.is_overdue(now) => format!("⏰ overdue {}", due.format("%Y-%m-%d")),
            Some(due) => format!("due {}", due.format("%Y-%m-%d")),
            None => String::new(),
        };
        let estimate = task
            .estimated_minutes
            .map(|m| format!("{}m", m))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "   {} {:>4} │ {:36} │ {:11} │ {:>5} │ {}",
            priority_icon(task.priority),
            task.id,
            truncate(&task.title, 36),
            task.status.as_str(),
            estimate,
            due
        );
    }

    Ok(())
}

pub fn cmd_tasks_add(
    db: &Database,
    user: &str,
    config: &Config,
    title: &str,
    options: TaskOptions,
) -> Result<()> {
    let priority = options
        .priority
        .parse::<TaskPriority>()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let due_at = options
        .due
        .as_deref()
        .map(|d| parse_due(config, d))
        .transpose()?;

    let new_task = NewTask {
        title: title.to_string(),
        priority,
        due_at,
        estimated_minutes: options.estimate,
        energy: options.energy,
        category: options.category,
        ..Default::default()
    };

    let task = db
        .create_task(user, &new_task)
        .context("Failed to create task")?;
    db.log_audit(user, "create", Some("task"), Some(task.id), Some("cli"))?;

    println!(
        "✅ Added task {} ({}): {}",
        task.id,
        task.priority.as_str(),
        task.title
    );

    Ok(())
}

pub fn cmd_tasks_move(db: &Database, user: &str, id: i64, status: &str) -> Result<()> {
    let status = parse_status(status)?;
    let task = db.move_task(user, id, status)?;
    db.log_audit(
        user,
        "move",
        Some("task"),
        Some(id),
        Some(&format!("status={}", status)),
    )?;

    println!("✅ Task {} moved to {}", task.id, task.status.as_str());
    Ok(())
}

pub fn cmd_tasks_delete(db: &Database, user: &str, id: i64) -> Result<()> {
    if !db.delete_task(user, id)? {
        anyhow::bail!("Task not found: {}", id);
    }
    db.log_audit(user, "delete", Some("task"), Some(id), Some("cli"))?;

    println!("🗑️  Task {} deleted", id);
    Ok(())
}
