//! Data sources feeding the insight engine
//!
//! A [`DataSource`] supplies the three collections the evaluator needs for one
//! user and one day. The live source reads SQLite; the fixture source returns a
//! fixed sample day for demos and offline runs. The kind is chosen once at
//! startup.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::insights::Snapshot;
use crate::models::{
    Appointment, DayWindow, Event, EventCategory, Task, TaskPriority, TaskStatus,
};

/// Which data source implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    #[default]
    Live,
    Fixture,
}

impl DataSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fixture => "fixture",
        }
    }
}

impl std::str::FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" | "sqlite" => Ok(Self::Live),
            "fixture" | "static" | "mock" => Ok(Self::Fixture),
            _ => Err(format!("Unknown data source: {} (expected live or fixture)", s)),
        }
    }
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supplier of one user's day
///
/// Any failure is reported as [`Error::DataUnavailable`].
#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> DataSourceKind;

    /// Events overlapping the day window
    async fn fetch_today_events(&self, user_id: &str, window: &DayWindow) -> Result<Vec<Event>>;

    /// Tasks whose status is not done
    async fn fetch_open_tasks(&self, user_id: &str) -> Result<Vec<Task>>;

    /// Appointments awaiting confirmation
    async fn fetch_pending_appointments(&self, user_id: &str) -> Result<Vec<Appointment>>;
}

/// Build the configured source
pub fn build_source(kind: DataSourceKind, db: Database) -> Arc<dyn DataSource> {
    match kind {
        DataSourceKind::Live => Arc::new(LiveDataSource::new(db)),
        DataSourceKind::Fixture => Arc::new(StaticFixtureDataSource),
    }
}

/// Fetch all three collections concurrently
///
/// Fails as soon as any fetch fails; partial snapshots are never returned.
pub async fn collect_snapshot(
    source: &dyn DataSource,
    user_id: &str,
    window: &DayWindow,
) -> Result<Snapshot> {
    let (events, tasks, appointments) = tokio::try_join!(
        source.fetch_today_events(user_id, window),
        source.fetch_open_tasks(user_id),
        source.fetch_pending_appointments(user_id),
    )?;

    tracing::debug!(
        source = source.kind().as_str(),
        events = events.len(),
        tasks = tasks.len(),
        appointments = appointments.len(),
        "Snapshot collected"
    );

    Ok(Snapshot {
        events,
        tasks,
        appointments,
    })
}

// ============================================================================
// Live (SQLite)
// ============================================================================

/// Reads the user's day from the database
pub struct LiveDataSource {
    db: Database,
}

impl LiveDataSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run a blocking query on the pool off the async executor
    async fn query<T, F>(&self, what: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| Error::DataUnavailable(format!("{} query task failed: {}", what, e)))?
            .map_err(|e| match e {
                Error::DataUnavailable(_) => e,
                other => Error::DataUnavailable(format!("Failed to load {}: {}", what, other)),
            })
    }
}

#[async_trait]
impl DataSource for LiveDataSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Live
    }

    async fn fetch_today_events(&self, user_id: &str, window: &DayWindow) -> Result<Vec<Event>> {
        let user_id = user_id.to_string();
        let window = *window;
        self.query("events", move |db| db.list_events_for_day(&user_id, &window))
            .await
    }

    async fn fetch_open_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let user_id = user_id.to_string();
        self.query("tasks", move |db| db.list_open_tasks(&user_id))
            .await
    }

    async fn fetch_pending_appointments(&self, user_id: &str) -> Result<Vec<Appointment>> {
        let user_id = user_id.to_string();
        self.query("appointments", move |db| db.list_pending_appointments(&user_id))
            .await
    }
}

// ============================================================================
// Static fixture
// ============================================================================

/// A fixed sample day anchored to whatever window is requested
pub struct StaticFixtureDataSource;

impl StaticFixtureDataSource {
    fn local(window: &DayWindow, hour: i64, minute: i64) -> DateTime<Utc> {
        window.start + Duration::hours(hour) + Duration::minutes(minute)
    }

    /// The sample day's events, in start order
    pub fn events(user_id: &str, window: &DayWindow) -> Vec<Event> {
        let event = |id: i64,
                     title: &str,
                     start: (i64, i64),
                     end: (i64, i64),
                     category: EventCategory,
                     location: Option<&str>,
                     attendees: Option<u32>| Event {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            start: Self::local(window, start.0, start.1),
            end: Self::local(window, end.0, end.1),
            category,
            location: location.map(str::to_string),
            attendees,
            description: None,
            appointment_id: None,
            created_at: window.start,
        };

        vec![
            event(
                1,
                "Deep Work: Strategy Planning",
                (9, 0),
                (11, 0),
                EventCategory::FocusTime,
                None,
                None,
            ),
            event(2, "Lunch Break", (12, 0), (13, 0), EventCategory::Break, None, None),
            event(
                3,
                "Client Call - TechCorp",
                (14, 0),
                (15, 0),
                EventCategory::Meeting,
                Some("Zoom"),
                Some(4),
            ),
            event(
                4,
                "Team Standup",
                (16, 0),
                (16, 30),
                EventCategory::Meeting,
                Some("Conference Room B"),
                Some(8),
            ),
        ]
    }

    /// The sample board, including the finished task
    pub fn tasks(user_id: &str, created_at: DateTime<Utc>) -> Vec<Task> {
        let task = |id: i64,
                    title: &str,
                    status: TaskStatus,
                    priority: TaskPriority,
                    estimated_minutes: u32,
                    energy: u8,
                    category: &str| Task {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            priority,
            status,
            due_at: None,
            estimated_minutes: Some(estimated_minutes),
            energy: Some(energy),
            category: Some(category.to_string()),
            created_at,
            updated_at: created_at,
        };

        vec![
            task(1, "Review Q4 Budget", TaskStatus::Todo, TaskPriority::High, 120, 4, "Finance"),
            task(
                2,
                "Client Presentation",
                TaskStatus::InProgress,
                TaskPriority::High,
                90,
                5,
                "Sales",
            ),
            task(3, "Email Campaign", TaskStatus::Review, TaskPriority::Medium, 60, 2, "Marketing"),
            task(4, "Documentation", TaskStatus::Done, TaskPriority::Low, 45, 2, "Engineering"),
        ]
    }
}

#[async_trait]
impl DataSource for StaticFixtureDataSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Fixture
    }

    async fn fetch_today_events(&self, user_id: &str, window: &DayWindow) -> Result<Vec<Event>> {
        Ok(Self::events(user_id, window))
    }

    async fn fetch_open_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        Ok(Self::tasks(user_id, Utc::now())
            .into_iter()
            .filter(|t| t.is_open())
            .collect())
    }

    async fn fetch_pending_appointments(&self, _user_id: &str) -> Result<Vec<Appointment>> {
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{utc_offset, NewAppointment, NewEvent, NewTask};
    use chrono::{NaiveDate, TimeZone};

    fn window() -> DayWindow {
        DayWindow::for_date(
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            utc_offset(0).unwrap(),
        )
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("live".parse::<DataSourceKind>().unwrap(), DataSourceKind::Live);
        assert_eq!("Fixture".parse::<DataSourceKind>().unwrap(), DataSourceKind::Fixture);
        assert_eq!("static".parse::<DataSourceKind>().unwrap(), DataSourceKind::Fixture);
        assert!("remote".parse::<DataSourceKind>().is_err());
    }

    #[tokio::test]
    async fn test_fixture_day_is_anchored_to_window() {
        let source = StaticFixtureDataSource;
        let events = source.fetch_today_events("u", &window()).await.unwrap();

        assert_eq!(events.len(), 4);
        assert_eq!(events[0].title, "Deep Work: Strategy Planning");
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
        assert_eq!(events.iter().filter(|e| e.is_meeting()).count(), 2);
        assert!(events.iter().all(|e| window().contains(e.start)));
    }

    #[tokio::test]
    async fn test_fixture_excludes_done_tasks() {
        let source = StaticFixtureDataSource;
        let tasks = source.fetch_open_tasks("u").await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.is_open()));
        assert!(source.fetch_pending_appointments("u").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_source_reads_database() {
        let db = Database::in_memory().unwrap();
        let w = window();

        db.create_event(
            "u",
            &NewEvent {
                title: "Sync".to_string(),
                start: w.start + Duration::hours(10),
                end: w.start + Duration::hours(11),
                category: EventCategory::Meeting,
                location: None,
                attendees: Some(3),
                description: None,
            },
        )
        .unwrap();
        db.create_task("u", &NewTask::new("Open task")).unwrap();
        let mut done = NewTask::new("Finished");
        done.status = TaskStatus::Done;
        db.create_task("u", &done).unwrap();
        db.create_appointment(
            "u",
            &NewAppointment {
                client_name: "Dana".to_string(),
                client_email: None,
                client_phone: None,
                service: "Initial Consultation".to_string(),
                requested_at: w.start + Duration::hours(15),
                duration_minutes: None,
                notes: None,
            },
        )
        .unwrap();

        let source = build_source(DataSourceKind::Live, db);
        let snapshot = collect_snapshot(source.as_ref(), "u", &w).await.unwrap();

        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.tasks[0].title, "Open task");
        assert_eq!(snapshot.appointments.len(), 1);
    }
}
