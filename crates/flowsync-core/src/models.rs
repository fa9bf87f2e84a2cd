//! Domain models for FlowSync

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Events
// ============================================================================

/// Calendar event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Meeting,
    FocusTime,
    TaskBlock,
    Break,
    Appointment,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meeting => "meeting",
            Self::FocusTime => "focus_time",
            Self::TaskBlock => "task_block",
            Self::Break => "break",
            Self::Appointment => "appointment",
        }
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "meeting" => Ok(Self::Meeting),
            "focus_time" | "focus" => Ok(Self::FocusTime),
            "task_block" | "task" => Ok(Self::TaskBlock),
            "break" => Ok(Self::Break),
            "appointment" => Ok(Self::Appointment),
            _ => Err(format!("Unknown event category: {}", s)),
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A calendar event owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: EventCategory,
    pub location: Option<String>,
    pub attendees: Option<u32>,
    pub description: Option<String>,
    /// Set when the event was spawned by confirming an appointment
    pub appointment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_meeting(&self) -> bool {
        self.category == EventCategory::Meeting
    }

    /// True when `[start, end)` intersects the given range
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start < to && self.end > from
    }
}

/// New event for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: EventCategory,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidData("Event title is required".to_string()));
        }
        validate_span(self.start, self.end)
    }
}

/// Partial event update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub category: Option<EventCategory>,
    pub location: Option<String>,
    pub attendees: Option<u32>,
    pub description: Option<String>,
}

pub(crate) fn validate_span(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= start {
        return Err(Error::InvalidData(format!(
            "Event must end after it starts ({} >= {})",
            start, end
        )));
    }
    Ok(())
}

// ============================================================================
// Tasks
// ============================================================================

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Sort rank (higher = more pressing)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Unknown task priority: {}", s)),
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kanban column a task sits in
///
/// Transitions are unconstrained: any status can move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Board column order
    pub fn all() -> &'static [TaskStatus] {
        &[Self::Todo, Self::InProgress, Self::Review, Self::Done]
    }

    pub fn is_open(&self) -> bool {
        *self != Self::Done
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A task on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_at: Option<DateTime<Utc>>,
    /// Duration estimate in minutes
    pub estimated_minutes: Option<u32>,
    /// Energy cost, 1 (low) to 5 (high)
    pub energy: Option<u8>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_at.map(|due| due < now).unwrap_or(false)
    }
}

/// New task for insertion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub energy: Option<u8>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidData("Task title is required".to_string()));
        }
        validate_energy(self.energy)
    }
}

/// Partial task update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_at: Option<DateTime<Utc>>,
    pub estimated_minutes: Option<u32>,
    pub energy: Option<u8>,
    pub category: Option<String>,
}

impl TaskUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidData("Task title cannot be empty".to_string()));
            }
        }
        validate_energy(self.energy)
    }
}

fn validate_energy(energy: Option<u8>) -> Result<()> {
    match energy {
        Some(e) if !(1..=5).contains(&e) => Err(Error::InvalidData(format!(
            "Energy rating must be between 1 and 5, got {}",
            e
        ))),
        _ => Ok(()),
    }
}

/// Task counts per board column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub todo: i64,
    pub in_progress: i64,
    pub review: i64,
    pub done: i64,
    /// Tasks not yet done
    pub open: i64,
    /// Open tasks with high priority
    pub open_high_priority: i64,
}

// ============================================================================
// Appointments
// ============================================================================

/// Booking request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
        }
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "declined" => Ok(Self::Declined),
            _ => Err(format!("Unknown appointment status: {}", s)),
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default length of an appointment when the request carries none
pub const DEFAULT_APPOINTMENT_MINUTES: u32 = 30;

/// A booking request made by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub user_id: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub service: String,
    pub requested_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    /// Calendar event created on confirmation
    pub event_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn end(&self) -> DateTime<Utc> {
        self.requested_at
            + Duration::minutes(
                self.duration_minutes
                    .unwrap_or(DEFAULT_APPOINTMENT_MINUTES) as i64,
            )
    }
}

/// New booking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub client_name: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    pub service: String,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(Error::InvalidData("Client name is required".to_string()));
        }
        if self.service.trim().is_empty() {
            return Err(Error::InvalidData("Service is required".to_string()));
        }
        if self.duration_minutes == Some(0) {
            return Err(Error::InvalidData(
                "Appointment duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Day windows
// ============================================================================

/// `[start, end)` of one local calendar day, expressed in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for a local date in the given UTC offset
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let start = (local_midnight - Duration::seconds(offset.local_minus_utc() as i64)).and_utc();
        Self {
            date,
            start,
            end: start + Duration::days(1),
        }
    }

    /// Window of the local day that contains `instant`
    pub fn containing(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::for_date(instant.with_timezone(&offset).date_naive(), offset)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Build a UTC offset from minutes east of UTC
pub fn utc_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| Error::InvalidData(format!("Invalid UTC offset: {} minutes", minutes)))
}
