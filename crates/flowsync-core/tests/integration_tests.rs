//! Integration tests for flowsync-core
//!
//! These tests exercise the full record → fetch → evaluate workflow.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use flowsync_core::{
    booking::{available_slots, find_service},
    config::{CalendarConfig, InsightConfig},
    db::Database,
    insights::{FeedOrigin, InsightEngine, InsightFeed, InsightKind, RuleId},
    models::{utc_offset, DayWindow, EventCategory, NewAppointment, NewEvent, NewTask, TaskPriority, TaskStatus},
    source::{DataSourceKind, LiveDataSource, build_source},
};

const USER: &str = "ada@example.com";

fn day() -> DayWindow {
    DayWindow::for_date(
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        utc_offset(0).unwrap(),
    )
}

fn local(h: i64, m: i64) -> DateTime<Utc> {
    day().start + Duration::hours(h) + Duration::minutes(m)
}

fn meeting(db: &Database, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    db.create_event(
        USER,
        &NewEvent {
            title: title.to_string(),
            start,
            end,
            category: EventCategory::Meeting,
            location: None,
            attendees: Some(4),
            description: None,
        },
    )
    .expect("Failed to create meeting")
    .id
}

// =============================================================================
// Feed over SQLite
// =============================================================================

#[tokio::test]
async fn test_empty_database_is_balanced() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let feed = InsightFeed::new(InsightEngine::default(), Arc::new(LiveDataSource::new(db)));

    let result = feed.refresh(USER, &day(), local(8, 0)).await;

    assert_eq!(result.origin, FeedOrigin::Live);
    assert_eq!(result.insights.len(), 1);
    assert_eq!(result.insights[0].rule, RuleId::BalancedDay);
}

#[tokio::test]
async fn test_busy_day_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");

    let standup = meeting(&db, "Standup", local(9, 0), local(9, 30));
    let review = meeting(&db, "Design Review", local(9, 35), local(10, 30));
    meeting(&db, "Lunch & Learn", local(12, 0), local(13, 0));

    let mut high = NewTask::new("Ship release notes");
    high.priority = TaskPriority::High;
    db.create_task(USER, &high).unwrap();

    let mut late = NewTask::new("Expense report");
    late.due_at = Some(local(8, 0) - Duration::days(1));
    db.create_task(USER, &late).unwrap();

    db.create_appointment(
        USER,
        &NewAppointment {
            client_name: "Dana".to_string(),
            client_email: Some("dana@example.com".to_string()),
            client_phone: None,
            service: "Strategy Session".to_string(),
            requested_at: local(15, 0),
            duration_minutes: Some(60),
            notes: None,
        },
    )
    .unwrap();

    let source = build_source(DataSourceKind::Live, db.clone());
    let feed = InsightFeed::new(InsightEngine::default(), source);
    let result = feed.refresh(USER, &day(), local(8, 0)).await;

    let rules: Vec<RuleId> = result.insights.iter().map(|i| i.rule).collect();
    assert_eq!(
        rules,
        vec![
            RuleId::BackToBackMeetings,
            RuleId::HighPriorityLoad,
            RuleId::OverdueTasks,
            RuleId::PendingAppointments,
        ]
    );
    assert_eq!(
        result.insights[0].key,
        format!("back_to_back:{}:{}", standup, review)
    );
    assert_eq!(result.insights[1].kind, InsightKind::Alert);
}

#[tokio::test]
async fn test_confirming_appointment_changes_insights() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let feed = InsightFeed::new(
        InsightEngine::new(InsightConfig::default()),
        build_source(DataSourceKind::Live, db.clone()),
    );

    let appt = db
        .create_appointment(
            USER,
            &NewAppointment {
                client_name: "Sam".to_string(),
                client_email: None,
                client_phone: None,
                service: "Initial Consultation".to_string(),
                requested_at: local(11, 0),
                duration_minutes: None,
                notes: None,
            },
        )
        .unwrap();

    let before = feed.refresh(USER, &day(), local(8, 0)).await;
    assert_eq!(before.insights[0].rule, RuleId::PendingAppointments);

    db.confirm_appointment(USER, appt.id).unwrap();

    let after = feed.refresh(USER, &day(), local(8, 0)).await;
    assert_eq!(after.insights.len(), 1);
    assert_eq!(after.insights[0].rule, RuleId::BalancedDay);

    // The derived event is on today's calendar
    let events = db.list_events_for_day(USER, &day()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].category, EventCategory::Appointment);
}

#[tokio::test]
async fn test_done_tasks_do_not_reach_rules() {
    let db = Database::in_memory().expect("Failed to create in-memory database");

    let mut task = NewTask::new("Migrate billing");
    task.priority = TaskPriority::High;
    let task = db.create_task(USER, &task).unwrap();

    let feed = InsightFeed::new(InsightEngine::default(), build_source(DataSourceKind::Live, db.clone()));
    let result = feed.refresh(USER, &day(), local(8, 0)).await;
    assert_eq!(result.insights[0].rule, RuleId::HighPriorityLoad);

    db.move_task(USER, task.id, TaskStatus::Done).unwrap();
    let result = feed.refresh(USER, &day(), local(8, 0)).await;
    assert_eq!(result.insights[0].rule, RuleId::BalancedDay);
}

// =============================================================================
// Booking
// =============================================================================

#[test]
fn test_slots_respect_booked_calendar() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    meeting(&db, "Board Meeting", local(13, 0), local(15, 0));

    let service = find_service("coaching").expect("coaching service");
    let events = db.list_events_for_day(USER, &day()).unwrap();
    let slots = available_slots(
        &day(),
        utc_offset(0).unwrap(),
        service.duration_minutes,
        &events,
        &CalendarConfig::default(),
        local(0, 0),
    );

    let blocked: Vec<&str> = slots
        .iter()
        .filter(|s| !s.available)
        .map(|s| s.label.as_str())
        .collect();
    // 45-minute sessions starting 12:30 through 14:30 touch the meeting
    assert_eq!(blocked, vec!["12:30", "13:00", "13:30", "14:00", "14:30"]);
}
