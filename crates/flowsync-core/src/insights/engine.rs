//! Insight engine - runs the rules in order over a day snapshot

use chrono::{DateTime, Utc};

use crate::config::InsightConfig;
use crate::models::Event;

use super::appointments::PendingAppointmentsRule;
use super::meetings::{BackToBackMeetingsRule, MeetingHeavyDayRule};
use super::types::{Insight, InsightKind, RuleId, Snapshot};
use super::workload::{HighPriorityLoadRule, OverdueTasksRule};

/// Context handed to every rule during one evaluation
pub struct EvaluationContext<'a> {
    pub snapshot: &'a Snapshot,
    /// Evaluation instant (used for overdue checks)
    pub now: DateTime<Utc>,
    pub config: &'a InsightConfig,
    /// Meeting events sorted by start; ties keep snapshot order
    pub meetings: Vec<&'a Event>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(snapshot: &'a Snapshot, now: DateTime<Utc>, config: &'a InsightConfig) -> Self {
        let mut meetings: Vec<&Event> = snapshot.events.iter().filter(|e| e.is_meeting()).collect();
        meetings.sort_by_key(|e| e.start);
        Self {
            snapshot,
            now,
            config,
            meetings,
        }
    }
}

/// A single insight rule
///
/// Rules are pure: they read the context and return zero or more insights.
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    /// Human-readable name
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Insight>;
}

/// Runs the registered rules in registration order
pub struct InsightEngine {
    config: InsightConfig,
    rules: Vec<Box<dyn Rule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new(InsightConfig::default())
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules
    pub fn new(config: InsightConfig) -> Self {
        let mut engine = Self {
            config,
            rules: vec![],
        };

        engine.register(Box::new(BackToBackMeetingsRule));
        engine.register(Box::new(HighPriorityLoadRule));
        engine.register(Box::new(OverdueTasksRule));
        engine.register(Box::new(PendingAppointmentsRule));
        engine.register(Box::new(MeetingHeavyDayRule));

        engine
    }

    /// Append a rule after the existing ones
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule against the snapshot
    ///
    /// Output follows rule order with no dedup or ranking, and is never empty:
    /// when no rule fires a single balanced-day tip is returned.
    pub fn evaluate(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<Insight> {
        let ctx = EvaluationContext::new(snapshot, now, &self.config);
        let mut insights = vec![];

        for rule in &self.rules {
            let found = rule.evaluate(&ctx);
            tracing::debug!(
                rule = rule.id().as_str(),
                name = rule.name(),
                count = found.len(),
                "Rule evaluated"
            );
            insights.extend(found);
        }

        if insights.is_empty() {
            insights.push(balanced_day());
        }

        insights
    }

    /// Registered rule ids in evaluation order
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}

fn balanced_day() -> Insight {
    Insight::new(
        RuleId::BalancedDay,
        "balanced_day",
        InsightKind::Tip,
        "Your day looks well-balanced. Keep up the good work!",
    )
    .with_action("Keep it up")
}

/// Served when the day could not be fetched and nothing is cached
pub fn default_insights() -> Vec<Insight> {
    vec![Insight::new(
        RuleId::PeakFocus,
        "peak_focus",
        InsightKind::Tip,
        "Your peak focus time is 9-11 AM. Perfect for deep work!",
    )
    .with_action("Schedule important tasks")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Appointment, AppointmentStatus, EventCategory, Task, TaskPriority, TaskStatus,
    };
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    fn event(id: i64, title: &str, start: DateTime<Utc>, end: DateTime<Utc>, category: EventCategory) -> Event {
        Event {
            id,
            user_id: "u".to_string(),
            title: title.to_string(),
            start,
            end,
            category,
            location: None,
            attendees: None,
            description: None,
            appointment_id: None,
            created_at: start,
        }
    }

    fn meeting(id: i64, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        event(id, title, start, end, EventCategory::Meeting)
    }

    fn task(id: i64, priority: TaskPriority, due_at: Option<DateTime<Utc>>) -> Task {
        Task {
            id,
            user_id: "u".to_string(),
            title: format!("Task {}", id),
            description: None,
            priority,
            status: TaskStatus::Todo,
            due_at,
            estimated_minutes: None,
            energy: None,
            category: None,
            created_at: at(8, 0),
            updated_at: at(8, 0),
        }
    }

    fn pending(id: i64) -> Appointment {
        Appointment {
            id,
            user_id: "u".to_string(),
            client_name: "Dana".to_string(),
            client_email: None,
            client_phone: None,
            service: "Strategy Session".to_string(),
            requested_at: at(15, 0),
            duration_minutes: Some(60),
            notes: None,
            status: AppointmentStatus::Pending,
            event_id: None,
            created_at: at(8, 0),
        }
    }

    fn rules(insights: &[Insight]) -> Vec<RuleId> {
        insights.iter().map(|i| i.rule).collect()
    }

    #[test]
    fn test_engine_registers_rules_in_order() {
        let engine = InsightEngine::default();
        assert_eq!(
            engine.rule_ids(),
            vec![
                RuleId::BackToBackMeetings,
                RuleId::HighPriorityLoad,
                RuleId::OverdueTasks,
                RuleId::PendingAppointments,
                RuleId::MeetingHeavyDay,
            ]
        );
    }

    #[test]
    fn test_rule_names_are_distinct() {
        let engine = InsightEngine::default();
        let names: Vec<&str> = engine.rules.iter().map(|r| r.name()).collect();
        assert!(names.iter().all(|n| !n.trim().is_empty()));

        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_empty_day_yields_only_balanced_tip() {
        let engine = InsightEngine::default();
        let insights = engine.evaluate(&Snapshot::default(), at(12, 0));

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].rule, RuleId::BalancedDay);
        assert_eq!(insights[0].kind, InsightKind::Tip);
        assert_eq!(insights[0].key, "balanced_day");
    }

    #[test]
    fn test_balanced_tip_never_accompanies_other_insights() {
        let engine = InsightEngine::default();
        let snapshot = Snapshot {
            appointments: vec![pending(1)],
            ..Default::default()
        };
        let insights = engine.evaluate(&snapshot, at(12, 0));
        assert!(!insights.is_empty());
        assert!(insights.iter().all(|i| i.rule != RuleId::BalancedDay));
    }

    #[test]
    fn test_back_to_back_scenario() {
        // 09:00-10:00 then 10:10: gap of 10 minutes fires
        let engine = InsightEngine::default();
        let snapshot = Snapshot {
            events: vec![
                meeting(1, "Planning", at(9, 0), at(10, 0)),
                meeting(2, "Design Review", at(10, 10), at(11, 0)),
            ],
            ..Default::default()
        };
        let insights = engine.evaluate(&snapshot, at(8, 0));
        assert_eq!(rules(&insights), vec![RuleId::BackToBackMeetings]);
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert!(insights[0].message.contains("Planning"));
        assert!(insights[0].message.contains("Design Review"));
        assert_eq!(insights[0].key, "back_to_back:1:2");

        // Same pair with the second starting at 10:20: gap of 20 minutes does not
        let snapshot = Snapshot {
            events: vec![
                meeting(1, "Planning", at(9, 0), at(10, 0)),
                meeting(2, "Design Review", at(10, 20), at(11, 0)),
            ],
            ..Default::default()
        };
        let insights = engine.evaluate(&snapshot, at(8, 0));
        assert_eq!(rules(&insights), vec![RuleId::BalancedDay]);
    }

    #[test]
    fn test_back_to_back_is_order_independent() {
        let engine = InsightEngine::default();
        let a = meeting(1, "A", at(9, 0), at(10, 0));
        let b = meeting(2, "B", at(10, 5), at(11, 0));
        let c = meeting(3, "C", at(11, 10), at(12, 0));
        let d = meeting(4, "D", at(14, 0), at(15, 0));

        let sorted = Snapshot {
            events: vec![a.clone(), b.clone(), c.clone(), d.clone()],
            ..Default::default()
        };
        let shuffled = Snapshot {
            events: vec![d, c, a, b],
            ..Default::default()
        };

        let first = engine.evaluate(&sorted, at(8, 0));
        let second = engine.evaluate(&shuffled, at(8, 0));
        assert_eq!(first, second);

        // A->B and B->C qualify, C->D does not
        let keys: Vec<&str> = first.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["back_to_back:1:2", "back_to_back:2:3"]);
    }

    #[test]
    fn test_overlapping_meetings_fire() {
        let engine = InsightEngine::default();
        let snapshot = Snapshot {
            events: vec![
                meeting(1, "Sync", at(9, 0), at(10, 0)),
                meeting(2, "Interview", at(9, 30), at(10, 30)),
            ],
            ..Default::default()
        };
        let insights = engine.evaluate(&snapshot, at(8, 0));
        assert_eq!(rules(&insights), vec![RuleId::BackToBackMeetings]);
        assert!(insights[0].message.contains("overlap"));
    }

    #[test]
    fn test_non_meetings_are_ignored_for_adjacency() {
        let engine = InsightEngine::default();
        let snapshot = Snapshot {
            events: vec![
                meeting(1, "Sync", at(9, 0), at(10, 0)),
                event(2, "Deep Work", at(10, 0), at(11, 0), EventCategory::FocusTime),
                meeting(3, "1:1", at(11, 30), at(12, 0)),
            ],
            ..Default::default()
        };
        let insights = engine.evaluate(&snapshot, at(8, 0));
        assert_eq!(rules(&insights), vec![RuleId::BalancedDay]);
    }

    #[test]
    fn test_one_high_priority_of_three() {
        let engine = InsightEngine::default();
        let snapshot = Snapshot {
            tasks: vec![
                task(1, TaskPriority::Low, None),
                task(2, TaskPriority::High, None),
                task(3, TaskPriority::Medium, None),
            ],
            // Spaced past the back-to-back gap, so only the task rule fires
            events: vec![
                meeting(10, "Standup", at(9, 0), at(10, 0)),
                meeting(11, "Design review", at(10, 20), at(11, 0)),
            ],
            ..Default::default()
        };
        let insights = engine.evaluate(&snapshot, at(12, 0));
        assert_eq!(rules(&insights), vec![RuleId::HighPriorityLoad]);
        assert_eq!(insights[0].kind, InsightKind::Alert);
        assert!(insights[0].message.contains("1 high-priority task"));
    }

    #[test]
    fn test_flipping_one_due_date_flips_overdue_rule() {
        let engine = InsightEngine::default();
        let now = at(12, 0);
        let mut snapshot = Snapshot {
            tasks: vec![
                task(1, TaskPriority::Low, Some(now + Duration::hours(2))),
                task(2, TaskPriority::Medium, None),
            ],
            ..Default::default()
        };
        assert!(!rules(&engine.evaluate(&snapshot, now)).contains(&RuleId::OverdueTasks));

        snapshot.tasks[0].due_at = Some(now - Duration::hours(2));
        let insights = engine.evaluate(&snapshot, now);
        assert_eq!(rules(&insights), vec![RuleId::OverdueTasks]);
        assert!(insights[0].message.contains("1 overdue task"));
    }

    #[test]
    fn test_output_follows_rule_order() {
        let engine = InsightEngine::default();
        let now = at(12, 0);
        let snapshot = Snapshot {
            events: vec![
                meeting(1, "M1", at(9, 0), at(9, 30)),
                meeting(2, "M2", at(9, 30), at(10, 0)),
                meeting(3, "M3", at(11, 0), at(11, 30)),
                meeting(4, "M4", at(13, 0), at(13, 30)),
                meeting(5, "M5", at(15, 0), at(15, 30)),
            ],
            tasks: vec![
                task(1, TaskPriority::High, None),
                task(2, TaskPriority::Low, Some(now - Duration::days(1))),
            ],
            appointments: vec![pending(9)],
        };
        let insights = engine.evaluate(&snapshot, now);
        assert_eq!(
            rules(&insights),
            vec![
                RuleId::BackToBackMeetings,
                RuleId::HighPriorityLoad,
                RuleId::OverdueTasks,
                RuleId::PendingAppointments,
                RuleId::MeetingHeavyDay,
            ]
        );
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let config = InsightConfig {
            back_to_back_gap: Duration::minutes(30),
            meeting_heavy_threshold: 1,
        };
        let engine = InsightEngine::new(config);
        let snapshot = Snapshot {
            events: vec![
                meeting(1, "A", at(9, 0), at(10, 0)),
                meeting(2, "B", at(10, 20), at(11, 0)),
            ],
            ..Default::default()
        };
        let insights = engine.evaluate(&snapshot, at(8, 0));
        assert_eq!(
            rules(&insights),
            vec![RuleId::BackToBackMeetings, RuleId::MeetingHeavyDay]
        );
    }

    #[test]
    fn test_default_insights_is_peak_focus_tip() {
        let defaults = default_insights();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].kind, InsightKind::Tip);
        assert_eq!(defaults[0].action.as_deref(), Some("Schedule important tasks"));
    }
}
