//! Task workload rules

use crate::models::{Task, TaskPriority};

use super::engine::{EvaluationContext, Rule};
use super::types::{entity_key, plural, Insight, InsightKind, RuleId};

/// Alerts when open high-priority tasks are waiting
///
/// Only `high` counts; `urgent` tasks are not included.
pub struct HighPriorityLoadRule;

impl Rule for HighPriorityLoadRule {
    fn id(&self) -> RuleId {
        RuleId::HighPriorityLoad
    }

    fn name(&self) -> &'static str {
        "High-priority Load"
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Insight> {
        let high: Vec<&Task> = ctx
            .snapshot
            .tasks
            .iter()
            .filter(|t| t.is_open() && t.priority == TaskPriority::High)
            .collect();

        if high.is_empty() {
            return vec![];
        }

        vec![Insight::new(
            self.id(),
            entity_key("high_priority", high.iter().map(|t| t.id)),
            InsightKind::Alert,
            format!(
                "You have {} on your plate",
                plural(high.len(), "high-priority task")
            ),
        )
        .with_action("Schedule focus time")]
    }
}

/// Warns about open tasks past their due time
pub struct OverdueTasksRule;

impl Rule for OverdueTasksRule {
    fn id(&self) -> RuleId {
        RuleId::OverdueTasks
    }

    fn name(&self) -> &'static str {
        "Overdue Tasks"
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Insight> {
        let overdue: Vec<&Task> = ctx
            .snapshot
            .tasks
            .iter()
            .filter(|t| t.is_overdue(ctx.now))
            .collect();

        if overdue.is_empty() {
            return vec![];
        }

        vec![Insight::new(
            self.id(),
            entity_key("overdue", overdue.iter().map(|t| t.id)),
            InsightKind::Warning,
            format!("You have {}", plural(overdue.len(), "overdue task")),
        )
        .with_action("Review and reschedule")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightConfig;
    use crate::insights::types::Snapshot;
    use crate::models::TaskStatus;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn task(id: i64, priority: TaskPriority, status: TaskStatus) -> Task {
        Task {
            id,
            user_id: "u".to_string(),
            title: format!("Task {}", id),
            description: None,
            priority,
            status,
            due_at: None,
            estimated_minutes: Some(30),
            energy: Some(3),
            category: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_urgent_and_done_do_not_count_as_high() {
        let config = InsightConfig::default();
        let snapshot = Snapshot {
            tasks: vec![
                task(1, TaskPriority::Urgent, TaskStatus::Todo),
                task(2, TaskPriority::High, TaskStatus::Done),
            ],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        assert!(HighPriorityLoadRule.evaluate(&ctx).is_empty());
    }

    #[test]
    fn test_high_priority_count_and_key() {
        let config = InsightConfig::default();
        let snapshot = Snapshot {
            tasks: vec![
                task(4, TaskPriority::High, TaskStatus::Todo),
                task(5, TaskPriority::High, TaskStatus::InProgress),
            ],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = HighPriorityLoadRule.evaluate(&ctx);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].key, "high_priority:4,5");
        assert!(insights[0].message.contains("2 high-priority tasks"));
    }

    #[test]
    fn test_due_exactly_now_is_not_overdue() {
        let config = InsightConfig::default();
        let mut due_now = task(1, TaskPriority::Low, TaskStatus::Todo);
        due_now.due_at = Some(now());
        let mut late = task(2, TaskPriority::Low, TaskStatus::Review);
        late.due_at = Some(now() - Duration::minutes(1));

        let snapshot = Snapshot {
            tasks: vec![due_now, late],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = OverdueTasksRule.evaluate(&ctx);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].key, "overdue:2");
    }
}
