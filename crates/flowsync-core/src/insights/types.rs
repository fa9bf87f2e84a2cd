//! Core types for the insight engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Appointment, Event, Task};

/// Presentation tone of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Tip,
    Warning,
    Suggestion,
    Alert,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Tip => "tip",
            InsightKind::Warning => "warning",
            InsightKind::Suggestion => "suggestion",
            InsightKind::Alert => "alert",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tip" => Ok(InsightKind::Tip),
            "warning" => Ok(InsightKind::Warning),
            "suggestion" => Ok(InsightKind::Suggestion),
            "alert" => Ok(InsightKind::Alert),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// Rule that produced an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Adjacent meetings with too little room between them
    BackToBackMeetings,
    /// Open tasks marked high priority
    HighPriorityLoad,
    /// Open tasks past their due time
    OverdueTasks,
    /// Booking requests awaiting review
    PendingAppointments,
    /// More meetings than the configured threshold
    MeetingHeavyDay,
    /// Emitted alone when no other rule fires
    BalancedDay,
    /// Static tip served when no data could be fetched
    PeakFocus,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::BackToBackMeetings => "back_to_back_meetings",
            RuleId::HighPriorityLoad => "high_priority_load",
            RuleId::OverdueTasks => "overdue_tasks",
            RuleId::PendingAppointments => "pending_appointments",
            RuleId::MeetingHeavyDay => "meeting_heavy_day",
            RuleId::BalancedDay => "balanced_day",
            RuleId::PeakFocus => "peak_focus",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "back_to_back_meetings" => Ok(RuleId::BackToBackMeetings),
            "high_priority_load" => Ok(RuleId::HighPriorityLoad),
            "overdue_tasks" => Ok(RuleId::OverdueTasks),
            "pending_appointments" => Ok(RuleId::PendingAppointments),
            "meeting_heavy_day" => Ok(RuleId::MeetingHeavyDay),
            "balanced_day" => Ok(RuleId::BalancedDay),
            "peak_focus" => Ok(RuleId::PeakFocus),
            _ => Err(format!("Unknown insight rule: {}", s)),
        }
    }
}

/// An advisory message derived from one user's day
///
/// Insights are never persisted. `key` is built from the rule id and the ids
/// of the entities involved, so the same situation yields the same key on
/// every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub key: String,
    pub kind: InsightKind,
    pub rule: RuleId,
    pub message: String,
    pub action: Option<String>,
}

impl Insight {
    pub fn new(
        rule: RuleId,
        key: impl Into<String>,
        kind: InsightKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            rule,
            message: message.into(),
            action: None,
        }
    }

    /// Attach a suggested follow-up
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Everything the evaluator looks at for one user and one day
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Events overlapping the day window
    pub events: Vec<Event>,
    /// Tasks whose status is not done
    pub tasks: Vec<Task>,
    /// Appointments still pending
    pub appointments: Vec<Appointment>,
}

/// Build a stable key from a prefix and entity ids, e.g. `overdue:3,7`
pub(crate) fn entity_key(prefix: &str, ids: impl IntoIterator<Item = i64>) -> String {
    let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    format!("{}:{}", prefix, ids.join(","))
}

/// `1 task`, `3 tasks`
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            InsightKind::Tip,
            InsightKind::Warning,
            InsightKind::Suggestion,
            InsightKind::Alert,
        ] {
            assert_eq!(kind.as_str().parse::<InsightKind>().unwrap(), kind);
        }
        assert!("notice".parse::<InsightKind>().is_err());
    }

    #[test]
    fn test_insight_serializes_snake_case() {
        let insight = Insight::new(RuleId::OverdueTasks, "overdue:1", InsightKind::Warning, "late")
            .with_action("Review and reschedule");
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["kind"], "warning");
        assert_eq!(json["rule"], "overdue_tasks");
        assert_eq!(json["action"], "Review and reschedule");
    }

    #[test]
    fn test_entity_key_and_plural() {
        assert_eq!(entity_key("overdue", [3, 7]), "overdue:3,7");
        assert_eq!(plural(1, "meeting"), "1 meeting");
        assert_eq!(plural(0, "meeting"), "0 meetings");
        assert_eq!(plural(5, "task"), "5 tasks");
    }
}
