//! Meeting rules
//!
//! - Back-to-back meetings: adjacent meetings closer than the configured gap
//! - Meeting-heavy day: more meetings than the configured threshold

use chrono::Duration;

use super::engine::{EvaluationContext, Rule};
use super::types::{entity_key, plural, Insight, InsightKind, RuleId};

/// Warns about each adjacent pair of meetings with too little room between them
pub struct BackToBackMeetingsRule;

impl Rule for BackToBackMeetingsRule {
    fn id(&self) -> RuleId {
        RuleId::BackToBackMeetings
    }

    fn name(&self) -> &'static str {
        "Back-to-back Meetings"
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Insight> {
        let mut insights = vec![];

        for pair in ctx.meetings.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            let gap = next.start - current.end;

            // Overlaps have a negative gap and fire as well
            if gap >= ctx.config.back_to_back_gap {
                continue;
            }

            let message = if gap < Duration::zero() {
                // Partial minutes of overlap round up
                let overlap = (-gap).num_seconds();
                format!(
                    "\"{}\" and \"{}\" overlap by {}",
                    current.title,
                    next.title,
                    plural(((overlap + 59) / 60) as usize, "minute")
                )
            } else if gap == Duration::zero() {
                format!(
                    "\"{}\" runs straight into \"{}\" with no break",
                    current.title, next.title
                )
            } else if gap < Duration::minutes(1) {
                format!(
                    "Less than a minute between \"{}\" and \"{}\"",
                    current.title, next.title
                )
            } else {
                format!(
                    "Only {} between \"{}\" and \"{}\"",
                    plural(gap.num_minutes() as usize, "minute"),
                    current.title,
                    next.title
                )
            };

            insights.push(
                Insight::new(
                    self.id(),
                    format!("back_to_back:{}:{}", current.id, next.id),
                    InsightKind::Warning,
                    message,
                )
                .with_action("Add a buffer between meetings"),
            );
        }

        insights
    }
}

/// Warns when the day holds more meetings than the threshold
pub struct MeetingHeavyDayRule;

impl Rule for MeetingHeavyDayRule {
    fn id(&self) -> RuleId {
        RuleId::MeetingHeavyDay
    }

    fn name(&self) -> &'static str {
        "Meeting-heavy Day"
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Insight> {
        let count = ctx.meetings.len();
        if count <= ctx.config.meeting_heavy_threshold {
            return vec![];
        }

        vec![Insight::new(
            self.id(),
            entity_key("meeting_heavy", ctx.meetings.iter().map(|e| e.id)),
            InsightKind::Warning,
            format!(
                "You have {} today. Protect some time for focused work.",
                plural(count, "meeting")
            ),
        )
        .with_action("Block focus time")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightConfig;
    use crate::insights::types::Snapshot;
    use crate::models::{Event, EventCategory};
    use chrono::{DateTime, TimeZone, Utc};

    fn meeting(id: i64, start: (u32, u32), end: (u32, u32)) -> Event {
        let day = |h, m| Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap();
        Event {
            id,
            user_id: "u".to_string(),
            title: format!("Meeting {}", id),
            start: day(start.0, start.1),
            end: day(end.0, end.1),
            category: EventCategory::Meeting,
            location: None,
            attendees: Some(3),
            description: None,
            appointment_id: None,
            created_at: day(0, 0),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_gap_boundary_is_exclusive() {
        let config = InsightConfig::default();
        let snapshot = Snapshot {
            events: vec![meeting(1, (9, 0), (10, 0)), meeting(2, (10, 15), (11, 0))],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        assert!(BackToBackMeetingsRule.evaluate(&ctx).is_empty());

        let snapshot = Snapshot {
            events: vec![meeting(1, (9, 0), (10, 0)), meeting(2, (10, 14), (11, 0))],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = BackToBackMeetingsRule.evaluate(&ctx);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].message.contains("14 minutes"));
    }

    #[test]
    fn test_zero_gap_message() {
        let config = InsightConfig::default();
        let snapshot = Snapshot {
            events: vec![meeting(1, (9, 0), (10, 0)), meeting(2, (10, 0), (10, 30))],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = BackToBackMeetingsRule.evaluate(&ctx);
        assert!(insights[0].message.contains("no break"));
    }

    #[test]
    fn test_overlap_reports_minutes() {
        let config = InsightConfig::default();
        let snapshot = Snapshot {
            events: vec![meeting(1, (9, 0), (10, 0)), meeting(2, (9, 45), (10, 30))],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = BackToBackMeetingsRule.evaluate(&ctx);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].message.contains("overlap by 15 minutes"));
    }

    #[test]
    fn test_sub_minute_gaps_are_not_zero() {
        let config = InsightConfig::default();
        let mut first = meeting(1, (9, 0), (10, 0));
        let mut second = meeting(2, (10, 0), (10, 30));

        first.end += Duration::seconds(30);
        let snapshot = Snapshot {
            events: vec![first.clone(), second.clone()],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = BackToBackMeetingsRule.evaluate(&ctx);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].message.contains("overlap by 1 minute"));
        assert!(!insights[0].message.contains("no break"));

        first.end -= Duration::seconds(30);
        second.start += Duration::seconds(30);
        let snapshot = Snapshot {
            events: vec![first, second],
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = BackToBackMeetingsRule.evaluate(&ctx);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].message.starts_with("Less than a minute between"));
    }

    #[test]
    fn test_meeting_heavy_threshold_is_strict() {
        let config = InsightConfig::default();
        let four: Vec<Event> = (0..4)
            .map(|i| meeting(i, (9 + i as u32 * 2, 0), (9 + i as u32 * 2, 30)))
            .collect();
        let snapshot = Snapshot {
            events: four.clone(),
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        assert!(MeetingHeavyDayRule.evaluate(&ctx).is_empty());

        let mut five = four;
        five.push(meeting(9, (18, 0), (18, 30)));
        let snapshot = Snapshot {
            events: five,
            ..Default::default()
        };
        let ctx = EvaluationContext::new(&snapshot, now(), &config);
        let insights = MeetingHeavyDayRule.evaluate(&ctx);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].message.contains("5 meetings"));
        assert_eq!(insights[0].key, "meeting_heavy:0,1,2,3,9");
    }
}
