//! Pending appointment rule

use crate::models::AppointmentStatus;

use super::engine::{EvaluationContext, Rule};
use super::types::{entity_key, plural, Insight, InsightKind, RuleId};

/// Reminds the user about booking requests awaiting a decision
pub struct PendingAppointmentsRule;

impl Rule for PendingAppointmentsRule {
    fn id(&self) -> RuleId {
        RuleId::PendingAppointments
    }

    fn name(&self) -> &'static str {
        "Pending Appointments"
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Vec<Insight> {
        let ids: Vec<i64> = ctx
            .snapshot
            .appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Pending)
            .map(|a| a.id)
            .collect();

        if ids.is_empty() {
            return vec![];
        }

        vec![Insight::new(
            self.id(),
            entity_key("pending_appointments", ids.iter().copied()),
            InsightKind::Tip,
            format!(
                "{} waiting for your confirmation",
                plural(ids.len(), "appointment request")
            ),
        )
        .with_action("Review requests")]
    }
}
