use crate::application::services::context_provider::CalculationContextProvider;
use crate::domain::{
    entities::{parse_duration, SlaDefinition, SlaDuration},
    errors::SlaResult,
    services::{calculate_due_date, to_working_hours, CalculationContext, ReferenceDayPolicy},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Turns SLA definitions into due dates against the stored calendar
#[derive(Clone)]
pub struct SlaService {
    contexts: Arc<CalculationContextProvider>,
    policy: ReferenceDayPolicy,
}

impl SlaService {
    pub fn new(contexts: Arc<CalculationContextProvider>, policy: ReferenceDayPolicy) -> Self {
        Self { contexts, policy }
    }

    /// Resolution due date for an SLA definition starting at `start`
    pub async fn calculate_due(
        &self,
        start: DateTime<Utc>,
        definition: &SlaDefinition,
    ) -> SlaResult<DateTime<Utc>> {
        let context = self
            .contexts
            .context(definition.operational_hours_enabled)
            .await?;
        Self::calculate_due_with_context(start, definition.resolution(), &context, self.policy)
    }

    /// Due date for a duration string such as `"4h"` or `"1d 4h"`
    pub async fn calculate_due_for_duration(
        &self,
        start: DateTime<Utc>,
        duration: &str,
        operational_hours_enabled: bool,
    ) -> SlaResult<DateTime<Utc>> {
        let duration = parse_duration(duration)?;
        let context = self.contexts.context(operational_hours_enabled).await?;
        Self::calculate_due_with_context(start, duration, &context, self.policy)
    }

    /// Pure calculation against an explicit context
    pub fn calculate_due_with_context(
        start: DateTime<Utc>,
        duration: SlaDuration,
        context: &CalculationContext,
        policy: ReferenceDayPolicy,
    ) -> SlaResult<DateTime<Utc>> {
        let required_hours = if context.operational_hours_enabled() {
            to_working_hours(duration, context.operational_hours(), policy)?
        } else {
            duration.elapsed_hours()
        };

        let due = calculate_due_date(start, required_hours, context)?;

        debug!(
            "SLA {} from {} ({:.4} required hours, operational hours {}) due at {}",
            duration,
            start.to_rfc3339(),
            required_hours,
            if context.operational_hours_enabled() { "on" } else { "off" },
            due.to_rfc3339()
        );

        Ok(due)
    }
}
