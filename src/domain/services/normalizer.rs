use crate::domain::entities::{OperationalHours, SlaDuration, WorkingTimeType};
use crate::domain::errors::{SlaError, SlaResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a day-based SLA is converted to working hours when enabled weekdays
/// have different lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceDayPolicy {
    /// Mean length of the enabled working days
    #[default]
    Average,
    /// All enabled working days must be the same length
    Uniform,
}

impl FromStr for ReferenceDayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "average" => Ok(ReferenceDayPolicy::Average),
            "uniform" => Ok(ReferenceDayPolicy::Uniform),
            other => Err(format!("Invalid reference day policy: {}", other)),
        }
    }
}

/// Length in hours of "one day" of an SLA under the given schedule.
/// Zero when no weekday has working time.
pub fn reference_daily_hours(
    hours: &OperationalHours,
    policy: ReferenceDayPolicy,
) -> SlaResult<f64> {
    if hours.working_time_type() == WorkingTimeType::RoundTheClock {
        return Ok(24.0);
    }

    let lengths = hours.enabled_day_seconds();
    if lengths.is_empty() {
        return Ok(0.0);
    }

    match policy {
        ReferenceDayPolicy::Average => {
            let total: u64 = lengths.iter().map(|(_, s)| u64::from(*s)).sum();
            Ok(total as f64 / lengths.len() as f64 / 3600.0)
        }
        ReferenceDayPolicy::Uniform => {
            let (first_day, first) = lengths[0];
            if let Some((day, seconds)) = lengths.iter().find(|(_, s)| *s != first) {
                return Err(SlaError::config(format!(
                    "Working days differ in length ({} has {:.2}h, {} has {:.2}h); \
                     day-based SLAs need uniform days",
                    first_day,
                    f64::from(first) / 3600.0,
                    day,
                    f64::from(*seconds) / 3600.0
                )));
            }
            Ok(f64::from(first) / 3600.0)
        }
    }
}

/// Convert a declared duration into working hours:
/// `days * daily_hours + hours + minutes / 60`
pub fn to_working_hours(
    duration: SlaDuration,
    hours: &OperationalHours,
    policy: ReferenceDayPolicy,
) -> SlaResult<f64> {
    let mut total = f64::from(duration.hours) + f64::from(duration.minutes) / 60.0;

    if duration.days > 0 {
        let daily_hours = reference_daily_hours(hours, policy)?;
        if daily_hours <= 0.0 {
            return Err(SlaError::config(
                "Cannot convert days to working hours: no working day is enabled",
            ));
        }
        total += f64::from(duration.days) * daily_hours;
    }

    Ok(total)
}
