use crate::domain::errors::{SlaError, SlaResult};
use crate::domain::services::calendar::{CalculationContext, LocalWindow};
use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};

/// How far ahead the walker looks for the next working window
pub const MAX_LOOKAHEAD_DAYS: i64 = 5 * 366;

/// Upper bound on a single requirement; roughly a century of working time
const MAX_REQUIRED_HOURS: f64 = 100.0 * 366.0 * 24.0;

/// Due instant after `required_hours` of working time counted from `start`.
///
/// Nights, disabled weekdays, breaks and holidays are skipped. A start
/// outside working time is first moved forward to the next window opening,
/// so a zero-hour requirement yields the next working instant. The result is
/// truncated to whole seconds.
pub fn calculate_due_date(
    start: DateTime<Utc>,
    required_hours: f64,
    context: &CalculationContext,
) -> SlaResult<DateTime<Utc>> {
    let required = hours_to_duration(required_hours)?;

    if !context.operational_hours_enabled() {
        return Ok(truncate_to_seconds(start + required));
    }

    let mut cursor = context.to_local(start);
    let mut remaining = required;

    loop {
        let window = next_working_window(cursor, context)?;
        if window.start > cursor {
            cursor = window.start;
        }

        // Strictly positive: the window ends after the cursor
        let available = window.end - cursor;
        if remaining <= available {
            let due = context.to_utc(cursor + remaining);
            return Ok(truncate_to_seconds(due));
        }

        remaining = remaining - available;
        cursor = window.end;
    }
}

/// First working window that ends after `cursor`: the window containing it,
/// or the next one to open. A window's end is outside it, its start inside.
pub fn next_working_window(
    cursor: NaiveDateTime,
    context: &CalculationContext,
) -> SlaResult<LocalWindow> {
    let first_day = cursor.date();

    for offset in 0..=MAX_LOOKAHEAD_DAYS {
        let Some(date) = first_day.checked_add_signed(Duration::days(offset)) else {
            break;
        };

        if let Some(window) = context
            .working_windows_on(date)
            .into_iter()
            .find(|w| w.end > cursor)
        {
            return Ok(window);
        }
    }

    Err(SlaError::calculation(format!(
        "No working time found within {} days after {}",
        MAX_LOOKAHEAD_DAYS, cursor
    )))
}

fn hours_to_duration(hours: f64) -> SlaResult<Duration> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(SlaError::calculation(format!(
            "Required hours must be a non-negative number, got {}",
            hours
        )));
    }
    if hours > MAX_REQUIRED_HOURS {
        return Err(SlaError::calculation(format!(
            "Required hours {} exceed the supported maximum",
            hours
        )));
    }
    Ok(Duration::microseconds((hours * 3_600_000_000.0).round() as i64))
}

fn truncate_to_seconds(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.with_nanosecond(0).unwrap_or(instant)
}
