use crate::domain::errors::{SlaError, SlaResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ===== SLA Duration =====

/// Declared SLA time. Days are converted to working hours through the
/// configured reference day length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlaDuration {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl SlaDuration {
    pub fn new(days: u32, hours: u32, minutes: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }

    /// Wall-clock hours, counting a day as 24 hours
    pub fn elapsed_hours(&self) -> f64 {
        f64::from(self.days) * 24.0 + f64::from(self.hours) + f64::from(self.minutes) / 60.0
    }
}

impl fmt::Display for SlaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
    }
}

// ===== SLA Definition =====

/// Resolution time of an SLA as declared by the SLA-assignment code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaDefinition {
    pub resolution_days: u32,
    pub resolution_hours: u32,
    pub resolution_minutes: u32,
    /// When false the deadline is plain elapsed time
    pub operational_hours_enabled: bool,
}

impl SlaDefinition {
    pub fn resolution(&self) -> SlaDuration {
        SlaDuration::new(
            self.resolution_days,
            self.resolution_hours,
            self.resolution_minutes,
        )
    }
}

// ===== Duration strings =====

/// Parse an SLA duration string such as `"2h"`, `"30m"`, `"1d4h"` or
/// `"1d 4h 30m"`. Each unit may appear once.
pub fn parse_duration(duration_str: &str) -> SlaResult<SlaDuration> {
    static FULL_REGEX: OnceLock<Regex> = OnceLock::new();
    static PART_REGEX: OnceLock<Regex> = OnceLock::new();
    let full = FULL_REGEX.get_or_init(|| {
        Regex::new(r"^\s*(\d+\s*[dhm]\s*)+$").expect("Invalid duration regex")
    });
    let part = PART_REGEX
        .get_or_init(|| Regex::new(r"(\d+)\s*([dhm])").expect("Invalid duration regex"));

    if !full.is_match(duration_str) {
        return Err(SlaError::config(format!(
            "Invalid duration format: '{}'. Expected <number><d|h|m>, e.g. \"1d 4h 30m\"",
            duration_str
        )));
    }

    let mut days = None;
    let mut hours = None;
    let mut minutes = None;

    for caps in part.captures_iter(duration_str) {
        let number: u32 = caps[1].parse().map_err(|_| {
            SlaError::config(format!("Invalid number in duration: {}", &caps[1]))
        })?;

        let slot = match &caps[2] {
            "d" => &mut days,
            "h" => &mut hours,
            "m" => &mut minutes,
            unit => return Err(SlaError::config(format!("Invalid duration unit: {}", unit))),
        };

        if slot.replace(number).is_some() {
            return Err(SlaError::config(format!(
                "Duration unit '{}' appears more than once in '{}'",
                &caps[2], duration_str
            )));
        }
    }

    Ok(SlaDuration::new(
        days.unwrap_or(0),
        hours.unwrap_or(0),
        minutes.unwrap_or(0),
    ))
}
