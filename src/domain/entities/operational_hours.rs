use crate::domain::errors::{SlaError, SlaResult};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SECONDS_PER_DAY: u32 = 86_400;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ===== Stored configuration document =====

/// How the weekly schedule is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingTimeType {
    /// Every non-holiday day is one [00:00, 24:00) window
    RoundTheClock,
    /// Enabled days share the standard start/end and standard breaks
    StandardFixed,
    /// Enabled days may override the standard window with their own
    PerDayCustom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    #[default]
    Standard,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPeriodConfig {
    pub start: String, // "12:00"
    pub end: String,   // "13:00"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDayConfig {
    pub weekday: Weekday,
    pub enabled: bool,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub custom_start: Option<String>,
    #[serde(default)]
    pub custom_end: Option<String>,
    #[serde(default)]
    pub breaks: Vec<BreakPeriodConfig>,
}

/// Operational hours as edited by admins and stored as JSON.
///
/// Times are wall-clock `HH:MM` or `HH:MM:SS` strings in the business
/// timezone; `24:00` is accepted as an end of day. Weekdays without an entry
/// are treated as disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalHoursConfig {
    pub working_time_type: WorkingTimeType,
    pub standard_start: String,
    pub standard_end: String,
    #[serde(default)]
    pub standard_breaks: Vec<BreakPeriodConfig>,
    #[serde(default)]
    pub days: Vec<WorkingDayConfig>,
}

impl OperationalHoursConfig {
    /// Standard-fixed schedule with the given weekdays enabled
    pub fn standard(start: &str, end: &str, working_days: &[Weekday]) -> Self {
        Self {
            working_time_type: WorkingTimeType::StandardFixed,
            standard_start: start.to_string(),
            standard_end: end.to_string(),
            standard_breaks: Vec::new(),
            days: WEEK
                .iter()
                .map(|weekday| WorkingDayConfig {
                    weekday: *weekday,
                    enabled: working_days.contains(weekday),
                    schedule_type: ScheduleType::Standard,
                    custom_start: None,
                    custom_end: None,
                    breaks: Vec::new(),
                })
                .collect(),
        }
    }

    /// Round-the-clock schedule; standard times are kept only for display
    pub fn round_the_clock() -> Self {
        let mut config = Self::standard("00:00", "24:00", &WEEK);
        config.working_time_type = WorkingTimeType::RoundTheClock;
        config
    }

    pub fn with_standard_break(mut self, start: &str, end: &str) -> Self {
        self.standard_breaks.push(BreakPeriodConfig {
            start: start.to_string(),
            end: end.to_string(),
        });
        self
    }

    /// Give one weekday its own window and breaks (switches to per-day mode)
    pub fn with_custom_day(
        mut self,
        weekday: Weekday,
        start: &str,
        end: &str,
        breaks: &[(&str, &str)],
    ) -> Self {
        self.working_time_type = WorkingTimeType::PerDayCustom;
        let custom = WorkingDayConfig {
            weekday,
            enabled: true,
            schedule_type: ScheduleType::Custom,
            custom_start: Some(start.to_string()),
            custom_end: Some(end.to_string()),
            breaks: breaks
                .iter()
                .map(|(s, e)| BreakPeriodConfig {
                    start: s.to_string(),
                    end: e.to_string(),
                })
                .collect(),
        };
        self.days.retain(|d| d.weekday != weekday);
        self.days.push(custom);
        self
    }

    /// Parse a stored configuration document
    pub fn parse(json_str: &str) -> SlaResult<Self> {
        Ok(serde_json::from_str::<OperationalHoursConfig>(json_str)?)
    }
}

// ===== Validated model =====

/// Wall-clock time of day in seconds since midnight, `0..=86_400`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(SECONDS_PER_DAY);

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> SlaResult<Self> {
        if hours == 24 && minutes == 0 && seconds == 0 {
            return Ok(Self::END_OF_DAY);
        }
        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(SlaError::config(format!(
                "Time of day out of range: {:02}:{:02}:{:02}",
                hours, minutes, seconds
            )));
        }
        Ok(TimeOfDay(hours * 3600 + minutes * 60 + seconds))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = SlaError;

    fn from_str(s: &str) -> SlaResult<Self> {
        let invalid = || {
            SlaError::config(format!(
                "Invalid time of day '{}'. Expected HH:MM or HH:MM:SS",
                s
            ))
        };

        let parts: Vec<&str> = s.trim().split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }

        let mut fields = [0u32; 3];
        for (slot, part) in fields.iter_mut().zip(parts.iter()) {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Self::from_hms(fields[0], fields[1], fields[2])
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = (self.0 / 3600, (self.0 % 3600) / 60, self.0 % 60);
        if s == 0 {
            write!(f, "{:02}:{:02}", h, m)
        } else {
            write!(f, "{:02}:{:02}:{:02}", h, m, s)
        }
    }
}

/// Half-open `[start, end)` interval within one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> SlaResult<Self> {
        if start >= end {
            return Err(SlaError::config(format!(
                "Window start {} must be before its end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    fn parse(start: &str, end: &str) -> SlaResult<Self> {
        Self::new(start.parse()?, end.parse()?)
    }

    pub fn seconds(&self) -> u32 {
        self.end.seconds() - self.start.seconds()
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start <= time && time < self.end
    }
}

/// Working window of one weekday with its breaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    window: TimeWindow,
    breaks: Vec<TimeWindow>, // sorted, non-overlapping
}

impl DaySchedule {
    pub fn new(window: TimeWindow, mut breaks: Vec<TimeWindow>) -> SlaResult<Self> {
        breaks.sort_by_key(|b| b.start);
        for pair in breaks.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(SlaError::config(format!(
                    "Overlapping breaks {}-{} and {}-{}",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }
        Ok(Self { window, breaks })
    }

    pub fn full_day() -> Self {
        Self {
            window: TimeWindow {
                start: TimeOfDay::MIDNIGHT,
                end: TimeOfDay::END_OF_DAY,
            },
            breaks: Vec::new(),
        }
    }

    /// The day's window minus its breaks. Breaks reaching past the window
    /// are clipped to it.
    pub fn working_windows(&self) -> Vec<TimeWindow> {
        let mut windows = Vec::with_capacity(self.breaks.len() + 1);
        let mut cursor = self.window.start;

        for brk in &self.breaks {
            let start = brk.start.max(self.window.start);
            let end = brk.end.min(self.window.end);
            if start >= end {
                continue;
            }
            if start > cursor {
                windows.push(TimeWindow { start: cursor, end: start });
            }
            cursor = cursor.max(end);
        }

        if cursor < self.window.end {
            windows.push(TimeWindow {
                start: cursor,
                end: self.window.end,
            });
        }

        windows
    }

    pub fn working_seconds(&self) -> u32 {
        self.working_windows().iter().map(TimeWindow::seconds).sum()
    }
}

/// Validated weekly schedule. Holidays are not part of it; see
/// `CalculationContext` for the combined view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationalHours {
    working_time_type: WorkingTimeType,
    days: [Option<DaySchedule>; 7], // indexed from Monday, None when disabled
}

impl OperationalHours {
    pub fn from_config(config: &OperationalHoursConfig) -> SlaResult<Self> {
        let standard = DaySchedule::new(
            TimeWindow::parse(&config.standard_start, &config.standard_end)?,
            parse_breaks(&config.standard_breaks)?,
        )?;

        let mut days: [Option<DaySchedule>; 7] = Default::default();
        let mut seen = [false; 7];

        for day in &config.days {
            let idx = day.weekday.num_days_from_monday() as usize;
            if seen[idx] {
                return Err(SlaError::config(format!(
                    "Weekday {} is configured more than once",
                    day.weekday
                )));
            }
            seen[idx] = true;

            if config.working_time_type == WorkingTimeType::RoundTheClock {
                continue;
            }

            if !day.enabled {
                // Still reject malformed times on disabled days
                for time in day.custom_start.iter().chain(day.custom_end.iter()) {
                    time.parse::<TimeOfDay>()?;
                }
                parse_breaks(&day.breaks)?;
                continue;
            }

            let custom = match day.schedule_type {
                ScheduleType::Custom => Some(parse_custom_day(day)?),
                ScheduleType::Standard => None,
            };

            days[idx] = match (config.working_time_type, custom) {
                (WorkingTimeType::PerDayCustom, Some(custom)) => Some(custom),
                _ => Some(standard.clone()),
            };
        }

        if config.working_time_type == WorkingTimeType::RoundTheClock {
            days = std::array::from_fn(|_| Some(DaySchedule::full_day()));
        }

        Ok(Self {
            working_time_type: config.working_time_type,
            days,
        })
    }

    pub fn working_time_type(&self) -> WorkingTimeType {
        self.working_time_type
    }

    /// Schedule of a weekday, `None` when the day is disabled
    pub fn schedule_for(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    /// Working sub-intervals of a weekday, ignoring holidays
    pub fn windows_for_weekday(&self, weekday: Weekday) -> Vec<TimeWindow> {
        self.schedule_for(weekday)
            .map(DaySchedule::working_windows)
            .unwrap_or_default()
    }

    pub fn is_enabled(&self, weekday: Weekday) -> bool {
        self.schedule_for(weekday).is_some()
    }

    /// Working seconds of every enabled weekday that has any working time
    pub fn enabled_day_seconds(&self) -> Vec<(Weekday, u32)> {
        WEEK.iter()
            .filter_map(|weekday| {
                self.schedule_for(*weekday)
                    .map(|schedule| (*weekday, schedule.working_seconds()))
            })
            .filter(|(_, seconds)| *seconds > 0)
            .collect()
    }
}

fn parse_breaks(breaks: &[BreakPeriodConfig]) -> SlaResult<Vec<TimeWindow>> {
    breaks
        .iter()
        .map(|b| TimeWindow::parse(&b.start, &b.end))
        .collect()
}

fn parse_custom_day(day: &WorkingDayConfig) -> SlaResult<DaySchedule> {
    let (start, end) = match (&day.custom_start, &day.custom_end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(SlaError::config(format!(
                "{} uses a custom schedule but has no custom start/end",
                day.weekday
            )))
        }
    };
    DaySchedule::new(TimeWindow::parse(start, end)?, parse_breaks(&day.breaks)?)
}
