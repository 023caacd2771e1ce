use crate::domain::errors::{SlaError, SlaResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Either a dated holiday or a yearly (month, day) template.
///
/// Templates never mark a day as non-working by themselves; the holiday
/// generator materializes them into `Concrete` rows per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HolidayKind {
    Concrete { date: NaiveDate },
    RecurringTemplate { month: u32, day: u32 },
}

impl HolidayKind {
    pub fn month(&self) -> u32 {
        match self {
            HolidayKind::Concrete { date } => date.month(),
            HolidayKind::RecurringTemplate { month, .. } => *month,
        }
    }

    pub fn day(&self) -> u32 {
        match self {
            HolidayKind::Concrete { date } => date.day(),
            HolidayKind::RecurringTemplate { day, .. } => *day,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            HolidayKind::Concrete { date } => Some(date.year()),
            HolidayKind::RecurringTemplate { .. } => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            HolidayKind::Concrete { date } => Some(*date),
            HolidayKind::RecurringTemplate { .. } => None,
        }
    }
}

/// Holiday calendar entry for SLA business hours calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: HolidayKind,
    /// Templates and the rows generated from them carry this flag
    pub is_recurring: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Holiday {
    /// One-off holiday on a specific date
    pub fn new(name: String, description: Option<String>, date: NaiveDate) -> Self {
        Self::build(name, description, HolidayKind::Concrete { date }, false)
    }

    /// Yearly template keyed by (month, day)
    pub fn recurring(
        name: String,
        description: Option<String>,
        month: u32,
        day: u32,
    ) -> SlaResult<Self> {
        // 2000 is a leap year, so 29 February is accepted as a template
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(SlaError::config(format!(
                "Invalid recurring holiday date: month {} day {}",
                month, day
            )));
        }
        Ok(Self::build(
            name,
            description,
            HolidayKind::RecurringTemplate { month, day },
            true,
        ))
    }

    fn build(
        name: String,
        description: Option<String>,
        kind: HolidayKind,
        is_recurring: bool,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            kind,
            is_recurring,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The (month, day) of an active recurring template. Generated yearly
    /// rows are not templates.
    pub fn template_key(&self) -> Option<(u32, u32)> {
        match self.kind {
            HolidayKind::RecurringTemplate { month, day } if self.is_recurring && self.is_active => {
                Some((month, day))
            }
            _ => None,
        }
    }

    /// Concrete instance of this template in `year`. `None` when the
    /// (month, day) does not exist that year (29 February).
    pub fn materialize(&self, year: i32) -> Option<Holiday> {
        let date = NaiveDate::from_ymd_opt(year, self.kind.month(), self.kind.day())?;
        Some(Self::build(
            self.name.clone(),
            self.description.clone(),
            HolidayKind::Concrete { date },
            true,
        ))
    }
}

/// A generated or pre-existing concrete holiday, as reported for auditing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayOccurrence {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayGenerationFailure {
    pub template_id: String,
    pub name: String,
    pub year: i32,
    pub reason: String,
}

/// Outcome of one holiday generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HolidayGenerationReport {
    pub generated: Vec<HolidayOccurrence>,
    pub already_existed: Vec<HolidayOccurrence>,
    pub failures: Vec<HolidayGenerationFailure>,
}

impl HolidayGenerationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
