use crate::domain::{
    entities::{Holiday, HolidayKind},
    errors::{SlaError, SlaResult},
    ports::holiday_repository::HolidayRepository,
};
use crate::infrastructure::persistence::Database;
use chrono::NaiveDate;
use sqlx::{any::AnyRow, Row};

const HOLIDAY_COLUMNS: &str =
    "id, name, description, month, day, year, is_recurring, is_active, created_at, updated_at";

fn row_to_holiday(row: &AnyRow) -> SlaResult<Holiday> {
    let id: String = row.try_get("id")?;
    let month: i64 = row.try_get("month")?;
    let day: i64 = row.try_get("day")?;
    let year: Option<i64> = row.try_get("year")?;

    let bad_date = || SlaError::storage(format!("Holiday {} has an invalid date", id));
    let month = u32::try_from(month).map_err(|_| bad_date())?;
    let day = u32::try_from(day).map_err(|_| bad_date())?;

    let kind = match year {
        Some(year) => {
            let year = i32::try_from(year).map_err(|_| bad_date())?;
            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad_date)?;
            HolidayKind::Concrete { date }
        }
        None => HolidayKind::RecurringTemplate { month, day },
    };

    Ok(Holiday {
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        kind,
        is_recurring: row.try_get::<i64, _>("is_recurring")? != 0,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        id,
    })
}

impl Database {
    /// Create a new holiday
    pub async fn create_holiday(&self, holiday: &Holiday) -> SlaResult<()> {
        sqlx::query(
            "INSERT INTO holidays (id, name, description, month, day, year, is_recurring, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&holiday.id)
        .bind(&holiday.name)
        .bind(&holiday.description)
        .bind(i64::from(holiday.kind.month()))
        .bind(i64::from(holiday.kind.day()))
        .bind(holiday.kind.year().map(i64::from))
        .bind(i64::from(holiday.is_recurring))
        .bind(i64::from(holiday.is_active))
        .bind(&holiday.created_at)
        .bind(&holiday.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a generated holiday unless an active row holds its date
    pub async fn insert_generated_holiday(&self, holiday: &Holiday) -> SlaResult<bool> {
        let result = sqlx::query(
            "INSERT INTO holidays (id, name, description, month, day, year, is_recurring, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT DO NOTHING",
        )
        .bind(&holiday.id)
        .bind(&holiday.name)
        .bind(&holiday.description)
        .bind(i64::from(holiday.kind.month()))
        .bind(i64::from(holiday.kind.day()))
        .bind(holiday.kind.year().map(i64::from))
        .bind(i64::from(holiday.is_recurring))
        .bind(i64::from(holiday.is_active))
        .bind(&holiday.created_at)
        .bind(&holiday.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a holiday by ID
    pub async fn get_holiday(&self, id: &str) -> SlaResult<Option<Holiday>> {
        let row = sqlx::query(&format!("SELECT {} FROM holidays WHERE id = ?", HOLIDAY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_holiday).transpose()
    }

    /// Get all holidays
    pub async fn list_holidays(&self) -> SlaResult<Vec<Holiday>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM holidays ORDER BY year IS NOT NULL, year, month, day",
            HOLIDAY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_holiday).collect()
    }

    /// Active recurring templates, oldest first. Generated yearly rows are
    /// not templates.
    pub async fn list_recurring_holidays(&self) -> SlaResult<Vec<Holiday>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM holidays
             WHERE is_recurring = 1 AND is_active = 1 AND year IS NULL
             ORDER BY created_at ASC",
            HOLIDAY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_holiday).collect()
    }

    /// Concrete row on a date, preferring an active one
    pub async fn find_concrete_holiday(
        &self,
        month: u32,
        day: u32,
        year: i32,
    ) -> SlaResult<Option<Holiday>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM holidays
             WHERE month = ? AND day = ? AND year = ?
             ORDER BY is_active DESC, created_at ASC
             LIMIT 1",
            HOLIDAY_COLUMNS
        ))
        .bind(i64::from(month))
        .bind(i64::from(day))
        .bind(i64::from(year))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_holiday).transpose()
    }

    /// Enable or disable a holiday; rows are never deleted
    pub async fn set_holiday_active(&self, id: &str, is_active: bool) -> SlaResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query("UPDATE holidays SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(i64::from(is_active))
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SlaError::storage(format!("Holiday {} not found", id)));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl HolidayRepository for Database {
    async fn create_holiday(&self, holiday: &Holiday) -> SlaResult<()> {
        self.create_holiday(holiday).await
    }

    async fn get_holiday(&self, id: &str) -> SlaResult<Option<Holiday>> {
        self.get_holiday(id).await
    }

    async fn list_holidays(&self) -> SlaResult<Vec<Holiday>> {
        self.list_holidays().await
    }

    async fn list_recurring_holidays(&self) -> SlaResult<Vec<Holiday>> {
        self.list_recurring_holidays().await
    }

    async fn find_concrete_holiday(
        &self,
        month: u32,
        day: u32,
        year: i32,
    ) -> SlaResult<Option<Holiday>> {
        self.find_concrete_holiday(month, day, year).await
    }

    async fn insert_generated_holiday(&self, holiday: &Holiday) -> SlaResult<bool> {
        self.insert_generated_holiday(holiday).await
    }

    async fn set_holiday_active(&self, id: &str, is_active: bool) -> SlaResult<()> {
        self.set_holiday_active(id, is_active).await
    }
}
