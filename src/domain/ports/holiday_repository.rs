use crate::domain::entities::Holiday;
use crate::domain::errors::SlaResult;

/// Repository for holiday calendar rows
#[async_trait::async_trait]
pub trait HolidayRepository: Send + Sync {
    async fn create_holiday(&self, holiday: &Holiday) -> SlaResult<()>;
    async fn get_holiday(&self, id: &str) -> SlaResult<Option<Holiday>>;
    async fn list_holidays(&self) -> SlaResult<Vec<Holiday>>;

    /// Active recurring templates; generated yearly rows are excluded
    async fn list_recurring_holidays(&self) -> SlaResult<Vec<Holiday>>;

    /// Concrete row on the given date, preferring an active one
    async fn find_concrete_holiday(
        &self,
        month: u32,
        day: u32,
        year: i32,
    ) -> SlaResult<Option<Holiday>>;

    /// Insert a generated row. Returns false when an active row for the same
    /// (month, day, year) already exists; the storage uniqueness constraint
    /// decides, so concurrent generators cannot both succeed.
    async fn insert_generated_holiday(&self, holiday: &Holiday) -> SlaResult<bool>;

    async fn set_holiday_active(&self, id: &str, is_active: bool) -> SlaResult<()>;
}
