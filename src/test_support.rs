//! In-memory doubles for unit tests.

use crate::domain::{
    entities::{Holiday, HolidayKind},
    errors::{SlaError, SlaResult},
    ports::holiday_repository::HolidayRepository,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Holiday store mirroring the database's `(month, day, year)` uniqueness
/// rule for active concrete rows
#[derive(Default)]
pub struct InMemoryHolidayRepository {
    rows: Mutex<Vec<Holiday>>,
    failing_dates: Mutex<HashSet<(u32, u32)>>,
}

impl InMemoryHolidayRepository {
    /// Make inserts of concrete rows on this (month, day) fail
    pub fn fail_inserts_on(&self, month: u32, day: u32) {
        self.failing_dates.lock().unwrap().insert((month, day));
    }

    pub fn rows(&self) -> Vec<Holiday> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl HolidayRepository for InMemoryHolidayRepository {
    async fn create_holiday(&self, holiday: &Holiday) -> SlaResult<()> {
        if !self.insert_generated_holiday(holiday).await? {
            return Err(SlaError::storage("UNIQUE constraint failed: holidays"));
        }
        Ok(())
    }

    async fn get_holiday(&self, id: &str) -> SlaResult<Option<Holiday>> {
        Ok(self.rows.lock().unwrap().iter().find(|h| h.id == id).cloned())
    }

    async fn list_holidays(&self) -> SlaResult<Vec<Holiday>> {
        Ok(self.rows())
    }

    async fn list_recurring_holidays(&self) -> SlaResult<Vec<Holiday>> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|h| h.is_active && h.is_recurring)
            .filter(|h| matches!(h.kind, HolidayKind::RecurringTemplate { .. }))
            .collect())
    }

    async fn find_concrete_holiday(
        &self,
        month: u32,
        day: u32,
        year: i32,
    ) -> SlaResult<Option<Holiday>> {
        let matching: Vec<Holiday> = self
            .rows()
            .into_iter()
            .filter(|h| {
                h.kind.year() == Some(year) && h.kind.month() == month && h.kind.day() == day
            })
            .collect();
        // Same preference as the SQL query: active first, then oldest
        let active = matching.iter().find(|h| h.is_active).cloned();
        Ok(active.or_else(|| matching.into_iter().next()))
    }

    async fn insert_generated_holiday(&self, holiday: &Holiday) -> SlaResult<bool> {
        let key = (holiday.kind.month(), holiday.kind.day());
        if holiday.kind.year().is_some() && self.failing_dates.lock().unwrap().contains(&key) {
            return Err(SlaError::storage("disk I/O error"));
        }

        let mut rows = self.rows.lock().unwrap();
        let taken = holiday.is_active
            && holiday.kind.year().is_some()
            && rows.iter().any(|h| {
                h.is_active
                    && h.kind.year() == holiday.kind.year()
                    && h.kind.month() == key.0
                    && h.kind.day() == key.1
            });
        if taken {
            return Ok(false);
        }
        rows.push(holiday.clone());
        Ok(true)
    }

    async fn set_holiday_active(&self, id: &str, is_active: bool) -> SlaResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| SlaError::storage(format!("Holiday {} not found", id)))?;
        row.is_active = is_active;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_find_concrete_holiday_prefers_active_row() {
        let repo = InMemoryHolidayRepository::default();
        let date = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        let mut disabled = Holiday::new("Christmas".into(), None, date);
        disabled.is_active = false;
        let active = Holiday::new("Christmas".into(), None, date);
        repo.create_holiday(&disabled).await.unwrap();
        repo.create_holiday(&active).await.unwrap();

        let found = repo.find_concrete_holiday(12, 25, 2026).await.unwrap().unwrap();
        assert_eq!(found.id, active.id);

        repo.set_holiday_active(&active.id, false).await.unwrap();
        let found = repo.find_concrete_holiday(12, 25, 2026).await.unwrap().unwrap();
        assert_eq!(found.id, disabled.id);
    }
}
