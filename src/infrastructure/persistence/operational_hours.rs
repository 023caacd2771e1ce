use crate::domain::{
    entities::{OperationalHours, OperationalHoursConfig},
    errors::SlaResult,
    ports::operational_hours_repository::OperationalHoursRepository,
};
use crate::infrastructure::persistence::Database;
use sqlx::Row;

impl Database {
    // ========================================
    // Operational Hours Operations
    // ========================================

    /// Get the active operational hours document
    pub async fn get_active_operational_hours(&self) -> SlaResult<Option<OperationalHoursConfig>> {
        let row = sqlx::query(
            "SELECT config FROM operational_hours
             WHERE is_active = 1
             ORDER BY updated_at DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let json: String = row.try_get("config")?;
                Ok(Some(OperationalHoursConfig::parse(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Store a validated configuration as the only active one
    pub async fn save_operational_hours(&self, config: &OperationalHoursConfig) -> SlaResult<String> {
        // Reject invalid schedules before they can reach a calculation
        OperationalHours::from_config(config)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let json = serde_json::to_string(config)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE operational_hours SET is_active = 0, updated_at = ? WHERE is_active = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO operational_hours (id, config, is_active, created_at, updated_at)
             VALUES (?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(&json)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Stored operational hours configuration {}", id);
        Ok(id)
    }
}

#[async_trait::async_trait]
impl OperationalHoursRepository for Database {
    async fn get_active_operational_hours(&self) -> SlaResult<Option<OperationalHoursConfig>> {
        self.get_active_operational_hours().await
    }

    async fn save_operational_hours(&self, config: &OperationalHoursConfig) -> SlaResult<String> {
        self.save_operational_hours(config).await
    }
}
