use crate::domain::entities::OperationalHoursConfig;
use crate::domain::errors::SlaResult;

/// Repository for the operational hours document owned by admin settings
#[async_trait::async_trait]
pub trait OperationalHoursRepository: Send + Sync {
    async fn get_active_operational_hours(&self) -> SlaResult<Option<OperationalHoursConfig>>;

    /// Validate and store a new active configuration, deactivating the
    /// previous one. Returns the new record id.
    async fn save_operational_hours(&self, config: &OperationalHoursConfig) -> SlaResult<String>;
}
