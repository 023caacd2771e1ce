use crate::application::services::{
    CalculationContextProvider, HolidayGenerationService, SlaService,
};
use crate::config::Config;
use crate::domain::ports::time_service::TimeService;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::workers::HolidayGenerationWorker;
use std::sync::Arc;

/// Services wired from configuration and storage
pub struct AppState {
    pub contexts: Arc<CalculationContextProvider>,
    pub sla_service: SlaService,
    pub holiday_worker: HolidayGenerationWorker,
}

pub fn build_app_state(
    db: Database,
    config: &Config,
    time_service: Arc<dyn TimeService>,
) -> AppState {
    let db = Arc::new(db);

    let contexts = Arc::new(CalculationContextProvider::new(
        db.clone(),
        db.clone(),
        config.business_offset,
        config.cache_settings(),
    ));

    let sla_service = SlaService::new(contexts.clone(), config.reference_day_policy);
    tracing::info!(
        "SLA service initialized (reference day policy {:?})",
        config.reference_day_policy
    );

    let generator = HolidayGenerationService::new(
        db,
        time_service.clone(),
        config.business_offset,
        config.holiday_lookahead_years,
    );
    let holiday_worker = HolidayGenerationWorker::new(
        generator,
        time_service,
        config.holiday_generation_interval(),
    );

    AppState {
        contexts,
        sla_service,
        holiday_worker,
    }
}
