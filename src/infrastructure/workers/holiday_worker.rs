use crate::application::services::HolidayGenerationService;
use crate::domain::entities::HolidayGenerationReport;
use crate::domain::ports::time_service::TimeService;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs holiday generation once at startup and then on a fixed interval
pub struct HolidayGenerationWorker {
    service: HolidayGenerationService,
    time_service: Arc<dyn TimeService>,
    interval: Duration,
}

impl HolidayGenerationWorker {
    pub fn new(
        service: HolidayGenerationService,
        time_service: Arc<dyn TimeService>,
        interval: Duration,
    ) -> Self {
        Self {
            service,
            time_service,
            interval,
        }
    }

    pub async fn run(&self) {
        info!("Starting HolidayGenerationWorker (interval {:?})", self.interval);
        loop {
            self.run_once().await;
            self.time_service.sleep(self.interval).await;
        }
    }

    /// One generation pass; errors are logged and the worker keeps going
    pub async fn run_once(&self) -> Option<HolidayGenerationReport> {
        match self.service.check_and_generate_holidays().await {
            Ok(report) => {
                metrics::counter!("sla_holidays_generated_total")
                    .increment(report.generated.len() as u64);
                metrics::counter!("sla_holidays_generation_failures_total")
                    .increment(report.failures.len() as u64);

                for failure in &report.failures {
                    warn!(
                        "Holiday '{}' ({}) not generated for {}: {}",
                        failure.name, failure.template_id, failure.year, failure.reason
                    );
                }
                if !report.generated.is_empty() {
                    info!("Generated {} holiday occurrences", report.generated.len());
                }
                Some(report)
            }
            Err(e) => {
                error!("Holiday generation run failed: {}", e);
                None
            }
        }
    }
}
