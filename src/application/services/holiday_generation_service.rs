use crate::domain::{
    entities::{Holiday, HolidayGenerationFailure, HolidayGenerationReport, HolidayOccurrence},
    errors::SlaResult,
    ports::{holiday_repository::HolidayRepository, time_service::TimeService},
};
use chrono::{Datelike, FixedOffset};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Materializes yearly rows for recurring holidays.
///
/// Safe to run concurrently: duplicate inserts are rejected by the storage
/// uniqueness constraint and reported as already existing.
#[derive(Clone)]
pub struct HolidayGenerationService {
    holiday_repo: Arc<dyn HolidayRepository>,
    time_service: Arc<dyn TimeService>,
    offset: FixedOffset,
    lookahead_years: u32,
}

impl HolidayGenerationService {
    pub fn new(
        holiday_repo: Arc<dyn HolidayRepository>,
        time_service: Arc<dyn TimeService>,
        offset: FixedOffset,
        lookahead_years: u32,
    ) -> Self {
        Self {
            holiday_repo,
            time_service,
            offset,
            lookahead_years,
        }
    }

    /// Generate rows for the current business year and the lookahead years
    pub async fn check_and_generate_holidays(&self) -> SlaResult<HolidayGenerationReport> {
        let current_year = self.time_service.now().with_timezone(&self.offset).year();
        self.generate_from_year(current_year).await
    }

    /// Same as `check_and_generate_holidays` with an explicit first year
    pub async fn generate_from_year(&self, first_year: i32) -> SlaResult<HolidayGenerationReport> {
        let templates = self.holiday_repo.list_recurring_holidays().await?;
        let last_year = first_year + self.lookahead_years as i32;

        let mut report = HolidayGenerationReport::default();
        let mut seen = HashSet::new();

        for template in &templates {
            let Some(key) = template.template_key() else {
                continue;
            };
            // Several rows can share a (month, day); the first one wins
            if !seen.insert(key) {
                continue;
            }

            for year in first_year..=last_year {
                self.generate_one(template, year, &mut report).await;
            }
        }

        info!(
            "Holiday generation for {}..={}: {} generated, {} already existed, {} failed",
            first_year,
            last_year,
            report.generated.len(),
            report.already_existed.len(),
            report.failures.len()
        );

        Ok(report)
    }

    async fn generate_one(
        &self,
        template: &Holiday,
        year: i32,
        report: &mut HolidayGenerationReport,
    ) {
        let (month, day) = (template.kind.month(), template.kind.day());

        let failure = |reason: String| HolidayGenerationFailure {
            template_id: template.id.clone(),
            name: template.name.clone(),
            year,
            reason,
        };

        let existing = match self.holiday_repo.find_concrete_holiday(month, day, year).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Failed to look up holiday '{}' for {}: {}", template.name, year, e);
                report.failures.push(failure(e.to_string()));
                return;
            }
        };

        if let Some(existing) = existing {
            if let Some(date) = existing.kind.date() {
                report.already_existed.push(HolidayOccurrence {
                    id: existing.id,
                    name: existing.name,
                    date,
                    is_active: existing.is_active,
                });
            }
            return;
        }

        let Some(instance) = template.materialize(year) else {
            debug!("Holiday '{}' has no {:02}-{:02} in {}", template.name, month, day, year);
            report.failures.push(failure(format!(
                "{:02}-{:02} does not exist in {}",
                month, day, year
            )));
            return;
        };

        let Some(date) = instance.kind.date() else {
            return;
        };

        match self.holiday_repo.insert_generated_holiday(&instance).await {
            Ok(true) => {
                info!("Generated holiday '{}' on {}", instance.name, date);
                report.generated.push(HolidayOccurrence {
                    id: instance.id,
                    name: instance.name,
                    date,
                    is_active: true,
                });
            }
            Ok(false) => {
                // Another run inserted it between our lookup and insert
                match self.holiday_repo.find_concrete_holiday(month, day, year).await {
                    Ok(Some(winner)) => report.already_existed.push(HolidayOccurrence {
                        id: winner.id,
                        name: winner.name,
                        date,
                        is_active: winner.is_active,
                    }),
                    Ok(None) => report
                        .failures
                        .push(failure("insert was rejected but no row exists".to_string())),
                    Err(e) => report.failures.push(failure(e.to_string())),
                }
            }
            Err(e) => {
                warn!("Failed to generate holiday '{}' on {}: {}", template.name, date, e);
                report.failures.push(failure(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::HolidayKind;
    use crate::test_support::InMemoryHolidayRepository;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::time::Duration;

    struct FixedClock(DateTime<Utc>);

    #[async_trait]
    impl TimeService for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }

        async fn sleep(&self, _duration: Duration) {}
    }

    fn service(repo: Arc<InMemoryHolidayRepository>, lookahead_years: u32) -> HolidayGenerationService {
        HolidayGenerationService::new(
            repo,
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())),
            FixedOffset::east_opt(0).unwrap(),
            lookahead_years,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_template(repo: &InMemoryHolidayRepository, name: &str, month: u32, day: u32) -> Holiday {
        let template = Holiday::recurring(name.to_string(), None, month, day).unwrap();
        repo.create_holiday(&template).await.unwrap();
        template
    }

    #[tokio::test]
    async fn test_generates_current_and_lookahead_years() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        seed_template(&repo, "Christmas", 12, 25).await;

        let report = service(repo.clone(), 1).check_and_generate_holidays().await.unwrap();

        let dates: Vec<_> = report.generated.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2026, 12, 25), date(2027, 12, 25)]);
        assert!(report.already_existed.is_empty());
        assert!(report.is_clean());

        let generated: Vec<_> = repo
            .rows()
            .into_iter()
            .filter(|h| matches!(h.kind, HolidayKind::Concrete { .. }))
            .collect();
        assert_eq!(generated.len(), 2);
        assert!(generated.iter().all(|h| h.is_recurring && h.is_active && h.name == "Christmas"));
    }

    #[tokio::test]
    async fn test_second_run_generates_nothing() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        seed_template(&repo, "Christmas", 12, 25).await;
        seed_template(&repo, "New Year", 1, 1).await;
        let service = service(repo.clone(), 1);

        let first = service.check_and_generate_holidays().await.unwrap();
        assert_eq!(first.generated.len(), 4);

        let second = service.check_and_generate_holidays().await.unwrap();
        assert!(second.generated.is_empty());
        assert_eq!(second.already_existed.len(), 4);
        assert_eq!(repo.rows().len(), 6);
    }

    #[tokio::test]
    async fn test_disabled_instance_is_not_reactivated() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        let template = seed_template(&repo, "Christmas", 12, 25).await;
        let mut disabled = template.materialize(2026).unwrap();
        disabled.is_active = false;
        repo.create_holiday(&disabled).await.unwrap();

        let report = service(repo.clone(), 0).check_and_generate_holidays().await.unwrap();

        assert!(report.generated.is_empty());
        assert_eq!(report.already_existed.len(), 1);
        assert_eq!(report.already_existed[0].id, disabled.id);
        assert!(!report.already_existed[0].is_active);
        let stored = repo.get_holiday(&disabled.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_generated_rows_are_not_templates() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        let mut legacy = Holiday::new("Independence Day".into(), None, date(2025, 7, 4));
        legacy.is_recurring = true;
        repo.create_holiday(&legacy).await.unwrap();

        let report = service(repo, 1).check_and_generate_holidays().await.unwrap();
        assert_eq!(report, HolidayGenerationReport::default());
    }

    #[tokio::test]
    async fn test_disabling_template_stops_generation() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        let template = seed_template(&repo, "Founders Day", 3, 3).await;
        let service = service(repo.clone(), 1);

        let first = service.generate_from_year(2026).await.unwrap();
        assert_eq!(first.generated.len(), 2);

        repo.set_holiday_active(&template.id, false).await.unwrap();
        let second = service.generate_from_year(2027).await.unwrap();
        assert_eq!(second, HolidayGenerationReport::default());
        assert_eq!(repo.rows().len(), 3);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_run() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        seed_template(&repo, "Labour Day", 5, 1).await;
        seed_template(&repo, "Christmas", 12, 25).await;
        repo.fail_inserts_on(5, 1);

        let report = service(repo, 0).check_and_generate_holidays().await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "Labour Day");
        assert_eq!(report.failures[0].year, 2026);
        assert_eq!(report.generated.len(), 1);
        assert_eq!(report.generated[0].date, date(2026, 12, 25));
    }

    #[tokio::test]
    async fn test_leap_day_reported_for_common_years() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        seed_template(&repo, "Leap day", 2, 29).await;

        let report = service(repo, 0).generate_from_year(2027).await.unwrap();
        assert!(report.generated.is_empty());
        assert_eq!(report.failures.len(), 1);

        let repo = Arc::new(InMemoryHolidayRepository::default());
        seed_template(&repo, "Leap day", 2, 29).await;
        let report = service(repo, 0).generate_from_year(2028).await.unwrap();
        assert_eq!(report.generated[0].date, date(2028, 2, 29));
    }

    #[tokio::test]
    async fn test_disabled_template_is_ignored() {
        let repo = Arc::new(InMemoryHolidayRepository::default());
        let template = seed_template(&repo, "Retired", 3, 3).await;
        repo.set_holiday_active(&template.id, false).await.unwrap();

        let report = service(repo, 1).check_and_generate_holidays().await.unwrap();
        assert_eq!(report, HolidayGenerationReport::default());
    }
}
