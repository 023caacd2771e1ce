use crate::domain::{
    entities::OperationalHours,
    errors::{SlaError, SlaResult},
    ports::{
        holiday_repository::HolidayRepository,
        operational_hours_repository::OperationalHoursRepository,
    },
    services::{CalculationContext, HolidayCalendar},
};
use arc_swap::ArcSwapOption;
use chrono::FixedOffset;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cache bounds for the operational hours snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Snapshots younger than this are served without touching storage
    pub ttl: Duration,
    /// Oldest snapshot still served when a reload fails
    pub max_staleness: Duration,
    /// Bound on one reload from storage
    pub load_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_staleness: Duration::from_secs(3600),
            load_timeout: Duration::from_secs(2),
        }
    }
}

/// One consistent generation of schedule and holidays
#[derive(Debug)]
pub struct CalendarSnapshot {
    pub hours: Arc<OperationalHours>,
    pub holidays: Arc<HolidayCalendar>,
    loaded_at: Instant,
}

impl CalendarSnapshot {
    pub fn age(&self) -> Duration {
        self.loaded_at.elapsed()
    }
}

/// Builds calculation contexts from the stored configuration.
///
/// Readers share an immutable snapshot; a refresh replaces it with a single
/// atomic swap.
pub struct CalculationContextProvider {
    hours_repo: Arc<dyn OperationalHoursRepository>,
    holiday_repo: Arc<dyn HolidayRepository>,
    offset: FixedOffset,
    settings: CacheSettings,
    snapshot: ArcSwapOption<CalendarSnapshot>,
}

impl CalculationContextProvider {
    pub fn new(
        hours_repo: Arc<dyn OperationalHoursRepository>,
        holiday_repo: Arc<dyn HolidayRepository>,
        offset: FixedOffset,
        settings: CacheSettings,
    ) -> Self {
        Self {
            hours_repo,
            holiday_repo,
            offset,
            settings,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Context for one calculation call
    pub async fn context(&self, operational_hours_enabled: bool) -> SlaResult<CalculationContext> {
        let snapshot = self.snapshot().await?;
        Ok(CalculationContext::new(
            snapshot.hours.clone(),
            snapshot.holidays.clone(),
            self.offset,
        )
        .with_operational_hours(operational_hours_enabled))
    }

    /// Current snapshot, reloading it when older than the TTL
    pub async fn snapshot(&self) -> SlaResult<Arc<CalendarSnapshot>> {
        let cached = self.snapshot.load_full();
        if let Some(snapshot) = &cached {
            if snapshot.age() < self.settings.ttl {
                return Ok(snapshot.clone());
            }
        }

        match tokio::time::timeout(self.settings.load_timeout, self.load()).await {
            Ok(Ok(fresh)) => {
                let fresh = Arc::new(fresh);
                self.snapshot.store(Some(fresh.clone()));
                debug!(
                    "Reloaded operational hours snapshot ({} holidays)",
                    fresh.holidays.len()
                );
                Ok(fresh)
            }
            Ok(Err(SlaError::Storage(reason))) => self.fall_back(cached, reason),
            Ok(Err(other)) => Err(other),
            Err(_) => self.fall_back(
                cached,
                format!("load timed out after {:?}", self.settings.load_timeout),
            ),
        }
    }

    /// Drop the cached snapshot so the next call reloads
    pub fn invalidate(&self) {
        self.snapshot.store(None);
        info!("Operational hours snapshot invalidated");
    }

    fn fall_back(
        &self,
        cached: Option<Arc<CalendarSnapshot>>,
        reason: String,
    ) -> SlaResult<Arc<CalendarSnapshot>> {
        match cached {
            Some(snapshot) if snapshot.age() <= self.settings.max_staleness => {
                warn!(
                    "Failed to reload operational hours ({}); serving snapshot from {:?} ago",
                    reason,
                    snapshot.age()
                );
                Ok(snapshot)
            }
            _ => Err(SlaError::config(format!(
                "Operational hours unavailable and no usable cached snapshot: {}",
                reason
            ))),
        }
    }

    async fn load(&self) -> SlaResult<CalendarSnapshot> {
        let config = self
            .hours_repo
            .get_active_operational_hours()
            .await?
            .ok_or_else(|| SlaError::config("No active operational hours configuration"))?;
        let hours = OperationalHours::from_config(&config)?;

        let holidays = self.holiday_repo.list_holidays().await?;
        let calendar = HolidayCalendar::from_holidays(&holidays);

        Ok(CalendarSnapshot {
            hours: Arc::new(hours),
            holidays: Arc::new(calendar),
            loaded_at: Instant::now(),
        })
    }
}
