#![allow(dead_code)]
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use oxidesk_sla::{
    bootstrap::{build_app_state, AppState},
    config::Config,
    infrastructure::{persistence::Database, runtime::TokioTimeService},
    CacheSettings, CalculationContextProvider, Holiday, OperationalHoursConfig,
    ReferenceDayPolicy, SlaService,
};
use std::sync::Arc;

pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

pub fn utc_offset() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monday to Friday 08:00-17:00 with no breaks
pub fn office_hours() -> OperationalHoursConfig {
    OperationalHoursConfig::standard("08:00", "17:00", &WEEKDAYS)
}

pub async fn save_hours(db: &Database, config: &OperationalHoursConfig) {
    db.save_operational_hours(config)
        .await
        .expect("Failed to save operational hours");
}

pub async fn create_test_holiday(db: &Database, name: &str, on: NaiveDate) -> Holiday {
    let holiday = Holiday::new(name.to_string(), None, on);
    db.create_holiday(&holiday)
        .await
        .expect("Failed to create holiday");
    holiday
}

pub async fn create_recurring_holiday(db: &Database, name: &str, month: u32, day: u32) -> Holiday {
    let holiday = Holiday::recurring(name.to_string(), None, month, day)
        .expect("Invalid recurring holiday");
    db.create_holiday(&holiday)
        .await
        .expect("Failed to create recurring holiday");
    holiday
}

pub fn provider_for(db: &Database, offset: FixedOffset) -> Arc<CalculationContextProvider> {
    Arc::new(CalculationContextProvider::new(
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        offset,
        CacheSettings::default(),
    ))
}

pub fn sla_service_for(db: &Database) -> SlaService {
    SlaService::new(provider_for(db, utc_offset()), ReferenceDayPolicy::Average)
}

pub fn test_config(policy: ReferenceDayPolicy) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        business_offset: utc_offset(),
        cache_ttl_secs: 300,
        max_staleness_secs: 3600,
        load_timeout_ms: 2000,
        holiday_lookahead_years: 1,
        holiday_generation_interval_secs: 86_400,
        reference_day_policy: policy,
        metrics_port: None,
    }
}

pub fn build_state(db: &Database, policy: ReferenceDayPolicy) -> AppState {
    build_app_state(
        db.clone(),
        &test_config(policy),
        Arc::new(TokioTimeService::new()),
    )
}
