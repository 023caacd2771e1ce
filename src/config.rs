use crate::application::services::context_provider::CacheSettings;
use crate::domain::services::ReferenceDayPolicy;
use chrono::{FixedOffset, Offset, Utc};
use regex::Regex;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub business_offset: FixedOffset,
    pub cache_ttl_secs: u64,
    pub max_staleness_secs: u64,
    pub load_timeout_ms: u64,
    pub holiday_lookahead_years: u32,
    pub holiday_generation_interval_secs: u64,
    pub reference_day_policy: ReferenceDayPolicy,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, SettingsError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://oxidesk-sla.db?mode=rwc".to_string());

        let business_offset = match env::var("BUSINESS_UTC_OFFSET") {
            Ok(raw) => parse_utc_offset(&raw)?,
            Err(_) => utc(),
        };

        let cache_ttl_secs = parse_var("SLA_CACHE_TTL_SECS", 300)?;
        let max_staleness_secs = parse_var("SLA_MAX_STALENESS_SECS", 3600)?;
        let load_timeout_ms = parse_var("SLA_LOAD_TIMEOUT_MS", 2000)?;
        let holiday_lookahead_years = parse_var("HOLIDAY_LOOKAHEAD_YEARS", 1)?;
        let holiday_generation_interval_secs =
            parse_var("HOLIDAY_GENERATION_INTERVAL_SECS", 86_400)?;

        if holiday_generation_interval_secs == 0 {
            return Err(SettingsError::InvalidValue {
                name: "HOLIDAY_GENERATION_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let reference_day_policy = match env::var("SLA_REFERENCE_DAY_POLICY") {
            Ok(raw) => raw.parse().map_err(|_| SettingsError::InvalidValue {
                name: "SLA_REFERENCE_DAY_POLICY",
                value: raw,
            })?,
            Err(_) => ReferenceDayPolicy::default(),
        };

        let metrics_port = match env::var("METRICS_PORT") {
            Ok(raw) => Some(raw.parse().map_err(|_| SettingsError::InvalidPort(raw))?),
            Err(_) => None,
        };

        Ok(Config {
            database_url,
            business_offset,
            cache_ttl_secs,
            max_staleness_secs,
            load_timeout_ms,
            holiday_lookahead_years,
            holiday_generation_interval_secs,
            reference_day_policy,
            metrics_port,
        })
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            max_staleness: Duration::from_secs(self.max_staleness_secs),
            load_timeout: Duration::from_millis(self.load_timeout_ms),
        }
    }

    pub fn holiday_generation_interval(&self) -> Duration {
        Duration::from_secs(self.holiday_generation_interval_secs)
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, SettingsError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidValue { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn offset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([+-])(\d{2}):?(\d{2})$").expect("Invalid offset regex"))
}

/// Parse `+HH:MM`, `-HHMM` or `Z` into a fixed offset
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, SettingsError> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let invalid = || SettingsError::InvalidOffset(raw.to_string());
    let caps = offset_regex().captures(value).ok_or_else(invalid)?;

    let hours: i32 = caps[2].parse().map_err(|_| invalid())?;
    let minutes: i32 = caps[3].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    let seconds = hours * 3600 + minutes * 60;
    let seconds = if &caps[1] == "-" { -seconds } else { seconds };
    FixedOffset::east_opt(seconds).ok_or_else(invalid)
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid UTC offset '{0}', expected +HH:MM")]
    InvalidOffset(String),

    #[error("Invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid port number '{0}'")]
    InvalidPort(String),
}
