pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_support;

pub use application::services::{
    CacheSettings, CalculationContextProvider, HolidayGenerationService, SlaService,
};
pub use domain::entities::{
    parse_duration, Holiday, HolidayGenerationReport, OperationalHoursConfig, SlaDefinition,
    SlaDuration,
};
pub use domain::errors::{SlaError, SlaResult};
pub use domain::services::{
    calculate_due_date, CalculationContext, HolidayCalendar, ReferenceDayPolicy,
};
