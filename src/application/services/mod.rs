pub mod context_provider;
pub mod holiday_generation_service;
pub mod sla_service;

pub use context_provider::*;
pub use holiday_generation_service::*;
pub use sla_service::*;
