pub mod observability;
pub mod persistence;
pub mod runtime;
pub mod workers;
