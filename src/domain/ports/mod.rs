pub mod holiday_repository;
pub mod operational_hours_repository;
pub mod time_service;
