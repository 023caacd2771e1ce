pub mod holiday_worker;

pub use holiday_worker::*;
