pub mod holiday;
pub mod operational_hours;
pub mod sla;

pub use holiday::*;
pub use operational_hours::*;
pub use sla::*;
