pub mod calendar;
pub mod due_date;
pub mod normalizer;

pub use calendar::*;
pub use due_date::*;
pub use normalizer::*;
