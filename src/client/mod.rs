pub mod facade;
pub mod result;

pub use facade::{CalculationClient, Structure};
pub use result::CalculationResult;
