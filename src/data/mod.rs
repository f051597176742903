pub mod cjson;
pub mod params;

pub use cjson::whitelist_cjson;
pub use params::{ParameterSet, Task};
