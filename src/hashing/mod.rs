pub mod canonical_json;

pub use canonical_json::{hash_value, to_canonical_json};
