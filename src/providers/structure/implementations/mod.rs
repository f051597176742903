pub mod cache_provider;
pub mod generation_provider;
pub mod remote_provider;
pub mod test_provider;
