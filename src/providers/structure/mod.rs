pub mod implementations;
pub mod trait_structure;

pub use implementations::cache_provider::CacheProvider;
pub use implementations::generation_provider::GenerationProvider;
pub use implementations::remote_provider::RemoteLookupProvider;
pub use implementations::test_provider::TestStructureProvider;
pub use trait_structure::StructureProvider;
