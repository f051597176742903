use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::client_error::ProviderError;
use crate::providers::structure::implementations::generation_provider::build_record;
use crate::providers::structure::trait_structure::StructureProvider;
use crate::structure::{Identifier, StructureRecord};

/// Proveedor determinista para pruebas: resuelve únicamente los
/// identificadores sembrados, con registros construidos por el toolkit.
#[derive(Debug, Default)]
pub struct TestStructureProvider {
    seeds: DashMap<String, StructureRecord>,
}

impl TestStructureProvider {
    pub fn new() -> Self {
        Self { seeds: DashMap::new() }
    }

    /// Siembra un identificador resoluble. Entradas que el toolkit no sabe
    /// interpretar se ignoran.
    pub fn seed(self, raw: &str) -> Self {
        if let Ok(id) = Identifier::parse(raw) {
            if let Ok(Some(record)) = build_record(&id, "test-seed") {
                self.seeds.insert(id.normalized().to_string(), record);
            }
        }
        self
    }
}

#[async_trait]
impl StructureProvider for TestStructureProvider {
    fn get_name(&self) -> &str {
        "test-seed"
    }

    fn get_description(&self) -> &str {
        "Fixed seed set of resolvable structures for tests"
    }

    async fn resolve(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<StructureRecord>, ProviderError> {
        Ok(self.seeds.get(identifier.normalized()).map(|e| e.clone()))
    }
}
