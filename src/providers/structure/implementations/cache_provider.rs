use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::client_error::ProviderError;
use crate::providers::structure::trait_structure::StructureProvider;
use crate::structure::{Identifier, StructureRecord};

/// Caché en proceso de estructuras resueltas, indexada por el identificador
/// normalizado. La fachada la consulta primero y escribe en ella cada
/// resolución exitosa de otras fuentes, lo que hace `find_structure`
/// idempotente dentro de la sesión.
#[derive(Debug, Default)]
pub struct CacheProvider {
    entries: DashMap<String, StructureRecord>,
}

impl CacheProvider {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn insert(&self, identifier: &Identifier, record: StructureRecord) {
        self.entries.insert(identifier.normalized().to_string(), record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StructureProvider for CacheProvider {
    fn get_name(&self) -> &str {
        "cache"
    }

    fn get_description(&self) -> &str {
        "In-process cache of previously resolved structures"
    }

    async fn resolve(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<StructureRecord>, ProviderError> {
        Ok(self.entries.get(identifier.normalized()).map(|e| e.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(inchi: &str) -> StructureRecord {
        StructureRecord {
            inchi: inchi.into(),
            inchikey: "KEY".into(),
            smiles: None,
            name: None,
            formula: "H2O".into(),
            cjson: json!({ "chemicalJson": 1, "atoms": {} }),
            provenance: "test".into(),
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = CacheProvider::new();
        let id = Identifier::parse("InChI=1S/H2O/h1H2").unwrap();
        assert!(cache.resolve(&id).await.unwrap().is_none());
        cache.insert(&id, record("InChI=1S/H2O/h1H2"));
        let hit = cache.resolve(&id).await.unwrap().unwrap();
        assert_eq!(hit.inchi, "InChI=1S/H2O/h1H2");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_key_is_normalized_identifier() {
        let cache = CacheProvider::new();
        let bare = Identifier::parse("1S/H2O/h1H2").unwrap();
        cache.insert(&bare, record("InChI=1S/H2O/h1H2"));
        // La forma con prefijo resuelve la misma entrada.
        let full = Identifier::parse("InChI=1S/H2O/h1H2").unwrap();
        assert!(cache.resolve(&full).await.unwrap().is_some());
    }
}
