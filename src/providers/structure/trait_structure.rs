use async_trait::async_trait;

use crate::errors::client_error::ProviderError;
use crate::structure::{Identifier, StructureRecord};

/// Contrato de las fuentes de resolución de estructuras. La fachada las
/// consulta en orden (caché, remoto, generación) y se queda con la primera
/// respuesta; `Ok(None)` significa "esta fuente no lo conoce" y se sigue
/// con la siguiente.
#[async_trait]
pub trait StructureProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_description(&self) -> &str;

    async fn resolve(&self, identifier: &Identifier)
        -> Result<Option<StructureRecord>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverProvider;

    #[async_trait]
    impl StructureProvider for NeverProvider {
        fn get_name(&self) -> &str {
            "never"
        }
        fn get_description(&self) -> &str {
            "resolves nothing"
        }
        async fn resolve(
            &self,
            _identifier: &Identifier,
        ) -> Result<Option<StructureRecord>, ProviderError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_provider_can_decline() {
        let p = NeverProvider;
        assert_eq!(p.get_name(), "never");
        let id = Identifier::parse("CCO").unwrap();
        assert!(p.resolve(&id).await.unwrap().is_none());
    }
}
