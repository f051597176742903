use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::errors::client_error::ClientError;

/// Referencia a un entorno de cálculo empaquetado: `repositorio:tag`,
/// por ejemplo `openchemistry/psi4:1.2.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    /// Parsea `repositorio[:tag]`; sin tag se asume `latest`.
    pub fn parse(raw: &str) -> Result<ImageRef, ClientError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(ClientError::Validation(format!("bad image reference '{raw}'")));
        }
        let (repository, tag) = match trimmed.rsplit_once(':') {
            Some((repo, tag)) if !tag.contains('/') => (repo, tag),
            _ => (trimmed, "latest"),
        };
        if repository.is_empty() || tag.is_empty() {
            return Err(ClientError::Validation(format!("bad image reference '{raw}'")));
        }
        Ok(ImageRef { repository: repository.to_string(), tag: tag.to_string() })
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Entrada del registro de imágenes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub image: ImageRef,
    pub digest: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Registro en memoria de las imágenes conocidas por la sesión. La fachada
/// lo consulta antes de enviar un trabajo; una imagen no registrada es un
/// fallo de backend, no de validación.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    entries: DashMap<String, ImageEntry>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Registra una imagen. Devuelve false si la combinación
    /// repositorio:tag ya existía (idéntica no se duplica).
    pub fn register(&self, image: ImageRef, digest: Option<String>) -> bool {
        let key = image.to_string();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, ImageEntry { image, digest, registered_at: Utc::now() });
        true
    }

    pub fn contains(&self, image: &ImageRef) -> bool {
        self.entries.contains_key(&image.to_string())
    }

    /// Búsqueda por repositorio y/o tag.
    pub fn find(&self, repository: Option<&str>, tag: Option<&str>) -> Vec<ImageEntry> {
        self.entries
            .iter()
            .filter(|e| repository.map_or(true, |r| e.image.repository == r))
            .filter(|e| tag.map_or(true, |t| e.image.tag == t))
            .map(|e| e.clone())
            .collect()
    }

    pub fn remove(&self, image: &ImageRef) -> bool {
        self.entries.remove(&image.to_string()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_tag() {
        let image = ImageRef::parse("openchemistry/psi4:1.2.1").unwrap();
        assert_eq!(image.repository, "openchemistry/psi4");
        assert_eq!(image.tag, "1.2.1");
        assert_eq!(image.to_string(), "openchemistry/psi4:1.2.1");
    }

    #[test]
    fn test_parse_without_tag_defaults_latest() {
        let image = ImageRef::parse("openchemistry/nwchem").unwrap();
        assert_eq!(image.tag, "latest");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ImageRef::parse("").is_err());
        assert!(ImageRef::parse("repo tag").is_err());
        assert!(ImageRef::parse(":1.0").is_err());
    }

    #[test]
    fn test_registry_register_and_find() {
        let registry = ImageRegistry::new();
        let psi4 = ImageRef::parse("openchemistry/psi4:1.2.1").unwrap();
        assert!(registry.register(psi4.clone(), Some("sha256:abc".into())));
        // Idéntica: rechazada.
        assert!(!registry.register(psi4.clone(), None));
        assert!(registry.contains(&psi4));

        let nwchem = ImageRef::parse("openchemistry/nwchem:6.8").unwrap();
        registry.register(nwchem, None);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find(Some("openchemistry/psi4"), None).len(), 1);
        assert_eq!(registry.find(None, Some("6.8")).len(), 1);
        assert_eq!(registry.find(None, None).len(), 2);
    }

    #[test]
    fn test_registry_remove() {
        let registry = ImageRegistry::new();
        let image = ImageRef::parse("a/b:1").unwrap();
        registry.register(image.clone(), None);
        assert!(registry.remove(&image));
        assert!(!registry.remove(&image));
        assert!(registry.is_empty());
    }
}
