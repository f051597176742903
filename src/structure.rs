use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::client_error::ClientError;

/// Identificador químico aceptado por `find_structure`. La clasificación es
/// la de la frontera: InChI explícito, capa estándar sin prefijo, o SMILES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Inchi(String),
    Smiles(String),
}

impl Identifier {
    /// Clasifica y normaliza un identificador crudo. Identificadores
    /// malformados fallan con `NotFound`: ninguna fuente podrá resolverlos.
    pub fn parse(raw: &str) -> Result<Identifier, ClientError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientError::NotFound(raw.to_string()));
        }
        if let Some(rest) = trimmed.strip_prefix("InChI=") {
            if rest.is_empty() || rest.contains(char::is_whitespace) {
                return Err(ClientError::NotFound(raw.to_string()));
            }
            return Ok(Identifier::Inchi(trimmed.to_string()));
        }
        // Capa estándar sin el prefijo: se añade, como hace el servicio de
        // moléculas con los cuerpos "inchi".
        if trimmed.starts_with("1S/") {
            if trimmed.contains(char::is_whitespace) {
                return Err(ClientError::NotFound(raw.to_string()));
            }
            return Ok(Identifier::Inchi(format!("InChI={trimmed}")));
        }
        if trimmed.contains(char::is_whitespace) {
            return Err(ClientError::NotFound(raw.to_string()));
        }
        Ok(Identifier::Smiles(trimmed.to_string()))
    }

    /// Forma normalizada usada como clave de caché.
    pub fn normalized(&self) -> &str {
        match self {
            Identifier::Inchi(s) | Identifier::Smiles(s) => s,
        }
    }
}

/// Registro inmutable de una estructura resuelta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub inchi: String,
    pub inchikey: String,
    pub smiles: Option<String>,
    pub name: Option<String>,
    /// Fórmula en orden de Hill.
    pub formula: String,
    /// Parte estructural del cjson (átomos y enlaces).
    pub cjson: Value,
    /// Proveedor que originó el registro.
    pub provenance: String,
}
