//! Utilidades sobre chemical JSON (cjson).
//!
//! El documento completo que produce un backend puede llevar secciones
//! grandes (bases, vibraciones) que no queremos arrastrar en cada registro
//! de estructura; `whitelist_cjson` se queda con lo estructural.
use serde_json::{Map, Value};

use crate::errors::server_error::ConvertError;

/// Claves aceptadas para la versión del documento. La variante con espacio
/// aparece en documentos antiguos.
const VERSION_KEYS: [&str; 2] = ["chemicalJson", "chemical json"];

/// Reduce un documento cjson a su parte estructural: átomos, enlaces y la
/// clave de versión. Falla si no hay clave de versión.
pub fn whitelist_cjson(cjson: &Value) -> Result<Value, ConvertError> {
    let obj = cjson.as_object().ok_or_else(|| ConvertError::Parse {
        format: "cjson".into(),
        message: "document is not a JSON object".into(),
    })?;

    let version_key = VERSION_KEYS
        .iter()
        .find(|k| obj.contains_key(**k))
        .ok_or_else(|| ConvertError::Parse {
            format: "cjson".into(),
            message: "no \"chemicalJson\" key found".into(),
        })?;

    let atoms = obj.get("atoms").ok_or_else(|| ConvertError::Parse {
        format: "cjson".into(),
        message: "missing \"atoms\" section".into(),
    })?;

    let mut out = Map::new();
    out.insert((*version_key).to_string(), obj[*version_key].clone());
    out.insert("atoms".to_string(), atoms.clone());
    // Los enlaces importan, pero pueden faltar.
    if let Some(bonds) = obj.get("bonds") {
        out.insert("bonds".to_string(), bonds.clone());
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitelist_keeps_structural_parts() {
        let full = json!({
            "chemicalJson": 1,
            "atoms": { "elements": { "number": [8, 1, 1] } },
            "bonds": { "connections": { "index": [0, 1, 0, 2] }, "order": [1, 1] },
            "basisSet": { "huge": true },
            "vibrations": { "frequencies": [1.0] }
        });
        let clean = whitelist_cjson(&full).unwrap();
        let obj = clean.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("atoms"));
        assert!(obj.contains_key("bonds"));
        assert!(!obj.contains_key("basisSet"));
        assert!(!obj.contains_key("vibrations"));
    }

    #[test]
    fn test_whitelist_accepts_legacy_version_key() {
        let doc = json!({ "chemical json": 0, "atoms": {} });
        let clean = whitelist_cjson(&doc).unwrap();
        assert!(clean.get("chemical json").is_some());
    }

    #[test]
    fn test_whitelist_requires_version_key() {
        let doc = json!({ "atoms": {} });
        assert!(whitelist_cjson(&doc).is_err());
    }

    #[test]
    fn test_whitelist_bonds_optional() {
        let doc = json!({ "chemicalJson": 1, "atoms": { "elements": { "number": [10] } } });
        let clean = whitelist_cjson(&doc).unwrap();
        assert!(clean.get("bonds").is_none());
    }
}
