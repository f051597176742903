use async_trait::async_trait;

use crate::convert::formats::{self, Molecule};
use crate::convert::toolkit::Toolkit;
use crate::data::cjson::whitelist_cjson;
use crate::errors::client_error::ProviderError;
use crate::providers::structure::trait_structure::StructureProvider;
use crate::structure::{Identifier, StructureRecord};

/// Última fuente de la cadena de resolución: genera el registro con el
/// toolkit de conversión en lugar de consultarlo en ningún sitio. Falla
/// sólo si el identificador no se puede interpretar químicamente.
#[derive(Debug, Default)]
pub struct GenerationProvider;

impl GenerationProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Construye un registro de estructura a partir de un identificador ya
/// clasificado. Compartido con el proveedor de pruebas.
pub fn build_record(
    identifier: &Identifier,
    provenance: &str,
) -> Result<Option<StructureRecord>, ProviderError> {
    let (mol, inchi, smiles): (Molecule, String, Option<String>) = match identifier {
        Identifier::Inchi(inchi) => {
            let Ok(mol) = formats::parse_inchi(inchi) else { return Ok(None) };
            (mol, inchi.clone(), None)
        }
        Identifier::Smiles(smiles) => {
            let Ok(mol) = formats::parse_smiles(smiles) else { return Ok(None) };
            let (inchi, _) = Toolkit::to_inchi(&mol);
            (mol, inchi, Some(smiles.clone()))
        }
    };

    let (_, inchikey) = Toolkit::to_inchi(&mol);
    let cjson = whitelist_cjson(&formats::to_cjson(&mol))
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;

    Ok(Some(StructureRecord {
        inchi,
        inchikey,
        smiles,
        name: None,
        formula: mol.hill_formula(),
        cjson,
        provenance: provenance.to_string(),
    }))
}

#[async_trait]
impl StructureProvider for GenerationProvider {
    fn get_name(&self) -> &str {
        "generation"
    }

    fn get_description(&self) -> &str {
        "Generates structure records with the conversion toolkit"
    }

    async fn resolve(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<StructureRecord>, ProviderError> {
        build_record(identifier, self.get_name())
    }
}
