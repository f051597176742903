//! Fachada del toolkit de conversión y el contrato `ConversionEngine`.
//!
//! El pool de workers del servicio habla con el toolkit a través del trait,
//! de modo que las pruebas pueden inyectar motores lentos o instrumentados.
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::formats::{self, Molecule};
use crate::errors::server_error::ConvertError;

/// Opciones de conversión aceptadas por la API del servicio.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub gen3d: bool,
    pub add_hydrogens: bool,
    pub perceive_bonds: bool,
    pub gen3d_forcefield: String,
    pub gen3d_steps: u32,
    pub out_options: Map<String, Value>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            gen3d: false,
            add_hydrogens: false,
            perceive_bonds: false,
            gen3d_forcefield: "mmff94".into(),
            gen3d_steps: 100,
            out_options: Map::new(),
        }
    }
}

/// Salida de una conversión: texto con su content type, o JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Converted {
    Text { data: String, mime: &'static str },
    Json(Value),
}

/// Contrato del motor de conversión. Una llamada es bloqueante y retiene al
/// worker que la ejecuta hasta terminar; el paralelismo vive en el pool.
pub trait ConversionEngine: Send + Sync {
    fn convert(
        &self,
        data: &str,
        input_format: &str,
        output_format: &str,
        options: &ConvertOptions,
    ) -> Result<Converted, ConvertError>;

    fn properties(
        &self,
        data: &str,
        input_format: &str,
        add_hydrogens: bool,
    ) -> Result<Value, ConvertError>;
}

/// Implementación en Rust puro del motor de conversión.
#[derive(Debug, Default)]
pub struct Toolkit;

impl Toolkit {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, data: &str, format: &str) -> Result<Molecule, ConvertError> {
        match normalize_format(format) {
            "xyz" => formats::parse_xyz(data),
            "cjson" => formats::parse_cjson(data),
            "smiles" => formats::parse_smiles(data),
            "inchi" => formats::parse_inchi(data),
            other => Err(ConvertError::UnknownFormat(other.to_string())),
        }
    }

    /// InChI sintético de capa de fórmula más su clave. Sustituto del
    /// cálculo nativo: misma forma, derivación por digest.
    pub fn to_inchi(mol: &Molecule) -> (String, String) {
        let inchi = format!("InChI=1S/{}", mol.hill_formula());
        (inchi.clone(), inchikey_for(&inchi))
    }
}

fn normalize_format(format: &str) -> &str {
    match format.to_ascii_lowercase().as_str() {
        "smi" | "smiles" => "smiles",
        "xyz" => "xyz",
        "cjson" | "json" => "cjson",
        "inchi" => "inchi",
        _ => "?",
    }
}

/// Clave con la forma de una InChIKey (bloques 14-10-1 de letras
/// mayúsculas), derivada del digest sha256 del InChI.
fn inchikey_for(inchi: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(inchi.as_bytes());
    let digest = hasher.finalize();
    let letters: Vec<char> =
        digest.iter().map(|b| char::from(b'A' + (b % 26))).collect();
    let block1: String = letters[0..14].iter().collect();
    let block2: String = letters[14..22].iter().collect();
    format!("{block1}-{block2}SA-N")
}

const MIME_SMILES: &str = "chemical/x-daylight-smiles";
const MIME_XYZ: &str = "chemical/x-xyz";

impl ConversionEngine for Toolkit {
    fn convert(
        &self,
        data: &str,
        input_format: &str,
        output_format: &str,
        options: &ConvertOptions,
    ) -> Result<Converted, ConvertError> {
        let input = normalize_format(input_format);
        if input == "?" {
            return Err(ConvertError::UnknownFormat(input_format.to_string()));
        }
        let mut mol = self.parse(data, input)?;

        if options.add_hydrogens {
            mol.add_hydrogens();
        }
        if options.perceive_bonds {
            mol.perceive_bonds()?;
        }
        if options.gen3d && !mol.has_coords() {
            mol.generate_coords(&options.gen3d_forcefield, options.gen3d_steps);
        }

        match normalize_format(output_format) {
            "smiles" => {
                // Canonicalización real fuera de alcance: sólo eco de una
                // entrada ya en SMILES.
                if input == "smiles" {
                    Ok(Converted::Text { data: data.trim().to_string(), mime: MIME_SMILES })
                } else {
                    Err(ConvertError::UnsupportedFormat {
                        input: input.to_string(),
                        output: "smiles".to_string(),
                    })
                }
            }
            "inchi" => {
                let (inchi, inchikey) = Toolkit::to_inchi(&mol);
                Ok(Converted::Json(json!({ "inchi": inchi, "inchikey": inchikey })))
            }
            "xyz" => {
                let text = formats::to_xyz(&mol)?;
                Ok(Converted::Text { data: text, mime: MIME_XYZ })
            }
            "cjson" => Ok(Converted::Json(formats::to_cjson(&mol))),
            _ => Err(ConvertError::UnknownFormat(output_format.to_string())),
        }
    }

    fn properties(
        &self,
        data: &str,
        input_format: &str,
        add_hydrogens: bool,
    ) -> Result<Value, ConvertError> {
        let mut mol = self.parse(data, input_format)?;
        if add_hydrogens {
            mol.add_hydrogens();
        }
        Ok(json!({
            "atomCount": mol.atom_count(),
            "heavyAtomCount": mol.heavy_atom_count(),
            "formula": mol.hill_formula(),
            "spacedFormula": mol.spaced_formula(),
            "mass": mol.mass(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_ethanol() {
        let props = Toolkit::new().properties("CCO", "smiles", false).unwrap();
        assert_eq!(props["formula"], "C2H6O");
        assert_eq!(props["atomCount"], 9);
        assert_eq!(props["heavyAtomCount"], 3);
        let mass = props["mass"].as_f64().unwrap();
        assert!((mass - 46.069).abs() < 0.01);
    }

    #[test]
    fn test_convert_smiles_to_inchi() {
        let out = Toolkit::new()
            .convert("CCO", "smiles", "inchi", &ConvertOptions::default())
            .unwrap();
        let Converted::Json(doc) = out else { panic!("expected json") };
        assert_eq!(doc["inchi"], "InChI=1S/C2H6O");
        let key = doc["inchikey"].as_str().unwrap();
        assert_eq!(key.len(), 27);
        assert_eq!(key.chars().nth(14), Some('-'));
        assert!(key.ends_with("-N"));
    }

    #[test]
    fn test_inchikey_is_deterministic() {
        let a = Toolkit::to_inchi(&crate::convert::formats::parse_smiles("CCO").unwrap());
        let b = Toolkit::to_inchi(&crate::convert::formats::parse_smiles("CCO").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_convert_smiles_to_xyz_requires_gen3d() {
        let toolkit = Toolkit::new();
        let err = toolkit.convert("CCO", "smiles", "xyz", &ConvertOptions::default());
        assert!(matches!(err, Err(ConvertError::NoCoordinates)));

        let opts = ConvertOptions { gen3d: true, ..Default::default() };
        let out = toolkit.convert("CCO", "smiles", "xyz", &opts).unwrap();
        let Converted::Text { data, mime } = out else { panic!("expected text") };
        assert_eq!(mime, "chemical/x-xyz");
        assert!(data.starts_with("9\n"));
    }

    #[test]
    fn test_convert_xyz_to_cjson_with_bond_perception() {
        let xyz = "3\nwater\nO 0.0 0.0 0.117\nH 0.0 0.757 -0.469\nH 0.0 -0.757 -0.469\n";
        let opts = ConvertOptions { perceive_bonds: true, ..Default::default() };
        let out = Toolkit::new().convert(xyz, "xyz", "cjson", &opts).unwrap();
        let Converted::Json(doc) = out else { panic!("expected json") };
        assert_eq!(doc["atoms"]["elements"]["number"], serde_json::json!([8, 1, 1]));
        assert_eq!(doc["bonds"]["order"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_smi_alias_and_echo() {
        let out = Toolkit::new()
            .convert(" CCO \n", "smi", "smiles", &ConvertOptions::default())
            .unwrap();
        assert_eq!(out, Converted::Text { data: "CCO".into(), mime: "chemical/x-daylight-smiles" });
    }

    #[test]
    fn test_unknown_formats_rejected() {
        let toolkit = Toolkit::new();
        assert!(matches!(
            toolkit.convert("x", "pdbqt", "xyz", &ConvertOptions::default()),
            Err(ConvertError::UnknownFormat(_))
        ));
        assert!(matches!(
            toolkit.convert("CCO", "smiles", "mol2", &ConvertOptions::default()),
            Err(ConvertError::UnknownFormat(_))
        ));
        assert!(matches!(
            toolkit.convert("3\nw\nO 0 0 0\nH 0 0 1\nH 0 1 0\n", "xyz", "smiles", &ConvertOptions::default()),
            Err(ConvertError::UnsupportedFormat { .. })
        ));
    }
}
