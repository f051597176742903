use serde_json::{json, Value};

use crate::backend::trait_backend::{CalculationOutput, Orbitals, Vibrations};
use crate::data::params::ParameterSet;
use crate::hashing::hash_value;
use crate::structure::StructureRecord;

/// Resultado de un cálculo terminado. Inmutable: se crea al completarse el
/// trabajo y sólo expone subvistas con nombre, cada una renderizable a
/// JSON por separado.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    key: String,
    structure: StructureRecord,
    params: ParameterSet,
    output: CalculationOutput,
}

impl CalculationResult {
    pub fn new(structure: StructureRecord, params: ParameterSet, output: CalculationOutput) -> Self {
        let key = hash_value(&json!({
            "inchikey": structure.inchikey,
            "parameters": params.to_value(),
        }));
        Self { key, structure, params, output }
    }

    /// Identidad del resultado: estructura de origen + parámetros.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn structure(&self) -> &StructureRecord {
        &self.structure
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Propiedades escalares calculadas (energía total, eco de parámetros).
    pub fn properties(&self) -> &Value {
        &self.output.properties
    }

    pub fn orbitals(&self) -> Option<&Orbitals> {
        self.output.orbitals.as_ref()
    }

    pub fn vibrations(&self) -> Option<&Vibrations> {
        self.output.vibrations.as_ref()
    }

    /// Geometría optimizada (cjson), presente en tareas `optimize`.
    pub fn optimized_structure(&self) -> Option<&Value> {
        self.output.optimized.as_ref()
    }

    /// Render completo del resultado; cada subvista es serializable por su
    /// cuenta vía serde.
    pub fn to_value(&self) -> Value {
        json!({
            "key": self.key,
            "structure": self.structure,
            "parameters": self.params.to_value(),
            "properties": self.output.properties,
            "orbitals": self.output.orbitals,
            "vibrations": self.output.vibrations,
            "optimizedStructure": self.output.optimized,
        })
    }
}
