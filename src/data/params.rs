//! Conjunto de parámetros de cálculo.
//!
//! El esquema pertenece al backend: aquí sólo se validan las claves
//! conocidas en la frontera del cliente (`theory`, `functional`, `basis`,
//! `task`) y se exige que los valores sean escalares. Claves desconocidas
//! pasan intactas; el backend decide sobre ellas. La clave `task` está
//! reservada para los atajos `optimize`/`energy`/`frequencies`.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hashing::hash_value;

/// Clave reservada que los atajos de la fachada inyectan.
pub const TASK_KEY: &str = "task";

/// Claves interpretadas en la frontera del cliente.
pub const KNOWN_KEYS: [&str; 4] = ["theory", "functional", "basis", "task"];

/// Tarea de cálculo inyectada por los atajos de la fachada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Optimize,
    Energy,
    Frequency,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Optimize => "optimize",
            Task::Energy => "energy",
            Task::Frequency => "frequency",
        }
    }

    pub fn parse(raw: &str) -> Option<Task> {
        match raw {
            "optimize" => Some(Task::Optimize),
            "energy" => Some(Task::Energy),
            "frequency" => Some(Task::Frequency),
            _ => None,
        }
    }
}

/// Mapa ordenado clave -> valor escalar, interpretado por el backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet(IndexMap<String, Value>);

impl ParameterSet {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copia superficial con la clave `task` fijada. No toca ninguna otra
    /// entrada: invariante de los atajos de la fachada.
    pub fn with_task(&self, task: Task) -> ParameterSet {
        let mut copy = self.clone();
        copy.0.insert(TASK_KEY.to_string(), Value::String(task.as_str().to_string()));
        copy
    }

    /// Validación en la frontera del cliente. Claves desconocidas se
    /// difieren al backend; sólo se rechaza lo que nunca puede ser válido.
    pub fn validate(&self) -> Result<(), String> {
        for (key, value) in &self.0 {
            if key.trim().is_empty() {
                return Err("empty parameter key".to_string());
            }
            match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => {}
                _ => return Err(format!("parameter '{key}' must be a scalar value")),
            }
        }
        if let Some(task) = self.0.get(TASK_KEY) {
            let raw = task.as_str().unwrap_or_default();
            if Task::parse(raw).is_none() {
                return Err(format!("unknown task '{raw}'"));
            }
        }
        Ok(())
    }

    /// Representación JSON tal y como viaja al backend.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }

    /// Hash canónico del conjunto (identidad del resultado).
    pub fn canonical_hash(&self) -> String {
        hash_value(&self.to_value())
    }
}

impl FromIterator<(String, Value)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
