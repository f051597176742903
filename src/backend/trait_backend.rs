use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::image::ImageRef;
use crate::data::params::ParameterSet;
use crate::errors::client_error::ClientError;
use crate::structure::StructureRecord;

pub type JobId = Uuid;

/// Estado de un trabajo en el backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

/// Petición de cálculo tal y como viaja al backend.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub image: ImageRef,
    pub params: ParameterSet,
    pub structure: StructureRecord,
    pub submitted_at: DateTime<Utc>,
}

impl JobRequest {
    pub fn new(image: ImageRef, params: ParameterSet, structure: StructureRecord) -> Self {
        Self { image, params, structure, submitted_at: Utc::now() }
    }
}

/// Orbitales moleculares de un cálculo terminado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orbitals {
    pub energies: Vec<f64>,
    pub occupations: Vec<f64>,
}

/// Modos vibracionales de un cálculo de frecuencias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vibrations {
    pub frequencies: Vec<f64>,
    pub intensities: Vec<f64>,
    pub modes: Vec<Vec<f64>>,
}

/// Salida completa de un trabajo terminado con éxito. Qué subvistas van
/// pobladas depende de la tarea pedida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutput {
    pub properties: Value,
    pub orbitals: Option<Orbitals>,
    pub vibrations: Option<Vibrations>,
    /// Geometría optimizada en cjson.
    pub optimized: Option<Value>,
}

/// Contrato de un backend de cálculo: envío asíncrono, sondeo de estado y
/// recogida del resultado terminal.
#[async_trait]
pub trait CalculationBackend: Send + Sync {
    fn get_name(&self) -> &str;

    async fn submit(&self, request: JobRequest) -> Result<JobId, ClientError>;

    async fn status(&self, id: JobId) -> Result<JobStatus, ClientError>;

    /// Resultado de un trabajo `Complete`; para uno `Failed` devuelve el
    /// error de backend que lo tumbó.
    async fn fetch(&self, id: JobId) -> Result<CalculationOutput, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Complete.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&JobStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&JobStatus::Running).unwrap(), "\"running\"");
    }
}
