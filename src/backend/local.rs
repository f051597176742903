//! Backend local en proceso.
//!
//! Ejecuta los trabajos de la cola en tareas tokio y sintetiza salidas
//! deterministas (digest del trabajo como semilla), de modo que la fachada
//! y las pruebas tienen un backend completo sin servicios externos. El
//! esquema de parámetros que interpreta: `task` decide las subvistas y
//! `simulateFailure` tumba el trabajo.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::queue::{JobQueue, QueueKind};
use super::trait_backend::{
    CalculationBackend, CalculationOutput, JobId, JobRequest, JobStatus, Orbitals, Vibrations,
};
use crate::convert::formats;
use crate::data::params::{ParameterSet, Task, TASK_KEY};
use crate::errors::client_error::ClientError;
use crate::hashing::to_canonical_json;

#[derive(Debug)]
struct JobEntry {
    request: JobRequest,
    status: JobStatus,
    output: Option<CalculationOutput>,
    error: Option<String>,
}

struct Inner {
    queue: JobQueue,
    jobs: DashMap<JobId, JobEntry>,
    delay: Duration,
}

/// Backend de cálculo en proceso, compartible entre tareas.
#[derive(Clone)]
pub struct LocalBackend {
    inner: Arc<Inner>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::with_queue(QueueKind::Fifo, 0, Duration::from_millis(10))
    }

    /// Control fino para pruebas: disciplina y tope de la cola, y retardo
    /// simulado de cómputo por trabajo.
    pub fn with_queue(kind: QueueKind, max_running: usize, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: JobQueue::new(kind, max_running),
                jobs: DashMap::new(),
                delay,
            }),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self::with_queue(QueueKind::Fifo, 0, delay)
    }

    /// Saca de la cola todo lo que quepa y lanza su ejecución.
    fn dispatch(&self) {
        for id in self.inner.queue.pop(usize::MAX) {
            let request = {
                let Some(mut entry) = self.inner.jobs.get_mut(&id) else {
                    self.inner.queue.finish();
                    continue;
                };
                entry.status = JobStatus::Running;
                entry.request.clone()
            };
            let backend = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(backend.inner.delay).await;
                let result = synthesize(&request);
                if let Some(mut entry) = backend.inner.jobs.get_mut(&id) {
                    match result {
                        Ok(output) => {
                            entry.status = JobStatus::Complete;
                            entry.output = Some(output);
                        }
                        Err(message) => {
                            tracing::warn!(job = %id, error = %message, "job failed");
                            entry.status = JobStatus::Failed;
                            entry.error = Some(message);
                        }
                    }
                }
                backend.inner.queue.finish();
                backend.dispatch();
            });
        }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalculationBackend for LocalBackend {
    fn get_name(&self) -> &str {
        "local"
    }

    async fn submit(&self, request: JobRequest) -> Result<JobId, ClientError> {
        // El backend valida su propio esquema aunque la fachada ya lo
        // hiciera: es el dueño último de los parámetros.
        request.params.validate().map_err(ClientError::Validation)?;
        let id = JobId::new_v4();
        tracing::debug!(job = %id, image = %request.image, "job submitted");
        self.inner.jobs.insert(
            id,
            JobEntry { request, status: JobStatus::Pending, output: None, error: None },
        );
        self.inner.queue.add(id);
        self.dispatch();
        Ok(id)
    }

    async fn status(&self, id: JobId) -> Result<JobStatus, ClientError> {
        self.inner
            .jobs
            .get(&id)
            .map(|e| e.status)
            .ok_or_else(|| ClientError::Backend(format!("unknown job {id}")))
    }

    async fn fetch(&self, id: JobId) -> Result<CalculationOutput, ClientError> {
        let entry =
            self.inner.jobs.get(&id).ok_or_else(|| ClientError::Backend(format!("unknown job {id}")))?;
        match entry.status {
            JobStatus::Complete => Ok(entry.output.clone().expect("complete job has output")),
            JobStatus::Failed => Err(ClientError::Backend(
                entry.error.clone().unwrap_or_else(|| "job failed".into()),
            )),
            _ => Err(ClientError::Backend(format!("job {id} has not finished"))),
        }
    }
}

/// Semilla determinista del trabajo: digest de estructura + imagen +
/// parámetros en forma canónica.
fn job_seed(request: &JobRequest) -> Vec<u8> {
    let identity = json!({
        "inchikey": request.structure.inchikey,
        "image": request.image.to_string(),
        "parameters": request.params.to_value(),
    });
    let mut hasher = Sha256::new();
    hasher.update(to_canonical_json(&identity).as_bytes());
    hasher.finalize().to_vec()
}

fn frac(seed: &[u8], i: usize) -> f64 {
    f64::from(seed[i % seed.len()]) / 255.0
}

fn requested_task(params: &ParameterSet) -> Task {
    params
        .get(TASK_KEY)
        .and_then(Value::as_str)
        .and_then(Task::parse)
        .unwrap_or(Task::Energy)
}

fn synthesize(request: &JobRequest) -> Result<CalculationOutput, String> {
    if request.params.get("simulateFailure").and_then(Value::as_bool) == Some(true) {
        return Err("simulated backend failure".to_string());
    }

    let cjson_text = request.structure.cjson.to_string();
    let mol = formats::parse_cjson(&cjson_text)
        .map_err(|e| format!("structure rejected by backend: {e}"))?;
    let seed = job_seed(request);
    let task = requested_task(&request.params);

    let electrons: u32 = mol.atoms.iter().map(|a| u32::from(a.atomic_number)).sum();
    let total_energy = -(f64::from(electrons) + frac(&seed, 0));

    let mut properties = Map::new();
    properties.insert("totalEnergy".into(), json!(total_energy));
    properties.insert("task".into(), json!(task.as_str()));
    for key in ["theory", "functional", "basis"] {
        if let Some(value) = request.params.get(key) {
            properties.insert(key.into(), value.clone());
        }
    }

    let occupied = (electrons / 2).max(1) as usize;
    let total_orbitals = occupied + 4;
    let step = 10.0 / total_orbitals as f64;
    let orbitals = Orbitals {
        energies: (0..total_orbitals)
            .map(|i| -10.0 + step * i as f64 + 0.001 * frac(&seed, i))
            .collect(),
        occupations: (0..total_orbitals)
            .map(|i| if i < occupied { 2.0 } else { 0.0 })
            .collect(),
    };

    let vibrations = match task {
        Task::Frequency => {
            let n_modes = (3 * mol.atom_count()).saturating_sub(6).max(1);
            Some(Vibrations {
                frequencies: (0..n_modes).map(|i| 500.0 + 3000.0 * frac(&seed, i + 1)).collect(),
                intensities: (0..n_modes).map(|i| 100.0 * frac(&seed, i + 2)).collect(),
                modes: vec![vec![0.0; 3 * mol.atom_count()]; n_modes],
            })
        }
        _ => None,
    };

    let optimized = match task {
        Task::Optimize => {
            let mut opt = mol.clone();
            if !opt.has_coords() {
                opt.generate_coords("mmff94", 100);
            }
            Some(formats::to_cjson(&opt))
        }
        _ => None,
    };

    Ok(CalculationOutput {
        properties: Value::Object(properties),
        orbitals: Some(orbitals),
        vibrations,
        optimized,
    })
}
