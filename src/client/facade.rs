//! Fachada de cálculo.
//!
//! `CalculationClient` resuelve identificadores contra la cadena de
//! proveedores (caché, remoto, generación) y devuelve `Structure`, la
//! fachada de una estructura concreta: desde ella se envían trabajos
//! (`calculate`) y los atajos `optimize`/`energy`/`frequencies`, que sólo
//! inyectan la clave `task` antes de delegar. `calculate` bloquea al
//! llamador sondeando el backend hasta estado terminal o plazo vencido.
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::backend::image::{ImageRef, ImageRegistry};
use crate::backend::trait_backend::{CalculationBackend, JobRequest, JobStatus};
use crate::client::result::CalculationResult;
use crate::config::CONFIG;
use crate::data::params::{ParameterSet, Task};
use crate::errors::client_error::ClientError;
use crate::providers::structure::implementations::cache_provider::CacheProvider;
use crate::providers::structure::implementations::generation_provider::GenerationProvider;
use crate::providers::structure::implementations::remote_provider::RemoteLookupProvider;
use crate::providers::structure::trait_structure::StructureProvider;
use crate::structure::{Identifier, StructureRecord};

struct Session {
    cache: CacheProvider,
    resolvers: Vec<Box<dyn StructureProvider>>,
    backend: Arc<dyn CalculationBackend>,
    images: ImageRegistry,
    poll_interval: Duration,
    deadline: Duration,
}

/// Cliente de la sesión de cálculo.
#[derive(Clone)]
pub struct CalculationClient {
    session: Arc<Session>,
}

impl CalculationClient {
    pub fn new(
        resolvers: Vec<Box<dyn StructureProvider>>,
        backend: Arc<dyn CalculationBackend>,
        images: ImageRegistry,
    ) -> Self {
        Self {
            session: Arc::new(Session {
                cache: CacheProvider::new(),
                resolvers,
                backend,
                images,
                poll_interval: CONFIG.client.poll_interval,
                deadline: CONFIG.client.calc_deadline,
            }),
        }
    }

    /// Cadena de resolución por defecto: remoto (si está configurado) y
    /// generación local.
    pub fn from_config(backend: Arc<dyn CalculationBackend>, images: ImageRegistry) -> Self {
        let mut resolvers: Vec<Box<dyn StructureProvider>> = Vec::new();
        if let Some(url) = &CONFIG.client.lookup_url {
            resolvers.push(Box::new(RemoteLookupProvider::new(url.clone())));
        }
        resolvers.push(Box::new(GenerationProvider::new()));
        Self::new(resolvers, backend, images)
    }

    /// Ajuste de sondeo y plazo (pruebas y despliegues especiales).
    pub fn with_timing(mut self, poll_interval: Duration, deadline: Duration) -> Self {
        let session = Arc::get_mut(&mut self.session)
            .expect("with_timing must be called before sharing the client");
        session.poll_interval = poll_interval;
        session.deadline = deadline;
        self
    }

    /// Resuelve un identificador químico a una estructura: caché primero,
    /// después cada proveedor en orden, escribiendo en caché el primer
    /// acierto. Repetir la llamada devuelve un registro equivalente.
    pub async fn find_structure(&self, identifier: &str) -> Result<Structure, ClientError> {
        let id = Identifier::parse(identifier)?;

        if let Some(record) = self.session.cache.resolve(&id).await? {
            return Ok(self.wrap(record));
        }
        for provider in &self.session.resolvers {
            if let Some(record) = provider.resolve(&id).await? {
                tracing::debug!(
                    identifier = id.normalized(),
                    provider = provider.get_name(),
                    "structure resolved"
                );
                self.session.cache.insert(&id, record.clone());
                return Ok(self.wrap(record));
            }
        }
        Err(ClientError::NotFound(identifier.to_string()))
    }

    fn wrap(&self, record: StructureRecord) -> Structure {
        Structure { record, session: Arc::clone(&self.session) }
    }
}

/// Fachada de una estructura resuelta. Inmutable; cada operación de envío
/// produce un `CalculationResult` independiente.
#[derive(Clone)]
pub struct Structure {
    record: StructureRecord,
    session: Arc<Session>,
}

impl std::fmt::Debug for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Structure")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl Structure {
    pub fn record(&self) -> &StructureRecord {
        &self.record
    }

    pub fn inchi(&self) -> &str {
        &self.record.inchi
    }

    pub fn inchikey(&self) -> &str {
        &self.record.inchikey
    }

    pub fn smiles(&self) -> Option<&str> {
        self.record.smiles.as_deref()
    }

    pub fn formula(&self) -> &str {
        &self.record.formula
    }

    pub fn cjson(&self) -> &serde_json::Value {
        &self.record.cjson
    }

    /// Envía un trabajo al backend seleccionado por `image` y bloquea
    /// sondeando hasta estado terminal.
    pub async fn calculate(
        &self,
        image: &str,
        params: &ParameterSet,
    ) -> Result<CalculationResult, ClientError> {
        params.validate().map_err(ClientError::Validation)?;
        let image = ImageRef::parse(image)?;
        if !self.session.images.contains(&image) {
            return Err(ClientError::Backend(format!("image not found: {image}")));
        }

        let request = JobRequest::new(image, params.clone(), self.record.clone());
        let job = self.session.backend.submit(request).await?;
        tracing::debug!(job = %job, structure = %self.record.inchikey, "calculation submitted");

        let started = Instant::now();
        loop {
            let status = self.session.backend.status(job).await?;
            match status {
                JobStatus::Complete | JobStatus::Failed => {
                    let output = self.session.backend.fetch(job).await?;
                    return Ok(CalculationResult::new(
                        self.record.clone(),
                        params.clone(),
                        output,
                    ));
                }
                JobStatus::Pending | JobStatus::Running => {
                    if started.elapsed() >= self.session.deadline {
                        return Err(ClientError::Timeout(self.session.deadline));
                    }
                    tokio::time::sleep(self.session.poll_interval).await;
                }
            }
        }
    }

    async fn calculate_task(
        &self,
        image: &str,
        params: &ParameterSet,
        task: Task,
    ) -> Result<CalculationResult, ClientError> {
        self.calculate(image, &params.with_task(task)).await
    }

    /// `calculate` con `task = optimize`. Sin más efectos sobre los
    /// parámetros del llamador.
    pub async fn optimize(
        &self,
        image: &str,
        params: &ParameterSet,
    ) -> Result<CalculationResult, ClientError> {
        self.calculate_task(image, params, Task::Optimize).await
    }

    /// `calculate` con `task = energy`.
    pub async fn energy(
        &self,
        image: &str,
        params: &ParameterSet,
    ) -> Result<CalculationResult, ClientError> {
        self.calculate_task(image, params, Task::Energy).await
    }

    /// `calculate` con `task = frequency`.
    pub async fn frequencies(
        &self,
        image: &str,
        params: &ParameterSet,
    ) -> Result<CalculationResult, ClientError> {
        self.calculate_task(image, params, Task::Frequency).await
    }
}
