//! Backends de cálculo: registro de imágenes, cola de trabajos, contrato
//! `CalculationBackend` y un backend local en proceso.

pub mod image;
pub mod local;
pub mod queue;
pub mod trait_backend;

pub use image::{ImageRef, ImageRegistry};
pub use local::LocalBackend;
pub use queue::{JobQueue, QueueKind};
pub use trait_backend::{CalculationBackend, CalculationOutput, JobId, JobRequest, JobStatus};
