//! chemcalc-rust
//!
//! Cliente y servicio para cálculos de química computacional:
//! - `client` expone la fachada de cálculo (`find_structure`, `calculate`,
//!   `optimize`, `energy`, `frequencies`) sobre un backend de trabajos.
//! - `backend` modela el registro de imágenes, la cola de trabajos y un
//!   backend local para pruebas.
//! - `convert` es el toolkit de conversión de formatos (xyz/cjson/smiles/
//!   inchi) y de propiedades moleculares.
//! - `server` envuelve el toolkit en un servicio HTTP con un pool fijo de
//!   workers y timeout por petición.
//!
//! Puede usarse desde `main.rs` (binario del servicio) o por otros crates.

pub mod backend;
pub mod client;
pub mod config;
pub mod convert;
pub mod data;
pub mod errors;
pub mod hashing;
pub mod providers;
pub mod server;
pub mod structure;

pub use client::facade::{CalculationClient, Structure};
pub use client::result::CalculationResult;
pub use errors::client_error::ClientError;
pub use structure::StructureRecord;
