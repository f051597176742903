//! Servicio HTTP de conversión.
//!
//! Pool fijo de workers (hilos dedicados, uno por petición en curso) delante
//! del toolkit, con plazo por petición impuesto en el frente. El toolkit
//! modela una librería nativa que retiene un lock global de ejecución
//! durante cada llamada: el paralelismo es entre workers, nunca dentro de
//! uno, y no comparten más estado mutable que el canal de trabajo.

pub mod pool;
pub mod routes;

pub use pool::{ConversionPool, WorkReply, WorkRequest};
pub use routes::{router, AppState};
