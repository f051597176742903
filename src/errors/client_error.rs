use thiserror::Error;

/// Errores de la fachada de cálculo. Todos se propagan directamente al
/// llamador; no hay reintentos automáticos.
#[derive(Debug, Error)]
pub enum ClientError {
    /// El identificador es malformado o ninguna fuente lo resuelve.
    #[error("structure not found: {0}")]
    NotFound(String),
    /// El conjunto de parámetros fue rechazado antes de enviarse.
    #[error("invalid parameters: {0}")]
    Validation(String),
    /// Fallo del backend o imagen de cálculo inexistente.
    #[error("backend error: {0}")]
    Backend(String),
    /// El trabajo superó el plazo de servicio.
    #[error("calculation timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errores de los proveedores de resolución de estructuras.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("lookup request failed: {0}")]
    Http(String),
    #[error("provider returned malformed data: {0}")]
    Malformed(String),
}
