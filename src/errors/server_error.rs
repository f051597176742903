use thiserror::Error;

/// Errores del toolkit de conversión.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported conversion: {input} -> {output}")]
    UnsupportedFormat { input: String, output: String },
    #[error("unknown format: {0}")]
    UnknownFormat(String),
    #[error("parse error ({format}): {message}")]
    Parse { format: String, message: String },
    #[error("molecule has no 3d coordinates")]
    NoCoordinates,
    #[error("unknown element: {0}")]
    UnknownElement(String),
}

/// Errores del servicio HTTP de conversión. La capa axum los traduce a
/// códigos de estado; la recuperación es el aislamiento entre workers,
/// nunca un reintento dentro del proceso.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("malformed request: {0}")]
    BadRequest(String),
    #[error("request exceeded the {0:?} processing deadline")]
    Timeout(std::time::Duration),
    #[error("worker pool is shut down")]
    PoolClosed,
    #[error("conversion worker crashed while processing the request")]
    WorkerCrashed,
}

impl ServerError {
    /// Código HTTP asociado a cada fallo.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::Convert(ConvertError::UnknownFormat(_)) => 400,
            ServerError::Convert(ConvertError::UnsupportedFormat { .. }) => 400,
            ServerError::Convert(_) => 422,
            ServerError::BadRequest(_) => 400,
            ServerError::Timeout(_) => 504,
            ServerError::PoolClosed => 503,
            ServerError::WorkerCrashed => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timeout_maps_to_504() {
        assert_eq!(ServerError::Timeout(Duration::from_secs(600)).status_code(), 504);
    }

    #[test]
    fn test_convert_error_maps_to_4xx() {
        let err = ServerError::from(ConvertError::UnknownFormat("pdbqt".into()));
        assert_eq!(err.status_code(), 400);
        let err = ServerError::from(ConvertError::NoCoordinates);
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_parse_error_format() {
        let err = ConvertError::Parse { format: "xyz".into(), message: "bad atom line".into() };
        assert_eq!(err.to_string(), "parse error (xyz): bad atom line");
    }
}
