//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`) leída una sola vez al arrancar. Tras la carga nada de esto
//! muta: los workers del servicio sólo comparten configuración de lectura.
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuración global de la aplicación.
pub struct AppConfig {
    /// Configuración del servicio de conversión.
    pub server: ServerConfig,
    /// Configuración de la fachada de cálculo.
    pub client: ClientConfig,
}

/// Parámetros del servicio HTTP de conversión.
pub struct ServerConfig {
    /// Dirección de escucha (host:puerto).
    pub bind: String,
    /// Número fijo de workers del pool.
    pub workers: usize,
    /// Tiempo máximo de procesamiento por petición.
    pub request_timeout: Duration,
}

/// Parámetros de la fachada cliente (resolución y sondeo de trabajos).
pub struct ClientConfig {
    /// URL base del resolvedor remoto de estructuras (opcional).
    pub lookup_url: Option<String>,
    /// Intervalo entre sondeos de estado de un trabajo.
    pub poll_interval: Duration,
    /// Plazo máximo de un cálculo antes de rendirse.
    pub calc_deadline: Duration,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
    AppConfig {
        server: ServerConfig {
            bind: env::var("CHEMCALC_BIND").unwrap_or_else(|_| "0.0.0.0:5000".into()),
            workers: env_parse("CHEMCALC_WORKERS", 4),
            request_timeout: Duration::from_secs(env_parse("CHEMCALC_TIMEOUT_SECS", 600)),
        },
        client: ClientConfig {
            lookup_url: env::var("CHEMCALC_LOOKUP_URL").ok(),
            poll_interval: Duration::from_millis(env_parse("CHEMCALC_POLL_INTERVAL_MS", 250)),
            calc_deadline: Duration::from_secs(env_parse("CHEMCALC_CALC_DEADLINE_SECS", 3600)),
        },
    }
});
