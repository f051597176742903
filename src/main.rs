//! Binario del servicio de conversión: pool fijo de workers delante del
//! toolkit, escuchando en la dirección configurada.
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chemcalc_rust::config::CONFIG;
use chemcalc_rust::convert::toolkit::Toolkit;
use chemcalc_rust::server::pool::ConversionPool;
use chemcalc_rust::server::routes::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let pool = ConversionPool::new(Arc::new(Toolkit::new()), CONFIG.server.workers);
    let state = Arc::new(AppState { pool, request_timeout: CONFIG.server.request_timeout });

    let listener = tokio::net::TcpListener::bind(&CONFIG.server.bind).await?;
    tracing::info!(
        bind = %CONFIG.server.bind,
        workers = CONFIG.server.workers,
        timeout_secs = CONFIG.server.request_timeout.as_secs(),
        "conversion service listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}
