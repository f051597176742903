//! Rutas del servicio de conversión.
//!
//! Dos rutas, espejo de la API original del wrapper:
//! - `POST /convert/{output_format}`: cuerpo JSON con `format` y `data`,
//!   más opciones (`gen3d`, `addHydrogens`, `perceiveBonds`, `outOptions`,
//!   `gen3dForcefield`, `gen3dSteps`).
//! - `POST /properties`: cuerpo JSON con `format`, `data` y opcionalmente
//!   `addHydrogens`.
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::pool::{ConversionPool, WorkReply, WorkRequest};
use crate::convert::toolkit::{ConvertOptions, Converted};
use crate::errors::server_error::ServerError;

/// Estado inmutable compartido por los handlers.
pub struct AppState {
    pub pool: ConversionPool,
    pub request_timeout: Duration,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/convert/{output_format}", post(convert))
        .route("/properties", post(properties))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertBody {
    format: String,
    data: Value,
    #[serde(default)]
    gen3d: bool,
    #[serde(default)]
    add_hydrogens: bool,
    #[serde(default)]
    perceive_bonds: bool,
    #[serde(default)]
    out_options: Map<String, Value>,
    #[serde(default = "default_forcefield")]
    gen3d_forcefield: String,
    #[serde(default = "default_gen3d_steps")]
    gen3d_steps: u32,
}

fn default_forcefield() -> String {
    "mmff94".to_string()
}

fn default_gen3d_steps() -> u32 {
    100
}

/// `data` puede llegar como cadena o como objeto (cjson embebido).
fn data_as_string(data: &Value) -> Result<String, ServerError> {
    match data {
        Value::String(s) => Ok(s.clone()),
        Value::Object(_) => Ok(data.to_string()),
        _ => Err(ServerError::BadRequest("\"data\" must be a string or an object".into())),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::debug!(status = %status, error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn reply_to_response(reply: WorkReply) -> Response {
    match reply {
        WorkReply::Converted(Converted::Text { data, mime }) => {
            ([(header::CONTENT_TYPE, mime)], data).into_response()
        }
        WorkReply::Converted(Converted::Json(doc)) => Json(doc).into_response(),
        WorkReply::Properties(props) => Json(props).into_response(),
    }
}

async fn convert(
    State(state): State<Arc<AppState>>,
    Path(output_format): Path<String>,
    Json(body): Json<ConvertBody>,
) -> Result<Response, ServerError> {
    let data = data_as_string(&body.data)?;
    let request = WorkRequest::Convert {
        data,
        input_format: body.format,
        output_format,
        options: ConvertOptions {
            gen3d: body.gen3d,
            add_hydrogens: body.add_hydrogens,
            perceive_bonds: body.perceive_bonds,
            gen3d_forcefield: body.gen3d_forcefield,
            gen3d_steps: body.gen3d_steps,
            out_options: body.out_options,
        },
    };
    let reply = state.pool.process(request, state.request_timeout).await?;
    Ok(reply_to_response(reply))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertiesBody {
    format: String,
    data: Value,
    #[serde(default)]
    add_hydrogens: bool,
}

async fn properties(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PropertiesBody>,
) -> Result<Response, ServerError> {
    let data = data_as_string(&body.data)?;
    let request = WorkRequest::Properties {
        data,
        input_format: body.format,
        add_hydrogens: body.add_hydrogens,
    };
    let reply = state.pool.process(request, state.request_timeout).await?;
    Ok(reply_to_response(reply))
}
