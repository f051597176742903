use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use chemcalc_rust::convert::toolkit::{
    ConversionEngine, ConvertOptions, Converted, Toolkit,
};
use chemcalc_rust::errors::server_error::ConvertError;
use chemcalc_rust::server::pool::ConversionPool;
use chemcalc_rust::server::routes::{router, AppState};

fn service(timeout: Duration) -> axum::Router {
    let pool = ConversionPool::new(Arc::new(Toolkit::new()), 2);
    router(Arc::new(AppState { pool, request_timeout: timeout }))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_convert_smiles_to_inchi() {
    let app = service(Duration::from_secs(5));
    let body = json!({ "format": "smiles", "data": "CCO" });
    let response = app.oneshot(post_json("/convert/inchi", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["inchi"], "InChI=1S/C2H6O");
    assert_eq!(doc["inchikey"].as_str().unwrap().len(), 27);
}

#[tokio::test]
async fn test_convert_smiles_to_xyz_with_gen3d() {
    let app = service(Duration::from_secs(5));
    let body = json!({ "format": "smiles", "data": "CCO", "gen3d": true });
    let response = app.oneshot(post_json("/convert/xyz", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mime = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert_eq!(mime, "chemical/x-xyz");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    // Etanol con hidrógenos explícitos: 9 átomos.
    assert!(text.starts_with("9\n"));
}

#[tokio::test]
async fn test_convert_accepts_embedded_cjson_object() {
    let app = service(Duration::from_secs(5));
    let cjson = json!({
        "chemicalJson": 1,
        "atoms": {
            "elements": { "number": [8, 1, 1] },
            "coords": { "3d": [0.0, 0.0, 0.117, 0.0, 0.757, -0.469, 0.0, -0.757, -0.469] }
        }
    });
    let body = json!({ "format": "cjson", "data": cjson, "perceiveBonds": true });
    let response = app.oneshot(post_json("/convert/cjson", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["atoms"]["elements"]["number"], json!([8, 1, 1]));
    assert_eq!(doc["bonds"]["order"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_properties_route() {
    let app = service(Duration::from_secs(5));
    let body = json!({ "format": "smiles", "data": "CCO" });
    let response = app.oneshot(post_json("/properties", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let props = json_body(response).await;
    assert_eq!(props["formula"], "C2H6O");
    assert_eq!(props["spacedFormula"], "C 2 H 6 O 1");
    assert_eq!(props["atomCount"], 9);
    assert_eq!(props["heavyAtomCount"], 3);
}

#[tokio::test]
async fn test_unknown_output_format_is_400_with_error_body() {
    let app = service(Duration::from_secs(5));
    let body = json!({ "format": "smiles", "data": "CCO" });
    let response = app.oneshot(post_json("/convert/mol2", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let doc = json_body(response).await;
    assert!(doc["error"].as_str().unwrap().contains("mol2"));
}

#[tokio::test]
async fn test_malformed_molecule_is_422() {
    let app = service(Duration::from_secs(5));
    // Anillo sin cerrar: el parser lo rechaza.
    let body = json!({ "format": "smiles", "data": "C1CC" });
    let response = app.oneshot(post_json("/convert/inchi", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_numeric_data_is_400() {
    let app = service(Duration::from_secs(5));
    let body = json!({ "format": "smiles", "data": 42 });
    let response = app.oneshot(post_json("/properties", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

struct SlowEngine(Duration);

impl ConversionEngine for SlowEngine {
    fn convert(
        &self,
        _data: &str,
        _input: &str,
        _output: &str,
        _options: &ConvertOptions,
    ) -> Result<Converted, ConvertError> {
        std::thread::sleep(self.0);
        Ok(Converted::Json(json!({ "ok": true })))
    }

    fn properties(&self, _: &str, _: &str, _: bool) -> Result<Value, ConvertError> {
        std::thread::sleep(self.0);
        Ok(json!({ "ok": true }))
    }
}

#[tokio::test]
async fn test_deadline_exceeded_is_504() {
    let pool = ConversionPool::new(Arc::new(SlowEngine(Duration::from_millis(500))), 1);
    let app = router(Arc::new(AppState { pool, request_timeout: Duration::from_millis(50) }));
    let body = json!({ "format": "smiles", "data": "CCO" });
    let response = app.oneshot(post_json("/properties", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let doc = json_body(response).await;
    assert!(doc["error"].as_str().unwrap().contains("deadline"));
}
