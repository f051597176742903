use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use chemcalc_rust::backend::image::{ImageRef, ImageRegistry};
use chemcalc_rust::backend::local::LocalBackend;
use chemcalc_rust::backend::queue::QueueKind;
use chemcalc_rust::data::params::{ParameterSet, TASK_KEY};
use chemcalc_rust::providers::structure::implementations::generation_provider::GenerationProvider;
use chemcalc_rust::{CalculationClient, ClientError};

const PSI4: &str = "openchemistry/psi4:1.2.1";

// Cliente completo sin servicios externos: generación local + backend en
// proceso, con sondeo rápido para que las pruebas no se eternicen.
fn build_client(backend: LocalBackend) -> CalculationClient {
    let images = ImageRegistry::new();
    images.register(ImageRef::parse(PSI4).unwrap(), None);
    CalculationClient::new(vec![Box::new(GenerationProvider::new())], Arc::new(backend), images)
        .with_timing(Duration::from_millis(5), Duration::from_secs(10))
}

fn dft_params() -> ParameterSet {
    let mut params = ParameterSet::new();
    params.insert("theory", "dft").insert("functional", "b3lyp").insert("basis", "6-31g");
    params
}

#[tokio::test]
async fn test_water_energy_end_to_end() {
    let client = build_client(LocalBackend::new());
    let water = client.find_structure("InChI=1S/H2O/h1H2").await.expect("resolve water");
    assert_eq!(water.formula(), "H2O");
    assert_eq!(water.inchikey().len(), 27);

    let result = water.energy(PSI4, &dft_params()).await.expect("energy calculation");
    assert!(result.properties()["totalEnergy"].as_f64().unwrap() < 0.0);
    assert_eq!(result.properties()["theory"], "dft");
    assert_eq!(result.properties()["functional"], "b3lyp");
    assert_eq!(result.properties()["basis"], "6-31g");

    // Agua: 10 electrones, 5 orbitales ocupados.
    let orbitals = result.orbitals().expect("orbitals view");
    assert_eq!(orbitals.occupations.iter().filter(|o| **o > 0.0).count(), 5);
    assert!(result.vibrations().is_none());
    assert!(result.optimized_structure().is_none());
}

#[tokio::test]
async fn test_shortcuts_only_inject_task() {
    let client = build_client(LocalBackend::new());
    let water = client.find_structure("O").await.unwrap();
    let params = dft_params();

    let optimized = water.optimize(PSI4, &params).await.unwrap();
    assert_eq!(optimized.params().get(TASK_KEY), Some(&json!("optimize")));
    assert_eq!(optimized.params().len(), params.len() + 1);
    for (key, value) in params.iter() {
        assert_eq!(optimized.params().get(key), Some(value));
    }
    // Los parámetros del llamador quedan intactos.
    assert!(params.get(TASK_KEY).is_none());

    assert!(optimized.optimized_structure().is_some());
    assert!(optimized.vibrations().is_none());
}

#[tokio::test]
async fn test_frequencies_yield_vibrations() {
    let client = build_client(LocalBackend::new());
    let water = client.find_structure("InChI=1S/H2O/h1H2").await.unwrap();
    let result = water.frequencies(PSI4, &dft_params()).await.unwrap();
    let vibs = result.vibrations().expect("vibrations view");
    // 3N-6 modos con N=3.
    assert_eq!(vibs.frequencies.len(), 3);
    assert_eq!(vibs.intensities.len(), 3);
}

#[tokio::test]
async fn test_repeated_calculation_has_same_key_and_output() {
    let client = build_client(LocalBackend::new());
    let ethanol = client.find_structure("CCO").await.unwrap();
    let params = dft_params();
    let first = ethanol.energy(PSI4, &params).await.unwrap();
    let second = ethanol.energy(PSI4, &params).await.unwrap();
    assert_eq!(first.key(), second.key());
    assert_eq!(first.properties(), second.properties());

    // Otra tarea sobre la misma estructura cambia la identidad.
    let freq = ethanol.frequencies(PSI4, &params).await.unwrap();
    assert_ne!(first.key(), freq.key());
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_backend_error() {
    let client = build_client(LocalBackend::new());
    let water = client.find_structure("O").await.unwrap();
    let mut params = ParameterSet::new();
    params.insert("simulateFailure", true);
    let err = water.calculate(PSI4, &params).await.unwrap_err();
    match err {
        ClientError::Backend(message) => assert!(message.contains("simulated")),
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_capped_queue_still_completes_concurrent_jobs() {
    // Tope de un trabajo en vuelo: los envíos simultáneos se serializan en
    // la cola pero todos terminan.
    let backend = LocalBackend::with_queue(QueueKind::Fifo, 1, Duration::from_millis(10));
    let client = build_client(backend);
    let water = client.find_structure("O").await.unwrap();
    let params = dft_params();

    let a = water.energy(PSI4, &params);
    let b = water.frequencies(PSI4, &params);
    let c = water.optimize(PSI4, &params);
    let (a, b, c) = tokio::join!(a, b, c);
    assert!(a.unwrap().orbitals().is_some());
    assert!(b.unwrap().vibrations().is_some());
    assert!(c.unwrap().optimized_structure().is_some());
}

#[tokio::test]
async fn test_smiles_and_inchi_resolve_to_same_formula() {
    let client = build_client(LocalBackend::new());
    let by_smiles = client.find_structure("O").await.unwrap();
    let by_inchi = client.find_structure("InChI=1S/H2O/h1H2").await.unwrap();
    assert_eq!(by_smiles.formula(), by_inchi.formula());
}
