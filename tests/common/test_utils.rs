use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use house_price_api::{artifacts::ArtifactSet, inference::PricePredictor, server};
use serde_json::{Value, json};
use std::{fs, sync::Arc};
use tempfile::TempDir;

/// Column layout the test model is trained on; the last column is never computed.
pub const TEST_FEATURE_COLUMNS: [&str; 11] = [
    "location",
    "total_sqft",
    "bath",
    "balcony",
    "BHK",
    "Bedroom",
    "RK",
    "type_bedroom",
    "type_bhk",
    "type_rk",
    "area_type_plot",
];

pub const TEST_OVERALL_MEAN: f64 = 5000.0;

/// Write a JSON artifact into the directory
pub fn write_artifact(dir: &TempDir, file: &str, value: Value) {
    fs::write(dir.path().join(file), value.to_string()).expect("Failed to write artifact");
}

/// Linear model summing every feature, plus 0.5
pub fn test_model() -> Value {
    json!({
        "kind": "linear",
        "coefficients": vec![1.0; TEST_FEATURE_COLUMNS.len()],
        "intercept": 0.5,
        "feature_names_in": TEST_FEATURE_COLUMNS,
    })
}

/// Create a directory with a complete artifact set
pub fn create_test_artifacts_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    write_artifact(&dir, "model.json", test_model());
    write_artifact(
        &dir,
        "location_price_map.json",
        json!({"whitefield": 6000.0, "sarjapurroad": 7000.0}),
    );
    write_artifact(&dir, "overall_mean_price.json", json!(TEST_OVERALL_MEAN));
    write_artifact(
        &dir,
        "scaler.json",
        json!({"kind": "standard", "mean": [5000.0, 1000.0], "scale": [1000.0, 100.0]}),
    );
    write_artifact(&dir, "feature_columns.json", json!(TEST_FEATURE_COLUMNS));
    write_artifact(&dir, "bath_median.json", json!(3.0));
    write_artifact(&dir, "balcony_median.json", json!(2.0));
    dir
}

pub fn create_test_predictor() -> (PricePredictor, TempDir) {
    let dir = create_test_artifacts_dir();
    let artifacts = ArtifactSet::load(dir.path()).expect("Failed to load test artifacts");
    (PricePredictor::new(artifacts), dir)
}

/// Create the full router over the test artifacts, with a UI page
pub fn create_test_app() -> (Router, TempDir) {
    let (predictor, dir) = create_test_predictor();
    fs::write(dir.path().join("index.html"), "<html><body>House prices</body></html>")
        .expect("Failed to write UI page");
    let app = server::router(Arc::new(predictor), dir.path());
    (app, dir)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
