use std::path::PathBuf;
use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::pricing::features::FeatureVector;
use crate::pricing::model::{ModelError, PriceModel};
use crate::pricing::resolver::ResolvedModel;
use crate::pricing::router::pricing_router;
use crate::pricing::service::PricingService;

pub(super) const AS_OF_YEAR: i32 = 2025;

pub(super) fn linear_artifact() -> Value {
    json!({
        "format_version": 1,
        "model_type": "linear",
        "name": "complex_price_model_v2",
        "intercept": 100000.0,
        "coefficients": [50000.0, 30000.0, 100.0, 2000.0, -500.0, -400.0],
        "minimum_price": 25000.0
    })
}

/// Writes `contents` into a fresh temp dir; keep the `TempDir` alive for the test's duration.
pub(super) fn artifact_file(contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("price_model.json");
    std::fs::write(&path, contents).expect("write artifact");
    (dir, path)
}

pub(super) fn json_artifact_file(document: &Value) -> (TempDir, PathBuf) {
    artifact_file(&serde_json::to_vec(document).expect("serialize artifact"))
}

pub(super) fn valid_features() -> Value {
    json!({
        "bedrooms": 3,
        "bathrooms": 2,
        "size_sqft": 1500,
        "school_rating": 7.5,
        "commute_time": 30,
        "property_age": 10
    })
}

pub(super) fn record(id: Value, overrides: Value) -> Value {
    let mut record = valid_features();
    record["id"] = id;
    if let (Some(target), Value::Object(extra)) = (record.as_object_mut(), overrides) {
        target.extend(extra);
    }
    record
}

/// Model that accepts input but emits nothing.
pub(super) struct SilentModel;

impl PriceModel for SilentModel {
    fn predict(&self, _rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// Model that returns the bedroom count, handy for asserting which row was priced.
pub(super) struct EchoBedroomsModel;

impl PriceModel for EchoBedroomsModel {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        Ok(rows.iter().map(|row| row.bedrooms).collect())
    }

    fn name(&self) -> &str {
        "echo-bedrooms"
    }
}

pub(super) fn heuristic_service() -> PricingService {
    PricingService::new(ResolvedModel::heuristic())
}

pub(super) fn service_with(model: impl PriceModel + 'static) -> PricingService {
    PricingService::new(ResolvedModel::from_artifact(Arc::new(model)))
}

pub(super) fn router_with(service: PricingService) -> axum::Router {
    pricing_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
