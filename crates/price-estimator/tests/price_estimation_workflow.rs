//! End-to-end scenarios through the public pricing facade: model resolution at startup followed
//! by single and batch estimation.

use price_estimator::pricing::{
    FeatureVector, HeuristicModel, ModelResolver, PriceModel, PricingService, PropertyFeatures,
};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_artifact(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("complex_price_model_v2.json");
    std::fs::write(&path, contents).expect("write artifact");
    path
}

fn reference_features() -> PropertyFeatures {
    PropertyFeatures {
        bedrooms: Some(3.0),
        bathrooms: Some(2.0),
        size_sqft: Some(1500.0),
        school_rating: Some(7.5),
        commute_time: Some(30.0),
        property_age: Some(10.0),
    }
}

#[test]
fn service_without_artifact_serves_heuristic_prices() {
    let dir = TempDir::new().expect("temp dir");
    let resolver = ModelResolver::new(dir.path().join("missing.json"));
    let service = PricingService::from_resolver(&resolver);

    assert!(!service.provenance().ml_used);
    let price = service.predict(&reference_features()).expect("prediction");
    assert_eq!(price, 624_500.0);
    assert_eq!(
        price,
        service.predict(&reference_features()).expect("repeat prediction")
    );
}

#[test]
fn service_with_untrusted_object_artifact_stays_on_fallback() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_artifact(
        &dir,
        r#"{"py/object": "__main__.ComplexTrapModelRenamed", "state": {}}"#,
    );

    let service = PricingService::from_resolver(&ModelResolver::new(path));

    assert!(service.provenance().fallback());
    assert_eq!(service.model().name(), "heuristic");
}

#[test]
fn service_with_linear_artifact_uses_it_for_both_paths() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_artifact(
        &dir,
        r#"{
            "model_type": "linear",
            "intercept": 50000,
            "coefficients": [10000, 5000, 100, 1000, -100, -100]
        }"#,
    );

    let service = PricingService::from_resolver(&ModelResolver::new(path));
    assert!(service.provenance().ml_used);

    // 50k + 30k + 10k + 150k + 7.5k - 3k - 1k
    let single = service.predict(&reference_features()).expect("prediction");
    assert_eq!(single, 243_500.0);

    let batch = service.score_batch(
        &[
            json!({ "id": "a", "bedrooms": 3, "bathrooms": 2, "size_sqft": 1500,
                    "school_rating": 7.5, "commute_time": 30, "year_built": 2015 }),
            json!({ "id": "b", "bedrooms": "three" }),
        ],
        2025,
    );
    assert_eq!(batch.predictions.len(), 1);
    assert_eq!(batch.predictions["a"].predicted_price, single);
    assert!(batch.provenance.ml_used);
}

#[test]
fn heuristic_floor_holds_for_extreme_inputs() {
    let model = HeuristicModel::default();
    let floor = model.coefficients().minimum_price;

    for commute in [0.0, 45.0, 240.0, 10_000.0] {
        for age in [0.0, 30.0, 150.0, 5_000.0] {
            let row = FeatureVector {
                bedrooms: 0.0,
                bathrooms: 0.0,
                size_sqft: 1.0,
                school_rating: 0.0,
                commute_time: commute,
                property_age: age,
            };
            let prices = model.predict(&[row]).expect("heuristic predicts");
            assert!(prices[0] >= floor, "{commute}/{age} priced below floor");
        }
    }
}
