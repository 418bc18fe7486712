use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use super::batch::{BatchPredictions, PricePrediction};
use super::features::PropertyFeatures;
use super::service::{current_year, PricingService};

/// Validated single-property payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub size_sqft: f64,
    pub school_rating: f64,
    pub commute_time: f64,
    pub property_age: f64,
}

impl PredictionRequest {
    /// Collect every range violation rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if !(self.size_sqft.is_finite() && self.size_sqft > 0.0) {
            problems.push("size_sqft must be greater than 0".to_string());
        }
        if !(0.0..=10.0).contains(&self.school_rating) {
            problems.push("school_rating must be between 0 and 10".to_string());
        }
        if !(self.commute_time.is_finite() && self.commute_time >= 0.0) {
            problems.push("commute_time must be 0 or greater".to_string());
        }
        if !(self.property_age.is_finite() && self.property_age >= 0.0) {
            problems.push("property_age must be 0 or greater".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

impl From<&PredictionRequest> for PropertyFeatures {
    fn from(request: &PredictionRequest) -> Self {
        Self {
            bedrooms: Some(f64::from(request.bedrooms)),
            bathrooms: Some(f64::from(request.bathrooms)),
            size_sqft: Some(request.size_sqft),
            school_rating: Some(request.school_rating),
            commute_time: Some(request.commute_time),
            property_age: Some(request.property_age),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub input_features: PredictionRequest,
    pub ml_used: bool,
    pub fallback: bool,
}

/// Batch payload; records stay untyped so one bad record cannot reject the whole request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub properties: Vec<Value>,
    #[serde(default)]
    pub as_of_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub predictions: BTreeMap<String, PricePrediction>,
    pub ml_used: bool,
    pub fallback: bool,
}

impl From<BatchPredictions> for BatchResponse {
    fn from(batch: BatchPredictions) -> Self {
        Self {
            predictions: batch.predictions,
            ml_used: batch.provenance.ml_used,
            fallback: batch.provenance.fallback(),
        }
    }
}

/// Router exposing single and batch price estimation.
pub fn pricing_router(service: Arc<PricingService>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/predict/batch", post(batch_handler))
        .with_state(service)
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<PricingService>>,
    Json(request): Json<PredictionRequest>,
) -> Response {
    if let Err(problems) = request.validate() {
        let payload = json!({ "error": "invalid features", "details": problems });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    match service.predict(&PropertyFeatures::from(&request)) {
        Ok(predicted_price) => {
            let provenance = service.provenance();
            let body = PredictionResponse {
                predicted_price,
                input_features: request,
                ml_used: provenance.ml_used,
                fallback: provenance.fallback(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!(error = %err, "single prediction failed");
            let payload = json!({ "error": format!("Prediction failed: {err}") });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn batch_handler(
    State(service): State<Arc<PricingService>>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let year = request.as_of_year.unwrap_or_else(current_year);
    let batch = service.score_batch(&request.properties, year);
    Json(BatchResponse::from(batch))
}
