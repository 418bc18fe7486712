use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::features::{coerce_number, NonNumericField, PropertyFeatures};
use super::predictor::{PredictionError, PricePredictor};
use super::resolver::ModelProvenance;

/// Price attached to one scored batch item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    pub predicted_price: f64,
}

/// Successful predictions keyed by record identifier, plus the serving model's provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPredictions {
    pub predictions: BTreeMap<String, PricePrediction>,
    pub provenance: ModelProvenance,
    pub skipped: usize,
}

/// Why a single batch item was left out of the result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ItemFailure {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no usable id")]
    MissingIdentifier,
    #[error(transparent)]
    NonNumeric(#[from] NonNumericField),
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),
}

/// Scores property records one by one, omitting any record that fails.
#[derive(Debug, Clone)]
pub struct BatchScorer {
    predictor: PricePredictor,
}

impl BatchScorer {
    pub fn new(predictor: PricePredictor) -> Self {
        Self { predictor }
    }

    /// Score every record, deriving ages from `year_built` relative to `current_year`.
    pub fn score_batch(&self, properties: &[Value], current_year: i32) -> BatchPredictions {
        let mut predictions = BTreeMap::new();
        let mut skipped = 0;

        for (index, record) in properties.iter().enumerate() {
            match self.score_record(record, current_year) {
                Ok((id, predicted_price)) => {
                    predictions.insert(id, PricePrediction { predicted_price });
                }
                Err(failure) => {
                    skipped += 1;
                    warn!(index, error = %failure, "skipping batch item");
                }
            }
        }

        debug!(
            scored = predictions.len(),
            skipped,
            total = properties.len(),
            "batch scored"
        );

        BatchPredictions {
            predictions,
            provenance: self.predictor.provenance(),
            skipped,
        }
    }

    fn score_record(
        &self,
        record: &Value,
        current_year: i32,
    ) -> Result<(String, f64), ItemFailure> {
        let fields = record.as_object().ok_or(ItemFailure::NotAnObject)?;
        let id = record_id(fields).ok_or(ItemFailure::MissingIdentifier)?;
        let features = record_features(fields, current_year)?;
        let price = self.predictor.predict_single(&features)?;
        Ok((id, price))
    }
}

fn record_id(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn record_features(
    fields: &Map<String, Value>,
    current_year: i32,
) -> Result<PropertyFeatures, NonNumericField> {
    let number = |name: &str| coerce_number(name, fields.get(name));

    Ok(PropertyFeatures {
        bedrooms: number("bedrooms")?,
        bathrooms: number("bathrooms")?,
        size_sqft: number("size_sqft")?,
        school_rating: number("school_rating")?,
        commute_time: number("commute_time")?,
        property_age: property_age(fields, current_year)?,
    })
}

/// A truthy `year_built` wins over an explicit `property_age`.
fn property_age(
    fields: &Map<String, Value>,
    current_year: i32,
) -> Result<Option<f64>, NonNumericField> {
    match coerce_number("year_built", fields.get("year_built"))? {
        Some(year_built) if year_built != 0.0 => {
            Ok(Some((f64::from(current_year) - year_built).max(0.0)))
        }
        _ => coerce_number("property_age", fields.get("property_age")),
    }
}
