use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::ModelError;

/// Number of numeric inputs every price model consumes.
pub const FEATURE_COUNT: usize = 6;

/// Fixed, ordered numeric representation of one property.
///
/// Field order is the coefficient order of every model; [`FeatureVector::as_array`] is the only
/// sanctioned way to flatten it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub size_sqft: f64,
    pub school_rating: f64,
    pub commute_time: f64,
    pub property_age: f64,
}

impl FeatureVector {
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.bedrooms,
            self.bathrooms,
            self.size_sqft,
            self.school_rating,
            self.commute_time,
            self.property_age,
        ]
    }

    /// Row used by the resolver to probe a freshly decoded artifact.
    pub fn reference() -> Self {
        Self {
            bedrooms: 3.0,
            bathrooms: 2.0,
            size_sqft: 1500.0,
            school_rating: 7.5,
            commute_time: 30.0,
            property_age: 10.0,
        }
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = ModelError;

    fn try_from(row: &[f64]) -> Result<Self, Self::Error> {
        match *row {
            [bedrooms, bathrooms, size_sqft, school_rating, commute_time, property_age] => {
                Ok(Self {
                    bedrooms,
                    bathrooms,
                    size_sqft,
                    school_rating,
                    commute_time,
                    property_age,
                })
            }
            _ => Err(ModelError::MalformedFeatureRow {
                expected: FEATURE_COUNT,
                found: row.len(),
            }),
        }
    }
}

/// Named, possibly incomplete feature set handed to the single-item predictor.
///
/// Absent values are not an error: they collapse to `0.0` when the canonical vector is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFeatures {
    #[serde(default)]
    pub bedrooms: Option<f64>,
    #[serde(default)]
    pub bathrooms: Option<f64>,
    #[serde(default)]
    pub size_sqft: Option<f64>,
    #[serde(default)]
    pub school_rating: Option<f64>,
    #[serde(default)]
    pub commute_time: Option<f64>,
    #[serde(default)]
    pub property_age: Option<f64>,
}

impl PropertyFeatures {
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector {
            bedrooms: or_zero(self.bedrooms),
            bathrooms: or_zero(self.bathrooms),
            size_sqft: or_zero(self.size_sqft),
            school_rating: or_zero(self.school_rating),
            commute_time: or_zero(self.commute_time),
            property_age: or_zero(self.property_age),
        }
    }
}

impl From<FeatureVector> for PropertyFeatures {
    fn from(vector: FeatureVector) -> Self {
        Self {
            bedrooms: Some(vector.bedrooms),
            bathrooms: Some(vector.bathrooms),
            size_sqft: Some(vector.size_sqft),
            school_rating: Some(vector.school_rating),
            commute_time: Some(vector.commute_time),
            property_age: Some(vector.property_age),
        }
    }
}

// NaN is treated like a missing value.
fn or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(number) if !number.is_nan() => number,
        _ => 0.0,
    }
}

/// Raised when a loosely typed field cannot be read as a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("field '{field}' is not numeric: {value}")]
pub struct NonNumericField {
    pub field: String,
    pub value: String,
}

/// Lenient numeric coercion for untyped batch payloads.
///
/// `null`, empty strings and missing fields yield `None`; numbers, numeric strings and booleans
/// yield a value; anything else is rejected.
pub fn coerce_number(field: &str, value: Option<&Value>) -> Result<Option<f64>, NonNumericField> {
    let rejected = |value: &Value| NonNumericField {
        field: field.to_string(),
        value: value.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(if *flag { 1.0 } else { 0.0 })),
        Some(number @ Value::Number(_)) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| rejected(number)),
        Some(text @ Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
                _ => Err(rejected(text)),
            }
        }
        Some(other) => Err(rejected(other)),
    }
}
