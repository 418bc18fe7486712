//! Decoding of externally supplied model artifacts.
//!
//! Artifacts are JSON documents. Decoding happens in two passes: the bytes are first parsed into
//! an untyped [`serde_json::Value`] so corrupt files and capability gaps can be told apart, then
//! the document is checked for a model family that exposes a prediction capability.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::features::{FeatureVector, FEATURE_COUNT};
use super::model::{ModelError, PriceModel};

/// Highest artifact layout revision this build understands.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Why a readable artifact could not be adopted.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("artifact root must be a JSON object")]
    NotAnObject,
    #[error("artifact format version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },
    #[error("artifact model type '{0}' is not recognised")]
    UnknownModelType(String),
    #[error("artifact does not expose a prediction capability: {0}")]
    MissingCapability(String),
    #[error("artifact failed its probe prediction: {0}")]
    ProbeFailed(String),
}

/// Linear model parameters as stored in an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearArtifact {
    #[serde(default)]
    pub name: Option<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub minimum_price: Option<f64>,
}

/// Price model backed by a decoded linear artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearArtifactModel {
    name: String,
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
    minimum_price: f64,
}

impl LinearArtifactModel {
    fn from_artifact(artifact: LinearArtifact) -> Result<Self, ArtifactError> {
        let coefficients: [f64; FEATURE_COUNT] =
            artifact.coefficients.as_slice().try_into().map_err(|_| {
                ArtifactError::MissingCapability(format!(
                    "expected {FEATURE_COUNT} coefficients, found {}",
                    artifact.coefficients.len()
                ))
            })?;

        let minimum_price = artifact.minimum_price.unwrap_or(0.0);
        let parameters_finite = artifact.intercept.is_finite()
            && minimum_price.is_finite()
            && coefficients.iter().all(|weight| weight.is_finite());
        if !parameters_finite {
            return Err(ArtifactError::MissingCapability(
                "model parameters must be finite numbers".to_string(),
            ));
        }

        Ok(Self {
            name: artifact
                .name
                .unwrap_or_else(|| "linear-artifact".to_string()),
            intercept: artifact.intercept,
            coefficients,
            minimum_price,
        })
    }

    pub fn price(&self, features: &FeatureVector) -> f64 {
        let weighted: f64 = self
            .coefficients
            .iter()
            .zip(features.as_array())
            .map(|(weight, value)| weight * value)
            .sum();
        (self.intercept + weighted).max(self.minimum_price)
    }
}

impl PriceModel for LinearArtifactModel {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        rows.iter()
            .enumerate()
            .map(|(row, features)| {
                let value = self.price(features);
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ModelError::NonFiniteOutput { row, value })
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Decode artifact bytes into a model that has passed the capability check and a probe.
pub fn decode(bytes: &[u8]) -> Result<Box<dyn PriceModel>, ArtifactError> {
    let document: Value = serde_json::from_slice(bytes)?;
    let model = model_from_document(document)?;
    probe(model.as_ref())?;
    Ok(model)
}

fn model_from_document(document: Value) -> Result<Box<dyn PriceModel>, ArtifactError> {
    let Value::Object(mut fields) = document else {
        return Err(ArtifactError::NotAnObject);
    };

    if let Some(version) = fields.remove("format_version") {
        let found = version.as_u64().ok_or_else(|| {
            ArtifactError::MissingCapability(format!("format_version {version} is not an integer"))
        })?;
        if found > u64::from(SUPPORTED_FORMAT_VERSION) {
            return Err(ArtifactError::UnsupportedVersion {
                found,
                supported: SUPPORTED_FORMAT_VERSION,
            });
        }
    }

    let model_type = match fields.remove("model_type") {
        Some(Value::String(kind)) => kind,
        Some(other) => {
            return Err(ArtifactError::MissingCapability(format!(
                "model_type must be a string, found {other}"
            )))
        }
        None => {
            return Err(ArtifactError::MissingCapability(
                "no model_type declared".to_string(),
            ))
        }
    };

    match model_type.as_str() {
        "linear" => {
            let artifact: LinearArtifact = serde_json::from_value(Value::Object(fields))
                .map_err(|err| ArtifactError::MissingCapability(err.to_string()))?;
            Ok(Box::new(LinearArtifactModel::from_artifact(artifact)?))
        }
        _ => Err(ArtifactError::UnknownModelType(model_type)),
    }
}

fn probe(model: &dyn PriceModel) -> Result<(), ArtifactError> {
    let prices = model
        .predict(&[FeatureVector::reference()])
        .map_err(|err| ArtifactError::ProbeFailed(err.to_string()))?;

    match prices.as_slice() {
        [price] if price.is_finite() => Ok(()),
        [price] => Err(ArtifactError::ProbeFailed(format!(
            "reference row priced at {price}"
        ))),
        other => Err(ArtifactError::ProbeFailed(format!(
            "expected 1 price for 1 row, received {}",
            other.len()
        ))),
    }
}
