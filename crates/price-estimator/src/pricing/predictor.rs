use super::features::{FeatureVector, PropertyFeatures};
use super::model::ModelError;
use super::resolver::{ModelProvenance, ResolvedModel};

/// Prices a single property against the resolved model.
#[derive(Debug, Clone)]
pub struct PricePredictor {
    model: ResolvedModel,
}

impl PricePredictor {
    pub fn new(model: ResolvedModel) -> Self {
        Self { model }
    }

    pub fn provenance(&self) -> ModelProvenance {
        self.model.provenance()
    }

    pub fn model(&self) -> &ResolvedModel {
        &self.model
    }

    /// Normalize the named features into the canonical vector and price it.
    pub fn predict_single(&self, features: &PropertyFeatures) -> Result<f64, PredictionError> {
        self.predict_vector(&features.to_vector())
    }

    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<f64, PredictionError> {
        let prices = self.model.predict(std::slice::from_ref(vector))?;
        prices
            .first()
            .copied()
            .ok_or(PredictionError::EmptyPredictionResult)
    }
}

/// Request-level prediction failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model returned no predictions")]
    EmptyPredictionResult,
}
