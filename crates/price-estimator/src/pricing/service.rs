use chrono::{Datelike, Local};
use serde_json::Value;

use super::batch::{BatchPredictions, BatchScorer};
use super::features::PropertyFeatures;
use super::predictor::{PredictionError, PricePredictor};
use super::resolver::{ModelProvenance, ModelResolver, ResolvedModel};

/// Service composing the resolved model, single-item predictor and batch scorer.
#[derive(Debug, Clone)]
pub struct PricingService {
    predictor: PricePredictor,
    scorer: BatchScorer,
}

impl PricingService {
    pub fn new(model: ResolvedModel) -> Self {
        let predictor = PricePredictor::new(model);
        let scorer = BatchScorer::new(predictor.clone());
        Self { predictor, scorer }
    }

    /// Resolve the model once and build the service around it.
    pub fn from_resolver(resolver: &ModelResolver) -> Self {
        Self::new(resolver.resolve())
    }

    pub fn provenance(&self) -> ModelProvenance {
        self.predictor.provenance()
    }

    pub fn model(&self) -> &ResolvedModel {
        self.predictor.model()
    }

    pub fn predict(&self, features: &PropertyFeatures) -> Result<f64, PredictionError> {
        self.predictor.predict_single(features)
    }

    pub fn score_batch(&self, properties: &[Value], current_year: i32) -> BatchPredictions {
        self.scorer.score_batch(properties, current_year)
    }

    /// Score against the local calendar year.
    pub fn score_batch_now(&self, properties: &[Value]) -> BatchPredictions {
        self.score_batch(properties, current_year())
    }
}

pub fn current_year() -> i32 {
    Local::now().year()
}
