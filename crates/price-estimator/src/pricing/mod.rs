//! Property price estimation.
//!
//! A [`ModelResolver`] picks the serving model once at startup: a decoded artifact when it passes
//! the capability check, otherwise the deterministic [`HeuristicModel`]. The resulting
//! [`ResolvedModel`] is shared read-only by the single-item [`PricePredictor`] and the
//! [`BatchScorer`], which omits failing records instead of failing the batch.

pub mod artifact;
pub mod batch;
pub mod features;
pub mod model;
pub mod predictor;
pub mod resolver;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactError, LinearArtifact, LinearArtifactModel};
pub use batch::{BatchPredictions, BatchScorer, ItemFailure, PricePrediction};
pub use features::{FeatureVector, NonNumericField, PropertyFeatures, FEATURE_COUNT};
pub use model::{HeuristicCoefficients, HeuristicModel, ModelError, PriceModel};
pub use predictor::{PredictionError, PricePredictor};
pub use resolver::{ModelProvenance, ModelResolver, Resolution, ResolveError, ResolvedModel};
pub use router::{
    pricing_router, BatchRequest, BatchResponse, PredictionRequest, PredictionResponse,
};
pub use service::PricingService;
