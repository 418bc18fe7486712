use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::artifact::{self, ArtifactError};
use super::features::FeatureVector;
use super::model::{HeuristicModel, ModelError, PriceModel};

/// Whether predictions come from a real artifact or the heuristic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelProvenance {
    pub ml_used: bool,
}

impl ModelProvenance {
    pub const ARTIFACT: Self = Self { ml_used: true };
    pub const FALLBACK: Self = Self { ml_used: false };

    pub fn fallback(&self) -> bool {
        !self.ml_used
    }
}

/// Immutable model handle shared by every request for the lifetime of the process.
#[derive(Clone)]
pub struct ResolvedModel {
    model: Arc<dyn PriceModel>,
    provenance: ModelProvenance,
}

impl ResolvedModel {
    pub fn heuristic() -> Self {
        Self {
            model: Arc::new(HeuristicModel::default()),
            provenance: ModelProvenance::FALLBACK,
        }
    }

    /// Adopt an already validated model as the serving model.
    pub fn from_artifact(model: Arc<dyn PriceModel>) -> Self {
        Self {
            model,
            provenance: ModelProvenance::ARTIFACT,
        }
    }

    pub fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f64>, ModelError> {
        self.model.predict(rows)
    }

    pub fn provenance(&self) -> ModelProvenance {
        self.provenance
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }
}

impl fmt::Debug for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedModel")
            .field("model", &self.model.name())
            .field("provenance", &self.provenance)
            .finish()
    }
}

/// Reasons the resolver fell back to the heuristic model.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("model artifact unavailable at {}: {source}", .path.display())]
    ArtifactUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact at {} is incompatible: {source}", .path.display())]
    ArtifactIncompatible {
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },
}

/// Outcome of a resolution attempt, kept for observability.
#[derive(Debug)]
pub struct Resolution {
    pub model: ResolvedModel,
    pub fallback_cause: Option<ResolveError>,
}

/// Startup-time selection of the serving model.
pub struct ModelResolver {
    artifact_path: PathBuf,
}

impl ModelResolver {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Resolve the serving model. Never fails: every problem degrades to the heuristic.
    pub fn resolve(&self) -> ResolvedModel {
        self.resolve_with_cause().model
    }

    pub fn resolve_with_cause(&self) -> Resolution {
        match self.load_artifact() {
            Ok(model) => {
                info!(
                    path = %self.artifact_path.display(),
                    model = model.name(),
                    "model artifact adopted"
                );
                Resolution {
                    model: ResolvedModel::from_artifact(model),
                    fallback_cause: None,
                }
            }
            Err(cause) => {
                warn!(error = %cause, "falling back to heuristic price model");
                Resolution {
                    model: ResolvedModel::heuristic(),
                    fallback_cause: Some(cause),
                }
            }
        }
    }

    fn load_artifact(&self) -> Result<Arc<dyn PriceModel>, ResolveError> {
        let bytes = std::fs::read(&self.artifact_path).map_err(|source| {
            ResolveError::ArtifactUnavailable {
                path: self.artifact_path.clone(),
                source,
            }
        })?;

        let model =
            artifact::decode(&bytes).map_err(|source| ResolveError::ArtifactIncompatible {
                path: self.artifact_path.clone(),
                source,
            })?;

        Ok(Arc::from(model))
    }
}
