//! Normalise → vectorise → predict → aggregate.
//!
//! [`ModelContext`] owns the loaded artifacts and is shared read-only, usually
//! behind an `Arc`, by every [`Pipeline`] that serves requests from it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use newscheck_core::{
    AggregationMode, ModelId, PerModel, PredictRequest, PredictResponse, PredictionResult,
    RawPredictRequest, ValidationError, aggregate, normalize,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::artifact;
use crate::ensemble::Ensemble;
use crate::error::LoadError;
use crate::vectorizer::TfidfVectorizer;

/// Process-wide pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Mode used when a request does not name one.
    pub default_mode: AggregationMode,
    /// Model whose label is final in primary mode and breaks vote ties.
    pub primary: ModelId,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_mode: AggregationMode::Primary,
            primary: ModelId::Lr,
        }
    }
}

/// Loaded vectorizer and ensemble. Immutable once constructed.
pub struct ModelContext {
    vectorizer: TfidfVectorizer,
    ensemble: Ensemble,
}

/// What was loaded, for health checks and logs.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub dim: usize,
    /// Estimator kind per model.
    pub models: BTreeMap<ModelId, &'static str>,
}

impl ModelContext {
    /// Pair a vectorizer with an ensemble, checking every member accepts
    /// vectors of the vectorizer's dimension.
    pub fn new(vectorizer: TfidfVectorizer, ensemble: Ensemble) -> Result<Self, LoadError> {
        let dim = vectorizer.dim();
        for id in ModelId::ALL {
            let expected = ensemble.member(id).n_features();
            if expected != dim {
                return Err(LoadError::DimensionMismatch {
                    model: id,
                    expected,
                    actual: dim,
                });
            }
        }
        Ok(Self {
            vectorizer,
            ensemble,
        })
    }

    /// Load the vectorizer and the four classifiers from an artifact directory.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let vectorizer = TfidfVectorizer::load(&dir.join(artifact::VECTORIZER_FILE))?;
        let ensemble = Ensemble::load(dir)?;
        let context = Self::new(vectorizer, ensemble)?;

        info!(
            dir = %dir.display(),
            dim = context.vectorizer.dim(),
            "model artifacts ready"
        );
        Ok(context)
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            dim: self.vectorizer.dim(),
            models: self.ensemble.kinds().iter().map(|(id, k)| (id, *k)).collect(),
        }
    }
}

/// Request-scoped inference over a shared [`ModelContext`].
#[derive(Clone)]
pub struct Pipeline {
    context: Arc<ModelContext>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(context: Arc<ModelContext>, config: PipelineConfig) -> Self {
        Self { context, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn context(&self) -> &ModelContext {
        &self.context
    }

    /// Classify a validated request.
    pub fn predict(&self, request: &PredictRequest) -> PredictionResult {
        let mode = request.mode().unwrap_or(self.config.default_mode);
        let primary = self.config.primary;

        let normalized = normalize(request.text());
        let features = self.context.vectorizer.vectorize(&normalized);
        let predictions = self.context.ensemble.predict_all(&features);

        let labels: PerModel<_> = predictions.map(|_, p| p.label);
        let final_label = aggregate(&labels, mode, primary);

        if predictions.get(primary).probability.is_none() {
            warn!(
                model = %primary,
                kind = self.context.ensemble.member(primary).kind(),
                "primary model has no class probability"
            );
        }
        debug!(
            %mode,
            features = features.nnz(),
            final_label = final_label.class(),
            "prediction complete"
        );

        PredictionResult {
            mode,
            primary,
            predictions,
            final_label,
        }
    }

    /// Validate a raw request body and classify it.
    ///
    /// Validation happens before any model runs.
    pub fn handle(&self, raw: RawPredictRequest) -> Result<PredictResponse, ValidationError> {
        let request = raw.into_request(self.config.primary)?;
        Ok(self.predict(&request).to_response())
    }
}
