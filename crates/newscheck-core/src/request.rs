//! Request and response shapes exchanged with the serving boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{AggregationMode, Label, ModelId, PerModel};

/// Request body as sent by clients.
///
/// Older clients send the article under `news`, newer ones under `text`.
/// [`RawPredictRequest::into_request`] resolves this into a single
/// [`PredictRequest`] before the pipeline sees it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPredictRequest {
    #[serde(default)]
    pub news: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl RawPredictRequest {
    /// Validate into a canonical request.
    ///
    /// `news` wins over `text` whenever it is non-empty, even if it is only
    /// whitespace. An empty or missing `mode` means "use the configured
    /// default".
    pub fn into_request(self, primary: ModelId) -> Result<PredictRequest, ValidationError> {
        let text = [self.news, self.text]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_default();

        let mode = match self.mode.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(m) => Some(AggregationMode::parse_with_alias(m, primary)?),
        };

        PredictRequest::new(text, mode)
    }
}

/// A validated prediction request: non-empty text and an optional mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictRequest {
    text: String,
    mode: Option<AggregationMode>,
}

impl PredictRequest {
    /// Trim `text` and reject it if nothing is left.
    pub fn new(
        text: impl Into<String>,
        mode: Option<AggregationMode>,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(Self {
            text: trimmed.to_string(),
            mode,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Requested mode, or `None` for the configured default.
    pub fn mode(&self) -> Option<AggregationMode> {
        self.mode
    }
}

/// Output of a single ensemble member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrediction {
    pub label: Label,
    /// Probability of [`Label::Real`], absent when the model has none.
    pub probability: Option<f64>,
}

/// Full outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Mode actually used, after applying the default.
    pub mode: AggregationMode,
    pub primary: ModelId,
    pub predictions: PerModel<ModelPrediction>,
    pub final_label: Label,
}

impl PredictionResult {
    pub fn labels(&self) -> PerModel<Label> {
        self.predictions.map(|_, p| p.label)
    }

    /// The primary model's probability of [`Label::Real`].
    pub fn primary_probability(&self) -> Option<f64> {
        self.predictions.get(self.primary).probability
    }

    pub fn to_response(&self) -> PredictResponse {
        PredictResponse {
            mode: self.mode,
            models: self
                .predictions
                .iter()
                .map(|(id, p)| (id, p.label.as_str().to_string()))
                .collect(),
            primary_probability_real: self.primary_probability(),
            final_label: self.final_label.as_str().to_string(),
        }
    }
}

/// Response body returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub mode: AggregationMode,
    pub models: BTreeMap<ModelId, String>,
    pub primary_probability_real: Option<f64>,
    #[serde(rename = "final")]
    pub final_label: String,
}

/// Error body returned for rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
