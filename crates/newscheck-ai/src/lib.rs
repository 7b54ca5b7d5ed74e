//! Inference layer: artifact loading, TF-IDF vectorisation, and the
//! four-model classifier ensemble.

pub mod artifact;
pub mod ensemble;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod vectorizer;

#[cfg(test)]
mod testing;

pub use ensemble::Ensemble;
pub use error::{InferenceError, LoadError};
pub use models::Classifier;
pub use pipeline::{ContextSummary, ModelContext, Pipeline, PipelineConfig};
pub use vectorizer::{FeatureVector, TfidfVectorizer};
