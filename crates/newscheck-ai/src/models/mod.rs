//! Binary classifiers evaluated over TF-IDF feature vectors.

use std::path::Path;

use newscheck_core::Label;
use tracing::info;

use crate::artifact::{self, ModelArtifact, ModelSpec};
use crate::error::{InferenceError, LoadError};
use crate::vectorizer::FeatureVector;

mod linear;
mod tree;

pub use linear::LinearModel;
pub use tree::{DecisionTree, GradientBoosting, RandomForest};

/// A fitted binary classifier.
///
/// Implementations are immutable after load and shared across threads.
pub trait Classifier: Send + Sync {
    /// Estimator kind, e.g. `"logistic_regression"`.
    fn kind(&self) -> &'static str;

    /// Number of input features the model was fit on.
    fn n_features(&self) -> usize;

    fn predict(&self, x: &FeatureVector) -> Label;

    /// Probability of [`Label::Real`].
    fn predict_proba(&self, x: &FeatureVector) -> Result<f64, InferenceError>;
}

/// Build a classifier from a parsed artifact.
pub fn from_artifact(artifact: ModelArtifact) -> Result<Box<dyn Classifier>, String> {
    if artifact.classes != [0, 1] {
        return Err(format!(
            "expected classes [0, 1], got {:?}",
            artifact.classes
        ));
    }
    if artifact.n_features == 0 {
        return Err("n_features is zero".into());
    }

    let n = artifact.n_features;
    let model: Box<dyn Classifier> = match artifact.spec {
        ModelSpec::LogisticRegression(spec) => Box::new(LinearModel::logistic(spec, n)?),
        ModelSpec::LinearSvc(spec) => Box::new(LinearModel::svc(spec, n)?),
        ModelSpec::DecisionTree(spec) => Box::new(DecisionTree::new(&spec, n)?),
        ModelSpec::RandomForest { trees } => Box::new(RandomForest::new(&trees, n)?),
        ModelSpec::GradientBoosting {
            init,
            learning_rate,
            trees,
        } => Box::new(GradientBoosting::new(init, learning_rate, &trees, n)?),
    };
    Ok(model)
}

/// Load a classifier artifact from disk.
pub fn load(path: &Path) -> Result<Box<dyn Classifier>, LoadError> {
    let artifact: ModelArtifact = artifact::read_artifact(path)?;
    let model = from_artifact(artifact).map_err(|reason| LoadError::Corrupt {
        path: path.to_path_buf(),
        reason,
    })?;

    info!(
        kind = model.kind(),
        n_features = model.n_features(),
        path = %path.display(),
        "loaded classifier"
    );
    Ok(model)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
