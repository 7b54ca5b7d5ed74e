//! Test doubles shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use newscheck_core::{Label, PerModel};

use crate::artifact::{FORMAT_VERSION, Norm, VectorizerArtifact};
use crate::ensemble::Ensemble;
use crate::error::InferenceError;
use crate::models::Classifier;
use crate::vectorizer::{FeatureVector, TfidfVectorizer};

pub(crate) const TOY_DIM: usize = 3;

/// Classifier that always answers with the same label.
pub(crate) struct FixedClassifier {
    label: Label,
    probability: Option<f64>,
    n_features: usize,
    calls: Arc<AtomicUsize>,
}

impl FixedClassifier {
    pub(crate) fn new(label: Label, probability: Option<f64>) -> Self {
        Self {
            label,
            probability,
            n_features: TOY_DIM,
            calls: Arc::default(),
        }
    }

    pub(crate) fn with_n_features(mut self, n_features: usize) -> Self {
        self.n_features = n_features;
        self
    }

    /// Four members sharing one call counter.
    pub(crate) fn counting_ensemble(label: Label) -> (Ensemble, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let members = PerModel::from_fn(|_| {
            Box::new(Self {
                calls: Arc::clone(&calls),
                ..Self::new(label, Some(0.5))
            }) as Box<dyn Classifier>
        });
        (Ensemble::new(members), calls)
    }
}

impl Classifier for FixedClassifier {
    fn kind(&self) -> &'static str {
        "fixed"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, _x: &FeatureVector) -> Label {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.label
    }

    fn predict_proba(&self, _x: &FeatureVector) -> Result<f64, InferenceError> {
        self.probability
            .ok_or(InferenceError::ProbabilityUnavailable { kind: self.kind() })
    }
}

/// Vocabulary `["breaking", "news", "story"]` with unit IDF.
pub(crate) fn toy_vectorizer() -> TfidfVectorizer {
    let artifact = VectorizerArtifact {
        format_version: FORMAT_VERSION,
        vocabulary: ["breaking", "news", "story"]
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect(),
        idf: Some(vec![1.0; TOY_DIM]),
        lowercase: true,
        ngram_range: (1, 1),
        stop_words: vec![],
        sublinear_tf: false,
        norm: Norm::L2,
    };
    match TfidfVectorizer::from_artifact(artifact) {
        Ok(v) => v,
        Err(e) => panic!("toy vectorizer: {e}"),
    }
}

/// Members in LR, DT, GB, RF order.
pub(crate) fn toy_members(
    labels: [Label; 4],
    probability: Option<f64>,
) -> [Box<dyn Classifier>; 4] {
    labels.map(|label| {
        Box::new(FixedClassifier::new(label, probability)) as Box<dyn Classifier>
    })
}

/// Ensemble of fixed labels with no probabilities.
pub(crate) fn toy_ensemble(labels: [Label; 4]) -> Ensemble {
    Ensemble::new(PerModel::new(toy_members(labels, None)))
}
