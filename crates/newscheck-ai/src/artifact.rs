//! On-disk artifact formats.
//!
//! The artifact directory holds one vectorizer and four classifiers, each a
//! JSON export of a fitted scikit-learn estimator:
//!
//! | file                 | contents                         |
//! |----------------------|----------------------------------|
//! | `vectorizer.json`    | `TfidfVectorizer` vocabulary/IDF |
//! | `logistic.json`      | `LR` model                       |
//! | `decisiontree.json`  | `DT` model                       |
//! | `gradientboost.json` | `GB` model                       |
//! | `randomforest.json`  | `RF` model                       |
//!
//! Every file carries a `format_version`; files written for another version
//! are rejected before the rest of the document is parsed.

use std::collections::HashMap;
use std::path::Path;

use newscheck_core::ModelId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Artifact format version this build reads.
pub const FORMAT_VERSION: u32 = 1;

pub const VECTORIZER_FILE: &str = "vectorizer.json";

/// File name of the artifact for one ensemble member.
pub fn model_file(id: ModelId) -> &'static str {
    match id {
        ModelId::Lr => "logistic.json",
        ModelId::Dt => "decisiontree.json",
        ModelId::Gb => "gradientboost.json",
        ModelId::Rf => "randomforest.json",
    }
}

/// Row normalisation applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
    None,
}

/// Fitted `TfidfVectorizer` state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    pub format_version: u32,
    /// Term → column index.
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column. Absent when fit with `use_idf=False`.
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Inclusive word n-gram range `(min_n, max_n)`.
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// A fitted binary classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Number of input features the model was fit on.
    pub n_features: usize,
    /// Class values in column order. Only `[0, 1]` is supported.
    #[serde(default = "default_classes")]
    pub classes: Vec<u8>,
    #[serde(flatten)]
    pub spec: ModelSpec,
}

fn default_classes() -> Vec<u8> {
    vec![0, 1]
}

/// Estimator-specific parameters, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression(LinearSpec),
    /// Linear SVM: same decision function, no probability output.
    LinearSvc(LinearSpec),
    DecisionTree(TreeSpec),
    RandomForest {
        trees: Vec<TreeSpec>,
    },
    GradientBoosting {
        /// Raw score of the prior (log-odds of class 1).
        init: f64,
        learning_rate: f64,
        /// Regression trees, one per boosting stage.
        trees: Vec<TreeSpec>,
    },
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::LinearSvc(_) => "linear_svc",
            Self::DecisionTree(_) => "decision_tree",
            Self::RandomForest { .. } => "random_forest",
            Self::GradientBoosting { .. } => "gradient_boosting",
        }
    }
}

/// Weights of a linear decision function `coef · x + intercept`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSpec {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

/// Flattened scikit-learn `tree_` arrays, one entry per node.
///
/// `children_left[i] == -1` marks a leaf. `value[i]` holds the per-class
/// weights for classification trees (`[w0, w1]`) and the single predicted
/// value for regression trees (`[v]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct Header {
    format_version: u32,
}

/// Read a versioned JSON artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_err = |source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let header: Header = serde_json::from_str(&raw).map_err(parse_err)?;
    if header.format_version != FORMAT_VERSION {
        return Err(LoadError::Version {
            path: path.to_path_buf(),
            found: header.format_version,
            expected: FORMAT_VERSION,
        });
    }

    serde_json::from_str(&raw).map_err(parse_err)
}
