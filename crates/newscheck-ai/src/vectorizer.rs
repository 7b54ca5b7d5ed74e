//! TF-IDF vectorisation under a fitted vocabulary.
//!
//! Reproduces scikit-learn's `TfidfVectorizer.transform` for word analysers:
//! tokens are maximal runs of two or more word characters (letters, digits,
//! underscore), stop words are dropped before n-grams are formed, and terms
//! outside the vocabulary are ignored.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::artifact::{self, Norm, VectorizerArtifact};
use crate::error::LoadError;

// Leftmost-greedy matching of the class only ever starts at the beginning of
// a run, so each match is a whole run.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]{2,}").expect("token regex"));

/// Sparse feature vector with entries sorted by column index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build from `(index, value)` pairs. Pairs are sorted; duplicates are summed.
    pub fn from_entries(dim: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (index, value) in entries {
            debug_assert!(index < dim, "feature index {index} out of range {dim}");
            *merged.entry(index).or_insert(0.0) += value;
        }
        Self {
            dim,
            entries: merged.into_iter().collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Non-zero entries in ascending index order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `index`, zero when absent.
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Dot product with a dense weight vector.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(i, v)| weights.get(i).map(|w| w * v))
            .sum()
    }
}

/// Fitted TF-IDF vectorizer. Immutable after construction.
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    norm: Norm,
}

impl TfidfVectorizer {
    /// Build from a parsed artifact, checking it is internally consistent.
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, String> {
        let dim = artifact.vocabulary.len();
        if dim == 0 {
            return Err("vocabulary is empty".into());
        }

        let mut seen = vec![false; dim];
        for (term, &index) in &artifact.vocabulary {
            if index >= dim {
                return Err(format!("term {term:?} has index {index}, vocabulary size is {dim}"));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(format!("index {index} assigned to more than one term"));
            }
        }

        if let Some(idf) = &artifact.idf {
            if idf.len() != dim {
                return Err(format!("idf has {} entries, vocabulary has {dim}", idf.len()));
            }
            if let Some(pos) = idf.iter().position(|v| !v.is_finite()) {
                return Err(format!("idf[{pos}] is not finite"));
            }
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    /// Load `vectorizer.json` from an artifact file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let artifact: VectorizerArtifact = artifact::read_artifact(path)?;
        let vectorizer = Self::from_artifact(artifact).map_err(|reason| LoadError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })?;

        info!(
            dim = vectorizer.dim(),
            ngram_range = ?vectorizer.ngram_range,
            idf = vectorizer.idf.is_some(),
            path = %path.display(),
            "loaded vectorizer"
        );
        Ok(vectorizer)
    }

    /// Number of feature columns.
    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    /// Map normalised text to its TF-IDF feature vector.
    pub fn vectorize(&self, text: &str) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                let weight = match &self.idf {
                    Some(idf) => tf * idf[index],
                    None => tf,
                };
                (index, weight)
            })
            .collect();

        let norm = match self.norm {
            Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if norm > 0.0 {
            for (_, v) in &mut entries {
                *v /= norm;
            }
        }

        FeatureVector {
            dim: self.dim(),
            entries,
        }
    }

    /// Tokens and n-grams in document order, before the vocabulary lookup.
    fn terms(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = TOKEN_RE
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}
