//! Tree ensembles: single decision tree, random forest, gradient boosting.

use newscheck_core::Label;

use super::{Classifier, sigmoid};
use crate::artifact::TreeSpec;
use crate::error::InferenceError;
use crate::vectorizer::FeatureVector;

#[derive(Debug, Clone, Copy)]
enum LeafKind {
    /// Leaf holds `[w0, w1]`; stored as the class-1 fraction.
    Classification,
    /// Leaf holds `[v]`; stored as is.
    Regression,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A single binary tree compiled from scikit-learn's flat node arrays.
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_spec(spec: &TreeSpec, n_features: usize, leaf_kind: LeafKind) -> Result<Self, String> {
        let n = spec.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if spec.children_right.len() != n
            || spec.feature.len() != n
            || spec.threshold.len() != n
            || spec.value.len() != n
        {
            return Err("tree node arrays differ in length".into());
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (spec.children_left[i], spec.children_right[i]);
            if left == -1 {
                if right != -1 {
                    return Err(format!("node {i}: leaf with a right child"));
                }
                nodes.push(Node::Leaf(leaf_value(&spec.value[i], leaf_kind, i)?));
                continue;
            }

            // Children always come after their parent, which also rules out cycles.
            let child = |c: i64| -> Result<usize, String> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| format!("node {i}: child index {c} out of range"))
            };
            let feature = usize::try_from(spec.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| format!("node {i}: feature {} out of range", spec.feature[i]))?;
            let threshold = spec.threshold[i];
            if threshold.is_nan() {
                return Err(format!("node {i}: threshold is NaN"));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    /// Leaf value reached by `x`.
    fn evaluate(&self, x: &FeatureVector) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // Trees were fit on float32 features.
                    let value = x.get(feature) as f32 as f64;
                    i = if value <= threshold { left } else { right };
                }
                Node::Leaf(value) => return value,
            }
        }
    }
}

fn leaf_value(value: &[f64], kind: LeafKind, node: usize) -> Result<f64, String> {
    match (kind, value) {
        (LeafKind::Classification, &[w0, w1]) => {
            let total = w0 + w1;
            if !(w0 >= 0.0 && w1 >= 0.0 && total > 0.0 && total.is_finite()) {
                return Err(format!("node {node}: invalid class weights [{w0}, {w1}]"));
            }
            Ok(w1 / total)
        }
        (LeafKind::Regression, &[v]) if v.is_finite() => Ok(v),
        _ => Err(format!("node {node}: unexpected leaf value {value:?}")),
    }
}

fn label_from_probability(p: f64) -> Label {
    if p > 0.5 { Label::Real } else { Label::Fake }
}

/// Single classification tree. Leaf class fractions give the probability.
pub struct DecisionTree {
    tree: Tree,
    n_features: usize,
}

impl DecisionTree {
    pub fn new(spec: &TreeSpec, n_features: usize) -> Result<Self, String> {
        Ok(Self {
            tree: Tree::from_spec(spec, n_features, LeafKind::Classification)?,
            n_features,
        })
    }
}

impl Classifier for DecisionTree {
    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &FeatureVector) -> Label {
        label_from_probability(self.tree.evaluate(x))
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<f64, InferenceError> {
        Ok(self.tree.evaluate(x))
    }
}

/// Averages the leaf class fractions of its trees.
pub struct RandomForest {
    trees: Vec<Tree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(specs: &[TreeSpec], n_features: usize) -> Result<Self, String> {
        if specs.is_empty() {
            return Err("random forest has no trees".into());
        }
        let trees = specs
            .iter()
            .enumerate()
            .map(|(t, spec)| {
                Tree::from_spec(spec, n_features, LeafKind::Classification)
                    .map_err(|e| format!("tree {t}: {e}"))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { trees, n_features })
    }

    fn mean_probability(&self, x: &FeatureVector) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(x)).sum();
        sum / self.trees.len() as f64
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &FeatureVector) -> Label {
        label_from_probability(self.mean_probability(x))
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<f64, InferenceError> {
        Ok(self.mean_probability(x))
    }
}

/// Binary gradient boosting with log-loss: additive regression trees over
/// a prior log-odds score.
pub struct GradientBoosting {
    init: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
    n_features: usize,
}

impl GradientBoosting {
    pub fn new(
        init: f64,
        learning_rate: f64,
        specs: &[TreeSpec],
        n_features: usize,
    ) -> Result<Self, String> {
        if !init.is_finite() || !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(format!(
                "invalid boosting parameters init={init} learning_rate={learning_rate}"
            ));
        }
        let trees = specs
            .iter()
            .enumerate()
            .map(|(t, spec)| {
                Tree::from_spec(spec, n_features, LeafKind::Regression)
                    .map_err(|e| format!("stage {t}: {e}"))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            init,
            learning_rate,
            trees,
            n_features,
        })
    }

    /// Raw log-odds score of class 1.
    pub fn decision(&self, x: &FeatureVector) -> f64 {
        let stages: f64 = self.trees.iter().map(|t| t.evaluate(x)).sum();
        self.init + self.learning_rate * stages
    }
}

impl Classifier for GradientBoosting {
    fn kind(&self) -> &'static str {
        "gradient_boosting"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &FeatureVector) -> Label {
        label_from_probability(sigmoid(self.decision(x)))
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<f64, InferenceError> {
        Ok(sigmoid(self.decision(x)))
    }
}
