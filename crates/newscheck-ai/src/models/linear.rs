//! Linear decision functions: logistic regression and linear SVM.

use newscheck_core::Label;

use super::{Classifier, sigmoid};
use crate::artifact::LinearSpec;
use crate::error::InferenceError;
use crate::vectorizer::FeatureVector;

/// `coef · x + intercept`, class 1 when positive.
///
/// Logistic regression maps the decision value through the sigmoid to get a
/// probability. A linear SVM has no calibrated probability.
pub struct LinearModel {
    coef: Vec<f64>,
    intercept: f64,
    probabilistic: bool,
}

impl LinearModel {
    pub fn logistic(spec: LinearSpec, n_features: usize) -> Result<Self, String> {
        Self::new(spec, n_features, true)
    }

    pub fn svc(spec: LinearSpec, n_features: usize) -> Result<Self, String> {
        Self::new(spec, n_features, false)
    }

    fn new(spec: LinearSpec, n_features: usize, probabilistic: bool) -> Result<Self, String> {
        if spec.coef.len() != n_features {
            return Err(format!(
                "coef has {} weights, n_features is {n_features}",
                spec.coef.len()
            ));
        }
        if !spec.intercept.is_finite() || spec.coef.iter().any(|w| !w.is_finite()) {
            return Err("non-finite weight".into());
        }
        Ok(Self {
            coef: spec.coef,
            intercept: spec.intercept,
            probabilistic,
        })
    }

    pub fn decision(&self, x: &FeatureVector) -> f64 {
        x.dot(&self.coef) + self.intercept
    }
}

impl Classifier for LinearModel {
    fn kind(&self) -> &'static str {
        if self.probabilistic {
            "logistic_regression"
        } else {
            "linear_svc"
        }
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict(&self, x: &FeatureVector) -> Label {
        if self.decision(x) > 0.0 {
            Label::Real
        } else {
            Label::Fake
        }
    }

    fn predict_proba(&self, x: &FeatureVector) -> Result<f64, InferenceError> {
        if !self.probabilistic {
            return Err(InferenceError::ProbabilityUnavailable { kind: self.kind() });
        }
        Ok(sigmoid(self.decision(x)))
    }
}
