//! The four-member classifier ensemble.

use std::path::Path;

use newscheck_core::{ModelId, ModelPrediction, PerModel};
use tracing::debug;

use crate::artifact;
use crate::error::LoadError;
use crate::models::{self, Classifier};
use crate::vectorizer::FeatureVector;

/// `LR`, `DT`, `GB` and `RF`, each consuming the same feature vector.
pub struct Ensemble {
    members: PerModel<Box<dyn Classifier>>,
}

impl Ensemble {
    pub fn new(members: PerModel<Box<dyn Classifier>>) -> Self {
        Self { members }
    }

    /// Load all four classifier artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let members = PerModel::try_from_fn(|id| models::load(&dir.join(artifact::model_file(id))))?;
        Ok(Self { members })
    }

    pub fn member(&self, id: ModelId) -> &dyn Classifier {
        self.members.get(id).as_ref()
    }

    /// Estimator kind of each member.
    pub fn kinds(&self) -> PerModel<&'static str> {
        self.members.map(|_, m| m.kind())
    }

    /// Run every member on `x`.
    ///
    /// A member that cannot produce a probability reports it as `None`.
    pub fn predict_all(&self, x: &FeatureVector) -> PerModel<ModelPrediction> {
        self.members.map(|id, model| {
            let label = model.predict(x);
            let probability = match model.predict_proba(x) {
                Ok(p) => Some(p),
                Err(e) => {
                    debug!(model = %id, error = %e, "probability unavailable");
                    None
                }
            };
            ModelPrediction { label, probability }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::LinearSpec;
    use crate::models::LinearModel;
    use crate::testing::{FixedClassifier, toy_members};
    use newscheck_core::Label::{self, Fake, Real};

    fn linear(coef: [f64; 3], probabilistic: bool) -> Box<dyn Classifier> {
        let spec = LinearSpec {
            coef: coef.to_vec(),
            intercept: 0.0,
        };
        let model = if probabilistic {
            LinearModel::logistic(spec, 3)
        } else {
            LinearModel::svc(spec, 3)
        };
        Box::new(model.unwrap())
    }

    fn fixed(label: Label, probability: Option<f64>) -> Box<dyn Classifier> {
        Box::new(FixedClassifier::new(label, probability))
    }

    #[test]
    fn predict_all_runs_every_member() {
        let members = toy_members([Real, Fake, Fake, Real], Some(0.4));
        let ensemble = Ensemble::new(PerModel::new(members));
        let x = FeatureVector::from_entries(3, [(0, 1.0)]);
        let out = ensemble.predict_all(&x);

        assert_eq!(out.get(ModelId::Lr).label, Real);
        assert_eq!(out.get(ModelId::Dt).label, Fake);
        assert_eq!(out.get(ModelId::Gb).label, Fake);
        assert_eq!(out.get(ModelId::Rf).label, Real);
        assert!(out.iter().all(|(_, p)| p.probability == Some(0.4)));
    }

    #[test]
    fn missing_probability_degrades_to_none() {
        let ensemble = Ensemble::new(PerModel::new([
            linear([1.0, 0.0, 0.0], false),
            linear([1.0, 0.0, 0.0], true),
            fixed(Fake, None),
            fixed(Real, Some(0.9)),
        ]));
        let x = FeatureVector::from_entries(3, [(0, 2.0)]);
        let out = ensemble.predict_all(&x);

        assert_eq!(out.get(ModelId::Lr).label, Real);
        assert_eq!(out.get(ModelId::Lr).probability, None);
        assert!(out.get(ModelId::Dt).probability.unwrap() > 0.8);
        assert_eq!(out.get(ModelId::Gb).probability, None);
        assert_eq!(out.get(ModelId::Rf).probability, Some(0.9));
    }

    #[test]
    fn predictions_are_repeatable() {
        let ensemble = Ensemble::new(PerModel::new([
            linear([0.3, -1.2, 0.7], true),
            linear([1.1, 0.4, -0.2], true),
            linear([-0.5, 0.5, 0.5], false),
            linear([0.0, 2.0, -2.0], true),
        ]));
        let x = FeatureVector::from_entries(3, [(0, 0.2), (1, 0.5), (2, 0.84)]);
        let first = ensemble.predict_all(&x);
        for _ in 0..20 {
            let again = ensemble.predict_all(&x);
            for ((_, a), (_, b)) in first.iter().zip(again.iter()) {
                assert_eq!(a.label, b.label);
                assert_eq!(a.probability.map(f64::to_bits), b.probability.map(f64::to_bits));
            }
        }
    }

    #[test]
    fn kinds_reported_per_member() {
        let ensemble = Ensemble::new(PerModel::new([
            linear([1.0, 0.0, 0.0], true),
            linear([1.0, 0.0, 0.0], false),
            fixed(Fake, None),
            fixed(Fake, None),
        ]));
        let kinds = ensemble.kinds();
        assert_eq!(*kinds.get(ModelId::Lr), "logistic_regression");
        assert_eq!(*kinds.get(ModelId::Dt), "linear_svc");
        assert_eq!(ensemble.member(ModelId::Rf).kind(), "fixed");
    }
}
