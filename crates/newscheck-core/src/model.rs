//! Ensemble member identifiers, class labels, and aggregation modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the four ensemble members.
///
/// Ordering follows [`ModelId::ALL`], which is also the order models appear
/// in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelId {
    /// Logistic regression.
    Lr,
    /// Decision tree.
    Dt,
    /// Gradient boosting.
    Gb,
    /// Random forest.
    Rf,
}

impl ModelId {
    pub const COUNT: usize = 4;
    pub const ALL: [ModelId; Self::COUNT] = [Self::Lr, Self::Dt, Self::Gb, Self::Rf];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lr => "LR",
            Self::Dt => "DT",
            Self::Gb => "GB",
            Self::Rf => "RF",
        }
    }

    /// Position of this model in [`ModelId::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::Lr => 0,
            Self::Dt => 1,
            Self::Gb => 2,
            Self::Rf => 3,
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownModel(s.to_string()))
    }
}

/// Binary class label. Class 0 is fake, class 1 is not fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Label {
    Fake,
    Real,
}

impl Label {
    /// Numeric class value used by the fitted models.
    pub fn class(&self) -> u8 {
        match self {
            Self::Fake => 0,
            Self::Real => 1,
        }
    }

    /// Human-readable label used in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fake => "Fake News",
            Self::Real => "Not A Fake News",
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.class()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(class: u8) -> Result<Self, Self::Error> {
        match class {
            0 => Ok(Self::Fake),
            1 => Ok(Self::Real),
            other => Err(format!("class must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the four per-model labels are combined into the final label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationMode {
    /// The primary model's label is final.
    #[default]
    Primary,
    /// The most frequent label across all four models is final.
    Vote,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY",
            Self::Vote => "VOTE",
        }
    }

    /// Parse a mode string, also accepting the primary model's id as an
    /// alias for [`AggregationMode::Primary`] (older clients send `"LR"`).
    pub fn parse_with_alias(s: &str, primary: ModelId) -> Result<Self, ValidationError> {
        match s.parse() {
            Ok(mode) => Ok(mode),
            Err(_) if s.trim().eq_ignore_ascii_case(primary.as_str()) => Ok(Self::Primary),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("PRIMARY") {
            Ok(Self::Primary)
        } else if trimmed.eq_ignore_ascii_case("VOTE") {
            Ok(Self::Vote)
        } else {
            Err(ValidationError::UnknownMode(s.to_string()))
        }
    }
}

/// One value per ensemble member, indexed by [`ModelId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerModel<T>([T; ModelId::COUNT]);

impl<T> PerModel<T> {
    pub fn new(values: [T; ModelId::COUNT]) -> Self {
        Self(values)
    }

    /// Build a value for every model, called in [`ModelId::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(ModelId) -> T) -> Self {
        Self(std::array::from_fn(|i| f(ModelId::ALL[i])))
    }

    /// Like [`PerModel::from_fn`], stopping at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(ModelId) -> Result<T, E>) -> Result<Self, E> {
        let values = ModelId::ALL
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<T>, E>>()?;
        match <[T; ModelId::COUNT]>::try_from(values) {
            Ok(values) => Ok(Self(values)),
            Err(_) => unreachable!("one value per model"),
        }
    }

    pub fn get(&self, id: ModelId) -> &T {
        &self.0[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &T)> {
        ModelId::ALL.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(ModelId, &T) -> U) -> PerModel<U> {
        PerModel::from_fn(|id| f(id, self.get(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_round_trips_through_str() {
        for id in ModelId::ALL {
            assert_eq!(id.as_str().parse::<ModelId>().unwrap(), id);
            assert_eq!(ModelId::ALL[id.index()], id);
        }
        assert_eq!("rf".parse::<ModelId>().unwrap(), ModelId::Rf);
        assert!("SVM".parse::<ModelId>().is_err());
    }

    #[test]
    fn label_classes() {
        assert_eq!(Label::Fake.class(), 0);
        assert_eq!(Label::Real.class(), 1);
        assert_eq!(Label::try_from(1).unwrap(), Label::Real);
        assert!(Label::try_from(2).is_err());
        assert_eq!(Label::Fake.as_str(), "Fake News");
        assert_eq!(Label::Real.as_str(), "Not A Fake News");
    }

    #[test]
    fn label_serialises_as_class_number() {
        assert_eq!(serde_json::to_string(&Label::Real).unwrap(), "1");
        let parsed: Label = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, Label::Fake);
        assert!(serde_json::from_str::<Label>("7").is_err());
    }

    #[test]
    fn mode_parsing_is_case_insensitive() {
        assert_eq!("vote".parse::<AggregationMode>().unwrap(), AggregationMode::Vote);
        assert_eq!(" Primary ".parse::<AggregationMode>().unwrap(), AggregationMode::Primary);
        assert_eq!(
            "majority".parse::<AggregationMode>(),
            Err(ValidationError::UnknownMode("majority".into()))
        );
    }

    #[test]
    fn primary_id_is_a_mode_alias() {
        assert_eq!(
            AggregationMode::parse_with_alias("lr", ModelId::Lr).unwrap(),
            AggregationMode::Primary
        );
        assert_eq!(
            AggregationMode::parse_with_alias("VOTE", ModelId::Lr).unwrap(),
            AggregationMode::Vote
        );
        // Only the configured primary is an alias.
        assert!(AggregationMode::parse_with_alias("RF", ModelId::Lr).is_err());
    }

    #[test]
    fn per_model_indexing() {
        let values = PerModel::from_fn(|id| id.index() * 10);
        assert_eq!(*values.get(ModelId::Gb), 20);
        let order: Vec<ModelId> = values.iter().map(|(id, _)| id).collect();
        assert_eq!(order, ModelId::ALL.to_vec());
        let doubled = values.map(|_, v| v * 2);
        assert_eq!(*doubled.get(ModelId::Rf), 60);
    }

    #[test]
    fn per_model_try_from_fn_stops_at_first_error() {
        let mut visited = Vec::new();
        let result: Result<PerModel<u8>, ModelId> = PerModel::try_from_fn(|id| {
            visited.push(id);
            if id == ModelId::Gb { Err(id) } else { Ok(1) }
        });
        assert_eq!(result, Err(ModelId::Gb));
        assert_eq!(visited, vec![ModelId::Lr, ModelId::Dt, ModelId::Gb]);

        let ok: Result<PerModel<usize>, ()> = PerModel::try_from_fn(|id| Ok(id.index()));
        assert_eq!(*ok.unwrap().get(ModelId::Dt), 1);
    }
}
