//! Combines per-model labels into one final label.
//!
//! - [`AggregationMode::Primary`]: the primary model decides.
//! - [`AggregationMode::Vote`]: the label with the strictly highest count
//!   across all four models wins. A 2–2 split falls back to the primary
//!   model's label, so ties never depend on iteration order.

use tracing::debug;

use crate::model::{AggregationMode, Label, ModelId, PerModel};

/// Aggregate per-model labels into the final label.
pub fn aggregate(labels: &PerModel<Label>, mode: AggregationMode, primary: ModelId) -> Label {
    match mode {
        AggregationMode::Primary => *labels.get(primary),
        AggregationMode::Vote => majority(labels, primary),
    }
}

fn majority(labels: &PerModel<Label>, primary: ModelId) -> Label {
    let real = labels.iter().filter(|(_, l)| **l == Label::Real).count();
    let fake = ModelId::COUNT - real;

    match real.cmp(&fake) {
        std::cmp::Ordering::Greater => Label::Real,
        std::cmp::Ordering::Less => Label::Fake,
        std::cmp::Ordering::Equal => {
            let label = *labels.get(primary);
            debug!(%primary, label = label.class(), "vote tied, primary model decides");
            label
        }
    }
}
