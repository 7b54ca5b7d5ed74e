pub mod aggregate;
pub mod error;
pub mod model;
pub mod request;
pub mod text;

pub use aggregate::aggregate;
pub use error::ValidationError;
pub use model::{AggregationMode, Label, ModelId, PerModel};
pub use request::{
    ErrorResponse, ModelPrediction, PredictRequest, PredictResponse, PredictionResult,
    RawPredictRequest,
};
pub use text::normalize;
