use thiserror::Error;

/// Request rejected before any model is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Provide 'news' (or 'text') in JSON body")]
    EmptyText,

    #[error("unknown aggregation mode '{0}' (expected PRIMARY or VOTE)")]
    UnknownMode(String),

    #[error("unknown model id '{0}' (expected LR, DT, GB or RF)")]
    UnknownModel(String),
}
