use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    #[error("Index spec has no keys")]
    EmptyIndexKeys,

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),
}
