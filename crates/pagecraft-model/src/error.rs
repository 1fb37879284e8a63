use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),
    #[error("expected a JSON object for block input, found {0}")]
    NotAnObject(&'static str),
}

pub type Result<T> = std::result::Result<T, ModelError>;
