use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid brush configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("Preset parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> Self {
        err.to_string()
    }
}
