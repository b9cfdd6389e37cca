//! Auto-fork errors

use forkline_model::EngineError;

/// Auto-fork failure
#[derive(Debug, thiserror::Error)]
pub enum AutoForkError {
    /// No template with this id
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// Recipe payload could not be decoded
    #[error("malformed recipe: {0}")]
    MalformedRecipe(#[from] serde_json::Error),
}

impl From<AutoForkError> for EngineError {
    fn from(err: AutoForkError) -> Self {
        match err {
            AutoForkError::UnknownTemplate(id) => Self::InvalidTemplate(id),
            AutoForkError::MalformedRecipe(e) => Self::MalformedRecipe(e.to_string()),
        }
    }
}
