//! Error taxonomy for the coder pipelines.
//!
//! None of these escape a pipeline entry point; they are caught, logged and
//! folded into an [`Outcome`](crate::outcome::Outcome).

/// Failure reported by an external collaborator (generator or ranker).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("provider error: {0}")]
    Provider(String),
}

/// Failure to turn a candidate block into a structured value.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("candidate block is empty")]
    Empty,

    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Errors surfaced by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for fallible core helpers.
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<llm_gateway::GatewayError> for CollaboratorError {
    fn from(err: llm_gateway::GatewayError) -> Self {
        match err {
            llm_gateway::GatewayError::Http(msg) => CollaboratorError::Unavailable(msg),
            err @ llm_gateway::GatewayError::MissingApiKey => {
                CollaboratorError::Unavailable(err.to_string())
            }
            other => CollaboratorError::Provider(other.to_string()),
        }
    }
}
