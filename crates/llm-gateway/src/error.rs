//! Error types for llm-gateway

use thiserror::Error;

/// Characters of a rejected response body kept on [`GatewayError::Status`]
pub const STATUS_BODY_LIMIT: usize = 200;

/// Errors that can occur while talking to a chat completion endpoint
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No API key configured
    #[error("no API key configured (set CODER_LLM_API_KEY or OPENAI_API_KEY)")]
    MissingApiKey,

    /// Transport-level failure (connect, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success status
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected chat completion shape
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Non-success status, keeping at most [`STATUS_BODY_LIMIT`] characters of the body
    pub fn status(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(STATUS_BODY_LIMIT) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        GatewayError::Status { status, body }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Http(err.to_string())
    }
}
