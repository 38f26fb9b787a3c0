//! LLM-Gateway: chat completion backend for coder-agent
//!
//! A thin client for OpenAI-compatible `/chat/completions` endpoints.
//! It knows nothing about plans or documentation; it turns a prompt into
//! reply text or a [`GatewayError`].

pub mod client;
pub mod config;
pub mod error;

pub use client::ChatClient;
pub use config::{GatewayConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{GatewayError, STATUS_BODY_LIMIT};

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
