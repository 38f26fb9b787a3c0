//! Chat completion client
//!
//! Sends a single user message to an OpenAI-compatible endpoint and returns
//! the text of the first choice. No retries; callers decide what a failure means.

use crate::config::{GatewayConfig, DEFAULT_BASE_URL};
use crate::error::GatewayError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for chat completion calls
pub struct ChatClient {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl ChatClient {
    /// Create a new chat client
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("coder-llm-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(ChatClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env())
    }

    /// Active configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send `prompt` as a single user message and return the reply text.
    ///
    /// A reply with no content yields an empty string rather than an error.
    /// The hosted default endpoint is refused up front when no key is set.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        if self.config.api_key.is_none() && self.config.base_url == DEFAULT_BASE_URL {
            return Err(GatewayError::MissingApiKey);
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut request = self
            .http_client
            .post(self.config.completions_url())
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending chat completion");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "chat completion rejected");
            return Err(GatewayError::status(status.as_u16(), &body));
        }

        let text = response.text().await?;
        parse_completion(&text)
    }
}

/// Pull the first choice's content out of a chat completion body.
fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::UnexpectedResponse("no choices in response".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"a\":1}"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_parse_completion_null_content_is_empty() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "");
    }

    #[test]
    fn test_parse_completion_without_choices_fails() {
        let err = parse_completion(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, GatewayError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_parse_completion_rejects_non_json() {
        let err = parse_completion("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, GatewayError::Json(_)));
    }

    #[test]
    fn test_request_serializes_single_user_message() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.2,
            max_tokens: 16,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
        assert_eq!(value["max_tokens"], 16);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_gracefully() {
        // Port 9 (discard) is closed on test hosts; the call must error, not panic.
        let config = GatewayConfig::new("http://127.0.0.1:9/v1", "m").with_timeout_secs(2);
        let client = ChatClient::new(config).unwrap();
        let result = client.complete("hello").await;
        assert!(matches!(result, Err(GatewayError::Http(_))));
    }

    #[tokio::test]
    async fn test_default_endpoint_without_key_is_refused() {
        let config = GatewayConfig::new(DEFAULT_BASE_URL, "m");
        let client = ChatClient::new(config).unwrap();
        let result = client.complete("hello").await;
        assert!(matches!(result, Err(GatewayError::MissingApiKey)));
    }
}
