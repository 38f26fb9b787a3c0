//! Capability interfaces for the external services the pipelines depend on.
//!
//! Pipelines receive these as `Arc<dyn …>` so tests can substitute
//! deterministic stubs.

use async_trait::async_trait;
use llm_gateway::ChatClient;

use crate::error::CollaboratorError;
use crate::model::CodeSection;
use crate::obs::{prompt_fingerprint, EventKind, EventSink, Pipeline, PipelineEvent, Severity};

/// Maps a prompt to free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

/// Picks the section most relevant to a query.
///
/// The result is expected to carry an integer `chosen_section_index`, but
/// callers must tolerate any JSON shape.
#[async_trait]
pub trait RelevanceRanker: Send + Sync {
    async fn rank(
        &self,
        query: &str,
        candidates: &[CodeSection],
    ) -> Result<serde_json::Value, CollaboratorError>;
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        Ok(self.complete(prompt).await?)
    }
}

/// Call `generator`, reporting the prompt fingerprint and the result to `sink`.
///
/// Failures are recorded at error severity and handed back to the caller,
/// which decides the fallback.
pub(crate) async fn generate_observed(
    generator: &dyn TextGenerator,
    sink: &dyn EventSink,
    pipeline: Pipeline,
    prompt: &str,
) -> Result<String, CollaboratorError> {
    sink.record(PipelineEvent::new(
        pipeline,
        Severity::Debug,
        EventKind::PromptBuilt {
            fingerprint: prompt_fingerprint(prompt),
            chars: prompt.chars().count(),
        },
    ));

    match generator.generate(prompt).await {
        Ok(raw) => {
            sink.record(PipelineEvent::new(
                pipeline,
                Severity::Debug,
                EventKind::ResponseReceived {
                    chars: raw.chars().count(),
                },
            ));
            Ok(raw)
        }
        Err(err) => {
            sink.record(PipelineEvent::new(
                pipeline,
                Severity::Error,
                EventKind::CollaboratorFailed {
                    error: err.to_string(),
                },
            ));
            Err(err)
        }
    }
}
