//! Documentation bundle generation.
//!
//! Shape checking here is looser than for plans: any JSON object the model
//! returns is accepted, and whatever the five documentation fields lack is
//! left empty. An unreachable generator or an unreadable reply yields the
//! all-empty bundle.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::Instrument;

use crate::collaborator::{generate_observed, TextGenerator};
use crate::config::PipelineConfig;
use crate::extract::{extract, preview};
use crate::model::{DocumentationBundle, Exemplar};
use crate::obs::{call_span, EventKind, EventSink, Pipeline, PipelineEvent, Severity};
use crate::outcome::{FallbackReason, Outcome};
use crate::schema::{bundle_from_map, parse_object};

/// Inputs for one documentation call.
#[derive(Debug, Clone, Default)]
pub struct DocRequest {
    pub requirement: String,
    pub project_type: String,
    /// Code to document; empty when there is none.
    pub code: String,
    pub exemplars: Vec<Exemplar>,
    /// Opaque knowledge-base mapping, summarised into the prompt.
    pub tribal_knowledge: Map<String, Value>,
}

impl DocRequest {
    pub fn new(requirement: impl Into<String>, project_type: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            project_type: project_type.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_exemplars(mut self, exemplars: Vec<Exemplar>) -> Self {
        self.exemplars = exemplars;
        self
    }

    pub fn with_tribal_knowledge(mut self, knowledge: Map<String, Value>) -> Self {
        self.tribal_knowledge = knowledge;
        self
    }
}

/// Render up to `limit` exemplars as `# Exemplar:` blocks.
pub fn render_exemplars(exemplars: &[Exemplar], limit: usize) -> String {
    exemplars
        .iter()
        .take(limit)
        .map(|ex| format!("# Exemplar: {}\n{}\n", ex.section_name, ex.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-printed knowledge, cut to `limit` characters.
///
/// Falls back to the debug rendering if serialization fails.
pub fn summarize_knowledge(knowledge: &Map<String, Value>, limit: usize) -> String {
    let full = serde_json::to_string_pretty(knowledge).unwrap_or_else(|_| format!("{knowledge:?}"));
    preview(&full, limit).to_string()
}

/// Deterministic documentation prompt; sections appear only for inputs present.
pub fn document_prompt(request: &DocRequest, config: &PipelineConfig) -> String {
    let mut parts: Vec<String> = vec![
        "You are a technical writer. Generate comprehensive documentation.".to_string(),
        String::new(),
        format!("PROJECT_TYPE: {}", request.project_type),
        String::new(),
        "REQUIREMENT:".to_string(),
        request.requirement.clone(),
    ];

    if !request.code.is_empty() {
        parts.extend([String::new(), "CODE TO DOCUMENT:".to_string(), request.code.clone()]);
    }

    let exemplars = render_exemplars(&request.exemplars, config.prompt_exemplar_limit);
    if !exemplars.is_empty() {
        parts.extend([String::new(), "DOCUMENTATION EXEMPLARS:".to_string(), exemplars]);
    }

    if !request.tribal_knowledge.is_empty() {
        let summary = summarize_knowledge(&request.tribal_knowledge, config.knowledge_char_limit);
        parts.extend([String::new(), "TRIBAL KNOWLEDGE:".to_string(), summary]);
    }

    parts.extend(
        [
            "",
            "Generate documentation including:",
            "- README with setup and usage",
            "- API documentation",
            "- Inline code comments",
            "- Usage examples",
            "- Installation instructions",
            "",
            "Return a single JSON object with exactly these string fields and nothing else:",
            "{",
            "  \"readme\": \"...\",",
            "  \"api_docs\": \"...\",",
            "  \"inline_docs\": \"...\",",
            "  \"usage_examples\": \"...\",",
            "  \"installation_instructions\": \"...\"",
            "}",
        ]
        .map(str::to_string),
    );

    parts.join("\n")
}

/// Documentation pipeline.
pub struct Documenter {
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
}

impl Documenter {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        sink: Arc<dyn EventSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            sink,
            config,
        }
    }

    /// Generate a documentation bundle. Always returns all five fields.
    pub async fn document(&self, request: &DocRequest) -> Outcome<DocumentationBundle> {
        async {
            let outcome = self.document_inner(request).await;
            self.emit(
                Severity::Debug,
                EventKind::Completed {
                    degraded: outcome.is_degraded(),
                },
            );
            outcome
        }
        .instrument(call_span(Pipeline::Documentation))
        .await
    }

    async fn document_inner(&self, request: &DocRequest) -> Outcome<DocumentationBundle> {
        let prompt = document_prompt(request, &self.config);

        let raw = match generate_observed(
            self.generator.as_ref(),
            self.sink.as_ref(),
            Pipeline::Documentation,
            &prompt,
        )
        .await
        {
            Ok(raw) => raw,
            Err(err) => {
                return Outcome::fallback(
                    DocumentationBundle::empty(),
                    FallbackReason::Unreachable {
                        error: err.to_string(),
                    },
                );
            }
        };

        if raw.trim().is_empty() {
            self.emit(
                Severity::Warn,
                EventKind::ParseFailed {
                    error: "empty response".to_string(),
                    preview: String::new(),
                },
            );
            return Outcome::fallback(DocumentationBundle::empty(), FallbackReason::EmptyResponse);
        }

        match parse_object(&extract(&raw)) {
            Ok(map) => {
                let (bundle, missing) = bundle_from_map(map);
                if !missing.is_empty() {
                    self.emit(
                        Severity::Debug,
                        EventKind::FieldsDefaulted {
                            fields: missing.iter().map(|f| f.to_string()).collect(),
                        },
                    );
                }
                Outcome::repaired(bundle, missing.into_iter().map(str::to_string).collect())
            }
            Err(err) => {
                self.emit(
                    Severity::Warn,
                    EventKind::ParseFailed {
                        error: err.to_string(),
                        preview: preview(&raw, self.config.preview_char_limit).to_string(),
                    },
                );
                Outcome::fallback(
                    DocumentationBundle::empty(),
                    FallbackReason::Malformed {
                        error: err.to_string(),
                    },
                )
            }
        }
    }

    fn emit(&self, severity: Severity, kind: EventKind) {
        self.sink
            .record(PipelineEvent::new(Pipeline::Documentation, severity, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exemplar(index: usize, name: &str) -> Exemplar {
        Exemplar {
            index,
            artifact_name: "svc".to_string(),
            document_name: "lib.rs".to_string(),
            section_name: name.to_string(),
            description: format!("about {name}"),
        }
    }

    #[test]
    fn test_render_exemplars_caps_and_formats() {
        let exemplars: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, n)| exemplar(i, n))
            .collect();
        let text = render_exemplars(&exemplars, 3);
        assert_eq!(
            text,
            "# Exemplar: a\nabout a\n\n# Exemplar: b\nabout b\n\n# Exemplar: c\nabout c\n"
        );
    }

    #[test]
    fn test_summarize_knowledge_truncates() {
        let mut knowledge = Map::new();
        knowledge.insert("conventions".to_string(), json!("x".repeat(5000)));
        let summary = summarize_knowledge(&knowledge, 2000);
        assert_eq!(summary.chars().count(), 2000);
        assert!(summary.starts_with("{\n  \"conventions\""));
    }

    #[test]
    fn test_prompt_omits_absent_sections() {
        let prompt = document_prompt(&DocRequest::new("a CLI", "rust"), &PipelineConfig::default());
        assert!(prompt.contains("PROJECT_TYPE: rust"));
        assert!(prompt.contains("REQUIREMENT:\na CLI"));
        assert!(!prompt.contains("CODE TO DOCUMENT:"));
        assert!(!prompt.contains("DOCUMENTATION EXEMPLARS:"));
        assert!(!prompt.contains("TRIBAL KNOWLEDGE:"));
        assert!(prompt.contains("\"installation_instructions\""));
    }

    #[test]
    fn test_prompt_includes_optional_sections() {
        let mut knowledge = Map::new();
        knowledge.insert("style".to_string(), json!("terse"));
        let request = DocRequest::new("a CLI", "rust")
            .with_code("fn main() {}")
            .with_exemplars(vec![exemplar(0, "parse_args")])
            .with_tribal_knowledge(knowledge);
        let prompt = document_prompt(&request, &PipelineConfig::default());
        assert!(prompt.contains("CODE TO DOCUMENT:\nfn main() {}"));
        assert!(prompt.contains("DOCUMENTATION EXEMPLARS:\n# Exemplar: parse_args\nabout parse_args"));
        assert!(prompt.contains("TRIBAL KNOWLEDGE:\n{\n  \"style\": \"terse\"\n}"));
    }
}
