//! Work-breakdown planning.
//!
//! Asks the model to split a requirement into components plus search hints,
//! then repairs whatever comes back. The requirement's fallback plan is the
//! floor: a missing or broken field keeps its default, and nothing here
//! ever fails.

use std::sync::Arc;

use tracing::Instrument;

use crate::collaborator::{generate_observed, TextGenerator};
use crate::config::PipelineConfig;
use crate::extract::{extract, preview};
use crate::model::Plan;
use crate::obs::{call_span, EventKind, EventSink, Pipeline, PipelineEvent, Severity};
use crate::outcome::{FallbackReason, Outcome};
use crate::schema::{parse_object, repair_plan};

/// Deterministic planning prompt for `requirement` within `project_type`.
pub fn plan_prompt(requirement: &str, project_type: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a senior software architect helping another agent generate code.\n");
    prompt.push_str(
        "Break the requirement below into a small set of concrete code components, \
         and suggest search queries for finding related existing code.\n\n",
    );
    prompt.push_str("Respond with a single JSON object and nothing else (no prose, no markdown):\n");
    prompt.push_str("{\n");
    prompt.push_str("  \"components\": [\n");
    prompt.push_str("    {\"name\": \"...\", \"description\": \"...\", \"priority\": 1}\n");
    prompt.push_str("  ],\n");
    prompt.push_str("  \"search_queries\": [\"...\", \"...\"]\n");
    prompt.push_str("}\n\n");
    prompt.push_str(&format!("PROJECT_TYPE: {project_type}\n"));
    prompt.push_str(&format!("REQUIREMENTS:\n{requirement}\n"));
    prompt
}

/// Plan pipeline.
pub struct Planner {
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
}

impl Planner {
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

    /// Produce a plan for `requirement`. Always returns a usable plan.
    pub async fn plan(&self, requirement: &str, project_type: &str) -> Outcome<Plan> {
        async {
            let outcome = self.plan_inner(requirement, project_type).await;
            self.emit(
                Severity::Debug,
                EventKind::Completed {
                    degraded: outcome.is_degraded(),
                },
            );
            outcome
        }
        .instrument(call_span(Pipeline::Plan))
        .await
    }

    async fn plan_inner(&self, requirement: &str, project_type: &str) -> Outcome<Plan> {
        let prompt = plan_prompt(requirement, project_type);

        let raw = match generate_observed(
            self.generator.as_ref(),
            self.sink.as_ref(),
            Pipeline::Plan,
            &prompt,
        )
        .await
        {
            Ok(raw) => raw,
            Err(err) => {
                return Outcome::fallback(
                    Plan::fallback(requirement),
                    FallbackReason::Unreachable {
                        error: err.to_string(),
                    },
                );
            }
        };

        if raw.trim().is_empty() {
            return Outcome::fallback(Plan::fallback(requirement), FallbackReason::EmptyResponse);
        }

        let map = match parse_object(&extract(&raw)) {
            Ok(map) => map,
            Err(err) => {
                // Expected model variance.
                self.emit(
                    Severity::Info,
                    EventKind::ParseFailed {
                        error: err.to_string(),
                        preview: preview(&raw, self.config.preview_char_limit).to_string(),
                    },
                );
                return Outcome::fallback(
                    Plan::fallback(requirement),
                    FallbackReason::Malformed {
                        error: err.to_string(),
                    },
                );
            }
        };

        let (plan, repair) = repair_plan(&map, requirement);
        if repair.is_clean() {
            return Outcome::model(plan);
        }

        let notes = repair.notes();
        self.emit(
            Severity::Info,
            EventKind::FieldsDefaulted {
                fields: notes.clone(),
            },
        );

        if repair.defaulted.len() == 2 {
            return Outcome::fallback(
                plan,
                FallbackReason::Malformed {
                    error: "no usable components or search_queries".to_string(),
                },
            );
        }
        Outcome::repaired(plan, notes)
    }

    fn emit(&self, severity: Severity, kind: EventKind) {
        self.sink
            .record(PipelineEvent::new(Pipeline::Plan, severity, kind));
    }
}
