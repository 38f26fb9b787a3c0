//! Coder Core Library
//!
//! Turns noisy generative-model replies into well-typed results:
//! - `plan`: work-breakdown plans with per-field repair
//! - `exemplar`: ranked exemplar windows over code sections
//! - `docs`: documentation bundles
//!
//! Every pipeline is total. Failures degrade to a safe default and are
//! visible through the returned [`Outcome`] and the injected [`EventSink`].

pub mod agent;
pub mod collaborator;
pub mod config;
pub mod docs;
pub mod error;
pub mod exemplar;
pub mod extract;
pub mod model;
pub mod obs;
pub mod outcome;
pub mod plan;
pub mod ranking;
pub mod schema;
pub mod telemetry;

pub use agent::{CoderAgent, RunInput, RunReport};
pub use collaborator::{RelevanceRanker, TextGenerator};
pub use config::PipelineConfig;
pub use docs::{document_prompt, DocRequest, Documenter};
pub use error::{CollaboratorError, CoreError, Result, SchemaError};
pub use exemplar::{chosen_index, neighbourhood, ExemplarSelector, SelectionIssue};
pub use extract::{extract, preview};
pub use model::{CodeSection, Component, DocumentationBundle, Exemplar, Plan};
pub use obs::{
    call_span, prompt_fingerprint, EventKind, EventSink, MemorySink, Pipeline, PipelineEvent,
    Severity, TracingSink,
};
pub use outcome::{FallbackReason, Outcome, Provenance};
pub use plan::{plan_prompt, Planner};
pub use ranking::KeywordRanker;
pub use schema::{bundle_from_map, parse_object, repair_plan, PlanField, PlanRepair};
pub use telemetry::init_tracing;

pub use llm_gateway::{ChatClient, GatewayConfig};
