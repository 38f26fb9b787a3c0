//! Structured observability for pipeline calls.
//!
//! Pipelines never log through global state directly; they report
//! [`PipelineEvent`]s to an injected [`EventSink`]:
//! - [`TracingSink`] forwards each event to `tracing` at its severity
//! - [`MemorySink`] keeps events in memory so tests can assert on them
//!
//! Each call also runs inside a [`call_span`] tagged with a fresh `call_id`.
//! Raw model text only ever appears as a bounded preview and prompts only as
//! a fingerprint.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

/// Which pipeline emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Plan,
    Exemplars,
    Documentation,
}

impl Pipeline {
    pub fn as_str(self) -> &'static str {
        match self {
            Pipeline::Plan => "plan",
            Pipeline::Exemplars => "exemplars",
            Pipeline::Documentation => "documentation",
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// What happened during a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PromptBuilt { fingerprint: String, chars: usize },
    ResponseReceived { chars: usize },
    CollaboratorFailed { error: String },
    ParseFailed { error: String, preview: String },
    FieldsDefaulted { fields: Vec<String> },
    SelectionMalformed { detail: String },
    SelectionCorrected { detail: String },
    Completed { degraded: bool },
}

impl EventKind {
    /// Stable dotted name used as the `event` field.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PromptBuilt { .. } => "prompt.built",
            EventKind::ResponseReceived { .. } => "response.received",
            EventKind::CollaboratorFailed { .. } => "collaborator.failed",
            EventKind::ParseFailed { .. } => "response.parse_failed",
            EventKind::FieldsDefaulted { .. } => "response.fields_defaulted",
            EventKind::SelectionMalformed { .. } => "selection.malformed",
            EventKind::SelectionCorrected { .. } => "selection.corrected",
            EventKind::Completed { .. } => "call.completed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::PromptBuilt { fingerprint, chars } => {
                write!(f, "prompt {fingerprint} ({chars} chars)")
            }
            EventKind::ResponseReceived { chars } => write!(f, "response of {chars} chars"),
            EventKind::CollaboratorFailed { error } => write!(f, "collaborator failed: {error}"),
            EventKind::ParseFailed { error, preview } => {
                write!(f, "unparseable response: {error}; preview={preview:?}")
            }
            EventKind::FieldsDefaulted { fields } => {
                write!(f, "defaulted fields: {}", fields.join(", "))
            }
            EventKind::SelectionMalformed { detail } => {
                write!(f, "malformed ranking result: {detail}")
            }
            EventKind::SelectionCorrected { detail } => write!(f, "selection corrected: {detail}"),
            EventKind::Completed { degraded } => write!(f, "completed (degraded={degraded})"),
        }
    }
}

/// One observation from a pipeline call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEvent {
    pub pipeline: Pipeline,
    pub severity: Severity,
    pub kind: EventKind,
}

impl PipelineEvent {
    pub fn new(pipeline: Pipeline, severity: Severity, kind: EventKind) -> Self {
        Self {
            pipeline,
            severity,
            kind,
        }
    }
}

/// Receiver for pipeline events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: PipelineEvent);
}

/// Forwards events to the current `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: PipelineEvent) {
        let name = event.kind.name();
        let pipeline = event.pipeline.as_str();
        match event.severity {
            Severity::Debug => debug!(event = name, pipeline, "{}", event.kind),
            Severity::Info => info!(event = name, pipeline, "{}", event.kind),
            Severity::Warn => warn!(event = name, pipeline, "{}", event.kind),
            Severity::Error => error!(event = name, pipeline, "{}", event.kind),
        }
    }
}

/// An event with the time it was recorded.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub at: DateTime<Utc>,
    pub event: PipelineEvent,
}

/// Collects events in memory, optionally forwarding them to `tracing` too.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RecordedEvent>>,
    forward: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forward every event to [`TracingSink`].
    pub fn forwarding() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            forward: true,
        }
    }

    pub fn recorded(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.recorded().into_iter().map(|r| r.event).collect()
    }

    /// Event names in recording order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.kind.name()).collect()
    }

    /// Highest severity recorded so far.
    pub fn max_severity(&self) -> Option<Severity> {
        self.events().iter().map(|e| e.severity).max()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: PipelineEvent) {
        if self.forward {
            TracingSink.record(event.clone());
        }
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedEvent {
                at: Utc::now(),
                event,
            });
    }
}

/// Span for a single pipeline call, tagged with a fresh `call_id`.
///
/// Attach with `tracing::Instrument::instrument` so it follows the future
/// across await points.
pub fn call_span(pipeline: Pipeline) -> tracing::Span {
    let call_id = uuid::Uuid::new_v4();
    tracing::info_span!("coder.call", pipeline = %pipeline, call_id = %call_id)
}

/// Short SHA-256 fingerprint of a prompt, logged instead of the prompt itself.
pub fn prompt_fingerprint(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(digest)[..12].to_string()
}
