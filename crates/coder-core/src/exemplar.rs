//! Exemplar selection around a ranked code section.
//!
//! The ranker picks one section; the selector then widens the window to the
//! chosen section's neighbours, nearest first, predecessor before successor.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::collaborator::RelevanceRanker;
use crate::config::PipelineConfig;
use crate::model::{CodeSection, Exemplar};
use crate::obs::{call_span, EventKind, EventSink, Pipeline, PipelineEvent, Severity};
use crate::outcome::{FallbackReason, Outcome};

/// Neighbour offsets relative to the chosen index, in acceptance order.
pub const NEIGHBOUR_OFFSETS: [isize; 4] = [-1, 1, -2, 2];

/// Why a ranking result could not be used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIssue {
    /// The result was not a JSON object.
    NotAnObject,
    /// No `chosen_section_index` key, or it was `null`.
    Missing,
    /// Present but not a non-negative integer.
    Mistyped(String),
    /// An integer outside `[0, len)`.
    OutOfRange { index: u64, len: usize },
}

impl std::fmt::Display for SelectionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionIssue::NotAnObject => f.write_str("ranking result is not an object"),
            SelectionIssue::Missing => f.write_str("chosen_section_index missing"),
            SelectionIssue::Mistyped(raw) => write!(f, "chosen_section_index is not an index: {raw}"),
            SelectionIssue::OutOfRange { index, len } => {
                write!(f, "chosen_section_index {index} outside 0..{len}")
            }
        }
    }
}

/// Read and bounds-check `chosen_section_index` from a ranking result.
pub fn chosen_index(result: &Value, len: usize) -> Result<usize, SelectionIssue> {
    let obj = result.as_object().ok_or(SelectionIssue::NotAnObject)?;
    let raw = match obj.get("chosen_section_index") {
        None | Some(Value::Null) => return Err(SelectionIssue::Missing),
        Some(raw) => raw,
    };
    let index = raw
        .as_u64()
        .ok_or_else(|| SelectionIssue::Mistyped(raw.to_string()))?;
    match usize::try_from(index) {
        Ok(idx) if idx < len => Ok(idx),
        _ => Err(SelectionIssue::OutOfRange { index, len }),
    }
}

/// Indices of the chosen section and its in-bounds neighbours, capped at `max_count`.
pub fn neighbourhood(chosen: usize, len: usize, max_count: usize) -> Vec<usize> {
    if max_count == 0 || chosen >= len {
        return Vec::new();
    }
    let mut indices = vec![chosen];
    for offset in NEIGHBOUR_OFFSETS {
        if indices.len() >= max_count {
            break;
        }
        if let Some(neighbour) = chosen.checked_add_signed(offset) {
            if neighbour < len {
                indices.push(neighbour);
            }
        }
    }
    indices
}

/// Exemplar selection pipeline.
pub struct ExemplarSelector {
    ranker: Arc<dyn RelevanceRanker>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
}

impl ExemplarSelector {
    pub fn new(
        ranker: Arc<dyn RelevanceRanker>,
        sink: Arc<dyn EventSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            ranker,
            sink,
            config,
        }
    }

    /// Select up to the configured number of exemplars.
    pub async fn select(
        &self,
        requirement: &str,
        sections: &[CodeSection],
    ) -> Outcome<Vec<Exemplar>> {
        self.select_with_limit(requirement, sections, self.config.max_exemplars)
            .await
    }

    /// Select up to `max_count` exemplars, front-loaded with the ranked choice.
    ///
    /// Empty input returns nothing without consulting the ranker. A zero limit
    /// is honoured strictly as well: the primary exemplar is not forced in, so
    /// the result never holds more than `max_count` entries.
    pub async fn select_with_limit(
        &self,
        requirement: &str,
        sections: &[CodeSection],
        max_count: usize,
    ) -> Outcome<Vec<Exemplar>> {
        async {
            let outcome = self.select_inner(requirement, sections, max_count).await;
            self.emit(
                Severity::Debug,
                EventKind::Completed {
                    degraded: outcome.is_degraded(),
                },
            );
            outcome
        }
        .instrument(call_span(Pipeline::Exemplars))
        .await
    }

    async fn select_inner(
        &self,
        requirement: &str,
        sections: &[CodeSection],
        max_count: usize,
    ) -> Outcome<Vec<Exemplar>> {
        if sections.is_empty() || max_count == 0 {
            return Outcome::model(Vec::new());
        }

        let (chosen, degraded) = match self.ranker.rank(requirement, sections).await {
            Ok(result) => match chosen_index(&result, sections.len()) {
                Ok(idx) => (idx, None),
                Err(issue) => {
                    let detail = issue.to_string();
                    let note = format!("{detail}; using first section");
                    if issue == SelectionIssue::NotAnObject {
                        self.emit(Severity::Warn, EventKind::SelectionMalformed { detail: note });
                    } else {
                        self.emit(Severity::Info, EventKind::SelectionCorrected { detail: note });
                    }
                    (0, Some(FallbackReason::InvalidSelection { detail }))
                }
            },
            Err(err) => {
                self.emit(
                    Severity::Warn,
                    EventKind::SelectionMalformed {
                        detail: format!("ranker failed: {err}; using first section"),
                    },
                );
                (
                    0,
                    Some(FallbackReason::Unreachable {
                        error: err.to_string(),
                    }),
                )
            }
        };

        let exemplars = neighbourhood(chosen, sections.len(), max_count)
            .into_iter()
            .map(|idx| Exemplar::from_section(idx, &sections[idx]))
            .collect();

        match degraded {
            Some(reason) => Outcome::fallback(exemplars, reason),
            None => Outcome::model(exemplars),
        }
    }

    fn emit(&self, severity: Severity, kind: EventKind) {
        self.sink
            .record(PipelineEvent::new(Pipeline::Exemplars, severity, kind));
    }
}
