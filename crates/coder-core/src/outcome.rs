//! Total results with an explicit degradation marker.
//!
//! Every pipeline returns an [`Outcome`]: the value is always usable, and the
//! [`Provenance`] says whether it came from the model as-is, was partially
//! repaired, or is the safe default.

use serde::{Deserialize, Serialize};

/// Why a pipeline fell back to its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The collaborator call itself failed.
    Unreachable { error: String },
    /// The collaborator answered with nothing.
    EmptyResponse,
    /// A response arrived but no usable structure could be read from it.
    Malformed { error: String },
    /// The ranker's choice was missing, mistyped or out of range.
    InvalidSelection { detail: String },
}

/// Where an outcome's value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Provenance {
    /// Taken from the model response without substitutions.
    Model,
    /// Taken from the model response, with the named fields defaulted or
    /// corrected (`components[1] dropped`, `components[0].priority`).
    Repaired { defaulted: Vec<String> },
    /// The whole value is the default.
    Fallback { reason: FallbackReason },
}

/// A value that is always present, plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Outcome<T> {
    pub fn model(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Model,
        }
    }

    /// Collapses to [`Provenance::Model`] when nothing was defaulted.
    pub fn repaired(value: T, defaulted: Vec<String>) -> Self {
        if defaulted.is_empty() {
            return Self::model(value);
        }
        Self {
            value,
            provenance: Provenance::Repaired { defaulted },
        }
    }

    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback { reason },
        }
    }

    /// True unless the value came from the model untouched.
    pub fn is_degraded(&self) -> bool {
        !matches!(self.provenance, Provenance::Model)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.provenance, Provenance::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.provenance {
            Provenance::Fallback { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            provenance: self.provenance,
        }
    }
}
