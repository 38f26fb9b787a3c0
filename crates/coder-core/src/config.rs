//! Pipeline tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Limits applied by the pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Default cap on exemplars returned by the selector.
    pub max_exemplars: usize,
    /// Exemplars rendered into the documentation prompt.
    pub prompt_exemplar_limit: usize,
    /// Characters of serialized tribal knowledge kept in the prompt.
    pub knowledge_char_limit: usize,
    /// Characters of raw model text allowed into a log line.
    pub preview_char_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_exemplars: 3,
            prompt_exemplar_limit: 3,
            knowledge_char_limit: 2000,
            preview_char_limit: 200,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `CODER_MAX_EXEMPLARS`, `CODER_KNOWLEDGE_LIMIT`
    /// and `CODER_PREVIEW_LIMIT` when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = env_usize("CODER_MAX_EXEMPLARS")? {
            config.max_exemplars = v;
        }
        if let Some(v) = env_usize("CODER_KNOWLEDGE_LIMIT")? {
            config.knowledge_char_limit = v;
        }
        if let Some(v) = env_usize("CODER_PREVIEW_LIMIT")? {
            config.preview_char_limit = v;
        }
        Ok(config)
    }

    pub fn with_max_exemplars(mut self, n: usize) -> Self {
        self.max_exemplars = n;
        self
    }

    pub fn with_prompt_exemplar_limit(mut self, n: usize) -> Self {
        self.prompt_exemplar_limit = n;
        self
    }

    pub fn with_knowledge_char_limit(mut self, n: usize) -> Self {
        self.knowledge_char_limit = n;
        self
    }

    pub fn with_preview_char_limit(mut self, n: usize) -> Self {
        self.preview_char_limit = n;
        self
    }
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(raw) => parse_usize(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::InvalidConfig(format!("{key} must be a non-negative integer, got {raw:?}")))
}
