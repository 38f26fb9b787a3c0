//! Deterministic collaborator stubs shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use coder_core::{
    CodeSection, CollaboratorError, MemorySink, PipelineConfig, RelevanceRanker, TextGenerator,
};
use serde_json::Value;

/// Always answers with the same text and remembers the prompts it saw.
pub struct ScriptedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Simulates an unreachable provider.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "connection refused".to_string(),
        ))
    }
}

/// Returns a fixed ranking result and counts calls.
pub struct FixedRanker {
    result: Value,
    calls: AtomicUsize,
}

impl FixedRanker {
    pub fn new(result: Value) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceRanker for FixedRanker {
    async fn rank(
        &self,
        _query: &str,
        _candidates: &[CodeSection],
    ) -> Result<Value, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

/// Ranker whose backend is down.
pub struct FailingRanker;

#[async_trait]
impl RelevanceRanker for FailingRanker {
    async fn rank(
        &self,
        _query: &str,
        _candidates: &[CodeSection],
    ) -> Result<Value, CollaboratorError> {
        Err(CollaboratorError::Provider("search index offline".to_string()))
    }
}

pub fn sections(n: usize) -> Vec<CodeSection> {
    (0..n)
        .map(|i| {
            CodeSection::new(
                "billing-service",
                format!("module_{i}.rs"),
                format!("section_{i}"),
                format!("description of section {i}"),
            )
        })
        .collect()
}

pub fn sink() -> Arc<MemorySink> {
    Arc::new(MemorySink::new())
}

pub fn config() -> PipelineConfig {
    PipelineConfig::default()
}
