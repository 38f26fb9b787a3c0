//! In-process relevance ranking over code sections.
//!
//! [`KeywordRanker`] is the ranker used when no remote search service is
//! wired in. It scores each section by keyword overlap with the query and
//! answers in the same JSON shape a search service would.

use async_trait::async_trait;
use serde_json::json;

use crate::collaborator::RelevanceRanker;
use crate::error::CollaboratorError;
use crate::model::CodeSection;

/// Keyword-overlap ranker.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRanker;

impl KeywordRanker {
    pub fn new() -> Self {
        Self
    }

    /// Index and score of the best section; ties keep the earliest.
    pub fn best_match(&self, query: &str, candidates: &[CodeSection]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, section) in candidates.iter().enumerate() {
            let score = keyword_score(query, section);
            if score <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }
        best
    }
}

#[async_trait]
impl RelevanceRanker for KeywordRanker {
    async fn rank(
        &self,
        query: &str,
        candidates: &[CodeSection],
    ) -> Result<serde_json::Value, CollaboratorError> {
        Ok(match self.best_match(query, candidates) {
            Some((idx, score)) => json!({ "chosen_section_index": idx, "score": score }),
            None => json!({ "chosen_section_index": null }),
        })
    }
}

/// Fraction of query words found in the section's names and description.
fn keyword_score(query: &str, section: &CodeSection) -> f64 {
    let words: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| w.len() > 2)
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let haystack = format!(
        "{} {} {} {}",
        section.artifact_name, section.document_name, section.section_name, section.description
    )
    .to_lowercase();
    let matched = words.iter().filter(|w| haystack.contains(w.as_str())).count();
    matched as f64 / words.len() as f64
}
