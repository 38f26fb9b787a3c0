//! One handle over the three pipelines.
//!
//! [`CoderAgent`] owns the collaborators and event sink and builds a
//! pipeline per call. [`CoderAgent::run`] chains them for a single
//! requirement: plan and exemplar selection run concurrently, then the
//! documentation call sees the selected exemplars.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collaborator::{RelevanceRanker, TextGenerator};
use crate::config::PipelineConfig;
use crate::docs::{DocRequest, Documenter};
use crate::exemplar::ExemplarSelector;
use crate::model::{CodeSection, DocumentationBundle, Exemplar, Plan};
use crate::obs::{EventSink, TracingSink};
use crate::outcome::Outcome;
use crate::plan::Planner;
use crate::ranking::KeywordRanker;

/// Everything produced by [`CoderAgent::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub plan: Outcome<Plan>,
    pub exemplars: Outcome<Vec<Exemplar>>,
    pub documentation: Outcome<DocumentationBundle>,
}

impl RunReport {
    /// True if any stage fell short of a clean model answer.
    pub fn is_degraded(&self) -> bool {
        self.plan.is_degraded() || self.exemplars.is_degraded() || self.documentation.is_degraded()
    }
}

/// Inputs for [`CoderAgent::run`].
#[derive(Debug, Clone, Default)]
pub struct RunInput {
    pub requirement: String,
    pub project_type: String,
    pub code: String,
    pub sections: Vec<CodeSection>,
    pub tribal_knowledge: Map<String, Value>,
}

/// Facade over planning, exemplar selection and documentation.
#[derive(Clone)]
pub struct CoderAgent {
    generator: Arc<dyn TextGenerator>,
    ranker: Arc<dyn RelevanceRanker>,
    sink: Arc<dyn EventSink>,
    config: PipelineConfig,
}

impl CoderAgent {
    /// Agent with the keyword ranker, tracing sink and default limits.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            ranker: Arc::new(KeywordRanker::new()),
            sink: Arc::new(TracingSink),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_ranker(mut self, ranker: Arc<dyn RelevanceRanker>) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn planner(&self) -> Planner {
        Planner::new(
            Arc::clone(&self.generator),
            Arc::clone(&self.sink),
            self.config.clone(),
        )
    }

    pub fn selector(&self) -> ExemplarSelector {
        ExemplarSelector::new(
            Arc::clone(&self.ranker),
            Arc::clone(&self.sink),
            self.config.clone(),
        )
    }

    pub fn documenter(&self) -> Documenter {
        Documenter::new(
            Arc::clone(&self.generator),
            Arc::clone(&self.sink),
            self.config.clone(),
        )
    }

    pub async fn plan(&self, requirement: &str, project_type: &str) -> Outcome<Plan> {
        self.planner().plan(requirement, project_type).await
    }

    pub async fn select_exemplars(
        &self,
        requirement: &str,
        sections: &[CodeSection],
        max_count: usize,
    ) -> Outcome<Vec<Exemplar>> {
        self.selector()
            .select_with_limit(requirement, sections, max_count)
            .await
    }

    pub async fn document(&self, request: &DocRequest) -> Outcome<DocumentationBundle> {
        self.documenter().document(request).await
    }

    /// Plan, select exemplars, then document with those exemplars.
    pub async fn run(&self, input: RunInput) -> RunReport {
        let planner = self.planner();
        let selector = self.selector();
        let (plan, exemplars) = tokio::join!(
            planner.plan(&input.requirement, &input.project_type),
            selector.select(&input.requirement, &input.sections),
        );

        let request = DocRequest::new(input.requirement, input.project_type)
            .with_code(input.code)
            .with_exemplars(exemplars.value.clone())
            .with_tribal_knowledge(input.tribal_knowledge);
        let documentation = self.documenter().document(&request).await;

        RunReport {
            plan,
            exemplars,
            documentation,
        }
    }
}
