//! Plan pipeline: default floor, repair and fallback behaviour.

mod common;

use std::sync::Arc;

use coder_core::{
    Component, FallbackReason, Plan, Planner, Provenance, Severity,
};
use common::{config, sink, FailingGenerator, ScriptedGenerator};

const REQUIREMENT: &str = "Add invoice export to CSV";

fn default_plan() -> Plan {
    Plan {
        components: vec![Component {
            name: "main_module".to_string(),
            description: REQUIREMENT.to_string(),
            priority: 1,
        }],
        search_queries: vec![REQUIREMENT.to_string()],
    }
}

#[tokio::test]
async fn empty_response_yields_default_plan() {
    let events = sink();
    let planner = Planner::new(ScriptedGenerator::new(""), events.clone(), config());

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.value, default_plan());
    assert_eq!(outcome.fallback_reason(), Some(&FallbackReason::EmptyResponse));
}

#[tokio::test]
async fn unreachable_generator_yields_default_plan() {
    let events = sink();
    let planner = Planner::new(Arc::new(FailingGenerator), events.clone(), config());

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.value, default_plan());
    assert!(matches!(
        outcome.fallback_reason(),
        Some(FallbackReason::Unreachable { error }) if error.contains("connection refused")
    ));
    assert!(events.names().contains(&"collaborator.failed"));
    assert_eq!(events.max_severity(), Some(Severity::Error));
}

#[tokio::test]
async fn fenced_response_is_adopted() {
    let reply = "```json\n{\"components\": [{\"name\": \"exporter\", \"description\": \"write rows\", \"priority\": 1}, {\"name\": \"cli\", \"description\": \"flag parsing\", \"priority\": 2}], \"search_queries\": [\"csv writer\", \"invoice model\"]}\n```";
    let planner = Planner::new(ScriptedGenerator::new(reply), sink(), config());

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.provenance, Provenance::Model);
    assert_eq!(outcome.value.components.len(), 2);
    assert_eq!(outcome.value.components[0].name, "exporter");
    assert_eq!(outcome.value.components[1].priority, 2);
    assert_eq!(outcome.value.search_queries, vec!["csv writer", "invoice model"]);
}

#[tokio::test]
async fn empty_search_queries_keep_default_while_components_are_adopted() {
    let reply = r#"Here you go: {"components": [{"name": "exporter", "description": "write rows", "priority": 1}], "search_queries": []}"#;
    let events = sink();
    let planner = Planner::new(ScriptedGenerator::new(reply), events.clone(), config());

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.value.components[0].name, "exporter");
    assert_eq!(outcome.value.search_queries, vec![REQUIREMENT.to_string()]);
    assert_eq!(
        outcome.provenance,
        Provenance::Repaired {
            defaulted: vec!["search_queries".to_string()]
        }
    );
    assert!(events.names().contains(&"response.fields_defaulted"));
}

#[tokio::test]
async fn dropped_component_entry_is_reported_as_repair() {
    let reply = r#"{"components": [{"name": "exporter", "description": "write rows", "priority": 1}, {"description": "nameless"}], "search_queries": ["csv writer"]}"#;
    let events = sink();
    let planner = Planner::new(ScriptedGenerator::new(reply), events.clone(), config());

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.value.components.len(), 1);
    assert_eq!(outcome.value.components[0].name, "exporter");
    assert_eq!(
        outcome.provenance,
        Provenance::Repaired {
            defaulted: vec!["components[1] dropped".to_string()]
        }
    );
    assert!(outcome.is_degraded());
    assert!(events.names().contains(&"response.fields_defaulted"));
}

#[tokio::test]
async fn unusable_priority_is_reported_and_integral_float_kept() {
    let reply = r#"{"components": [{"name": "a", "description": "first", "priority": 2.0}, {"name": "b", "description": "second", "priority": "3"}], "search_queries": ["x"]}"#;
    let planner = Planner::new(ScriptedGenerator::new(reply), sink(), config());

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(
        outcome.value.components,
        vec![
            Component {
                name: "a".to_string(),
                description: "first".to_string(),
                priority: 2,
            },
            Component {
                name: "b".to_string(),
                description: "second".to_string(),
                priority: 2,
            },
        ]
    );
    assert_eq!(
        outcome.provenance,
        Provenance::Repaired {
            defaulted: vec!["components[1].priority".to_string()]
        }
    );
}

#[tokio::test]
async fn integral_float_priorities_alone_stay_a_model_answer() {
    let reply = r#"{"components": [{"name": "a", "description": "first", "priority": 3.0}], "search_queries": ["x"]}"#;
    let planner = Planner::new(ScriptedGenerator::new(reply), sink(), config());

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.provenance, Provenance::Model);
    assert_eq!(outcome.value.components[0].priority, 3);
}

#[tokio::test]
async fn unparseable_response_logs_info_and_falls_back() {
    let events = sink();
    let planner = Planner::new(
        ScriptedGenerator::new("I'm sorry, I can't produce a plan for that."),
        events.clone(),
        config(),
    );

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.value, default_plan());
    assert!(matches!(
        outcome.fallback_reason(),
        Some(FallbackReason::Malformed { .. })
    ));
    let parse_failed: Vec<_> = events
        .events()
        .into_iter()
        .filter(|e| e.kind.name() == "response.parse_failed")
        .collect();
    assert_eq!(parse_failed.len(), 1);
    assert_eq!(parse_failed[0].severity, Severity::Info);
    assert_eq!(events.max_severity(), Some(Severity::Info));
}

#[tokio::test]
async fn parse_failure_preview_is_bounded() {
    let long_reply = format!("{{ broken {}", "x".repeat(1000));
    let events = sink();
    let planner = Planner::new(
        ScriptedGenerator::new(long_reply),
        events.clone(),
        config().with_preview_char_limit(50),
    );

    planner.plan(REQUIREMENT, "rust-service").await;

    let preview = events
        .events()
        .into_iter()
        .find_map(|e| match e.kind {
            coder_core::EventKind::ParseFailed { preview, .. } => Some(preview),
            _ => None,
        })
        .expect("parse failure recorded");
    assert_eq!(preview.chars().count(), 50);
}

#[tokio::test]
async fn object_without_usable_fields_falls_back() {
    let planner = Planner::new(
        ScriptedGenerator::new(r#"{"plan": "do it"}"#),
        sink(),
        config(),
    );

    let outcome = planner.plan(REQUIREMENT, "rust-service").await;

    assert_eq!(outcome.value, default_plan());
    assert!(outcome.is_fallback());
}

#[tokio::test]
async fn prompt_carries_requirement_and_project_type() {
    let generator = ScriptedGenerator::new("{}");
    let planner = Planner::new(generator.clone(), sink(), config());

    planner.plan(REQUIREMENT, "rust-service").await;

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("PROJECT_TYPE: rust-service"));
    assert!(prompts[0].contains(REQUIREMENT));
}

#[tokio::test]
async fn empty_requirement_still_yields_plan() {
    let planner = Planner::new(Arc::new(FailingGenerator), sink(), config());

    let outcome = planner.plan("", "").await;

    assert_eq!(outcome.value.components.len(), 1);
    assert_eq!(outcome.value.components[0].description, "");
    assert_eq!(outcome.value.search_queries, vec![String::new()]);
}
