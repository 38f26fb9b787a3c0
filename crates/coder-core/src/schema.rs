//! Parsing and field-level repair of candidate blocks.
//!
//! Parsing is strict JSON, but shaping is tolerant: a mistyped field is
//! dropped and defaulted on its own instead of sinking the whole result.
//! List fields that come back empty are treated as absent.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::model::{Component, DocumentationBundle, Plan, BUNDLE_FIELDS};

/// Parse `candidate` as a JSON object.
pub fn parse_object(candidate: &str) -> Result<Map<String, Value>, SchemaError> {
    if candidate.trim().is_empty() {
        return Err(SchemaError::Empty);
    }
    match serde_json::from_str::<Value>(candidate)? {
        Value::Object(map) => Ok(map),
        other => Err(SchemaError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Top-level plan fields that can be individually defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanField {
    Components,
    SearchQueries,
}

impl PlanField {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanField::Components => "components",
            PlanField::SearchQueries => "search_queries",
        }
    }
}

impl fmt::Display for PlanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What [`repair_plan`] had to change to produce a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanRepair {
    /// Top-level fields that kept their default.
    pub defaulted: Vec<PlanField>,
    /// Entry-level corrections inside adopted fields, e.g. `components[1] dropped`.
    pub adjusted: Vec<String>,
}

impl PlanRepair {
    /// True when the model's plan was adopted without any substitution.
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty() && self.adjusted.is_empty()
    }

    /// Defaulted field names followed by entry-level corrections.
    pub fn notes(&self) -> Vec<String> {
        self.defaulted
            .iter()
            .map(PlanField::to_string)
            .chain(self.adjusted.iter().cloned())
            .collect()
    }
}

/// Shape `map` into a [`Plan`], starting from the requirement's fallback plan.
///
/// Absent optional keys (`description`, `priority`) default quietly; values
/// that are present but unusable are replaced and reported in the repair.
pub fn repair_plan(map: &Map<String, Value>, requirement: &str) -> (Plan, PlanRepair) {
    let mut plan = Plan::fallback(requirement);
    let mut repair = PlanRepair::default();

    match components_from(map.get("components")) {
        Some((components, notes)) => {
            plan.components = components;
            repair.adjusted.extend(notes);
        }
        None => repair.defaulted.push(PlanField::Components),
    }

    match search_queries_from(map.get("search_queries")) {
        Some((queries, notes)) => {
            plan.search_queries = queries;
            repair.adjusted.extend(notes);
        }
        None => repair.defaulted.push(PlanField::SearchQueries),
    }

    (plan, repair)
}

/// `None` when the list is absent, not a list, or has no usable entries.
fn components_from(value: Option<&Value>) -> Option<(Vec<Component>, Vec<String>)> {
    let items = value?.as_array()?;
    let mut components = Vec::new();
    let mut notes = Vec::new();
    for (position, item) in items.iter().enumerate() {
        match component_from(position, item, &mut notes) {
            Some(component) => components.push(component),
            None => notes.push(format!("components[{position}] dropped")),
        }
    }
    (!components.is_empty()).then_some((components, notes))
}

/// An entry needs an object with a non-blank string `name`; the rest is optional.
fn component_from(position: usize, item: &Value, notes: &mut Vec<String>) -> Option<Component> {
    let obj = item.as_object()?;
    let name = obj.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let description = match obj.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => {
            notes.push(format!("components[{position}].description"));
            String::new()
        }
    };

    let by_position = position as i64 + 1;
    let priority = match obj.get("priority") {
        None | Some(Value::Null) => by_position,
        Some(raw) => priority_from(raw).unwrap_or_else(|| {
            notes.push(format!("components[{position}].priority"));
            by_position
        }),
    };

    Some(Component {
        name: name.to_string(),
        description,
        priority,
    })
}

/// Integer priority; integral floats such as `2.0` count as integers.
fn priority_from(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn search_queries_from(value: Option<&Value>) -> Option<(Vec<String>, Vec<String>)> {
    let items = value?.as_array()?;
    let mut queries = Vec::new();
    let mut notes = Vec::new();
    for (position, item) in items.iter().enumerate() {
        match item.as_str().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => queries.push(query.to_string()),
            None => notes.push(format!("search_queries[{position}] dropped")),
        }
    }
    (!queries.is_empty()).then_some((queries, notes))
}

/// Accept any mapping as a [`DocumentationBundle`].
///
/// Strings are copied, `null` and missing keys become empty strings, other
/// values are kept as compact JSON text, unknown keys land in `extra`.
/// Returns the bundle and the names of the fields that were missing.
pub fn bundle_from_map(mut map: Map<String, Value>) -> (DocumentationBundle, Vec<&'static str>) {
    let mut bundle = DocumentationBundle::empty();
    let mut missing = Vec::new();

    for field in BUNDLE_FIELDS {
        let text = match map.remove(field) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => {
                missing.push(field);
                continue;
            }
            Some(other) => other.to_string(),
        };
        if let Some(slot) = bundle.field_mut(field) {
            *slot = text;
        }
    }

    bundle.extra = map.into_iter().collect();
    (bundle, missing)
}
