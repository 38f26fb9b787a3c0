//! Call-scoped data produced and consumed by the pipelines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name given to the single component of the default plan.
pub const DEFAULT_COMPONENT_NAME: &str = "main_module";

/// One unit of a work-breakdown plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub description: String,
    pub priority: i64,
}

/// Work breakdown produced from a requirement.
///
/// Never empty: [`Plan::fallback`] is the floor value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub components: Vec<Component>,
    pub search_queries: Vec<String>,
}

impl Plan {
    /// Single-component plan whose description and search hint are the requirement.
    pub fn fallback(requirement: &str) -> Self {
        Self {
            components: vec![Component {
                name: DEFAULT_COMPONENT_NAME.to_string(),
                description: requirement.to_string(),
                priority: 1,
            }],
            search_queries: vec![requirement.to_string()],
        }
    }
}

/// A section of an existing artifact offered as candidate context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSection {
    #[serde(default)]
    pub artifact_name: String,
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub description: String,
}

impl CodeSection {
    pub fn new(
        artifact_name: impl Into<String>,
        document_name: impl Into<String>,
        section_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            artifact_name: artifact_name.into(),
            document_name: document_name.into(),
            section_name: section_name.into(),
            description: description.into(),
        }
    }
}

/// A [`CodeSection`] picked as reference context, tagged with its input position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemplar {
    pub index: usize,
    pub artifact_name: String,
    pub document_name: String,
    pub section_name: String,
    pub description: String,
}

impl Exemplar {
    pub fn from_section(index: usize, section: &CodeSection) -> Self {
        Self {
            index,
            artifact_name: section.artifact_name.clone(),
            document_name: section.document_name.clone(),
            section_name: section.section_name.clone(),
            description: section.description.clone(),
        }
    }
}

/// The five documentation fields every bundle carries.
pub const BUNDLE_FIELDS: [&str; 5] = [
    "readme",
    "api_docs",
    "inline_docs",
    "usage_examples",
    "installation_instructions",
];

/// Generated documentation. All fields are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationBundle {
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub api_docs: String,
    #[serde(default)]
    pub inline_docs: String,
    #[serde(default)]
    pub usage_examples: String,
    #[serde(default)]
    pub installation_instructions: String,
    /// Keys the model returned beyond the five fields, kept verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DocumentationBundle {
    /// All five fields empty.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.readme.is_empty()
            && self.api_docs.is_empty()
            && self.inline_docs.is_empty()
            && self.usage_examples.is_empty()
            && self.installation_instructions.is_empty()
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "readme" => Some(&mut self.readme),
            "api_docs" => Some(&mut self.api_docs),
            "inline_docs" => Some(&mut self.inline_docs),
            "usage_examples" => Some(&mut self.usage_examples),
            "installation_instructions" => Some(&mut self.installation_instructions),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_fallback_uses_requirement() {
        let plan = Plan::fallback("build a CLI");
        assert_eq!(plan.components.len(), 1);
        assert_eq!(plan.components[0].name, "main_module");
        assert_eq!(plan.components[0].description, "build a CLI");
        assert_eq!(plan.components[0].priority, 1);
        assert_eq!(plan.search_queries, vec!["build a CLI".to_string()]);
    }

    #[test]
    fn test_code_section_deserializes_with_missing_fields() {
        let section: CodeSection =
            serde_json::from_str(r#"{"section_name": "parse_args"}"#).unwrap();
        assert_eq!(section.section_name, "parse_args");
        assert!(section.artifact_name.is_empty());
    }

    #[test]
    fn test_empty_bundle_serializes_all_five_keys() {
        let json = serde_json::to_value(DocumentationBundle::empty()).unwrap();
        let obj = json.as_object().unwrap();
        for field in BUNDLE_FIELDS {
            assert_eq!(obj[field], "");
        }
        assert!(!obj.contains_key("extra"));
    }

    #[test]
    fn test_field_mut_covers_every_bundle_field() {
        let mut bundle = DocumentationBundle::empty();
        for field in BUNDLE_FIELDS {
            assert!(bundle.field_mut(field).is_some());
        }
        assert!(bundle.field_mut("changelog").is_none());
    }
}
