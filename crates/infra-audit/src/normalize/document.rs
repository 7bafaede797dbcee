//! Cleaning of whole documents before a generic diff.
//!
//! Task definitions and gateway exports carry fields that change on every
//! deploy or differ by stage. Presets strip them so only configuration
//! drift remains.

use crate::node::{ConfigNode, Mapping};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task definition fields rewritten by every registration
pub const TASK_DEFINITION_VOLATILE_FIELDS: &[&str] = &[
    "taskDefinitionArn",
    "revision",
    "status",
    "registeredAt",
    "registeredBy",
    "compatibilities",
    "requiresAttributes",
    "tags",
];

/// Container lists compared by variable name rather than position
const NAMED_CONTAINER_LISTS: &[&str] = &["environment", "secrets"];

/// Gateway export fields that differ per stage
pub const GATEWAY_VOLATILE_FIELDS: &[&str] = &["servers"];

/// Cleaning applied to both documents before `infra-audit diff`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentPreset {
    /// ECS task definition
    Ecs,
    /// API Gateway OpenAPI export
    Gateway,
}

impl DocumentPreset {
    pub fn apply(&self, document: &ConfigNode) -> ConfigNode {
        match self {
            DocumentPreset::Ecs => clean_task_definition(document),
            DocumentPreset::Gateway => clean_gateway_export(document),
        }
    }
}

impl FromStr for DocumentPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecs" => Ok(DocumentPreset::Ecs),
            "gateway" => Ok(DocumentPreset::Gateway),
            other => Err(format!("unknown preset '{}' (expected ecs or gateway)", other)),
        }
    }
}

impl fmt::Display for DocumentPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentPreset::Ecs => "ecs",
            DocumentPreset::Gateway => "gateway",
        })
    }
}

/// Strip registration metadata and sort container variables by name
///
/// A `describe-task-definition` response is cleaned inside its
/// `taskDefinition` wrapper.
pub fn clean_task_definition(document: &ConfigNode) -> ConfigNode {
    let mut cleaned = document.clone();

    let target = match &mut cleaned {
        ConfigNode::Mapping(root) if root.contains_key("taskDefinition") => {
            root.get_mut("taskDefinition")
        }
        other => Some(other),
    };

    if let Some(ConfigNode::Mapping(definition)) = target {
        remove_fields(definition, TASK_DEFINITION_VOLATILE_FIELDS);

        if let Some(ConfigNode::Sequence(containers)) = definition.get_mut("containerDefinitions") {
            for container in containers.iter_mut() {
                if let ConfigNode::Mapping(container) = container {
                    sort_named_lists(container);
                }
            }
        }
    }

    cleaned
}

/// Strip stage-specific server entries
pub fn clean_gateway_export(document: &ConfigNode) -> ConfigNode {
    let mut cleaned = document.clone();
    if let ConfigNode::Mapping(root) = &mut cleaned {
        remove_fields(root, GATEWAY_VOLATILE_FIELDS);
    }
    cleaned
}

fn remove_fields(mapping: &mut Mapping, fields: &[&str]) {
    for field in fields {
        if mapping.remove(field).is_some() {
            debug!("Removed volatile field {}", field);
        }
    }
}

fn sort_named_lists(container: &mut Mapping) {
    for list in NAMED_CONTAINER_LISTS {
        if let Some(ConfigNode::Sequence(items)) = container.get_mut(list) {
            items.sort_by(|a, b| name_of(a).cmp(name_of(b)));
        }
    }
}

fn name_of(item: &ConfigNode) -> &str {
    item.get("name").and_then(ConfigNode::as_str).unwrap_or("")
}
