//! API Gateway integration projection.
//!
//! Extracts the integration fields most often responsible for drift so the
//! engine sees the same shape on both sides, even for partial exports.

use crate::node::{ConfigNode, Mapping};
use crate::utils::config::{DEFAULT_INTEGRATION_FALLBACK_KEY, DEFAULT_INTEGRATION_KEY};
use serde::{Deserialize, Serialize};

/// Scalar fields projected from an integration block (absent → null)
pub const INTEGRATION_SCALAR_FIELDS: &[&str] = &[
    "type",
    "uri",
    "httpMethod",
    "timeoutInMillis",
    "connectionType",
    "credentials",
    "passthroughBehavior",
    "contentHandling",
];

/// Mapping fields projected from an integration block (absent → `{}`)
pub const INTEGRATION_MAPPING_FIELDS: &[&str] = &["requestParameters", "requestTemplates"];

/// Where to find the integration block inside a method definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRules {
    /// Key of the integration block in OpenAPI exports
    pub integration_key: String,

    /// Key tried when the primary one is absent (get-method shaped dumps)
    pub fallback_key: Option<String>,
}

impl Default for IntegrationRules {
    fn default() -> Self {
        Self {
            integration_key: DEFAULT_INTEGRATION_KEY.to_string(),
            fallback_key: Some(DEFAULT_INTEGRATION_FALLBACK_KEY.to_string()),
        }
    }
}

impl IntegrationRules {
    fn find<'a>(&self, method_block: &'a ConfigNode) -> Option<&'a Mapping> {
        method_block
            .get(&self.integration_key)
            .or_else(|| {
                self.fallback_key
                    .as_deref()
                    .and_then(|key| method_block.get(key))
            })
            .and_then(ConfigNode::as_mapping)
    }
}

/// Project the comparable fields of a method's integration block
///
/// # Arguments
/// * `method_block` - One method entry of an API definition (e.g. `paths./users.get`)
/// * `rules` - Where to look for the integration block
///
/// # Returns
/// A mapping with every projected field present, in a fixed order
pub fn normalize_integration(method_block: &ConfigNode, rules: &IntegrationRules) -> ConfigNode {
    let integration = rules.find(method_block);
    let field = |name: &str| integration.and_then(|i| i.get(name));

    let mut projected = Mapping::new();

    for name in INTEGRATION_SCALAR_FIELDS {
        projected.insert(*name, field(*name).cloned().unwrap_or_else(ConfigNode::null));
    }

    for name in INTEGRATION_MAPPING_FIELDS {
        let value = match field(*name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => ConfigNode::empty_mapping(),
        };
        projected.insert(*name, value);
    }

    ConfigNode::Mapping(projected)
}
