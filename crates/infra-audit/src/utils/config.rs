//! Configuration and constants.
//!
//! `AuditConfig` is loaded from TOML and turned into the explicit option
//! structs consumed by the engine, normalizers, and audits.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use super::error::ConfigError;
use crate::audit::{EcsOptions, GatewayOptions};
use crate::diff::DiffOptions;
use crate::node::PathPattern;
use crate::normalize::{DocumentPreset, IntegrationRules, MaskingRules};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

// API Gateway integration lookup
pub const DEFAULT_INTEGRATION_KEY: &str = "x-amazon-apigateway-integration";
pub const DEFAULT_INTEGRATION_FALLBACK_KEY: &str = "methodIntegration";

// Fields that always differ between environments
pub const DEFAULT_GATEWAY_IGNORE_KEYS: &[&str] = &["uri", "credentials", "passthroughBehavior"];

// Masking
pub const DEFAULT_ARN_PATTERN: &str = r"arn:aws:[a-z0-9:-]+:[A-Za-z0-9_./-]+";
pub const DEFAULT_ACCOUNT_PATTERN: &str = r"\d{12}";
pub const DEFAULT_ARN_PLACEHOLDER: &str = "{{ARN_MASKED}}";
pub const DEFAULT_ACCOUNT_PLACEHOLDER: &str = "{{ACCOUNT_ID}}";

// ECS environment classification
pub const DEFAULT_SECRET_MARKER: &str = "SECRET";
pub const DEFAULT_EXPECTED_DRIFT_MARKERS: &[&str] =
    &["_HOST", "_URL", "_URI", "_ARN", "_DB", "_BUCKET"];
pub const DEFAULT_SECRET_NAME_MARKERS: &[&str] = &["KEY", "SECRET", "PASSWORD", "TOKEN"];
pub const DEFAULT_REGION_CONTEXT: &str = "eu-ireland";
pub const DEFAULT_FORBIDDEN_REGIONS: &[&str] = &["us-east-1", "us-west-2"];

/// Complete audit configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Generic document diff rules
    pub diff: DiffSection,

    /// API Gateway audit rules
    pub gateway: GatewaySection,

    /// Account/ARN masking for policies
    pub masking: MaskingSection,

    /// ECS task definition rules
    pub ecs: EcsSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiffSection {
    pub ignore_keys: Vec<String>,
    pub ignore_paths: Vec<PathPattern>,

    /// Cleaning applied to both documents before diffing
    pub preset: Option<DocumentPreset>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewaySection {
    pub integration_key: String,
    pub fallback_key: Option<String>,
    pub ignore_keys: Vec<String>,
    pub ignore_paths: Vec<PathPattern>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            integration_key: DEFAULT_INTEGRATION_KEY.to_string(),
            fallback_key: Some(DEFAULT_INTEGRATION_FALLBACK_KEY.to_string()),
            ignore_keys: to_strings(DEFAULT_GATEWAY_IGNORE_KEYS),
            ignore_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MaskingSection {
    pub arn_pattern: String,
    pub arn_placeholder: String,
    pub account_pattern: String,
    pub account_placeholder: String,
}

impl Default for MaskingSection {
    fn default() -> Self {
        Self {
            arn_pattern: DEFAULT_ARN_PATTERN.to_string(),
            arn_placeholder: DEFAULT_ARN_PLACEHOLDER.to_string(),
            account_pattern: DEFAULT_ACCOUNT_PATTERN.to_string(),
            account_placeholder: DEFAULT_ACCOUNT_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EcsSection {
    pub secret_marker: String,
    pub expected_drift_markers: Vec<String>,
    pub secret_name_markers: Vec<String>,

    /// Region context name → regions that must not appear in target values
    pub region_contexts: BTreeMap<String, Vec<String>>,
}

impl Default for EcsSection {
    fn default() -> Self {
        let mut region_contexts = BTreeMap::new();
        region_contexts.insert(
            DEFAULT_REGION_CONTEXT.to_string(),
            to_strings(DEFAULT_FORBIDDEN_REGIONS),
        );
        Self {
            secret_marker: DEFAULT_SECRET_MARKER.to_string(),
            expected_drift_markers: to_strings(DEFAULT_EXPECTED_DRIFT_MARKERS),
            secret_name_markers: to_strings(DEFAULT_SECRET_NAME_MARKERS),
            region_contexts,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl AuditConfig {
    /// Check that every section can be turned into working options
    ///
    /// # Errors
    /// * `ConfigError::Masking` - Bad masking pattern or unstable placeholder
    /// * `ConfigError::Invalid` - Empty integration key or secret marker
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.masking_rules()?;

        if self.gateway.integration_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "gateway.integration_key must not be empty".to_string(),
            ));
        }
        if self.ecs.secret_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "ecs.secret_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Ignore rules for generic document diffs
    pub fn diff_options(&self) -> DiffOptions {
        let mut options = DiffOptions::with_ignore_keys(self.diff.ignore_keys.iter().cloned());
        options.ignore_paths = self.diff.ignore_paths.clone();
        options
    }

    /// Integration lookup and ignore rules for gateway audits
    pub fn gateway_options(&self) -> GatewayOptions {
        let ignore_keys: BTreeSet<String> = self.gateway.ignore_keys.iter().cloned().collect();
        GatewayOptions {
            integration: IntegrationRules {
                integration_key: self.gateway.integration_key.clone(),
                fallback_key: self.gateway.fallback_key.clone(),
            },
            diff: DiffOptions {
                ignore_keys,
                ignore_paths: self.gateway.ignore_paths.clone(),
            },
        }
    }

    /// Compiled masking rules
    ///
    /// # Errors
    /// * `ConfigError::Masking` - Bad pattern or unstable placeholder
    pub fn masking_rules(&self) -> Result<MaskingRules, ConfigError> {
        let m = &self.masking;
        Ok(MaskingRules::new(
            &m.arn_pattern,
            &m.arn_placeholder,
            &m.account_pattern,
            &m.account_placeholder,
        )?)
    }

    /// ECS classification rules for an optional region context
    ///
    /// # Errors
    /// * `ConfigError::UnknownRegionContext` - Context not defined in `[ecs.region_contexts]`
    pub fn ecs_options(&self, region_context: Option<&str>) -> Result<EcsOptions, ConfigError> {
        let forbidden_regions = match region_context {
            None => Vec::new(),
            Some(name) => self
                .ecs
                .region_contexts
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownRegionContext(name.to_string()))?,
        };

        Ok(EcsOptions {
            secret_marker: self.ecs.secret_marker.clone(),
            expected_drift_markers: self.ecs.expected_drift_markers.clone(),
            forbidden_regions,
            secret_name_markers: self.ecs.secret_name_markers.clone(),
        })
    }
}

/// Load configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the TOML configuration file
///
/// # Returns
/// Parsed and validated AuditConfig; omitted sections take defaults
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Parse` - If TOML is invalid
/// * Any validation error from `AuditConfig::validate`
///
/// # Example
/// ```ignore
/// let config = load_config("infra-audit.toml")?;
/// let options = config.gateway_options();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AuditConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AuditConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
