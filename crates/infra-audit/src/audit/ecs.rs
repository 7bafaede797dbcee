//! ECS task definition drift classification.
//!
//! Compares the first container definition of two task definitions and
//! sorts every environment variable difference into a severity bucket.
//! Target values are also checked for malformed URLs and ports and for
//! plain-text credentials, even when both sides agree.

use crate::diff::SideLabels;
use crate::node::{ConfigNode, Mapping};
use crate::utils::config::{
    DEFAULT_EXPECTED_DRIFT_MARKERS, DEFAULT_SECRET_MARKER, DEFAULT_SECRET_NAME_MARKERS,
};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use super::AuditError;

/// Classification rules for environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct EcsOptions {
    /// Variables whose name contains this are checked for Plain/Secret changes
    pub secret_marker: String,

    /// Name fragments of variables expected to differ between environments
    pub expected_drift_markers: Vec<String>,

    /// Region names that must not appear in target values
    pub forbidden_regions: Vec<String>,

    /// Name fragments of variables that hold credentials
    pub secret_name_markers: Vec<String>,
}

/// Plain values shorter than this under a credential name look hardcoded
pub const MIN_SECRET_REFERENCE_LEN: usize = 20;

const SECRETS_MANAGER_PREFIX: &str = "arn:aws:secretsmanager";

impl Default for EcsOptions {
    fn default() -> Self {
        Self {
            secret_marker: DEFAULT_SECRET_MARKER.to_string(),
            expected_drift_markers: DEFAULT_EXPECTED_DRIFT_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            forbidden_regions: Vec::new(),
            secret_name_markers: DEFAULT_SECRET_NAME_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// How a variable is provided to the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnvVarKind {
    Plain,
    Secret,
}

/// One environment variable of a container definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub value: String,
    pub kind: EnvVarKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Critical,
    Suspicious,
    Expected,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Suspicious, Severity::Expected];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Suspicious => "Suspicious",
            Severity::Expected => "Expected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvStatus {
    MissingInSource,
    MissingInTarget,
    RegionViolation,
    TypeRisk,
    HardcodedSecret,
    InvalidFormat,
    InvalidPort,
    ConfigDiff,
    ValueDrift,
}

impl EnvStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EnvStatus::MissingInSource => "❌ Missing in Source",
            EnvStatus::MissingInTarget => "❌ Missing in Target",
            EnvStatus::RegionViolation => "🌍 Region Violation",
            EnvStatus::TypeRisk => "🔓 Type Risk",
            EnvStatus::HardcodedSecret => "🔑 Potential Hardcoded Secret",
            EnvStatus::InvalidFormat => "⚠️ Invalid Format (expected URL/ARN)",
            EnvStatus::InvalidPort => "⚠️ Invalid Port",
            EnvStatus::ConfigDiff => "🔄 Config Diff",
            EnvStatus::ValueDrift => "⚠️ Value Drift",
        }
    }
}

/// A reported environment variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvFinding {
    pub name: String,
    pub status: EnvStatus,
    pub severity: Severity,
    pub source_value: Option<String>,
    pub target_value: Option<String>,
}

/// A top-level container field compared as a whole
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldComparison {
    pub field: String,
    pub source: ConfigNode,
    pub target: ConfigNode,
}

impl FieldComparison {
    fn new(field: &str, source: &Mapping, target: &Mapping) -> Self {
        let read = |m: &Mapping| m.get(field).cloned().unwrap_or_else(ConfigNode::null);
        Self {
            field: field.to_string(),
            source: read(source),
            target: read(target),
        }
    }

    pub fn is_match(&self) -> bool {
        self.source == self.target
    }
}

/// Result of comparing two task definitions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcsAudit {
    pub image: FieldComparison,
    pub cpu: FieldComparison,
    pub memory: FieldComparison,

    /// Variable findings in name order; matching variables are omitted
    pub findings: Vec<EnvFinding>,
}

impl EcsAudit {
    pub fn findings_by(&self, severity: Severity) -> impl Iterator<Item = &EnvFinding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// Critical variable findings plus an image mismatch
    pub fn critical_count(&self) -> usize {
        self.findings_by(Severity::Critical).count() + usize::from(!self.image.is_match())
    }

    /// Everything except expected drift
    pub fn issue_count(&self) -> usize {
        self.critical_count() + self.findings_by(Severity::Suspicious).count()
    }
}

/// First container definition of a task definition document
///
/// Accepts both a bare task definition and a `describe-task-definition`
/// response wrapping it under `taskDefinition`.
pub fn container_definition(document: &ConfigNode) -> Result<&Mapping, AuditError> {
    let definitions = document
        .get("containerDefinitions")
        .or_else(|| {
            document
                .get("taskDefinition")
                .and_then(|td| td.get("containerDefinitions"))
        })
        .ok_or_else(|| {
            AuditError::InvalidTaskDefinition("no containerDefinitions found".to_string())
        })?;

    definitions
        .as_sequence()
        .and_then(|items| items.first())
        .and_then(ConfigNode::as_mapping)
        .ok_or_else(|| {
            AuditError::InvalidTaskDefinition(
                "containerDefinitions has no container mapping".to_string(),
            )
        })
}

/// Environment variables of a container, plain and secret
///
/// Secrets are keyed by name with their `valueFrom` reference as value.
/// A secret overrides a plain variable of the same name.
pub fn environment_map(container: &Mapping) -> BTreeMap<String, EnvVar> {
    let mut vars = BTreeMap::new();
    collect_vars(container, "environment", "value", EnvVarKind::Plain, &mut vars);
    collect_vars(container, "secrets", "valueFrom", EnvVarKind::Secret, &mut vars);
    vars
}

fn collect_vars(
    container: &Mapping,
    list_key: &str,
    value_key: &str,
    kind: EnvVarKind,
    vars: &mut BTreeMap<String, EnvVar>,
) {
    let Some(items) = container.get(list_key).and_then(ConfigNode::as_sequence) else {
        return;
    };

    for item in items {
        let Some(name) = item.get("name").and_then(ConfigNode::as_str) else {
            warn!("Skipping {} entry without a name", list_key);
            continue;
        };
        let value = item
            .get(value_key)
            .map(ConfigNode::to_plain_string)
            .unwrap_or_default();
        vars.insert(name.to_string(), EnvVar { value, kind });
    }
}

/// Compare two task definitions
///
/// # Errors
/// * `AuditError::InvalidTaskDefinition` - Either document has no container definition
pub fn audit_task_definitions(
    source: &ConfigNode,
    target: &ConfigNode,
    options: &EcsOptions,
) -> Result<EcsAudit, AuditError> {
    let source_container = container_definition(source)?;
    let target_container = container_definition(target)?;

    let source_vars = environment_map(source_container);
    let target_vars = environment_map(target_container);

    let mut names: Vec<&String> = source_vars.keys().chain(target_vars.keys()).collect();
    names.sort();
    names.dedup();

    let findings: Vec<EnvFinding> = names
        .into_iter()
        .filter_map(|name| {
            classify(name, source_vars.get(name), target_vars.get(name), options).map(
                |(status, severity)| EnvFinding {
                    name: name.clone(),
                    status,
                    severity,
                    source_value: source_vars.get(name).map(|v| v.value.clone()),
                    target_value: target_vars.get(name).map(|v| v.value.clone()),
                },
            )
        })
        .collect();

    debug!(
        "ECS audit: {} source vars, {} target vars, {} findings",
        source_vars.len(),
        target_vars.len(),
        findings.len()
    );

    Ok(EcsAudit {
        image: FieldComparison::new("image", source_container, target_container),
        cpu: FieldComparison::new("cpu", source_container, target_container),
        memory: FieldComparison::new("memory", source_container, target_container),
        findings,
    })
}

/// Render the audit as a text report grouped by severity
pub fn render_ecs_report(audit: &EcsAudit, labels: &SideLabels) -> String {
    let mut lines = Vec::new();

    for field in [&audit.image, &audit.cpu, &audit.memory] {
        if field.is_match() {
            lines.push(format!("✅ {}: {}", field.field, field.source.to_plain_string()));
        } else {
            lines.push(format!(
                "⚠️  {}: {}: {} | {}: {}",
                field.field,
                labels.source,
                field.source.to_plain_string(),
                labels.target,
                field.target.to_plain_string()
            ));
        }
    }
    lines.push(String::new());

    for severity in Severity::ALL {
        let findings: Vec<&EnvFinding> = audit.findings_by(severity).collect();
        if findings.is_empty() {
            continue;
        }
        lines.push(format!("--- {} ({}) ---", severity.label(), findings.len()));
        for finding in findings {
            lines.push(format!(
                "  {}: {} ({} -> {})",
                finding.name,
                finding.status.label(),
                finding.source_value.as_deref().unwrap_or("-"),
                finding.target_value.as_deref().unwrap_or("-")
            ));
        }
    }

    if audit.issue_count() == 0 {
        lines.push("✅ Configuration Logic is Identical!".to_string());
    } else {
        lines.push(format!(
            "❌ {} critical, {} suspicious",
            audit.critical_count(),
            audit.findings_by(Severity::Suspicious).count()
        ));
    }

    lines.join("\n")
}

/// First matching rule wins; `None` means the variable is in sync
fn classify(
    name: &str,
    source: Option<&EnvVar>,
    target: Option<&EnvVar>,
    options: &EcsOptions,
) -> Option<(EnvStatus, Severity)> {
    let (source, target) = match (source, target) {
        (None, _) => return Some((EnvStatus::MissingInSource, Severity::Critical)),
        (_, None) => return Some((EnvStatus::MissingInTarget, Severity::Critical)),
        (Some(s), Some(t)) => (s, t),
    };

    if options
        .forbidden_regions
        .iter()
        .any(|region| target.value.contains(region.as_str()))
    {
        return Some((EnvStatus::RegionViolation, Severity::Critical));
    }

    if name.contains(options.secret_marker.as_str()) && source.kind != target.kind {
        return Some((EnvStatus::TypeRisk, Severity::Critical));
    }

    if let Some(status) = check_value(name, target, options) {
        let severity = match status {
            EnvStatus::HardcodedSecret => Severity::Critical,
            _ => Severity::Suspicious,
        };
        return Some((status, severity));
    }

    if source.value != target.value {
        let expected = options
            .expected_drift_markers
            .iter()
            .any(|marker| name.contains(marker.as_str()));
        return Some(if expected {
            (EnvStatus::ConfigDiff, Severity::Expected)
        } else {
            (EnvStatus::ValueDrift, Severity::Suspicious)
        });
    }

    None
}

/// Format and credential checks on a single target variable
fn check_value(name: &str, var: &EnvVar, options: &EcsOptions) -> Option<EnvStatus> {
    let upper = name.to_ascii_uppercase();
    let value = var.value.to_ascii_lowercase();

    if (upper.ends_with("_URL") || upper.ends_with("_URI"))
        && !(value.starts_with("http") || value.starts_with("arn"))
    {
        return Some(EnvStatus::InvalidFormat);
    }

    // Secrets are references resolved by ECS, never literal values
    if var.kind == EnvVarKind::Plain
        && options
            .secret_name_markers
            .iter()
            .any(|marker| upper.contains(marker.to_ascii_uppercase().as_str()))
        && value.len() < MIN_SECRET_REFERENCE_LEN
        && !value.starts_with(SECRETS_MANAGER_PREFIX)
    {
        return Some(EnvStatus::HardcodedSecret);
    }

    if upper.ends_with("_PORT")
        && (var.value.is_empty() || !var.value.chars().all(|c| c.is_ascii_digit()))
    {
        return Some(EnvStatus::InvalidPort);
    }

    None
}
