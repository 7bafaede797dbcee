//! Semantic IAM policy comparison.
//!
//! Statements are masked before comparison, so policies that only differ in
//! account IDs or resource ARNs match. The target policy is also scanned,
//! unmasked, for dangerous grants.

use crate::diff::SideLabels;
use crate::node::ConfigNode;
use crate::normalize::{normalize_policy, policy_statements, MaskingRules, NormalizeError};
use log::debug;
use serde::Serialize;

use super::ecs::Severity;

/// Dangerous pattern found in a single statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRiskKind {
    /// Allow on every resource with wildcard, delete, or put actions
    OverPermissive,
    /// Principal names an IAM user instead of a role
    HardcodedUser,
}

impl PolicyRiskKind {
    pub fn label(&self) -> &'static str {
        match self {
            PolicyRiskKind::OverPermissive => "🚨 Over-Permissive: write access on '*' resource",
            PolicyRiskKind::HardcodedUser => "⚠️ Fragile: hardcoded IAM user ARN",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PolicyRiskKind::OverPermissive => Severity::Critical,
            PolicyRiskKind::HardcodedUser => Severity::Suspicious,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyRisk {
    /// `describe_statement` of the offending statement
    pub statement: String,
    pub kind: PolicyRiskKind,
    pub severity: Severity,
}

/// Statement-level difference between two policies
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyComparison {
    /// Source statements with no equal statement in the target
    pub missing: Vec<ConfigNode>,

    /// Target statements with no equal statement in the source
    pub extra: Vec<ConfigNode>,

    /// Risky grants in the target policy; not counted as drift
    pub risks: Vec<PolicyRisk>,
}

impl PolicyComparison {
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.missing.len() + self.extra.len()
    }
}

/// Compare two policy documents statement by statement
///
/// # Errors
/// * `NormalizeError` - Either policy could not be normalized
pub fn compare_policies(
    source: Option<&ConfigNode>,
    target: Option<&ConfigNode>,
    rules: &MaskingRules,
) -> Result<PolicyComparison, NormalizeError> {
    let source_statements = normalize_policy(source, rules)?;
    let target_statements = normalize_policy(target, rules)?;

    let missing = source_statements
        .iter()
        .filter(|s| !target_statements.contains(s))
        .cloned()
        .collect();
    let extra = target_statements
        .iter()
        .filter(|s| !source_statements.contains(s))
        .cloned()
        .collect();

    let risks = scan_policy_risks(&policy_statements(target)?);

    Ok(PolicyComparison {
        missing,
        extra,
        risks,
    })
}

/// Scan statements for over-permissive grants and user principals
///
/// Statements should be unmasked so principal ARNs are still readable.
/// A statement without `Effect` is treated as `Allow`.
pub fn scan_policy_risks(statements: &[ConfigNode]) -> Vec<PolicyRisk> {
    let mut risks = Vec::new();

    for statement in statements {
        let effect = statement
            .get("Effect")
            .and_then(ConfigNode::as_str)
            .unwrap_or("Allow");
        let actions = string_list(statement.get("Action"));
        let resources = string_list(statement.get("Resource"));

        let writes = actions
            .iter()
            .any(|a| *a == "*" || a.contains("Delete") || a.contains("Put"));
        if effect == "Allow" && resources.contains(&"*") && writes {
            risks.push(risk(statement, PolicyRiskKind::OverPermissive));
        }

        if let Some(principal) = statement.get("Principal") {
            if principal.to_value().to_string().contains(":user/") {
                risks.push(risk(statement, PolicyRiskKind::HardcodedUser));
            }
        }
    }

    debug!("Policy scan: {} risks in {} statements", risks.len(), statements.len());
    risks
}

fn risk(statement: &ConfigNode, kind: PolicyRiskKind) -> PolicyRisk {
    PolicyRisk {
        statement: describe_statement(statement),
        kind,
        severity: kind.severity(),
    }
}

/// A string or a list of strings; anything else is empty
fn string_list(node: Option<&ConfigNode>) -> Vec<&str> {
    match node {
        Some(ConfigNode::Sequence(items)) => items.iter().filter_map(ConfigNode::as_str).collect(),
        Some(other) => other.as_str().into_iter().collect(),
        None => Vec::new(),
    }
}

/// Short description of a statement, e.g. `Allow s3:GetObject`
pub fn describe_statement(statement: &ConfigNode) -> String {
    let effect = statement
        .get("Effect")
        .map(ConfigNode::to_plain_string)
        .unwrap_or_else(|| "?".to_string());
    let action = statement
        .get("Action")
        .or_else(|| statement.get("NotAction"))
        .map(ConfigNode::to_plain_string)
        .unwrap_or_else(|| "?".to_string());
    format!("{} {}", effect, action)
}

/// Render the comparison as a text report
pub fn render_policy_report(comparison: &PolicyComparison, labels: &SideLabels) -> String {
    let mut lines = Vec::new();
    if comparison.is_match() {
        lines.push("✅ Policies Match Semantically".to_string());
    }
    if !comparison.missing.is_empty() {
        lines.push(format!(
            "❌ Found {} Permissions MISSING in {}",
            comparison.missing.len(),
            labels.target
        ));
        for statement in &comparison.missing {
            lines.push(format!("   Missing: {}", describe_statement(statement)));
        }
    }
    if !comparison.extra.is_empty() {
        lines.push(format!(
            "⚠️  Found {} Permissions only in {}",
            comparison.extra.len(),
            labels.target
        ));
        for statement in &comparison.extra {
            lines.push(format!("   Extra: {}", describe_statement(statement)));
        }
    }
    if !comparison.risks.is_empty() {
        lines.push(format!("🔎 Risks in {} policy:", labels.target));
        for risk in &comparison.risks {
            lines.push(format!("   {} ({})", risk.kind.label(), risk.statement));
        }
    }
    lines.join("\n")
}
