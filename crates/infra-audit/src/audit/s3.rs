//! S3 bucket audit.
//!
//! A bucket document bundles the outputs of `get-bucket-encryption`,
//! `get-bucket-versioning` and `get-bucket-policy` under `Encryption`,
//! `Versioning` and `Policy`. Settings are compared whole; the policy goes
//! through the semantic comparison.

use crate::diff::SideLabels;
use crate::node::ConfigNode;
use crate::normalize::{MaskingRules, NormalizeError};
use log::debug;
use serde::Serialize;

use super::ecs::Severity;
use super::policy::{compare_policies, render_policy_report, PolicyComparison};

/// Versioning state of a bucket that never had it enabled
pub const DEFAULT_VERSIONING: &str = "Suspended";

/// One bucket setting on both sides
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSetting {
    pub setting: String,
    pub source: ConfigNode,
    pub target: ConfigNode,

    /// Severity reported when the sides differ
    pub severity: Severity,
}

impl BucketSetting {
    fn read(
        setting: &str,
        source: &ConfigNode,
        target: &ConfigNode,
        default: ConfigNode,
        severity: Severity,
    ) -> Self {
        let read = |doc: &ConfigNode| doc.get(setting).cloned().unwrap_or_else(|| default.clone());
        Self {
            setting: setting.to_string(),
            source: read(source),
            target: read(target),
            severity,
        }
    }

    pub fn is_match(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketAudit {
    pub encryption: BucketSetting,
    pub versioning: BucketSetting,
    pub policy: PolicyComparison,
}

impl BucketAudit {
    pub fn settings(&self) -> [&BucketSetting; 2] {
        [&self.encryption, &self.versioning]
    }

    /// Encryption mismatch plus permissions missing from the target
    pub fn critical_count(&self) -> usize {
        let settings = self
            .settings()
            .into_iter()
            .filter(|s| !s.is_match() && s.severity == Severity::Critical)
            .count();
        settings + self.policy.missing.len()
    }

    /// Mismatched settings plus policy drift
    pub fn issue_count(&self) -> usize {
        let settings = self.settings().into_iter().filter(|s| !s.is_match()).count();
        settings + self.policy.issue_count()
    }

    pub fn is_match(&self) -> bool {
        self.issue_count() == 0
    }
}

/// Compare two bucket documents
///
/// Missing `Encryption` reads as `{}` and missing `Versioning` as
/// `"Suspended"`, so a bucket that never configured either compares equal
/// to one that reports the defaults.
///
/// # Errors
/// * `NormalizeError` - Either bucket policy could not be normalized
pub fn audit_bucket(
    source: &ConfigNode,
    target: &ConfigNode,
    rules: &MaskingRules,
) -> Result<BucketAudit, NormalizeError> {
    let encryption = BucketSetting::read(
        "Encryption",
        source,
        target,
        ConfigNode::empty_mapping(),
        Severity::Critical,
    );
    let versioning = BucketSetting::read(
        "Versioning",
        source,
        target,
        ConfigNode::from(DEFAULT_VERSIONING),
        Severity::Suspicious,
    );
    let policy = compare_policies(source.get("Policy"), target.get("Policy"), rules)?;

    debug!(
        "Bucket audit: encryption match={}, versioning match={}, {} policy issues",
        encryption.is_match(),
        versioning.is_match(),
        policy.issue_count()
    );

    Ok(BucketAudit {
        encryption,
        versioning,
        policy,
    })
}

/// Render the audit as a text report
pub fn render_bucket_report(audit: &BucketAudit, labels: &SideLabels) -> String {
    let mut lines = Vec::new();

    for setting in audit.settings() {
        if setting.is_match() {
            lines.push(format!(
                "✅ {}: MATCH ({})",
                setting.setting,
                setting.target.to_plain_string()
            ));
        } else {
            let marker = match setting.severity {
                Severity::Critical => "❌",
                _ => "⚠️ ",
            };
            lines.push(format!(
                "{} {}: MISMATCH ({}) {}: {} | {}: {}",
                marker,
                setting.setting,
                setting.severity.label(),
                labels.source,
                setting.source.to_plain_string(),
                labels.target,
                setting.target.to_plain_string()
            ));
        }
    }
    lines.push(String::new());
    lines.push(render_policy_report(&audit.policy, labels));

    lines.join("\n")
}
