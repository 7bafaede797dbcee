//! API Gateway export audit.
//!
//! Walks the `paths` of two OpenAPI exports and reports missing endpoints,
//! missing methods, and integration drift per method.

use crate::diff::{diff_at, render_discrepancy, Discrepancy, DiffOptions, SideLabels};
use crate::node::{ConfigNode, Mapping, Path};
use crate::normalize::{normalize_integration, IntegrationRules};
use log::debug;
use serde::Serialize;

/// Root segment of integration discrepancy paths
pub const INTEGRATION_PATH_ROOT: &str = "Integration";

/// Inputs for a gateway audit
#[derive(Debug, Clone, Default)]
pub struct GatewayOptions {
    /// Where the integration block lives in each method
    pub integration: IntegrationRules,

    /// Keys and paths ignored when comparing integrations
    pub diff: DiffOptions,
}

/// One finding of a gateway audit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum GatewayIssue {
    /// Endpoint absent from the target
    MissingPath { path: String },

    /// Endpoint present, method absent from the target
    MissingMethod { path: String, method: String },

    /// Integration projections differ
    IntegrationMismatch {
        path: String,
        method: String,
        discrepancies: Vec<Discrepancy>,
    },

    /// Endpoint only the target has
    ExtraPath { path: String },

    /// Method only the target has
    ExtraMethod { path: String, method: String },
}

/// Result of comparing two gateway exports
#[derive(Debug, Clone, Default, Serialize)]
pub struct GatewayAudit {
    /// Number of source endpoints examined
    pub paths_checked: usize,

    /// Findings in report order
    pub issues: Vec<GatewayIssue>,
}

impl GatewayAudit {
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Compare every endpoint and method of two OpenAPI exports
///
/// # Arguments
/// * `source` - Export of the reference environment
/// * `target` - Export of the environment being checked
/// * `options` - Integration lookup and ignore rules
///
/// # Returns
/// GatewayAudit with source endpoints in sorted order, followed by
/// endpoints only the target has
pub fn audit_gateway(source: &ConfigNode, target: &ConfigNode, options: &GatewayOptions) -> GatewayAudit {
    let empty = Mapping::new();
    let source_paths = paths_of(source).unwrap_or(&empty);
    let target_paths = paths_of(target).unwrap_or(&empty);

    let mut issues = Vec::new();
    let integration_root = Path::from_keys([INTEGRATION_PATH_ROOT]);

    let mut names: Vec<&String> = source_paths.keys().collect();
    names.sort();

    for name in &names {
        let Some(target_methods) = target_paths.get(name) else {
            issues.push(GatewayIssue::MissingPath {
                path: name.to_string(),
            });
            continue;
        };

        let source_methods = source_paths
            .get(name)
            .and_then(ConfigNode::as_mapping)
            .unwrap_or(&empty);
        let target_methods = target_methods.as_mapping().unwrap_or(&empty);

        for (method, source_details) in source_methods.iter() {
            let Some(target_details) = target_methods.get(method) else {
                issues.push(GatewayIssue::MissingMethod {
                    path: name.to_string(),
                    method: method.clone(),
                });
                continue;
            };

            let source_integration = normalize_integration(source_details, &options.integration);
            let target_integration = normalize_integration(target_details, &options.integration);
            let discrepancies = diff_at(
                &source_integration,
                &target_integration,
                &options.diff,
                &integration_root,
            );

            if !discrepancies.is_empty() {
                issues.push(GatewayIssue::IntegrationMismatch {
                    path: name.to_string(),
                    method: method.clone(),
                    discrepancies,
                });
            }
        }

        for method in target_methods.keys() {
            if !source_methods.contains_key(method) {
                issues.push(GatewayIssue::ExtraMethod {
                    path: name.to_string(),
                    method: method.clone(),
                });
            }
        }
    }

    let mut extra: Vec<&String> = target_paths
        .keys()
        .filter(|name| !source_paths.contains_key(name))
        .collect();
    extra.sort();
    issues.extend(extra.into_iter().map(|name| GatewayIssue::ExtraPath {
        path: name.clone(),
    }));

    debug!(
        "Gateway audit: {} paths checked, {} issues",
        names.len(),
        issues.len()
    );

    GatewayAudit {
        paths_checked: names.len(),
        issues,
    }
}

fn paths_of(document: &ConfigNode) -> Option<&Mapping> {
    document.get("paths").and_then(ConfigNode::as_mapping)
}

/// Render the gateway audit as a text report
pub fn render_gateway_report(audit: &GatewayAudit, labels: &SideLabels, generated_at: &str) -> String {
    let mut lines = vec![
        "========================================================".to_string(),
        " AWS API GATEWAY AUDIT REPORT".to_string(),
        format!(" Generated: {}", generated_at),
        format!(" {} vs {}", labels.source, labels.target),
        "========================================================".to_string(),
        String::new(),
    ];

    for issue in &audit.issues {
        match issue {
            GatewayIssue::MissingPath { path } => {
                lines.push(format!("🔴 [MISSING PATH] {}", path));
                lines.push(format!(
                    "   Action: This entire endpoint is missing in {}.",
                    labels.target
                ));
            }
            GatewayIssue::MissingMethod { path, method } => {
                lines.push(format!("🟠 [MISSING METHOD] {} [{}]", path, method.to_uppercase()));
                lines.push(format!(
                    "   Action: The path exists, but {} is missing.",
                    method.to_uppercase()
                ));
            }
            GatewayIssue::IntegrationMismatch {
                path,
                method,
                discrepancies,
            } => {
                lines.push(format!("⚠️  [MISMATCH] {} [{}]", path, method.to_uppercase()));
                for discrepancy in discrepancies {
                    lines.push(format!("   - {}", render_discrepancy(discrepancy, labels)));
                }
            }
            GatewayIssue::ExtraPath { path } => {
                lines.push(format!("🔵 [EXTRA PATH] {}", path));
                lines.push(format!("   Note: Only {} defines this endpoint.", labels.target));
            }
            GatewayIssue::ExtraMethod { path, method } => {
                lines.push(format!("🔵 [EXTRA METHOD] {} [{}]", path, method.to_uppercase()));
            }
        }
        lines.push(String::new());
    }

    if audit.is_clean() {
        lines.push("✅ RESULT: Perfect Match! No configuration differences found.".to_string());
    } else {
        lines.push(format!(
            "❌ RESULT: Found {} issues that need attention.",
            audit.issue_count()
        ));
    }

    lines.join("\n")
}
