//! Markdown renderings for pull request comments and wiki pages.

use crate::audit::{
    describe_statement, BucketAudit, EcsAudit, GatewayAudit, GatewayIssue, PolicyComparison,
    Severity,
};
use crate::diff::{
    render_list, Discrepancy, DiscrepancyKind, DriftReport, DriftStatus, SideLabels,
};

/// Sections in the order they appear in a drift report
const KIND_SECTIONS: [(&str, &str); 5] = [
    ("MISSING KEY", "Missing keys"),
    ("EXTRA KEY", "Extra keys"),
    ("VALUE MISMATCH", "Value mismatches"),
    ("LIST MISMATCH", "List mismatches"),
    ("TYPE MISMATCH", "Type mismatches"),
];

/// Render a drift report grouped by discrepancy kind
pub fn render_drift_markdown(title: &str, report: &DriftReport) -> String {
    let labels = &report.labels;
    let mut md = format!("# {}\n\n", title);
    md.push_str(&format!(
        "_{} vs {} · generated {}_\n\n",
        labels.source, labels.target, report.generated_at
    ));

    if report.summary.status == DriftStatus::Synced {
        md.push_str("**Status:** ✅ SYNCED\n");
        return md;
    }

    md.push_str(&format!(
        "**Status:** ❌ DRIFT DETECTED ({} issues)\n",
        report.summary.total
    ));

    for (tag, heading) in KIND_SECTIONS {
        let group: Vec<&Discrepancy> = report
            .discrepancies
            .iter()
            .filter(|d| d.label() == tag)
            .collect();
        if group.is_empty() {
            continue;
        }

        md.push_str(&format!("\n## {} ({})\n\n", heading, group.len()));
        for discrepancy in group {
            md.push_str(&discrepancy_line(discrepancy, labels));
            md.push('\n');
        }
    }

    md
}

fn discrepancy_line(discrepancy: &Discrepancy, labels: &SideLabels) -> String {
    let path = &discrepancy.path;
    match &discrepancy.kind {
        DiscrepancyKind::MissingKey { value } => {
            format!("- `{}`: only in {} (`{}`)", path, labels.source, value)
        }
        DiscrepancyKind::ExtraKey { value } => {
            format!("- `{}`: only in {} (`{}`)", path, labels.target, value)
        }
        DiscrepancyKind::ValueMismatch { left, right }
        | DiscrepancyKind::TypeMismatch { left, right } => format!(
            "- `{}`: {} `{}` · {} `{}`",
            path, labels.source, left, labels.target, right
        ),
        DiscrepancyKind::ListMismatch { left, right } => format!(
            "- `{}`: {} `{}` · {} `{}`",
            path,
            labels.source,
            render_list(left),
            labels.target,
            render_list(right)
        ),
    }
}

/// Render a gateway audit as a table, one row per finding
pub fn render_gateway_markdown(audit: &GatewayAudit, labels: &SideLabels) -> String {
    let mut md = format!(
        "# API Gateway audit\n\n_{} vs {} · {} paths checked_\n\n",
        labels.source, labels.target, audit.paths_checked
    );

    if audit.is_clean() {
        md.push_str("✅ No configuration differences found.\n");
        return md;
    }

    md.push_str("| Issue | Path | Method | Details |\n");
    md.push_str("|-------|------|--------|---------|\n");
    for issue in &audit.issues {
        let (name, path, method, details) = match issue {
            GatewayIssue::MissingPath { path } => {
                ("Missing path", path, "", format!("absent in {}", labels.target))
            }
            GatewayIssue::MissingMethod { path, method } => (
                "Missing method",
                path,
                method.as_str(),
                format!("absent in {}", labels.target),
            ),
            GatewayIssue::IntegrationMismatch {
                path,
                method,
                discrepancies,
            } => {
                let changed: Vec<String> = discrepancies
                    .iter()
                    .map(|d| format!("`{}` ({})", d.path, d.label().to_lowercase()))
                    .collect();
                ("Integration mismatch", path, method.as_str(), changed.join("<br>"))
            }
            GatewayIssue::ExtraPath { path } => {
                ("Extra path", path, "", format!("only in {}", labels.target))
            }
            GatewayIssue::ExtraMethod { path, method } => (
                "Extra method",
                path,
                method.as_str(),
                format!("only in {}", labels.target),
            ),
        };
        md.push_str(&format!(
            "| {} | `{}` | {} | {} |\n",
            name,
            path,
            method.to_uppercase(),
            details
        ));
    }

    md.push_str(&format!("\n**{} issues**\n", audit.issue_count()));
    md
}

/// Render an ECS audit grouped by severity
pub fn render_ecs_markdown(audit: &EcsAudit, labels: &SideLabels) -> String {
    let mut md = format!("# ECS task definition audit\n\n_{} vs {}_\n\n", labels.source, labels.target);

    md.push_str("| Field | Source | Target | Match |\n");
    md.push_str("|-------|--------|--------|-------|\n");
    for field in [&audit.image, &audit.cpu, &audit.memory] {
        md.push_str(&format!(
            "| {} | `{}` | `{}` | {} |\n",
            field.field,
            field.source.to_plain_string(),
            field.target.to_plain_string(),
            if field.is_match() { "✅" } else { "❌" }
        ));
    }

    for severity in Severity::ALL {
        let findings: Vec<_> = audit.findings_by(severity).collect();
        if findings.is_empty() {
            continue;
        }
        md.push_str(&format!("\n## {} ({})\n\n", severity.label(), findings.len()));
        for finding in findings {
            md.push_str(&format!(
                "- `{}`: {} (`{}` → `{}`)\n",
                finding.name,
                finding.status.label(),
                finding.source_value.as_deref().unwrap_or("-"),
                finding.target_value.as_deref().unwrap_or("-")
            ));
        }
    }

    if audit.issue_count() == 0 {
        md.push_str("\n✅ Configuration logic is identical.\n");
    }
    md
}

/// Render a policy comparison as two statement lists
pub fn render_policy_markdown(comparison: &PolicyComparison, labels: &SideLabels) -> String {
    let mut md = format!("# Policy comparison\n\n_{} vs {}_\n\n", labels.source, labels.target);
    push_policy_sections(&mut md, comparison, labels);
    md
}

fn push_policy_sections(md: &mut String, comparison: &PolicyComparison, labels: &SideLabels) {
    if comparison.is_match() {
        md.push_str("✅ Policies match semantically.\n");
    }

    if !comparison.missing.is_empty() {
        md.push_str(&format!(
            "## Missing in {} ({})\n\n",
            labels.target,
            comparison.missing.len()
        ));
        for statement in &comparison.missing {
            md.push_str(&format!("- {}\n", describe_statement(statement)));
        }
        md.push('\n');
    }

    if !comparison.extra.is_empty() {
        md.push_str(&format!(
            "## Only in {} ({})\n\n",
            labels.target,
            comparison.extra.len()
        ));
        for statement in &comparison.extra {
            md.push_str(&format!("- {}\n", describe_statement(statement)));
        }
        md.push('\n');
    }

    if !comparison.risks.is_empty() {
        md.push_str(&format!(
            "## Risks in {} ({})\n\n",
            labels.target,
            comparison.risks.len()
        ));
        for risk in &comparison.risks {
            md.push_str(&format!(
                "- **{}** {} (`{}`)\n",
                risk.severity.label(),
                risk.kind.label(),
                risk.statement
            ));
        }
    }
}

/// Render a bucket audit: settings table, then the policy comparison
pub fn render_bucket_markdown(audit: &BucketAudit, labels: &SideLabels) -> String {
    let mut md = format!("# S3 bucket audit\n\n_{} vs {}_\n\n", labels.source, labels.target);

    md.push_str(&format!("| Setting | {} | {} | Status |\n", labels.source, labels.target));
    md.push_str("|---------|--------|--------|--------|\n");
    for setting in audit.settings() {
        let status = if setting.is_match() {
            "✅ MATCH".to_string()
        } else {
            format!("❌ MISMATCH ({})", setting.severity.label())
        };
        md.push_str(&format!(
            "| {} | `{}` | `{}` | {} |\n",
            setting.setting,
            setting.source.to_plain_string(),
            setting.target.to_plain_string(),
            status
        ));
    }

    md.push_str("\n## Policy\n\n");
    push_policy_sections(&mut md, &audit.policy, labels);
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{generate_report, DiffOptions};
    use crate::node::ConfigNode;
    use serde_json::json;

    fn node(value: serde_json::Value) -> ConfigNode {
        ConfigNode::from(value)
    }

    #[test]
    fn test_drift_markdown_groups_by_kind() {
        let left = node(json!({"a": 1, "b": {"c": 2}, "list": [1]}));
        let right = node(json!({"b": {"c": 3}, "list": [2], "z": true}));
        let report = generate_report(&left, &right, &DiffOptions::new(), SideLabels::default());

        let md = render_drift_markdown("Lambda config", &report);
        assert!(md.starts_with("# Lambda config\n"));
        assert!(md.contains("DRIFT DETECTED (4 issues)"));
        assert!(md.contains("## Missing keys (1)\n\n- `a`: only in Source (`1`)"));
        assert!(md.contains("## Extra keys (1)\n\n- `z`: only in Target (`true`)"));
        assert!(md.contains("- `b->c`: Source `2` · Target `3`"));
        assert!(md.contains("## List mismatches (1)\n\n- `list`: Source `[1]` · Target `[2]`"));
        assert!(!md.contains("## Type mismatches"));

        let missing = md.find("## Missing keys").unwrap();
        let values = md.find("## Value mismatches").unwrap();
        assert!(missing < values);
    }

    #[test]
    fn test_drift_markdown_synced() {
        let doc = node(json!({"a": 1}));
        let report = generate_report(&doc, &doc, &DiffOptions::new(), SideLabels::default());
        let md = render_drift_markdown("Same", &report);
        assert!(md.contains("✅ SYNCED"));
        assert!(!md.contains("##"));
    }

    #[test]
    fn test_gateway_markdown_table() {
        let audit = GatewayAudit {
            paths_checked: 2,
            issues: vec![
                GatewayIssue::MissingPath {
                    path: "/users".to_string(),
                },
                GatewayIssue::MissingMethod {
                    path: "/orders".to_string(),
                    method: "post".to_string(),
                },
            ],
        };
        let md = render_gateway_markdown(&audit, &SideLabels::new("prod", "dr"));
        assert!(md.contains("| Missing path | `/users` |  | absent in dr |"));
        assert!(md.contains("| Missing method | `/orders` | POST | absent in dr |"));
        assert!(md.contains("**2 issues**"));
    }

    #[test]
    fn test_policy_markdown_lists() {
        let comparison = PolicyComparison {
            missing: vec![node(json!({"Effect": "Allow", "Action": "s3:GetObject"}))],
            ..Default::default()
        };
        let md = render_policy_markdown(&comparison, &SideLabels::default());
        assert!(md.contains("## Missing in Target (1)\n\n- Allow s3:GetObject"));
        assert!(!md.contains("Only in"));
    }

    #[test]
    fn test_list_mismatch_shows_values() {
        let left = node(json!({"ports": [1, 2]}));
        let right = node(json!({"ports": [2, 1]}));
        let report = generate_report(&left, &right, &DiffOptions::new(), SideLabels::new("dev", "prod"));

        let md = render_drift_markdown("Ports", &report);
        assert!(md.contains("- `ports`: dev `[1, 2]` · prod `[2, 1]`"));
    }

    #[test]
    fn test_policy_markdown_lists_risks() {
        let comparison = PolicyComparison {
            risks: vec![crate::audit::PolicyRisk {
                statement: "Allow *".to_string(),
                kind: crate::audit::PolicyRiskKind::OverPermissive,
                severity: Severity::Critical,
            }],
            ..Default::default()
        };
        let md = render_policy_markdown(&comparison, &SideLabels::new("dev", "prod"));
        assert!(md.contains("✅ Policies match semantically."));
        assert!(md.contains("## Risks in prod (1)\n\n- **Critical** 🚨 Over-Permissive"));
        assert!(md.contains("(`Allow *`)"));
    }
}
