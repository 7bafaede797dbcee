//! Text and terminal rendering for drift reports.
//!
//! The plain text form is what gets written to report files; the terminal
//! summary adds colors.

use super::schema::{Discrepancy, DiscrepancyKind, DriftReport, DriftStatus, SideLabels};
use crate::node::ConfigNode;
use colored::*;

const RULE: &str = "========================================================";
const SEPARATOR: &str = "----------------------------------------";

/// Render one discrepancy as a text block
///
/// Mismatches span three lines: the tagged path, then the source and
/// target values indented underneath.
pub fn render_discrepancy(discrepancy: &Discrepancy, labels: &SideLabels) -> String {
    let path = &discrepancy.path;
    let tag = discrepancy.label();

    match &discrepancy.kind {
        DiscrepancyKind::MissingKey { .. } => format!(
            "[{}] {}: Present in {}, Missing in {}",
            tag, path, labels.source, labels.target
        ),
        DiscrepancyKind::ExtraKey { .. } => format!(
            "[{}] {}: Missing in {}, Present in {}",
            tag, path, labels.source, labels.target
        ),
        DiscrepancyKind::ValueMismatch { left, right } => {
            value_block(tag, &path.to_string(), labels, &left.to_string(), &right.to_string())
        }
        DiscrepancyKind::ListMismatch { left, right } => value_block(
            tag,
            &path.to_string(),
            labels,
            &render_list(left),
            &render_list(right),
        ),
        DiscrepancyKind::TypeMismatch { left, right } => value_block(
            tag,
            &format!("{} ({} vs {})", path, left.type_name(), right.type_name()),
            labels,
            &left.to_string(),
            &right.to_string(),
        ),
    }
}

fn value_block(tag: &str, header: &str, labels: &SideLabels, left: &str, right: &str) -> String {
    let width = labels.source.len().max(labels.target.len()) + 1;
    format!(
        "[{}] {}\n      {:<width$} {}\n      {:<width$} {}",
        tag,
        header,
        format!("{}:", labels.source),
        left,
        format!("{}:", labels.target),
        right,
        width = width
    )
}

/// List values inline, e.g. `[1, "a"]`
pub fn render_list(items: &[ConfigNode]) -> String {
    let rendered: Vec<String> = items.iter().map(|item| item.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

/// Render every discrepancy, one block per entry
pub fn render_discrepancies(discrepancies: &[Discrepancy], labels: &SideLabels) -> Vec<String> {
    discrepancies
        .iter()
        .map(|d| render_discrepancy(d, labels))
        .collect()
}

/// Render the downloadable text report
pub fn render_text_report(title: &str, report: &DriftReport) -> String {
    let mut lines = vec![
        RULE.to_string(),
        format!(" INFRA AUDIT REPORT - {}", title),
        format!(" Generated: {}", report.generated_at),
        format!(" {} vs {}", report.labels.source, report.labels.target),
        RULE.to_string(),
        String::new(),
    ];

    if report.discrepancies.is_empty() {
        lines.push("✅ STATUS: SYNCED. No configuration drift detected.".to_string());
    } else {
        lines.push(format!(
            "❌ STATUS: DRIFT DETECTED ({} issues found)",
            report.summary.total
        ));
        lines.push(String::new());
        lines.push("--- DETAILED CHANGES ---".to_string());
        for block in render_discrepancies(&report.discrepancies, &report.labels) {
            lines.push(block);
            lines.push(SEPARATOR.to_string());
        }
    }

    lines.join("\n")
}

/// Render a colored summary for the terminal
pub fn render_terminal_summary(report: &DriftReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str("\n🔍 ");
    out.push_str(&"Configuration Drift Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!("Source: {}\n", report.labels.source));
    out.push_str(&format!("Target: {}\n", report.labels.target));
    out.push_str("---------------------------------------------------\n");
    out.push_str(&format!("  Missing keys:     {}\n", summary.missing_keys));
    out.push_str(&format!("  Extra keys:       {}\n", summary.extra_keys));
    out.push_str(&format!("  Value mismatches: {}\n", summary.value_mismatches));
    out.push_str(&format!("  List mismatches:  {}\n", summary.list_mismatches));
    out.push_str(&format!("  Type mismatches:  {}\n", summary.type_mismatches));
    out.push_str("---------------------------------------------------\n");

    let status = match summary.status {
        DriftStatus::Synced => "✅ STATUS: SYNCED".green().bold(),
        DriftStatus::Drift => format!("❌ STATUS: DRIFT DETECTED ({} issues)", summary.total)
            .red()
            .bold(),
    };
    out.push_str(&status.to_string());
    out.push('\n');
    out
}
