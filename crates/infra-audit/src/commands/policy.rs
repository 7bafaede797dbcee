//! Policy command implementation.

use super::models::{PolicyArgs, ReportFormat};
use super::utils::{emit, load_config_or_default, side_labels};
use crate::audit::{compare_policies, render_policy_report};
use crate::node::ConfigNode;
use crate::output::markdown::render_policy_markdown;
use crate::output::read_document;
use anyhow::{Context, Result};
use log::info;

/// Policy inside a document
///
/// `get-bucket-policy` and similar responses wrap the policy under `Policy`;
/// anything else is taken as the policy itself.
pub fn policy_of(document: &ConfigNode) -> &ConfigNode {
    document.get("Policy").unwrap_or(document)
}

/// Execute the policy command
pub fn execute_policy(args: PolicyArgs) -> Result<()> {
    let common = &args.common;

    let config = load_config_or_default(common.config.as_deref())?;
    let rules = config.masking_rules()?;
    let source = read_document(&common.source).context("Failed to read source policy")?;
    let target = read_document(&common.target).context("Failed to read target policy")?;

    let comparison = compare_policies(Some(policy_of(&source)), Some(policy_of(&target)), &rules)
        .context("Failed to normalize policies")?;
    info!(
        "Policy comparison finished: {} missing, {} extra",
        comparison.missing.len(),
        comparison.extra.len()
    );

    let labels = side_labels(common);
    emit(common, &comparison, |format| match format {
        ReportFormat::Markdown => render_policy_markdown(&comparison, &labels),
        _ => render_policy_report(&comparison, &labels),
    })?;

    if common.fail_on_drift && !comparison.is_match() {
        return Err(anyhow::anyhow!(
            "Policy drift detected ({} statements)",
            comparison.issue_count()
        ));
    }

    Ok(())
}
