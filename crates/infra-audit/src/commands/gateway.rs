//! Gateway command implementation.

use super::models::{GatewayArgs, ReportFormat};
use super::utils::{emit, load_config_or_default, side_labels};
use crate::audit::{audit_gateway, render_gateway_report};
use crate::output::markdown::render_gateway_markdown;
use crate::output::read_document;
use anyhow::{Context, Result};
use log::info;

/// Execute the gateway command
pub fn execute_gateway(args: GatewayArgs) -> Result<()> {
    let common = &args.common;

    let config = load_config_or_default(common.config.as_deref())?;
    let source = read_document(&common.source).context("Failed to read source gateway export")?;
    let target = read_document(&common.target).context("Failed to read target gateway export")?;

    let audit = audit_gateway(&source, &target, &config.gateway_options());
    info!(
        "Gateway audit finished: {} paths checked, {} issues",
        audit.paths_checked,
        audit.issue_count()
    );

    let labels = side_labels(common);
    let generated_at = chrono::Utc::now().to_rfc3339();
    emit(common, &audit, |format| match format {
        ReportFormat::Markdown => render_gateway_markdown(&audit, &labels),
        _ => render_gateway_report(&audit, &labels, &generated_at),
    })?;

    if common.fail_on_drift && !audit.is_clean() {
        return Err(anyhow::anyhow!(
            "Gateway drift detected ({} issues)",
            audit.issue_count()
        ));
    }

    Ok(())
}
