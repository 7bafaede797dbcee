//! ECS command implementation.

use super::models::{EcsArgs, ReportFormat};
use super::utils::{emit, load_config_or_default, side_labels};
use crate::audit::{audit_task_definitions, render_ecs_report};
use crate::output::markdown::render_ecs_markdown;
use crate::output::read_document;
use anyhow::{Context, Result};
use log::info;

/// Execute the ecs command
pub fn execute_ecs(args: EcsArgs) -> Result<()> {
    let common = &args.common;

    let config = load_config_or_default(common.config.as_deref())?;
    let options = config.ecs_options(args.region_context.as_deref())?;
    let source = read_document(&common.source).context("Failed to read source task definition")?;
    let target = read_document(&common.target).context("Failed to read target task definition")?;

    let audit = audit_task_definitions(&source, &target, &options)?;
    info!(
        "ECS audit finished: {} critical, {} findings total",
        audit.critical_count(),
        audit.findings.len()
    );

    let labels = side_labels(common);
    emit(common, &audit, |format| match format {
        ReportFormat::Markdown => render_ecs_markdown(&audit, &labels),
        _ => render_ecs_report(&audit, &labels),
    })?;

    if common.fail_on_drift && audit.issue_count() > 0 {
        return Err(anyhow::anyhow!(
            "Task definition drift detected ({} issues)",
            audit.issue_count()
        ));
    }

    Ok(())
}
