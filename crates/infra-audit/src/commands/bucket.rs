//! Bucket command implementation.

use super::models::{BucketArgs, ReportFormat};
use super::utils::{emit, load_config_or_default, side_labels};
use crate::audit::{audit_bucket, render_bucket_report};
use crate::output::markdown::render_bucket_markdown;
use crate::output::read_document;
use anyhow::{Context, Result};
use log::info;

/// Execute the bucket command
pub fn execute_bucket(args: BucketArgs) -> Result<()> {
    let common = &args.common;

    let config = load_config_or_default(common.config.as_deref())?;
    let rules = config.masking_rules()?;
    let source = read_document(&common.source).context("Failed to read source bucket")?;
    let target = read_document(&common.target).context("Failed to read target bucket")?;

    let audit = audit_bucket(&source, &target, &rules).context("Failed to normalize bucket policies")?;
    info!(
        "Bucket audit finished: {} issues, {} risks",
        audit.issue_count(),
        audit.policy.risks.len()
    );

    let labels = side_labels(common);
    emit(common, &audit, |format| match format {
        ReportFormat::Markdown => render_bucket_markdown(&audit, &labels),
        _ => render_bucket_report(&audit, &labels),
    })?;

    if common.fail_on_drift && !audit.is_match() {
        return Err(anyhow::anyhow!(
            "Bucket drift detected ({} issues)",
            audit.issue_count()
        ));
    }

    Ok(())
}
