//! Diff command implementation.
//! Compares two arbitrary JSON documents and reports every discrepancy.

use super::models::{DiffArgs, ReportFormat};
use super::utils::{emit, load_config_or_default, side_labels};
use crate::diff::{generate_report, render_terminal_summary, render_text_report, DriftStatus};
use crate::node::PathPattern;
use crate::output::markdown::render_drift_markdown;
use crate::output::read_document;
use anyhow::{Context, Result};
use log::info;

/// Execute the diff command
pub fn execute_diff(args: DiffArgs) -> Result<()> {
    let common = &args.common;

    // Step 1: Load configuration and documents
    let config = load_config_or_default(common.config.as_deref())?;
    let source = read_document(&common.source).context("Failed to read source document")?;
    let target = read_document(&common.target).context("Failed to read target document")?;

    // Step 2: Strip volatile fields
    let (source, target) = match args.preset.or(config.diff.preset) {
        Some(preset) => {
            info!("Applying {} preset", preset);
            (preset.apply(&source), preset.apply(&target))
        }
        None => (source, target),
    };

    // Step 3: Merge CLI ignore rules over the configured ones
    let mut options = config.diff_options();
    for key in &args.ignore_keys {
        options = options.ignore_key(key.clone());
    }
    for raw in &args.ignore_paths {
        let pattern: PathPattern = raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid --ignore-path '{}': {}", raw, e))?;
        options = options.ignore_path(pattern);
    }

    // Step 4: Diff
    let report = generate_report(&source, &target, &options, side_labels(common));
    info!("Diff finished: {} discrepancies", report.summary.total);

    // Step 5: Output
    let title = format!("{} vs {}", common.source.display(), common.target.display());
    emit(common, &report, |format| match format {
        ReportFormat::Markdown => render_drift_markdown(&title, &report),
        _ => render_text_report(&title, &report),
    })?;

    if common.output.is_some() && common.format == ReportFormat::Text {
        println!("{}", render_terminal_summary(&report));
    }

    // Step 6: Exit status
    if common.fail_on_drift && report.summary.status == DriftStatus::Drift {
        return Err(anyhow::anyhow!(
            "Configuration drift detected ({} issues)",
            report.summary.total
        ));
    }

    Ok(())
}
