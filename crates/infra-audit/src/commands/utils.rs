//! Helpers shared by the command implementations.

use super::models::{CommonArgs, ReportFormat};
use crate::diff::SideLabels;
use crate::output::{write_report, write_text};
use crate::utils::config::{load_config, AuditConfig, REPORT_VERSION};
use anyhow::{Context, Result};
use colored::*;
use log::debug;
use serde::Serialize;
use std::path::Path;

/// Load the configuration file if one was given, defaults otherwise
pub fn load_config_or_default(path: Option<&Path>) -> Result<AuditConfig> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))
        }
        None => Ok(AuditConfig::default()),
    }
}

pub(crate) fn side_labels(args: &CommonArgs) -> SideLabels {
    SideLabels::new(args.source_label.clone(), args.target_label.clone())
}

/// Print or write a finished report
///
/// `render` is only called for text and markdown; JSON serializes `report`.
pub(crate) fn emit<T, F>(args: &CommonArgs, report: &T, render: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(ReportFormat) -> String,
{
    match (&args.output, args.format) {
        (Some(path), ReportFormat::Json) => {
            write_report(report, path).context("Failed to write JSON report")?;
            announce(path);
        }
        (Some(path), format) => {
            write_text(&render(format), path).context("Failed to write report")?;
            announce(path);
        }
        (None, ReportFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        (None, format) => {
            println!("{}", render(format));
        }
    }
    Ok(())
}

fn announce(path: &Path) {
    println!("📊 Report written to {}", path.display().to_string().cyan());
}

/// Display version information
pub fn display_version() {
    println!("Infra Audit v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_VERSION);
    println!();
    println!("Configuration drift detection across cloud environments.");
}
