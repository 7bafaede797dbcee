//! Structural diff of configuration trees.
//!
//! This module compares two parsed documents (source vs target) and produces a
//! flat, ordered list of discrepancies plus report rendering.
//!
//! # Example
//! ```ignore
//! use infra_audit::diff::{diff, DiffOptions};
//! use infra_audit::output::read_document;
//!
//! let dev = read_document("dev/gateway.json")?;
//! let staging = read_document("staging/gateway.json")?;
//! let options = DiffOptions::with_ignore_keys(["uri", "credentials"]);
//! for discrepancy in diff(&dev, &staging, &options) {
//!     println!("{}: {}", discrepancy.label(), discrepancy.path);
//! }
//! ```

mod engine;
mod options;
mod output;
mod schema;

// Public API exports
pub use engine::{diff, diff_at, generate_report};
pub use options::DiffOptions;
pub use output::{
    render_discrepancies, render_discrepancy, render_list, render_terminal_summary,
    render_text_report,
};
pub use schema::{
    Discrepancy, DiscrepancyKind, DriftReport, DriftStatus, DriftSummary, SideLabels,
};
