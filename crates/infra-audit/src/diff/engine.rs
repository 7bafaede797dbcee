//! Core diff engine implementation.
//! Recursively compares two configuration trees and collects discrepancies.

use crate::node::{ConfigNode, Mapping, Path, Scalar};
use crate::utils::config::REPORT_VERSION;
use chrono::Utc;
use log::debug;

use super::options::DiffOptions;
use super::schema::{Discrepancy, DiscrepancyKind, DriftReport, DriftSummary, SideLabels};

/// Compare two trees from the root
///
/// # Arguments
/// * `left` - Source document
/// * `right` - Target document
/// * `options` - Keys and paths to skip
///
/// # Returns
/// Discrepancies in discovery order; empty when the trees are equivalent
///
/// # Example
/// ```ignore
/// let options = DiffOptions::with_ignore_keys(["uri"]);
/// let discrepancies = diff(&dev, &staging, &options);
/// ```
pub fn diff(left: &ConfigNode, right: &ConfigNode, options: &DiffOptions) -> Vec<Discrepancy> {
    diff_at(left, right, options, &Path::root())
}

/// Compare two trees, reporting paths relative to `path`
///
/// A `null` side paired with a mapping is compared as an empty mapping, so
/// a document absent in one environment reports every key of the other.
pub fn diff_at(
    left: &ConfigNode,
    right: &ConfigNode,
    options: &DiffOptions,
    path: &Path,
) -> Vec<Discrepancy> {
    let mut out = Vec::new();
    let empty = Mapping::new();
    let empty_sequence = ConfigNode::Sequence(Vec::new());

    match (left, right) {
        (ConfigNode::Scalar(Scalar::Null), ConfigNode::Mapping(r)) => {
            diff_mappings(&empty, r, options, path, &mut out)
        }
        (ConfigNode::Mapping(l), ConfigNode::Scalar(Scalar::Null)) => {
            diff_mappings(l, &empty, options, path, &mut out)
        }
        (ConfigNode::Scalar(Scalar::Null), ConfigNode::Sequence(_)) => {
            compare_values(&empty_sequence, right, options, path, &mut out)
        }
        (ConfigNode::Sequence(_), ConfigNode::Scalar(Scalar::Null)) => {
            compare_values(left, &empty_sequence, options, path, &mut out)
        }
        _ => compare_values(left, right, options, path, &mut out),
    }

    out
}

/// Missing keys, then extra keys, then common keys in source order
fn diff_mappings(
    left: &Mapping,
    right: &Mapping,
    options: &DiffOptions,
    path: &Path,
    out: &mut Vec<Discrepancy>,
) {
    for (key, value) in left.iter() {
        if !right.contains_key(key) {
            out.push(Discrepancy::new(
                path.child(key.as_str()),
                DiscrepancyKind::MissingKey {
                    value: value.clone(),
                },
            ));
        }
    }

    for (key, value) in right.iter() {
        if !left.contains_key(key) {
            out.push(Discrepancy::new(
                path.child(key.as_str()),
                DiscrepancyKind::ExtraKey {
                    value: value.clone(),
                },
            ));
        }
    }

    for (key, left_value) in left.iter() {
        let Some(right_value) = right.get(key) else {
            continue;
        };

        let child = path.child(key.as_str());
        if options.is_ignored(key, &child) {
            continue;
        }

        compare_values(left_value, right_value, options, &child, out);
    }
}

fn compare_values(
    left: &ConfigNode,
    right: &ConfigNode,
    options: &DiffOptions,
    path: &Path,
    out: &mut Vec<Discrepancy>,
) {
    match (left, right) {
        (ConfigNode::Mapping(l), ConfigNode::Mapping(r)) => {
            diff_mappings(l, r, options, path, out)
        }
        (ConfigNode::Sequence(l), ConfigNode::Sequence(r)) => {
            if l != r {
                out.push(Discrepancy::new(
                    path.clone(),
                    DiscrepancyKind::ListMismatch {
                        left: l.clone(),
                        right: r.clone(),
                    },
                ));
            }
        }
        (ConfigNode::Scalar(l), ConfigNode::Scalar(r)) => {
            if l != r {
                out.push(Discrepancy::new(
                    path.clone(),
                    DiscrepancyKind::ValueMismatch {
                        left: left.clone(),
                        right: right.clone(),
                    },
                ));
            }
        }
        _ => out.push(Discrepancy::new(
            path.clone(),
            DiscrepancyKind::TypeMismatch {
                left: left.clone(),
                right: right.clone(),
            },
        )),
    }
}

/// Generate a complete drift report comparing two documents
///
/// # Arguments
/// * `left` - Source document
/// * `right` - Target document
/// * `options` - Keys and paths to skip
/// * `labels` - Environment names used when rendering
///
/// # Returns
/// DriftReport with every discrepancy and a per-kind summary
pub fn generate_report(
    left: &ConfigNode,
    right: &ConfigNode,
    options: &DiffOptions,
    labels: SideLabels,
) -> DriftReport {
    let discrepancies = diff(left, right, options);
    let summary = DriftSummary::from_discrepancies(&discrepancies);

    debug!(
        "Compared {} vs {}: {} discrepancies ({} ignore keys, {} ignore paths)",
        labels.source,
        labels.target,
        summary.total,
        options.ignore_keys.len(),
        options.ignore_paths.len()
    );

    DriftReport {
        report_version: REPORT_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        labels,
        discrepancies,
        summary,
    }
}
