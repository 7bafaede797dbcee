//! Schema definitions for drift reports.
//!
//! Defines the records produced when comparing two configuration trees.

use crate::node::{ConfigNode, Path};
use serde::{Deserialize, Serialize};

/// A single difference between the source and target trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Where in the tree the difference was found
    pub path: Path,

    /// What kind of difference, with the differing values
    #[serde(flatten)]
    pub kind: DiscrepancyKind,
}

/// Kind of difference, carrying the values involved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Key present in the source only
    MissingKey { value: ConfigNode },

    /// Key present in the target only
    ExtraKey { value: ConfigNode },

    /// Scalars differ
    ValueMismatch { left: ConfigNode, right: ConfigNode },

    /// Sequences differ; elements are not compared individually
    ListMismatch {
        left: Vec<ConfigNode>,
        right: Vec<ConfigNode>,
    },

    /// A mapping or sequence on one side, a different shape on the other
    TypeMismatch { left: ConfigNode, right: ConfigNode },
}

impl Discrepancy {
    pub fn new(path: Path, kind: DiscrepancyKind) -> Self {
        Self { path, kind }
    }

    /// Upper-case tag used in text reports, e.g. `MISSING KEY`
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

impl DiscrepancyKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiscrepancyKind::MissingKey { .. } => "MISSING KEY",
            DiscrepancyKind::ExtraKey { .. } => "EXTRA KEY",
            DiscrepancyKind::ValueMismatch { .. } => "VALUE MISMATCH",
            DiscrepancyKind::ListMismatch { .. } => "LIST MISMATCH",
            DiscrepancyKind::TypeMismatch { .. } => "TYPE MISMATCH",
        }
    }
}

/// Display names for the two compared environments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideLabels {
    pub source: String,
    pub target: String,
}

impl SideLabels {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl Default for SideLabels {
    fn default() -> Self {
        Self::new("Source", "Target")
    }
}

/// Complete drift report comparing a source and a target document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// Schema version for the report format
    pub report_version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    /// Names of the compared environments
    pub labels: SideLabels,

    /// Differences in discovery order
    pub discrepancies: Vec<Discrepancy>,

    /// Summary of the comparison
    pub summary: DriftSummary,
}

/// Overall comparison status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriftStatus {
    Synced,
    Drift,
}

/// Per-kind discrepancy counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub total: usize,
    pub missing_keys: usize,
    pub extra_keys: usize,
    pub value_mismatches: usize,
    pub list_mismatches: usize,
    pub type_mismatches: usize,
    pub status: DriftStatus,
}

impl DriftSummary {
    /// Count discrepancies by kind
    pub fn from_discrepancies(discrepancies: &[Discrepancy]) -> Self {
        let mut summary = DriftSummary {
            total: discrepancies.len(),
            missing_keys: 0,
            extra_keys: 0,
            value_mismatches: 0,
            list_mismatches: 0,
            type_mismatches: 0,
            status: if discrepancies.is_empty() {
                DriftStatus::Synced
            } else {
                DriftStatus::Drift
            },
        };

        for discrepancy in discrepancies {
            match discrepancy.kind {
                DiscrepancyKind::MissingKey { .. } => summary.missing_keys += 1,
                DiscrepancyKind::ExtraKey { .. } => summary.extra_keys += 1,
                DiscrepancyKind::ValueMismatch { .. } => summary.value_mismatches += 1,
                DiscrepancyKind::ListMismatch { .. } => summary.list_mismatches += 1,
                DiscrepancyKind::TypeMismatch { .. } => summary.type_mismatches += 1,
            }
        }

        summary
    }
}
