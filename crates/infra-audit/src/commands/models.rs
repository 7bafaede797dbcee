use crate::normalize::DocumentPreset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Rendering used for a command's report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown format '{}' (expected text, markdown or json)",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Text => "text",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Options shared by every audit command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonArgs {
    /// Path to the source environment document
    pub source: PathBuf,

    /// Path to the target environment document
    pub target: PathBuf,

    /// Optional TOML configuration file
    pub config: Option<PathBuf>,

    /// Report rendering
    pub format: ReportFormat,

    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,

    /// Return an error when drift is found
    pub fail_on_drift: bool,

    /// Display name of the source environment
    pub source_label: String,

    /// Display name of the target environment
    pub target_label: String,
}

impl Default for CommonArgs {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::new(),
            config: None,
            format: ReportFormat::Text,
            output: None,
            fail_on_drift: false,
            source_label: "Source".to_string(),
            target_label: "Target".to_string(),
        }
    }
}

/// Arguments for the diff command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffArgs {
    pub common: CommonArgs,

    /// Extra keys to skip, on top of `[diff] ignore_keys`
    pub ignore_keys: Vec<String>,

    /// Extra path patterns to skip, on top of `[diff] ignore_paths`
    pub ignore_paths: Vec<String>,

    /// Cleaning applied before diffing; overrides `[diff] preset`
    pub preset: Option<DocumentPreset>,
}

/// Arguments for the gateway command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayArgs {
    pub common: CommonArgs,
}

/// Arguments for the policy command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyArgs {
    pub common: CommonArgs,
}

/// Arguments for the bucket command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketArgs {
    pub common: CommonArgs,
}

/// Arguments for the ecs command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcsArgs {
    pub common: CommonArgs,

    /// Name of a `[ecs.region_contexts]` entry
    pub region_context: Option<String>,
}
