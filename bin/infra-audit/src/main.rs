//! Infra Audit CLI
//!
//! Detects configuration drift between two cloud environments from their
//! exported JSON documents.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::debug;
use std::path::PathBuf;

use infra_audit::commands::{
    display_version, execute_bucket, execute_diff, execute_ecs, execute_gateway, execute_policy,
    BucketArgs, CommonArgs, DiffArgs, EcsArgs, GatewayArgs, PolicyArgs, ReportFormat,
};
use infra_audit::normalize::DocumentPreset;

/// Infra Audit - configuration drift detection across environments
#[derive(Parser, Debug)]
#[command(name = "infra-audit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options every audit takes
#[derive(Args, Debug)]
struct Shared {
    /// Source environment document (JSON)
    source: PathBuf,

    /// Target environment document (JSON)
    target: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format: text, markdown or json
    #[arg(short, long, default_value = "text")]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exit with an error when drift is found
    #[arg(long)]
    fail_on_drift: bool,

    /// Display name of the source environment
    #[arg(long, default_value = "Source")]
    source_label: String,

    /// Display name of the target environment
    #[arg(long, default_value = "Target")]
    target_label: String,
}

impl From<Shared> for CommonArgs {
    fn from(shared: Shared) -> Self {
        CommonArgs {
            source: shared.source,
            target: shared.target,
            config: shared.config,
            format: shared.format,
            output: shared.output,
            fail_on_drift: shared.fail_on_drift,
            source_label: shared.source_label,
            target_label: shared.target_label,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Structural diff of two JSON documents
    Diff {
        #[command(flatten)]
        shared: Shared,

        /// Key to ignore wherever it appears (repeatable)
        #[arg(long = "ignore-key")]
        ignore_keys: Vec<String>,

        /// Path pattern to ignore, e.g. "paths->*->get->uri" (repeatable)
        #[arg(long = "ignore-path")]
        ignore_paths: Vec<String>,

        /// Strip volatile fields first: ecs (task definitions) or gateway (exports)
        #[arg(long)]
        preset: Option<DocumentPreset>,
    },

    /// Compare two API Gateway OpenAPI exports
    Gateway {
        #[command(flatten)]
        shared: Shared,
    },

    /// Compare two IAM or resource policies after masking account IDs and ARNs
    Policy {
        #[command(flatten)]
        shared: Shared,
    },

    /// Compare two S3 buckets: encryption, versioning and policy
    Bucket {
        #[command(flatten)]
        shared: Shared,
    },

    /// Compare two ECS task definitions
    Ecs {
        #[command(flatten)]
        shared: Shared,

        /// Region context from [ecs.region_contexts], e.g. eu-ireland
        #[arg(long)]
        region_context: Option<String>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    debug!("Parsed command: {:?}", cli.command);

    // Execute command
    match cli.command {
        Commands::Diff {
            shared,
            ignore_keys,
            ignore_paths,
            preset,
        } => execute_diff(DiffArgs {
            common: shared.into(),
            ignore_keys,
            ignore_paths,
            preset,
        })?,

        Commands::Gateway { shared } => execute_gateway(GatewayArgs {
            common: shared.into(),
        })?,

        Commands::Policy { shared } => execute_policy(PolicyArgs {
            common: shared.into(),
        })?,

        Commands::Bucket { shared } => execute_bucket(BucketArgs {
            common: shared.into(),
        })?,

        Commands::Ecs {
            shared,
            region_context,
        } => execute_ecs(EcsArgs {
            common: shared.into(),
            region_context,
        })?,

        Commands::Version => display_version(),
    }

    Ok(())
}
