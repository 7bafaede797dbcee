//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands load documents, run the library audits, and render the result.

pub mod bucket;
pub mod diff;
pub mod ecs;
pub mod gateway;
pub mod models;
pub mod policy;
pub mod utils;

// Re-export main command functions
pub use bucket::execute_bucket;
pub use diff::execute_diff;
pub use ecs::execute_ecs;
pub use gateway::execute_gateway;
pub use models::{BucketArgs, CommonArgs, DiffArgs, EcsArgs, GatewayArgs, PolicyArgs, ReportFormat};
pub use policy::execute_policy;
pub use utils::{display_version, load_config_or_default};
