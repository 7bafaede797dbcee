//! Infra Audit library
//!
//! Structural drift detection between configuration documents of two
//! environments, plus resource-specific audits built on top of it.

pub mod audit;
pub mod commands;
pub mod diff;
pub mod node;
pub mod normalize;
pub mod output;
pub mod utils;
