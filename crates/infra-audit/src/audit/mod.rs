//! Resource-specific audits built on the diff engine and normalizers.
//!
//! - `gateway`: API Gateway OpenAPI exports
//! - `policy`: IAM / bucket policies
//! - `ecs`: ECS task definitions
//! - `s3`: S3 bucket settings and policy

pub mod ecs;
pub mod gateway;
pub mod policy;
pub mod s3;

pub use ecs::{
    audit_task_definitions, render_ecs_report, EcsAudit, EcsOptions, EnvFinding, EnvStatus, Severity,
};
pub use gateway::{audit_gateway, render_gateway_report, GatewayAudit, GatewayIssue, GatewayOptions};
pub use policy::{
    compare_policies, describe_statement, render_policy_report, scan_policy_risks,
    PolicyComparison, PolicyRisk, PolicyRiskKind,
};
pub use s3::{audit_bucket, render_bucket_report, BucketAudit, BucketSetting};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid task definition: {0}")]
    InvalidTaskDefinition(String),
}
