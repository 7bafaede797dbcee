//! Pre-processing that makes documents from different environments comparable.
//!
//! - `document`: removal of deploy-volatile fields before a full diff
//! - `integration`: fixed projection of API Gateway integration blocks
//! - `policy`: IAM statement extraction with account/ARN masking

mod document;
mod integration;
mod policy;

pub use document::{
    clean_gateway_export, clean_task_definition, DocumentPreset, GATEWAY_VOLATILE_FIELDS,
    TASK_DEFINITION_VOLATILE_FIELDS,
};
pub use integration::{
    normalize_integration, IntegrationRules, INTEGRATION_MAPPING_FIELDS,
    INTEGRATION_SCALAR_FIELDS,
};
pub use policy::{mask_document, normalize_policy, policy_statements, MaskingRules};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Policy string is not valid JSON: {0}")]
    InvalidPolicyJson(serde_json::Error),

    #[error("Masked document is not valid JSON: {0}")]
    MaskedDocumentInvalid(serde_json::Error),

    #[error("Invalid masking pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Placeholder '{0}' would be masked again on a second pass")]
    UnstablePlaceholder(String),
}
