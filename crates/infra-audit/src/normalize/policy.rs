//! IAM policy normalization and environment masking.
//!
//! Account IDs and ARNs are replaced on the serialized document text, so
//! masking reaches every nesting level and key name alike.

use crate::node::{ConfigNode, Scalar};
use crate::utils::config::{
    DEFAULT_ACCOUNT_PATTERN, DEFAULT_ACCOUNT_PLACEHOLDER, DEFAULT_ARN_PATTERN,
    DEFAULT_ARN_PLACEHOLDER,
};
use log::{debug, warn};
use regex::{NoExpand, Regex};

use super::NormalizeError;

/// Compiled masking patterns and their placeholders
#[derive(Debug, Clone)]
pub struct MaskingRules {
    arn_pattern: Regex,
    account_pattern: Regex,
    arn_placeholder: String,
    account_placeholder: String,
}

impl MaskingRules {
    /// Build rules from patterns and placeholders
    ///
    /// # Errors
    /// * `NormalizeError::InvalidPattern` - A pattern does not compile
    /// * `NormalizeError::UnstablePlaceholder` - A placeholder would itself be
    ///   masked on a second pass
    pub fn new(
        arn_pattern: &str,
        arn_placeholder: &str,
        account_pattern: &str,
        account_placeholder: &str,
    ) -> Result<Self, NormalizeError> {
        let rules = Self {
            arn_pattern: Regex::new(arn_pattern)?,
            account_pattern: Regex::new(account_pattern)?,
            arn_placeholder: arn_placeholder.to_string(),
            account_placeholder: account_placeholder.to_string(),
        };

        for placeholder in [arn_placeholder, account_placeholder] {
            if rules.could_rematch(placeholder) {
                return Err(NormalizeError::UnstablePlaceholder(placeholder.to_string()));
            }
        }

        Ok(rules)
    }

    /// AWS ARN and 12-digit account masking with the standard placeholders
    pub fn aws_defaults() -> Result<Self, NormalizeError> {
        Self::new(
            DEFAULT_ARN_PATTERN,
            DEFAULT_ARN_PLACEHOLDER,
            DEFAULT_ACCOUNT_PATTERN,
            DEFAULT_ACCOUNT_PLACEHOLDER,
        )
    }

    pub fn arn_placeholder(&self) -> &str {
        &self.arn_placeholder
    }

    pub fn account_placeholder(&self) -> &str {
        &self.account_placeholder
    }

    /// Whether a placeholder may form a new match, alone or next to other text
    ///
    /// Digits and `arn:` are rejected outright since the account and ARN
    /// patterns key on them; `mask_stable` catches the rest.
    fn could_rematch(&self, placeholder: &str) -> bool {
        self.arn_pattern.is_match(placeholder)
            || self.account_pattern.is_match(placeholder)
            || placeholder.bytes().any(|b| b.is_ascii_digit())
            || placeholder.to_ascii_lowercase().contains("arn:")
    }

    /// Mask, then check a second pass leaves the result unchanged
    ///
    /// # Errors
    /// * `NormalizeError::UnstablePlaceholder` - A placeholder combined with
    ///   surrounding text into a new match
    pub fn mask_stable(&self, text: &str) -> Result<String, NormalizeError> {
        let once = self.mask_text(text);
        let twice = self.mask_text(&once);
        if once == twice {
            return Ok(once);
        }

        let placeholder = if self.arn_pattern.is_match(&once) {
            &self.arn_placeholder
        } else {
            &self.account_placeholder
        };
        Err(NormalizeError::UnstablePlaceholder(placeholder.clone()))
    }

    /// Replace ARNs first, then any remaining account IDs
    ///
    /// The input is JSON text, so placeholders are inserted JSON-escaped.
    pub fn mask_text(&self, text: &str) -> String {
        let arn_replacement = json_escape(&self.arn_placeholder);
        let account_replacement = json_escape(&self.account_placeholder);

        let without_arns = self
            .arn_pattern
            .replace_all(text, NoExpand(&arn_replacement));
        self.account_pattern
            .replace_all(&without_arns, NoExpand(&account_replacement))
            .into_owned()
    }
}

/// Escape text for insertion inside a JSON string literal
fn json_escape(text: &str) -> String {
    let quoted = serde_json::Value::String(text.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Mask environment-specific tokens anywhere in a document
///
/// # Errors
/// * `NormalizeError::MaskedDocumentInvalid` - Substitution produced invalid
///   JSON, e.g. a 12-digit number literal replaced by a bare placeholder
/// * `NormalizeError::UnstablePlaceholder` - A second pass would mask again
pub fn mask_document(document: &ConfigNode, rules: &MaskingRules) -> Result<ConfigNode, NormalizeError> {
    let text = serde_json::to_string(document).map_err(NormalizeError::MaskedDocumentInvalid)?;
    let masked = rules.mask_stable(&text)?;
    ConfigNode::parse_json(&masked).map_err(NormalizeError::MaskedDocumentInvalid)
}

/// Extract the statement list of an IAM-policy-shaped document, unmasked
///
/// # Arguments
/// * `policy` - Policy document; `None`, `null`, an empty mapping, or an
///   empty string yield no statements. A string is parsed as policy JSON.
///
/// # Returns
/// Statements in document order; a single statement mapping becomes a
/// one-element list
///
/// # Errors
/// * `NormalizeError::InvalidPolicyJson` - A string policy is not JSON
pub fn policy_statements(policy: Option<&ConfigNode>) -> Result<Vec<ConfigNode>, NormalizeError> {
    let Some(policy) = policy else {
        return Ok(Vec::new());
    };

    let parsed;
    let document = match policy {
        ConfigNode::Scalar(Scalar::Null) => return Ok(Vec::new()),
        ConfigNode::Scalar(Scalar::String(text)) => {
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }
            parsed = ConfigNode::parse_json(text).map_err(NormalizeError::InvalidPolicyJson)?;
            &parsed
        }
        other => other,
    };

    let statement = match document {
        ConfigNode::Mapping(mapping) => mapping.get("Statement"),
        other => {
            warn!("Policy document is a {}, not a mapping; no statements", other.type_name());
            None
        }
    };

    let statements = match statement {
        Some(ConfigNode::Sequence(items)) => items.clone(),
        Some(single @ ConfigNode::Mapping(_)) => vec![single.clone()],
        Some(other) => {
            warn!("Ignoring policy Statement of type {}", other.type_name());
            Vec::new()
        }
        None => Vec::new(),
    };

    Ok(statements)
}

/// Extract the masked statement list from an IAM-policy-shaped document
///
/// # Arguments
/// * `policy` - Same inputs as `policy_statements`
/// * `rules` - Masking patterns and placeholders
///
/// # Errors
/// * `NormalizeError::InvalidPolicyJson` - A string policy is not JSON
/// * `NormalizeError::MaskedDocumentInvalid` - Masking broke a statement
/// * `NormalizeError::UnstablePlaceholder` - Masking was not stable
pub fn normalize_policy(
    policy: Option<&ConfigNode>,
    rules: &MaskingRules,
) -> Result<Vec<ConfigNode>, NormalizeError> {
    let statements = policy_statements(policy)?
        .iter()
        .map(|statement| mask_document(statement, rules))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Normalized policy with {} statements", statements.len());
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules() -> MaskingRules {
        MaskingRules::aws_defaults().unwrap()
    }

    #[test]
    fn test_arn_with_account_becomes_single_placeholder() {
        let masked = rules().mask_text(r#"{"Resource":"arn:aws:s3:::bucket-123456789012"}"#);
        assert_eq!(masked, r#"{"Resource":"{{ARN_MASKED}}"}"#);
    }

    #[test]
    fn test_bare_account_id_masked() {
        let masked = rules().mask_text(r#"{"Principal":{"AWS":"123456789012"}}"#);
        assert_eq!(masked, r#"{"Principal":{"AWS":"{{ACCOUNT_ID}}"}}"#);
    }

    #[test]
    fn test_masking_is_idempotent_on_text() {
        let once = rules().mask_text(
            r#"{"a":"arn:aws:iam::123456789012:role/app","b":"210987654321","c":"plain"}"#,
        );
        assert_eq!(rules().mask_text(&once), once);
    }

    #[test]
    fn test_unstable_placeholder_rejected() {
        let result = MaskingRules::new(
            DEFAULT_ARN_PATTERN,
            "arn:aws:masked:x:y",
            DEFAULT_ACCOUNT_PATTERN,
            DEFAULT_ACCOUNT_PLACEHOLDER,
        );
        assert!(matches!(result, Err(NormalizeError::UnstablePlaceholder(_))));

        let result = MaskingRules::new(
            DEFAULT_ARN_PATTERN,
            DEFAULT_ARN_PLACEHOLDER,
            DEFAULT_ACCOUNT_PATTERN,
            "000000000000",
        );
        assert!(matches!(result, Err(NormalizeError::UnstablePlaceholder(_))));
    }

    #[test]
    fn test_digit_placeholder_rejected() {
        let result = MaskingRules::new(
            DEFAULT_ARN_PATTERN,
            DEFAULT_ARN_PLACEHOLDER,
            DEFAULT_ACCOUNT_PATTERN,
            "000000",
        );
        assert!(matches!(result, Err(NormalizeError::UnstablePlaceholder(p)) if p == "000000"));

        let result = MaskingRules::new(
            DEFAULT_ARN_PATTERN,
            "ARN:masked",
            DEFAULT_ACCOUNT_PATTERN,
            DEFAULT_ACCOUNT_PLACEHOLDER,
        );
        assert!(matches!(result, Err(NormalizeError::UnstablePlaceholder(_))));
    }

    #[test]
    fn test_placeholder_forming_new_match_fails_masking() {
        // "x" never matches "xy" alone, but "xyy" masks to "xy"
        let custom =
            MaskingRules::new(DEFAULT_ARN_PATTERN, DEFAULT_ARN_PLACEHOLDER, "xy", "x").unwrap();
        let document = ConfigNode::from(json!({"Statement": {"Sid": "xyy"}}));

        let result = mask_document(&document, &custom);
        assert!(matches!(result, Err(NormalizeError::UnstablePlaceholder(p)) if p == "x"));
        assert!(custom.mask_stable("plain").is_ok());
    }

    #[test]
    fn test_long_digit_runs_mask_stably() {
        let document = ConfigNode::from(json!({"Statement": {"Sid": "123456789012345678"}}));
        let once = mask_document(&document, &rules()).unwrap();
        let again = mask_document(&once, &rules()).unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn test_statements_unmasked() {
        let policy = ConfigNode::from(json!({
            "Statement": [{"Principal": {"AWS": "arn:aws:iam::123456789012:user/alice"}}]
        }));
        let statements = policy_statements(Some(&policy)).unwrap();
        assert_eq!(
            statements[0].get("Principal").and_then(|p| p.get("AWS")).and_then(ConfigNode::as_str),
            Some("arn:aws:iam::123456789012:user/alice")
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = MaskingRules::new("arn:(", "{{A}}", DEFAULT_ACCOUNT_PATTERN, "{{B}}");
        assert!(matches!(result, Err(NormalizeError::InvalidPattern(_))));
    }

    #[test]
    fn test_placeholder_is_json_escaped() {
        let custom = MaskingRules::new(
            DEFAULT_ARN_PATTERN,
            "<\"arn\">",
            DEFAULT_ACCOUNT_PATTERN,
            "$ACCOUNT",
        )
        .unwrap();
        let document = ConfigNode::from(json!({"r": "arn:aws:s3:::b", "a": "123456789012"}));

        let masked = mask_document(&document, &custom).unwrap();

        assert_eq!(masked.get("r").and_then(ConfigNode::as_str), Some("<\"arn\">"));
        assert_eq!(masked.get("a").and_then(ConfigNode::as_str), Some("$ACCOUNT"));
    }

    #[test]
    fn test_numeric_account_literal_is_an_error() {
        let document = ConfigNode::from(json!({"Statement": [], "Account": 123456789012u64}));
        let result = mask_document(&document, &rules());
        assert!(matches!(result, Err(NormalizeError::MaskedDocumentInvalid(_))));
    }

    #[test]
    fn test_absent_and_empty_policies() {
        assert!(normalize_policy(None, &rules()).unwrap().is_empty());
        assert!(normalize_policy(Some(&ConfigNode::null()), &rules()).unwrap().is_empty());
        assert!(normalize_policy(Some(&ConfigNode::empty_mapping()), &rules())
            .unwrap()
            .is_empty());
        assert!(normalize_policy(Some(&ConfigNode::from("")), &rules())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_single_statement_wrapped() {
        let policy = ConfigNode::from(json!({
            "Version": "2012-10-17",
            "Statement": {"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"}
        }));

        let statements = normalize_policy(Some(&policy), &rules()).unwrap();

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].get("Action").and_then(ConfigNode::as_str), Some("s3:GetObject"));
    }

    #[test]
    fn test_string_encoded_policy_parsed() {
        let policy = ConfigNode::from(
            r#"{"Statement":[{"Effect":"Deny","Principal":"*","Resource":"arn:aws:s3:::logs/*"}]}"#,
        );

        let statements = normalize_policy(Some(&policy), &rules()).unwrap();

        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].get("Resource").and_then(ConfigNode::as_str),
            Some("{{ARN_MASKED}}*")
        );
    }

    #[test]
    fn test_string_policy_not_json() {
        let result = normalize_policy(Some(&ConfigNode::from("{not json")), &rules());
        assert!(matches!(result, Err(NormalizeError::InvalidPolicyJson(_))));
    }
}
