//! Gateway, policy, bucket, and ECS audits over realistic documents.

use infra_audit::audit::*;
use infra_audit::diff::{DiscrepancyKind, SideLabels};
use infra_audit::node::{ConfigNode, Path};
use infra_audit::normalize::MaskingRules;
use infra_audit::utils::AuditConfig;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// GATEWAY
// ============================================================================

fn method(kind: &str, uri: &str) -> serde_json::Value {
    json!({
        "responses": {"200": {"description": "ok"}},
        "x-amazon-apigateway-integration": {
            "type": kind,
            "httpMethod": "POST",
            "uri": uri,
            "passthroughBehavior": "when_no_match"
        }
    })
}

fn gateway_exports() -> (ConfigNode, ConfigNode) {
    let source = json!({
        "openapi": "3.0.1",
        "paths": {
            "/users": {
                "get": method("AWS_PROXY", "arn:aws:lambda:dev-users"),
                "post": method("AWS_PROXY", "arn:aws:lambda:dev-users")
            },
            "/orders": {"get": method("AWS_PROXY", "arn:aws:lambda:dev-orders")},
            "/health": {"get": method("MOCK", "")}
        }
    });
    let target = json!({
        "openapi": "3.0.1",
        "paths": {
            "/users": {
                "get": method("HTTP_PROXY", "arn:aws:lambda:prod-users"),
                "delete": method("AWS_PROXY", "arn:aws:lambda:prod-users")
            },
            "/health": {"get": method("MOCK", "")},
            "/admin": {"get": method("AWS_PROXY", "arn:aws:lambda:prod-admin")}
        }
    });
    (ConfigNode::from(source), ConfigNode::from(target))
}

#[test]
fn test_gateway_audit_finds_every_issue_kind() {
    let (source, target) = gateway_exports();
    let audit = audit_gateway(&source, &target, &AuditConfig::default().gateway_options());

    assert_eq!(audit.paths_checked, 3);
    assert_eq!(
        audit.issues[0],
        GatewayIssue::MissingPath {
            path: "/orders".to_string()
        }
    );

    match &audit.issues[1] {
        GatewayIssue::IntegrationMismatch {
            path,
            method,
            discrepancies,
        } => {
            assert_eq!(path, "/users");
            assert_eq!(method, "get");
            assert_eq!(discrepancies.len(), 1);
            assert_eq!(discrepancies[0].path, Path::from_keys(["Integration", "type"]));
            assert_eq!(
                discrepancies[0].kind,
                DiscrepancyKind::ValueMismatch {
                    left: ConfigNode::from("AWS_PROXY"),
                    right: ConfigNode::from("HTTP_PROXY"),
                }
            );
        }
        other => panic!("expected integration mismatch, got {:?}", other),
    }

    assert_eq!(
        audit.issues[2..].to_vec(),
        vec![
            GatewayIssue::MissingMethod {
                path: "/users".to_string(),
                method: "post".to_string()
            },
            GatewayIssue::ExtraMethod {
                path: "/users".to_string(),
                method: "delete".to_string()
            },
            GatewayIssue::ExtraPath {
                path: "/admin".to_string()
            },
        ]
    );
    assert_eq!(audit.issue_count(), 5);
}

#[test]
fn test_gateway_uri_drift_reported_without_ignore_list() {
    let (source, target) = gateway_exports();
    let options = GatewayOptions::default();
    let audit = audit_gateway(&source, &target, &options);

    let Some(GatewayIssue::IntegrationMismatch { discrepancies, .. }) = audit.issues.get(1) else {
        panic!("expected integration mismatch");
    };
    let paths: Vec<String> = discrepancies.iter().map(|d| d.path.to_string()).collect();
    assert_eq!(paths, vec!["Integration->type", "Integration->uri"]);
}

#[test]
fn test_gateway_identical_exports_are_clean() {
    let (source, _) = gateway_exports();
    let audit = audit_gateway(&source, &source, &GatewayOptions::default());
    assert!(audit.is_clean());

    let report = render_gateway_report(&audit, &SideLabels::default(), "2025-01-01T00:00:00Z");
    assert!(report.contains("✅ RESULT: Perfect Match!"));
}

#[test]
fn test_gateway_report_lines() {
    let (source, target) = gateway_exports();
    let audit = audit_gateway(&source, &target, &AuditConfig::default().gateway_options());
    let report = render_gateway_report(&audit, &SideLabels::new("dev", "prod"), "now");

    assert!(report.contains("🔴 [MISSING PATH] /orders"));
    assert!(report.contains("🟠 [MISSING METHOD] /users [POST]"));
    assert!(report.contains("⚠️  [MISMATCH] /users [GET]"));
    assert!(report.contains("[VALUE MISMATCH] Integration->type"));
    assert!(report.contains("❌ RESULT: Found 5 issues that need attention."));
}

// ============================================================================
// POLICY
// ============================================================================

fn policy(account: &str, statements: Vec<serde_json::Value>) -> ConfigNode {
    let statements: Vec<serde_json::Value> = statements
        .into_iter()
        .map(|mut s| {
            s["Resource"] = json!(format!("arn:aws:s3:::data-{}/*", account));
            s
        })
        .collect();
    ConfigNode::from(json!({"Version": "2012-10-17", "Statement": statements}))
}

#[test]
fn test_policy_comparison_across_accounts() {
    let read = json!({"Effect": "Allow", "Action": "s3:GetObject"});
    let deny = json!({"Effect": "Deny", "Action": "s3:DeleteObject"});
    let write = json!({"Effect": "Allow", "Action": "s3:PutObject"});

    let source = policy("111122223333", vec![read.clone(), deny]);
    let target = policy("444455556666", vec![read, write]);

    let rules = MaskingRules::aws_defaults().unwrap();
    let comparison = compare_policies(Some(&source), Some(&target), &rules).unwrap();

    assert_eq!(comparison.missing.len(), 1);
    assert_eq!(comparison.extra.len(), 1);
    assert_eq!(describe_statement(&comparison.missing[0]), "Deny s3:DeleteObject");
    assert_eq!(describe_statement(&comparison.extra[0]), "Allow s3:PutObject");

    let report = render_policy_report(&comparison, &SideLabels::default());
    assert!(report.contains("❌ Found 1 Permissions MISSING in Target"));
    assert!(report.contains("   Missing: Deny s3:DeleteObject"));
}

#[test]
fn test_policy_match_after_masking() {
    let statement = json!({"Effect": "Allow", "Action": ["s3:GetObject", "s3:ListBucket"]});
    let source = policy("111122223333", vec![statement.clone()]);
    let target = policy("999988887777", vec![statement]);

    let rules = MaskingRules::aws_defaults().unwrap();
    let comparison = compare_policies(Some(&source), Some(&target), &rules).unwrap();
    assert!(comparison.is_match());
    assert_eq!(
        render_policy_report(&comparison, &SideLabels::default()),
        "✅ Policies Match Semantically"
    );
}

#[test]
fn test_policy_missing_on_one_side() {
    let source = policy("111122223333", vec![json!({"Effect": "Allow", "Action": "s3:*"})]);
    let rules = MaskingRules::aws_defaults().unwrap();

    let comparison = compare_policies(Some(&source), None, &rules).unwrap();
    assert_eq!(comparison.missing.len(), 1);
    assert!(comparison.extra.is_empty());
}

#[test]
fn test_policy_risks_read_unmasked_target() {
    let source = policy("111122223333", vec![json!({"Effect": "Allow", "Action": "s3:GetObject"})]);
    let target = ConfigNode::from(json!({"Statement": [
        {
            "Effect": "Allow",
            "Principal": {"AWS": "arn:aws:iam::444455556666:user/deploy"},
            "Action": "s3:GetObject",
            "Resource": "arn:aws:s3:::data-444455556666/*"
        },
        {"Effect": "Allow", "Action": ["s3:GetObject", "s3:DeleteObject"], "Resource": "*"}
    ]}));

    let rules = MaskingRules::aws_defaults().unwrap();
    let comparison = compare_policies(Some(&source), Some(&target), &rules).unwrap();

    let kinds: Vec<(PolicyRiskKind, Severity)> =
        comparison.risks.iter().map(|r| (r.kind, r.severity)).collect();
    assert_eq!(
        kinds,
        vec![
            (PolicyRiskKind::HardcodedUser, Severity::Suspicious),
            (PolicyRiskKind::OverPermissive, Severity::Critical),
        ]
    );
}

// ============================================================================
// BUCKET
// ============================================================================

fn bucket(account: &str, versioning: &str, encrypted: bool) -> ConfigNode {
    let mut document = json!({
        "Versioning": versioning,
        "Policy": policy(account, vec![json!({"Effect": "Allow", "Action": "s3:GetObject"})])
            .to_value()
            .to_string()
    });
    if encrypted {
        document["Encryption"] = json!({
            "ServerSideEncryptionConfiguration": {
                "Rules": [{"ApplyServerSideEncryptionByDefault": {"SSEAlgorithm": "aws:kms"}}]
            }
        });
    }
    ConfigNode::from(document)
}

#[test]
fn test_bucket_policies_match_across_accounts() {
    let rules = MaskingRules::aws_defaults().unwrap();
    let audit = audit_bucket(
        &bucket("111122223333", "Enabled", true),
        &bucket("444455556666", "Enabled", true),
        &rules,
    )
    .unwrap();
    assert!(audit.is_match());
    assert_eq!(audit.critical_count(), 0);
}

#[test]
fn test_bucket_report_flags_encryption_and_versioning() {
    let rules = MaskingRules::aws_defaults().unwrap();
    let audit = audit_bucket(
        &bucket("111122223333", "Enabled", true),
        &bucket("444455556666", "Suspended", false),
        &rules,
    )
    .unwrap();
    assert_eq!(audit.issue_count(), 2);
    assert_eq!(audit.critical_count(), 1);

    let report = render_bucket_report(&audit, &SideLabels::new("dev", "prod"));
    assert!(report.contains("❌ Encryption: MISMATCH (Critical)"));
    assert!(report.contains("⚠️  Versioning: MISMATCH (Suspicious) dev: Enabled | prod: Suspended"));
    assert!(report.ends_with("✅ Policies Match Semantically"));
}

// ============================================================================
// ECS
// ============================================================================

fn env(pairs: &[(&str, &str)]) -> serde_json::Value {
    json!(pairs
        .iter()
        .map(|(name, value)| json!({"name": name, "value": value}))
        .collect::<Vec<_>>())
}

fn task_definitions() -> (ConfigNode, ConfigNode) {
    let source = json!({
        "family": "orders",
        "containerDefinitions": [{
            "name": "app",
            "image": "registry/orders:1.0",
            "cpu": 256,
            "memory": 512,
            "environment": env(&[
                ("DB_HOST", "dev-db.internal"),
                ("LOG_LEVEL", "INFO"),
                ("FEATURE_X", "on"),
                ("API_SECRET", "plain-text"),
                ("ONLY_SRC", "1"),
                ("QUEUE_URL", "https://sqs.eu-west-1.amazonaws.com/q"),
            ])
        }]
    });
    let target = json!({
        "taskDefinition": {
            "family": "orders",
            "containerDefinitions": [{
                "name": "app",
                "image": "registry/orders:1.1",
                "cpu": 256,
                "memory": 1024,
                "environment": env(&[
                    ("DB_HOST", "prod-db.internal"),
                    ("LOG_LEVEL", "DEBUG"),
                    ("FEATURE_X", "on"),
                    ("ONLY_TGT", "2"),
                    ("QUEUE_URL", "https://sqs.us-east-1.amazonaws.com/q"),
                ]),
                "secrets": [{
                    "name": "API_SECRET",
                    "valueFrom": "arn:aws:secretsmanager:eu-west-1:444455556666:secret:api"
                }]
            }]
        }
    });
    (ConfigNode::from(source), ConfigNode::from(target))
}

#[test]
fn test_ecs_audit_classifies_every_variable() {
    let (source, target) = task_definitions();
    let options = AuditConfig::default().ecs_options(Some("eu-ireland")).unwrap();
    let audit = audit_task_definitions(&source, &target, &options).unwrap();

    let findings: Vec<(&str, EnvStatus, Severity)> = audit
        .findings
        .iter()
        .map(|f| (f.name.as_str(), f.status, f.severity))
        .collect();
    assert_eq!(
        findings,
        vec![
            ("API_SECRET", EnvStatus::TypeRisk, Severity::Critical),
            ("DB_HOST", EnvStatus::ConfigDiff, Severity::Expected),
            ("LOG_LEVEL", EnvStatus::ValueDrift, Severity::Suspicious),
            ("ONLY_SRC", EnvStatus::MissingInTarget, Severity::Critical),
            ("ONLY_TGT", EnvStatus::MissingInSource, Severity::Critical),
            ("QUEUE_URL", EnvStatus::RegionViolation, Severity::Critical),
        ]
    );

    assert!(!audit.image.is_match());
    assert!(audit.cpu.is_match());
    assert!(!audit.memory.is_match());
    assert_eq!(audit.critical_count(), 5);
    assert_eq!(audit.issue_count(), 6);
}

#[test]
fn test_ecs_without_region_context_skips_region_rule() {
    let (source, target) = task_definitions();
    let audit = audit_task_definitions(&source, &target, &EcsOptions::default()).unwrap();

    let queue = audit.findings.iter().find(|f| f.name == "QUEUE_URL").unwrap();
    assert_eq!(queue.status, EnvStatus::ConfigDiff);
    assert_eq!(queue.severity, Severity::Expected);
}

#[test]
fn test_ecs_rejects_document_without_containers() {
    let (source, _) = task_definitions();
    let bogus = ConfigNode::from(json!({"family": "orders"}));

    let result = audit_task_definitions(&source, &bogus, &EcsOptions::default());
    assert!(matches!(result, Err(AuditError::InvalidTaskDefinition(_))));
}

#[test]
fn test_ecs_report_groups_by_severity() {
    let (source, target) = task_definitions();
    let options = AuditConfig::default().ecs_options(Some("eu-ireland")).unwrap();
    let audit = audit_task_definitions(&source, &target, &options).unwrap();
    let report = render_ecs_report(&audit, &SideLabels::new("dev", "prod"));

    let critical = report.find("--- Critical (4) ---").unwrap();
    let suspicious = report.find("--- Suspicious (1) ---").unwrap();
    let expected = report.find("--- Expected (1) ---").unwrap();
    assert!(critical < suspicious && suspicious < expected);
    assert!(report.contains("⚠️  image: dev: registry/orders:1.0 | prod: registry/orders:1.1"));
    assert!(report.contains("✅ cpu: 256"));
    assert!(report.contains("❌ 5 critical, 1 suspicious"));
}
