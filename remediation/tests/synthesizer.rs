use common::models::{Column, QualityIssue};
use remediation::masking::{MaskPattern, masking_expression};
use remediation::{Dialect, ScriptKind, classify, synthesize_batch_script, synthesize_fix_script};

const NON_PII_TYPES: &[&str] = &[
    "null_values",
    "duplicate_values",
    "invalid_format",
    "missing_fk",
    "missing_index",
    "outlier_values",
    "stale_partition",
];

const DIALECTS: &[&str] = &["postgresql", "sqlserver", "mysql", "oracle"];

#[test]
fn non_pii_scripts_open_with_a_comment_naming_the_issue() {
    let column = Column::new("email").with_foreign_key("accounts", "id");
    for issue_type in NON_PII_TYPES {
        for dialect in DIALECTS {
            let script = synthesize_fix_script(
                &column,
                &QualityIssue::new(*issue_type),
                "customers",
                None,
                dialect,
            );
            let first = script.text.lines().next().unwrap();
            assert!(first.starts_with("-- "), "{issue_type}/{dialect}: {first}");
            assert!(first.contains(issue_type), "{issue_type}/{dialect}: {first}");
        }
    }
}

#[test]
fn synthesis_is_deterministic() {
    let column = Column::new("ssn").with_pii_type("ssn");
    let issue = QualityIssue::new("pii_unencrypted")
        .with_description("Requires Encryption: Yes\nRequires Masking: Yes");
    for dialect in DIALECTS {
        let first = synthesize_fix_script(&column, &issue, "people", Some("hr"), dialect);
        let second = synthesize_fix_script(&column, &issue, "people", Some("hr"), dialect);
        assert_eq!(first, second);
    }
}

#[test]
fn duplicate_removal_dispatches_on_dialect() {
    let column = Column::new("order_ref");
    let issue = QualityIssue::new("duplicate_values");
    let render = |dialect| synthesize_fix_script(&column, &issue, "orders", None, dialect).text;

    assert!(render("PostgreSQL 16").contains("ctid"));
    assert!(render("Microsoft SQL Server").contains("ROW_NUMBER"));
    assert!(render("mssql").contains("ROW_NUMBER"));
    assert!(render("mysql").contains("DELETE t1 FROM"));
    assert!(render("mariadb").contains("DELETE t1 FROM"));
}

#[test]
fn email_masking_expressions() {
    let expr = |dialect| masking_expression(MaskPattern::Email, dialect, "email");
    assert!(expr(Dialect::Postgres).contains("SPLIT_PART"));
    assert!(expr(Dialect::SqlServer).contains("CHARINDEX"));
    assert!(expr(Dialect::MySql).contains("SUBSTRING_INDEX"));
}

#[test]
fn bare_pii_issue_classifies_as_default() {
    let classification = classify(&Column::new("notes"), &QualityIssue::new("pii_unencrypted"));
    assert!(classification.is_pii_issue);
    assert_eq!(classification.pii_type.as_str(), "default");
}

#[test]
fn ssn_encryption_on_postgres() {
    let column = Column::new("ssn").with_pii_type("ssn");
    let issue = QualityIssue::new("pii_unencrypted").with_description("Requires Encryption: Yes");
    let script = synthesize_fix_script(&column, &issue, "people", None, "postgresql");

    assert_eq!(script.kind, ScriptKind::Encrypt);
    assert!(script.text.contains("CREATE EXTENSION IF NOT EXISTS pgcrypto;"));
    assert!(script.text.contains("pgp_sym_encrypt(ssn::text"));
    assert!(script.text.contains("pgp_sym_decrypt"));
}

#[test]
fn encryption_per_dialect() {
    let column = Column::new("card").with_pii_type("credit_card");
    let issue = QualityIssue::new("pii_detected").with_description("Requires Encryption: Yes");

    let mssql = synthesize_fix_script(&column, &issue, "payments", Some("dbo"), "sqlserver").text;
    assert!(mssql.contains("CREATE MASTER KEY"));
    assert!(mssql.contains("EncryptByKey"));
    assert!(mssql.contains("DecryptByKey"));

    let mysql = synthesize_fix_script(&column, &issue, "payments", None, "mysql").text;
    assert!(mysql.contains("AES_ENCRYPT"));
    assert!(mysql.contains("AES_DECRYPT"));
}

#[test]
fn masking_offers_alternatives() {
    let column = Column::new("email").with_pii_type("email");
    let issue = QualityIssue::new("pii_detected").with_description("Requires Masking: Yes");

    let pg = synthesize_fix_script(&column, &issue, "users", None, "postgres");
    assert_eq!(pg.kind, ScriptKind::Mask);
    assert!(pg.text.contains("CREATE OR REPLACE VIEW public.users_masked"));
    assert!(pg.text.contains("CREATE OR REPLACE FUNCTION public.mask_email"));
    assert!(pg.text.contains("email_masked"));

    let mysql = synthesize_fix_script(&column, &issue, "users", None, "mysql");
    assert!(!mysql.text.contains("CREATE OR REPLACE FUNCTION"));
}

#[test]
fn null_values_on_every_dialect() {
    let column = Column::new("email");
    for dialect in DIALECTS {
        let text = synthesize_fix_script(&column, &QualityIssue::new("null_values"), "users", None, dialect).text;
        assert!(text.contains("SET email = '<default_value>'"), "{dialect}");
        assert!(text.contains("ALTER TABLE public.users"), "{dialect}");
        assert!(text.contains("SET NOT NULL"), "{dialect}");
    }
}

#[test]
fn missing_fk_references_declared_target() {
    let column = Column::new("order_id").with_foreign_key("orders", "order_id");
    let text = synthesize_fix_script(&column, &QualityIssue::new("missing_fk"), "order_items", None, "postgresql").text;
    assert!(text.contains("REFERENCES orders(order_id)"));
}

#[test]
fn hostile_identifiers_are_quoted() {
    let column = Column::new("email; DROP TABLE users; --");
    let script = synthesize_fix_script(&column, &QualityIssue::new("null_values"), "users", None, "postgresql");
    assert!(script.text.contains("\"email; DROP TABLE users; --\""));
    assert!(!script.warnings.is_empty());
}

#[test]
fn batch_concatenates_every_issue() {
    let columns = vec![
        Column::new("email")
            .with_pii_type("email")
            .with_issue(QualityIssue::new("pii_detected").with_description("Requires Masking: Yes"))
            .with_issue(QualityIssue::new("null_values")),
        Column::new("id"),
        Column::new("total").with_issue(QualityIssue::new("outlier_values")),
    ];

    let text = synthesize_batch_script(&columns, "orders", None, "postgresql");
    assert!(text.contains("-- email: pii_detected\n"));
    assert!(text.contains("-- email: null_values\n"));
    assert!(text.contains("-- total: outlier_values\n"));
    assert_eq!(text.matches(remediation::synthesizer::BATCH_DIVIDER).count(), 3);
}
