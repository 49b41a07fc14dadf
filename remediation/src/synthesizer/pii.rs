use common::models::QualityIssue;

use super::builder::ScriptBuilder;
use super::{FixScript, ScriptKind, issue_context};
use crate::classifier::{Classification, RemediationCategory};
use crate::dialect::{Dialect, string_literal};
use crate::masking::{MaskPattern, masking_expression};

const ENCRYPTION_KEY: &str = "<encryption_key>";
const MASTER_KEY_PASSWORD: &str = "<master_key_password>";
const CERTIFICATE: &str = "PiiColumnCertificate";
const SYMMETRIC_KEY: &str = "PiiColumnKey";

pub(super) fn render(
    mut b: ScriptBuilder,
    issue: &QualityIssue,
    classification: &Classification,
) -> FixScript {
    let category = classification.category();
    let action = match category {
        RemediationCategory::EncryptAndMask => "Encrypt and mask",
        RemediationCategory::Encrypt => "Encrypt",
        RemediationCategory::Mask | RemediationCategory::None => "Mask",
    };
    let header = format!(
        "{action} PII column {}.{} ({}) for {}",
        b.table(),
        b.column(),
        classification.pii_type,
        b.dialect()
    );
    b.comment(&header);
    issue_context(&mut b, issue);

    let pattern = classification.pii_type.mask_pattern();
    let kind = match category {
        RemediationCategory::Encrypt => {
            b.comment(&format!("Replace {ENCRYPTION_KEY} with a key held in your secrets manager."));
            encrypt_steps(&mut b);
            swap_steps(&mut b);
            ScriptKind::Encrypt
        }
        RemediationCategory::EncryptAndMask => {
            b.comment(&format!("Replace {ENCRYPTION_KEY} with a key held in your secrets manager."));
            encrypt_steps(&mut b);
            mask_steps(&mut b, pattern);
            swap_steps(&mut b);
            ScriptKind::EncryptAndMask
        }
        RemediationCategory::Mask | RemediationCategory::None => {
            mask_steps(&mut b, pattern);
            ScriptKind::Mask
        }
    };

    b.finish(kind)
}

fn encrypted_column(b: &mut ScriptBuilder) -> String {
    let raw = format!("{}_encrypted", b.column_name());
    b.ident(&raw)
}

fn backup_table(b: &mut ScriptBuilder) -> String {
    let raw = format!("{}_backup", b.table_name());
    b.qualified(&raw)
}

fn encrypt_steps(b: &mut ScriptBuilder) {
    let table = b.table().to_string();
    let col = b.column().to_string();
    let enc = encrypted_column(b);
    let backup = backup_table(b);
    let key = ENCRYPTION_KEY;

    match b.dialect() {
        Dialect::Postgres => {
            b.step("Enable pgcrypto", "CREATE EXTENSION IF NOT EXISTS pgcrypto;");
            b.step(
                "Back up the table",
                &format!("CREATE TABLE {backup} AS SELECT * FROM {table};"),
            );
            b.step(
                "Add an encrypted column",
                &format!("ALTER TABLE {table} ADD COLUMN {enc} BYTEA;"),
            );
            b.step(
                "Encrypt existing values",
                &format!(
                    "UPDATE {table}\nSET {enc} = pgp_sym_encrypt({col}::text, '{key}')\nWHERE {col} IS NOT NULL;"
                ),
            );
            b.step(
                "Verify that decrypted values match the originals",
                &format!(
                    "SELECT {col},\n       pgp_sym_decrypt({enc}, '{key}') AS decrypted_value,\n       {col}::text = pgp_sym_decrypt({enc}, '{key}') AS matches\nFROM {table}\nWHERE {col} IS NOT NULL\nLIMIT 10;"
                ),
            );
        }
        Dialect::SqlServer => {
            b.step(
                "Create the master key, certificate and symmetric key",
                &format!(
                    "IF NOT EXISTS (SELECT * FROM sys.symmetric_keys WHERE name = '##MS_DatabaseMasterKey##')\n    CREATE MASTER KEY ENCRYPTION BY PASSWORD = '{MASTER_KEY_PASSWORD}';\nIF NOT EXISTS (SELECT * FROM sys.certificates WHERE name = '{CERTIFICATE}')\n    CREATE CERTIFICATE {CERTIFICATE} WITH SUBJECT = 'PII column encryption';\nIF NOT EXISTS (SELECT * FROM sys.symmetric_keys WHERE name = '{SYMMETRIC_KEY}')\n    CREATE SYMMETRIC KEY {SYMMETRIC_KEY} WITH ALGORITHM = AES_256\n    ENCRYPTION BY CERTIFICATE {CERTIFICATE};"
                ),
            );
            b.step(
                "Back up the table",
                &format!("SELECT * INTO {backup} FROM {table};"),
            );
            b.step(
                "Add an encrypted column",
                &format!("ALTER TABLE {table} ADD {enc} VARBINARY(MAX);"),
            );
            b.step(
                "Encrypt existing values",
                &format!(
                    "OPEN SYMMETRIC KEY {SYMMETRIC_KEY} DECRYPTION BY CERTIFICATE {CERTIFICATE};\nUPDATE {table}\nSET {enc} = EncryptByKey(Key_GUID('{SYMMETRIC_KEY}'), CAST({col} AS NVARCHAR(MAX)))\nWHERE {col} IS NOT NULL;"
                ),
            );
            b.step(
                "Verify that decrypted values match the originals",
                &format!(
                    "SELECT TOP 10 {col},\n       CAST(DecryptByKey({enc}) AS NVARCHAR(MAX)) AS decrypted_value\nFROM {table}\nWHERE {col} IS NOT NULL;\nCLOSE SYMMETRIC KEY {SYMMETRIC_KEY};"
                ),
            );
        }
        Dialect::MySql => {
            b.step(
                "Back up the table",
                &format!("CREATE TABLE {backup} AS SELECT * FROM {table};"),
            );
            b.step(
                "Add an encrypted column",
                &format!("ALTER TABLE {table} ADD COLUMN {enc} BLOB;"),
            );
            b.step(
                "Encrypt existing values",
                &format!(
                    "UPDATE {table}\nSET {enc} = AES_ENCRYPT({col}, '{key}')\nWHERE {col} IS NOT NULL;"
                ),
            );
            b.step(
                "Verify that decrypted values match the originals",
                &format!(
                    "SELECT {col},\n       CAST(AES_DECRYPT({enc}, '{key}') AS CHAR) AS decrypted_value\nFROM {table}\nWHERE {col} IS NOT NULL\nLIMIT 10;"
                ),
            );
        }
    }
}

/// Destructive replacement of the plaintext column, always commented out.
fn swap_steps(b: &mut ScriptBuilder) {
    let table = b.table().to_string();
    let col = b.column().to_string();
    let enc = encrypted_column(b);

    let sql = match b.dialect() {
        Dialect::Postgres | Dialect::MySql => format!(
            "ALTER TABLE {table} DROP COLUMN {col};\nALTER TABLE {table} RENAME COLUMN {enc} TO {col};"
        ),
        Dialect::SqlServer => {
            let object = string_literal(&format!("{table}.{enc}"));
            format!(
                "ALTER TABLE {table} DROP COLUMN {col};\nEXEC sp_rename '{object}', '{}', 'COLUMN';",
                string_literal(b.column_name())
            )
        }
    };
    b.commented_step(
        "Replace the plaintext column after verification (destructive)",
        &sql,
    );
}

fn mask_steps(b: &mut ScriptBuilder, pattern: MaskPattern) {
    let dialect = b.dialect();
    let table = b.table().to_string();
    let col = b.column().to_string();
    let expr = masking_expression(pattern, dialect, &col);

    let masked_raw = format!("{}_masked", b.column_name());
    let masked_col = b.ident(&masked_raw);
    let view_raw = format!("{}_masked", b.table_name());
    let view = b.qualified(&view_raw);

    let create_view = match dialect {
        Dialect::SqlServer => "CREATE OR ALTER VIEW",
        Dialect::Postgres | Dialect::MySql => "CREATE OR REPLACE VIEW",
    };
    b.step(
        "Option A: expose masked values through a view",
        &format!(
            "{create_view} {view} AS\nSELECT t.*,\n       {expr} AS {masked_col}\nFROM {table} AS t;"
        ),
    );
    b.comment("Grant readers access to the view instead of the base table.");

    if dialect == Dialect::Postgres {
        let function_raw = format!("mask_{}", b.column_name());
        let function = b.qualified(&function_raw);
        let body = masking_expression(pattern, dialect, "value");
        b.step(
            "Option B: reusable masking function",
            &format!(
                "CREATE OR REPLACE FUNCTION {function}(value TEXT)\nRETURNS TEXT AS $$\n    SELECT {body};\n$$ LANGUAGE SQL IMMUTABLE;"
            ),
        );
        b.comment(&format!("Usage: SELECT {function}({col}::text) FROM {table};"));
    }

    let text_type = match dialect {
        Dialect::Postgres => "TEXT",
        Dialect::SqlServer => "NVARCHAR(255)",
        Dialect::MySql => "VARCHAR(255)",
    };
    let add_column = match dialect {
        Dialect::SqlServer => format!("ALTER TABLE {table} ADD {masked_col} {text_type};"),
        Dialect::Postgres | Dialect::MySql => {
            format!("ALTER TABLE {table} ADD COLUMN {masked_col} {text_type};")
        }
    };
    let option = if dialect == Dialect::Postgres { "C" } else { "B" };
    b.step(
        &format!("Option {option}: store a masked copy alongside the original"),
        &format!("{add_column}\nUPDATE {table}\nSET {masked_col} = {expr}\nWHERE {col} IS NOT NULL;"),
    );
}
