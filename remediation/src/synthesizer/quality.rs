use common::models::{Column, IssueType, QualityIssue};
use once_cell::sync::Lazy;
use regex::Regex;

use super::builder::ScriptBuilder;
use super::{FixScript, ScriptKind, issue_context};
use crate::dialect::Dialect;

const DEFAULT_VALUE: &str = "<default_value>";
const EXPECTED_PATTERN: &str = "<expected_pattern>";
const FALLBACK_TYPE: &str = "VARCHAR(255)";

static DATA_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z][a-z0-9_ ]*(\(\s*(\d+|max)(\s*,\s*\d+)?\s*\))?$")
        .expect("Invalid data type regex")
});

pub(super) fn render(mut b: ScriptBuilder, column: &Column, issue: &QualityIssue) -> FixScript {
    let kind = match &issue.issue_type {
        IssueType::NullValues => ScriptKind::NullValues,
        IssueType::DuplicateValues => ScriptKind::DuplicateValues,
        IssueType::InvalidFormat => ScriptKind::InvalidFormat,
        IssueType::MissingFk => ScriptKind::MissingForeignKey,
        IssueType::MissingIndex => ScriptKind::MissingIndex,
        IssueType::OutlierValues => ScriptKind::OutlierValues,
        IssueType::PiiUnencrypted | IssueType::PiiDetected | IssueType::Other(_) => {
            ScriptKind::Diagnostic
        }
    };

    let header = if kind == ScriptKind::Diagnostic {
        format!(
            "Review {} in {}.{}: no automated fix template for this issue ({})",
            issue.issue_type,
            b.table(),
            b.column(),
            b.dialect()
        )
    } else {
        format!(
            "Fix {} in {}.{} ({})",
            issue.issue_type,
            b.table(),
            b.column(),
            b.dialect()
        )
    };
    b.comment(&header);
    issue_context(&mut b, issue);

    match kind {
        ScriptKind::NullValues => null_values(&mut b, column),
        ScriptKind::DuplicateValues => duplicate_values(&mut b),
        ScriptKind::InvalidFormat => invalid_format(&mut b),
        ScriptKind::MissingForeignKey => missing_foreign_key(&mut b, column),
        ScriptKind::MissingIndex => missing_index(&mut b),
        ScriptKind::OutlierValues => outlier_values(&mut b),
        _ => diagnostic(&mut b),
    }

    b.finish(kind)
}

/// Column type for statements that must restate it. Anything that does not
/// look like a type name is replaced rather than interpolated.
fn column_type(b: &mut ScriptBuilder, column: &Column) -> String {
    let declared = column.data_type.trim();
    if DATA_TYPE_REGEX.is_match(declared) {
        declared.to_uppercase()
    } else {
        b.warn(format!(
            "column data type {declared:?} is unknown or unusable; assuming {FALLBACK_TYPE}"
        ));
        FALLBACK_TYPE.to_string()
    }
}

fn null_values(b: &mut ScriptBuilder, column: &Column) {
    let table = b.table().to_string();
    let col = b.column().to_string();

    b.step(
        "Count rows with missing values",
        &format!("SELECT COUNT(*) AS null_rows\nFROM {table}\nWHERE {col} IS NULL;"),
    );
    b.comment(&format!("Replace {DEFAULT_VALUE} with a value appropriate for {col}."));
    b.step(
        "Backfill a default value",
        &format!("UPDATE {table}\nSET {col} = '{DEFAULT_VALUE}'\nWHERE {col} IS NULL;"),
    );

    let enforce = match b.dialect() {
        Dialect::Postgres => format!("ALTER TABLE {table}\nALTER COLUMN {col} SET NOT NULL;"),
        Dialect::SqlServer => {
            let ty = column_type(b, column);
            format!("ALTER TABLE {table}\nALTER COLUMN {col} {ty} NOT NULL;")
        }
        Dialect::MySql => {
            let ty = column_type(b, column);
            format!("ALTER TABLE {table}\nMODIFY {col} {ty} NOT NULL;")
        }
    };
    b.step(&format!("SET NOT NULL on {col}"), &enforce);
}

fn duplicate_values(b: &mut ScriptBuilder) {
    let table = b.table().to_string();
    let col = b.column().to_string();

    b.step(
        "Inspect duplicated values",
        &format!(
            "SELECT {col}, COUNT(*) AS occurrences\nFROM {table}\nGROUP BY {col}\nHAVING COUNT(*) > 1\nORDER BY occurrences DESC;"
        ),
    );

    let delete = match b.dialect() {
        Dialect::Postgres => format!(
            "DELETE FROM {table} a\nUSING {table} b\nWHERE a.ctid > b.ctid\n  AND a.{col} = b.{col};"
        ),
        Dialect::SqlServer => format!(
            "WITH ranked AS (\n    SELECT {col},\n           ROW_NUMBER() OVER (PARTITION BY {col} ORDER BY (SELECT NULL)) AS row_num\n    FROM {table}\n    WHERE {col} IS NOT NULL\n)\nDELETE FROM ranked\nWHERE row_num > 1;"
        ),
        Dialect::MySql => {
            b.warn("the MySQL de-duplication keeps the row with the lowest `id`; adjust if the key column differs");
            format!(
                "DELETE t1 FROM {table} t1\nINNER JOIN {table} t2\n    ON t1.{col} = t2.{col}\n   AND t1.id > t2.id;"
            )
        }
    };
    b.step("Remove duplicates, keeping one row per value", &delete);

    let constraint_raw = format!("uq_{}_{}", b.table_name(), b.column_name());
    let constraint = b.ident(&constraint_raw);
    b.commented_step(
        "Prevent new duplicates",
        &format!("ALTER TABLE {table} ADD CONSTRAINT {constraint} UNIQUE ({col});"),
    );
}

fn invalid_format(b: &mut ScriptBuilder) {
    let table = b.table().to_string();
    let col = b.column().to_string();

    let (mismatch, strip) = match b.dialect() {
        Dialect::Postgres => (
            format!("{col} !~ '{EXPECTED_PATTERN}'"),
            format!("REGEXP_REPLACE({col}, '[^a-zA-Z0-9]', '', 'g')"),
        ),
        Dialect::SqlServer => {
            b.warn("REGEXP_LIKE and REGEXP_REPLACE require SQL Server 2025 or Azure SQL");
            (
                format!("NOT REGEXP_LIKE({col}, '{EXPECTED_PATTERN}')"),
                format!("REGEXP_REPLACE({col}, '[^a-zA-Z0-9]', '')"),
            )
        }
        Dialect::MySql => (
            format!("{col} NOT REGEXP '{EXPECTED_PATTERN}'"),
            format!("REGEXP_REPLACE({col}, '[^a-zA-Z0-9]', '')"),
        ),
    };

    b.comment(&format!(
        "Replace {EXPECTED_PATTERN} with the format {col} must follow."
    ));
    b.step(
        "Find rows with an invalid format",
        &format!("SELECT {col}\nFROM {table}\nWHERE {mismatch};"),
    );
    b.step(
        "Strip non-alphanumeric characters",
        &format!("UPDATE {table}\nSET {col} = {strip}\nWHERE {mismatch};"),
    );
}

fn missing_foreign_key(b: &mut ScriptBuilder, column: &Column) {
    let table = b.table().to_string();
    let col = b.column().to_string();

    let target_table = column
        .foreign_key_table
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let target_column = column
        .foreign_key_column
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let ref_table = target_table.map(|t| b.ident(t)).unwrap_or_default();
    let ref_col = target_column.map(|c| b.ident(c)).unwrap_or_default();

    if target_table.is_some() && target_column.is_some() {
        b.step(
            "Find orphaned references",
            &format!(
                "SELECT c.{col}\nFROM {table} c\nLEFT JOIN {ref_table} p ON c.{col} = p.{ref_col}\nWHERE c.{col} IS NOT NULL\n  AND p.{ref_col} IS NULL;"
            ),
        );
    } else {
        b.warn("foreign key target is unknown; fill in the referenced table and column");
    }

    let fk_raw = format!("fk_{}_{}", b.table_name(), b.column_name());
    let fk = b.ident(&fk_raw);
    b.step(
        "Add the foreign key constraint",
        &format!(
            "ALTER TABLE {table}\nADD CONSTRAINT {fk}\nFOREIGN KEY ({col}) REFERENCES {ref_table}({ref_col});"
        ),
    );
}

fn missing_index(b: &mut ScriptBuilder) {
    let table = b.table().to_string();
    let col = b.column().to_string();
    let index_raw = format!("idx_{}_{}", b.table_name(), b.column_name());
    let index = b.ident(&index_raw);

    let sql = match b.dialect() {
        Dialect::Postgres => {
            format!("CREATE INDEX CONCURRENTLY IF NOT EXISTS {index}\nON {table} ({col});")
        }
        Dialect::SqlServer => format!("CREATE NONCLUSTERED INDEX {index}\nON {table} ({col});"),
        Dialect::MySql => format!("CREATE INDEX {index}\nON {table} ({col});"),
    };
    b.step("Create the missing index", &sql);
}

fn outlier_values(b: &mut ScriptBuilder) {
    let table = b.table().to_string();
    let col = b.column().to_string();

    let (mean, stddev) = match b.dialect() {
        Dialect::Postgres | Dialect::MySql => (
            format!("AVG({col}) OVER ()"),
            format!("STDDEV_SAMP({col}) OVER ()"),
        ),
        Dialect::SqlServer => (
            format!("AVG(CAST({col} AS FLOAT)) OVER ()"),
            format!("STDEV({col}) OVER ()"),
        ),
    };
    b.step(
        "Identify outliers with a z-score above 3",
        &format!(
            "WITH stats AS (\n    SELECT {col},\n           {mean} AS mean_value,\n           {stddev} AS stddev_value\n    FROM {table}\n    WHERE {col} IS NOT NULL\n)\nSELECT {col},\n       ({col} - mean_value) / NULLIF(stddev_value, 0) AS z_score\nFROM stats\nWHERE ABS(({col} - mean_value) / NULLIF(stddev_value, 0)) > 3\nORDER BY z_score DESC;"
        ),
    );

    let cap = match b.dialect() {
        Dialect::Postgres => format!(
            "WITH bounds AS (\n    SELECT PERCENTILE_CONT(0.01) WITHIN GROUP (ORDER BY {col}) AS lower_bound,\n           PERCENTILE_CONT(0.99) WITHIN GROUP (ORDER BY {col}) AS upper_bound\n    FROM {table}\n)\nUPDATE {table}\nSET {col} = LEAST(GREATEST({col}, bounds.lower_bound), bounds.upper_bound)\nFROM bounds\nWHERE {col} < bounds.lower_bound\n   OR {col} > bounds.upper_bound;"
        ),
        Dialect::SqlServer => format!(
            "WITH bounds AS (\n    SELECT DISTINCT\n           PERCENTILE_CONT(0.01) WITHIN GROUP (ORDER BY {col}) OVER () AS lower_bound,\n           PERCENTILE_CONT(0.99) WITHIN GROUP (ORDER BY {col}) OVER () AS upper_bound\n    FROM {table}\n)\nUPDATE t\nSET t.{col} = CASE WHEN t.{col} < b.lower_bound THEN b.lower_bound ELSE b.upper_bound END\nFROM {table} AS t\nCROSS JOIN bounds AS b\nWHERE t.{col} < b.lower_bound\n   OR t.{col} > b.upper_bound;"
        ),
        Dialect::MySql => {
            b.warn("PERCENTILE_CONT is available on MariaDB 10.3.3+; on MySQL compute the bounds separately");
            format!(
                "UPDATE {table} AS t\nCROSS JOIN (\n    SELECT DISTINCT\n           PERCENTILE_CONT(0.01) WITHIN GROUP (ORDER BY {col}) OVER () AS lower_bound,\n           PERCENTILE_CONT(0.99) WITHIN GROUP (ORDER BY {col}) OVER () AS upper_bound\n    FROM {table}\n) AS b\nSET t.{col} = LEAST(GREATEST(t.{col}, b.lower_bound), b.upper_bound)\nWHERE t.{col} < b.lower_bound\n   OR t.{col} > b.upper_bound;"
            )
        }
    };
    b.step("Cap values at the 1st and 99th percentiles", &cap);
}

fn diagnostic(b: &mut ScriptBuilder) {
    let table = b.table().to_string();
    let col = b.column().to_string();

    let frequencies = match b.dialect() {
        Dialect::SqlServer => format!(
            "SELECT TOP 100 {col}, COUNT(*) AS frequency\nFROM {table}\nGROUP BY {col}\nORDER BY frequency DESC;"
        ),
        Dialect::Postgres | Dialect::MySql => format!(
            "SELECT {col}, COUNT(*) AS frequency\nFROM {table}\nGROUP BY {col}\nORDER BY frequency DESC\nLIMIT 100;"
        ),
    };
    b.step("Inspect value frequencies", &frequencies);
    b.commented_step(
        "Example correction (edit before running)",
        &format!("UPDATE {table}\nSET {col} = '<corrected_value>'\nWHERE {col} = '<invalid_value>';"),
    );
}
