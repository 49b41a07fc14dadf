//! Fix-script synthesis.
//!
//! A script is picked from per-issue, per-dialect templates and rendered
//! against the asset's schema, table and column. Output is plain text meant
//! for human review; nothing here talks to a database.

mod batch;
mod builder;
mod pii;
mod quality;

use common::models::{Column, QualityIssue};
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::classifier::{self, Classification};
use crate::dialect::Dialect;
use builder::ScriptBuilder;

pub use batch::BATCH_DIVIDER;
pub(crate) use builder::comment_lines;

pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Encrypt,
    Mask,
    EncryptAndMask,
    NullValues,
    DuplicateValues,
    InvalidFormat,
    MissingForeignKey,
    MissingIndex,
    OutlierValues,
    Diagnostic,
    Supplied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixScript {
    pub kind: ScriptKind,
    pub dialect: Dialect,
    pub text: String,
    pub warnings: Vec<String>,
}

impl fmt::Display for FixScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders fix scripts for the columns of one asset.
#[derive(Debug, Clone)]
pub struct FixScriptSynthesizer {
    asset_name: String,
    schema: String,
    dialect: Dialect,
}

impl FixScriptSynthesizer {
    /// A blank or missing schema falls back to `public`.
    pub fn new(asset_name: impl Into<String>, schema: Option<&str>, dialect: Dialect) -> Self {
        let schema = schema
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SCHEMA);

        Self {
            asset_name: asset_name.into(),
            schema: schema.to_string(),
            dialect,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn synthesize(&self, column: &Column, issue: &QualityIssue) -> FixScript {
        let classification = classifier::classify(column, issue);
        self.synthesize_classified(column, issue, &classification)
    }

    /// Like [`synthesize`](Self::synthesize) with a caller-supplied
    /// classification, e.g. one already merged with a PII rule.
    pub fn synthesize_classified(
        &self,
        column: &Column,
        issue: &QualityIssue,
        classification: &Classification,
    ) -> FixScript {
        debug!(
            table = %self.asset_name,
            column = %column.column_name,
            issue_type = %issue.issue_type,
            dialect = %self.dialect,
            pii = classification.is_pii_issue,
            "Synthesizing fix script"
        );

        let b = ScriptBuilder::new(
            self.dialect,
            &self.schema,
            &self.asset_name,
            &column.column_name,
        );

        if classification.needs_pii_script() {
            pii::render(b, issue, classification)
        } else {
            quality::render(b, column, issue)
        }
    }

    /// Uses the backend-supplied script when the issue carries one.
    pub fn resolve(&self, column: &Column, issue: &QualityIssue) -> FixScript {
        match issue.supplied_fix_script() {
            Some(text) => FixScript {
                kind: ScriptKind::Supplied,
                dialect: self.dialect,
                text: text.trim_end().to_string(),
                warnings: Vec::new(),
            },
            None => self.synthesize(column, issue),
        }
    }

    pub fn batch(&self, columns: &[Column]) -> String {
        batch::render(self, columns)
    }

    /// Batch layout with each issue's script produced by `script_for`.
    pub fn batch_with<F>(&self, columns: &[Column], script_for: F) -> String
    where
        F: FnMut(&Column, &QualityIssue) -> FixScript,
    {
        batch::render_with(self, columns, script_for)
    }
}

/// One-shot form of [`FixScriptSynthesizer::synthesize`] taking the dialect
/// as free text.
pub fn synthesize_fix_script(
    column: &Column,
    issue: &QualityIssue,
    asset_name: &str,
    schema_name: Option<&str>,
    dialect: &str,
) -> FixScript {
    FixScriptSynthesizer::new(asset_name, schema_name, Dialect::detect(dialect))
        .synthesize(column, issue)
}

/// Concatenated fixes for every issue of every column ("copy all fixes").
pub fn synthesize_batch_script(
    columns: &[Column],
    asset_name: &str,
    schema_name: Option<&str>,
    dialect: &str,
) -> String {
    FixScriptSynthesizer::new(asset_name, schema_name, Dialect::detect(dialect)).batch(columns)
}

/// Common preamble: severity, affected rows and the issue text, all as
/// comments.
fn issue_context(b: &mut ScriptBuilder, issue: &QualityIssue) {
    b.comment(&format!("Severity: {}", issue.severity.as_str()));
    if let Some(rows) = issue.affected_rows {
        b.comment(&format!("Affected rows: {rows}"));
    }
    if let Some(title) = issue.title.as_deref().filter(|t| !t.trim().is_empty()) {
        b.comment(&format!("Issue: {title}"));
    }
    if let Some(description) = issue.description.as_deref().filter(|d| !d.trim().is_empty()) {
        b.comment(description);
    }
    b.comment("Suggested fix: review and test in a non-production environment before running.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defaults_to_public() {
        assert_eq!(FixScriptSynthesizer::new("t", None, Dialect::MySql).schema(), "public");
        assert_eq!(FixScriptSynthesizer::new("t", Some("  "), Dialect::MySql).schema(), "public");
        assert_eq!(FixScriptSynthesizer::new("t", Some("crm"), Dialect::MySql).schema(), "crm");
    }

    #[test]
    fn supplied_script_wins_in_resolve() {
        let synth = FixScriptSynthesizer::new("users", None, Dialect::Postgres);
        let column = Column::new("email");
        let issue = QualityIssue::new("null_values").with_fix_script("UPDATE users SET email = 'n/a';\n");

        let script = synth.resolve(&column, &issue);
        assert_eq!(script.kind, ScriptKind::Supplied);
        assert_eq!(script.text, "UPDATE users SET email = 'n/a';");

        let synthesized = synth.synthesize(&column, &issue);
        assert_eq!(synthesized.kind, ScriptKind::NullValues);
    }

    #[test]
    fn pii_issue_without_requirements_falls_through() {
        let column = Column::new("ssn").with_pii_type("ssn");
        let issue = QualityIssue::new("pii_unencrypted");
        let script = synthesize_fix_script(&column, &issue, "people", None, "postgresql");
        assert_eq!(script.kind, ScriptKind::Diagnostic);
        assert!(script.text.starts_with("-- Review pii_unencrypted"));
    }

    #[test]
    fn display_is_the_text() {
        let column = Column::new("email");
        let issue = QualityIssue::new("missing_index");
        let script = synthesize_fix_script(&column, &issue, "users", None, "mysql");
        assert_eq!(script.to_string(), script.text);
    }
}
