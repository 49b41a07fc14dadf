//! Helpers behind the CLI subcommands.

use catalog::models::{Envelope, ListPayload};
use common::models::{Column, IssueType};
use common::{Error, Result};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::classifier::{self, Classification, RemediationCategory};
use crate::synthesizer::FixScriptSynthesizer;

/// Reads columns from a JSON file: a bare array, `{"columns": [...]}`, or
/// either of those inside the API envelope.
pub fn load_columns(path: &Path) -> Result<Vec<Column>> {
    let raw = std::fs::read_to_string(path)?;
    let envelope: Envelope<ListPayload<Column>> = serde_json::from_str(&raw)?;
    let columns = envelope.into_result()?.into_vec();
    debug!(path = %path.display(), columns = columns.len(), "Loaded columns");
    Ok(columns)
}

/// Batch script for all columns, or only the named one.
pub fn render_scripts(
    synth: &FixScriptSynthesizer,
    columns: &[Column],
    only_column: Option<&str>,
) -> Result<String> {
    match only_column {
        None => Ok(synth.batch(columns)),
        Some(name) => {
            let selected: Vec<Column> = columns
                .iter()
                .filter(|c| c.column_name == name)
                .cloned()
                .collect();
            if selected.is_empty() {
                return Err(Error::NotFound(format!("column '{}'", name)));
            }
            Ok(synth.batch(&selected))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnClassification {
    pub column: String,
    pub issue_type: IssueType,
    #[serde(flatten)]
    pub classification: Classification,
    pub category: RemediationCategory,
}

pub fn classify_columns(columns: &[Column]) -> Vec<ColumnClassification> {
    columns
        .iter()
        .flat_map(|column| {
            column.quality_issues.iter().map(move |issue| {
                let classification = classifier::classify(column, issue);
                ColumnClassification {
                    column: column.column_name.clone(),
                    issue_type: issue.issue_type.clone(),
                    category: classification.category(),
                    classification,
                }
            })
        })
        .collect()
}
