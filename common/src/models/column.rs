use serde::{Deserialize, Serialize};

use super::issue::QualityIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionStatus {
    Encrypted,
    Unencrypted,
    Hashed,
    Masked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Column {
    #[serde(default, deserialize_with = "super::id_from_any")]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub column_name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default)]
    pub foreign_key_table: Option<String>,
    #[serde(default)]
    pub foreign_key_column: Option<String>,
    #[serde(default)]
    pub pii_type: Option<String>,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub encryption_status: Option<EncryptionStatus>,
    #[serde(default)]
    pub null_percentage: Option<f64>,
    #[serde(default)]
    pub unique_percentage: Option<f64>,
    #[serde(default)]
    pub sample_values: Option<Vec<String>>,
    #[serde(default)]
    pub quality_issues: Vec<QualityIssue>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            is_nullable: true,
            ..Default::default()
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn with_pii_type(mut self, pii_type: impl Into<String>) -> Self {
        self.pii_type = Some(pii_type.into());
        self.is_sensitive = true;
        self
    }

    pub fn with_foreign_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.is_foreign_key = true;
        self.foreign_key_table = Some(table.into());
        self.foreign_key_column = Some(column.into());
        self
    }

    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sample_values = Some(samples.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_issue(mut self, issue: QualityIssue) -> Self {
        self.quality_issues.push(issue);
        self
    }

    /// Declared PII tag, ignoring blank strings the backend sometimes sends.
    pub fn pii_type(&self) -> Option<&str> {
        self.pii_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn samples(&self) -> &[String] {
        self.sample_values.as_deref().unwrap_or_default()
    }

    /// Applies a confirmed "mark as not PII" decision.
    pub fn clear_pii(&mut self) {
        self.pii_type = None;
        self.is_sensitive = false;
        self.quality_issues.retain(|issue| !issue.issue_type.is_pii());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueType;

    #[test]
    fn deserializes_backend_column() {
        let json = r#"{
            "id": 42,
            "name": "customer_email",
            "data_type": "varchar(255)",
            "pii_type": "email",
            "is_sensitive": true,
            "encryption_status": "unencrypted",
            "sample_values": null,
            "quality_issues": [
                {"issue_type": "pii_unencrypted", "severity": "critical"}
            ]
        }"#;

        let column: Column = serde_json::from_str(json).unwrap();
        assert_eq!(column.id.as_deref(), Some("42"));
        assert_eq!(column.column_name, "customer_email");
        assert!(column.is_nullable);
        assert_eq!(column.pii_type(), Some("email"));
        assert_eq!(column.encryption_status, Some(EncryptionStatus::Unencrypted));
        assert!(column.samples().is_empty());
        assert_eq!(column.quality_issues[0].issue_type, IssueType::PiiUnencrypted);
    }

    #[test]
    fn blank_pii_type_is_absent() {
        let column = Column::new("notes").with_pii_type("  ");
        assert_eq!(column.pii_type(), None);
    }

    #[test]
    fn clear_pii_drops_pii_issues_only() {
        let mut column = Column::new("ssn")
            .with_pii_type("ssn")
            .with_issue(QualityIssue::new("pii_unencrypted"))
            .with_issue(QualityIssue::new("null_values"));

        column.clear_pii();

        assert_eq!(column.pii_type(), None);
        assert!(!column.is_sensitive);
        assert_eq!(column.quality_issues.len(), 1);
        assert_eq!(column.quality_issues[0].issue_type, IssueType::NullValues);
    }
}
