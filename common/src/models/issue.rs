use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag carried in `QualityIssue::issue_type`. Unknown tags survive as
/// `Other` so they can be echoed back in generated scripts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    NullValues,
    DuplicateValues,
    PiiUnencrypted,
    PiiDetected,
    InvalidFormat,
    MissingFk,
    MissingIndex,
    OutlierValues,
    Other(String),
}

impl IssueType {
    pub fn as_str(&self) -> &str {
        match self {
            IssueType::NullValues => "null_values",
            IssueType::DuplicateValues => "duplicate_values",
            IssueType::PiiUnencrypted => "pii_unencrypted",
            IssueType::PiiDetected => "pii_detected",
            IssueType::InvalidFormat => "invalid_format",
            IssueType::MissingFk => "missing_fk",
            IssueType::MissingIndex => "missing_index",
            IssueType::OutlierValues => "outlier_values",
            IssueType::Other(tag) => tag,
        }
    }

    pub fn is_pii(&self) -> bool {
        matches!(self, IssueType::PiiUnencrypted | IssueType::PiiDetected)
    }
}

impl From<String> for IssueType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "null_values" => IssueType::NullValues,
            "duplicate_values" => IssueType::DuplicateValues,
            "pii_unencrypted" => IssueType::PiiUnencrypted,
            "pii_detected" => IssueType::PiiDetected,
            "invalid_format" => IssueType::InvalidFormat,
            "missing_fk" => IssueType::MissingFk,
            "missing_index" => IssueType::MissingIndex,
            "outlier_values" => IssueType::OutlierValues,
            _ => IssueType::Other(tag),
        }
    }
}

impl From<&str> for IssueType {
    fn from(tag: &str) -> Self {
        IssueType::from(tag.to_string())
    }
}

impl From<IssueType> for String {
    fn from(issue_type: IssueType) -> Self {
        issue_type.as_str().to_string()
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "CRITICAL")]
    Critical,
    #[serde(alias = "HIGH")]
    High,
    #[default]
    #[serde(alias = "MEDIUM")]
    Medium,
    #[serde(alias = "LOW")]
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub issue_type: IssueType,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub affected_rows: Option<u64>,
    #[serde(default)]
    pub fix_script: Option<String>,
}

impl QualityIssue {
    pub fn new(issue_type: impl Into<IssueType>) -> Self {
        Self {
            issue_type: issue_type.into(),
            severity: Severity::default(),
            title: None,
            description: None,
            affected_rows: None,
            fix_script: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_affected_rows(mut self, rows: u64) -> Self {
        self.affected_rows = Some(rows);
        self
    }

    pub fn with_fix_script(mut self, script: impl Into<String>) -> Self {
        self.fix_script = Some(script.into());
        self
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// The backend-supplied script, if it is more than whitespace.
    pub fn supplied_fix_script(&self) -> Option<&str> {
        self.fix_script.as_deref().filter(|s| !s.trim().is_empty())
    }
}
