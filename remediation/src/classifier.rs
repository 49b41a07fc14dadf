use common::models::{Column, PiiRule, QualityIssue};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::masking::MaskPattern;

/// Title fragments checked in order; the first hit decides the PII type.
const TITLE_HINTS: &[(&str, &str)] = &[
    ("SSN", "ssn"),
    ("Credit Card", "credit_card"),
    ("Email", "email"),
    ("Phone", "phone"),
    ("ZIP", "zip_code"),
    ("Postal", "zip_code"),
    ("Date of Birth", "date_of_birth"),
    ("DOB", "date_of_birth"),
    ("Name", "name"),
];

const ENCRYPTION_HINTS: &[&str] = &["Requires Encryption: Yes", "ENCRYPT this column"];
const MASKING_HINTS: &[&str] = &["Requires Masking: Yes", "MASK in UI"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PiiType {
    Ssn,
    CreditCard,
    Email,
    Phone,
    ZipCode,
    DateOfBirth,
    Name,
    Default,
    Other(String),
}

impl PiiType {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "ssn" | "social_security_number" => PiiType::Ssn,
            "credit_card" | "creditcard" | "credit_card_number" => PiiType::CreditCard,
            "email" | "email_address" => PiiType::Email,
            "phone" | "phone_number" => PiiType::Phone,
            "zip_code" | "zip" | "zipcode" | "postal_code" => PiiType::ZipCode,
            "date_of_birth" | "dob" | "birth_date" => PiiType::DateOfBirth,
            "name" | "full_name" | "person_name" => PiiType::Name,
            "" | "default" => PiiType::Default,
            _ => PiiType::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PiiType::Ssn => "ssn",
            PiiType::CreditCard => "credit_card",
            PiiType::Email => "email",
            PiiType::Phone => "phone",
            PiiType::ZipCode => "zip_code",
            PiiType::DateOfBirth => "date_of_birth",
            PiiType::Name => "name",
            PiiType::Default => "default",
            PiiType::Other(tag) => tag,
        }
    }

    pub fn mask_pattern(&self) -> MaskPattern {
        match self {
            PiiType::Ssn => MaskPattern::Ssn,
            PiiType::CreditCard => MaskPattern::CreditCard,
            PiiType::Email => MaskPattern::Email,
            PiiType::Phone => MaskPattern::Phone,
            PiiType::ZipCode => MaskPattern::ZipCode,
            PiiType::DateOfBirth => MaskPattern::DateOfBirth,
            PiiType::Name | PiiType::Default | PiiType::Other(_) => MaskPattern::Default,
        }
    }
}

impl From<String> for PiiType {
    fn from(tag: String) -> Self {
        PiiType::from_tag(&tag)
    }
}

impl From<PiiType> for String {
    fn from(pii_type: PiiType) -> Self {
        pii_type.as_str().to_string()
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationCategory {
    EncryptAndMask,
    Encrypt,
    Mask,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_pii_issue: bool,
    pub pii_type: PiiType,
    pub requires_encryption: bool,
    pub requires_masking: bool,
}

impl Classification {
    pub fn category(&self) -> RemediationCategory {
        match (self.requires_encryption, self.requires_masking) {
            (true, true) => RemediationCategory::EncryptAndMask,
            (true, false) => RemediationCategory::Encrypt,
            (false, true) => RemediationCategory::Mask,
            (false, false) => RemediationCategory::None,
        }
    }

    /// True when the PII templates apply; a PII issue without either
    /// requirement is handled like any other issue type.
    pub fn needs_pii_script(&self) -> bool {
        self.is_pii_issue && (self.requires_encryption || self.requires_masking)
    }

    /// Folds in the requirements of the enabled rule for the same PII type.
    /// Requirements are only ever added, never cleared.
    pub fn with_rule(mut self, rule: &PiiRule) -> Self {
        let same_type = PiiType::from_tag(&rule.pii_type)
            .as_str()
            .eq_ignore_ascii_case(self.pii_type.as_str());
        if self.is_pii_issue && rule.is_enabled && same_type {
            self.requires_encryption |= rule.requires_encryption;
            self.requires_masking |= rule.requires_masking;
        }
        self
    }
}

/// Classifies a column issue. PII type precedence: the column's declared
/// tag, then the issue title, then `default`.
pub fn classify(column: &Column, issue: &QualityIssue) -> Classification {
    let title = issue.title();
    let description = issue.description();

    let is_pii_issue = title.contains("PII Detected")
        || description.contains("PII data")
        || issue.issue_type.is_pii();

    let pii_type = if is_pii_issue {
        column
            .pii_type()
            .map(PiiType::from_tag)
            .unwrap_or_else(|| pii_type_from_title(title))
    } else {
        PiiType::Default
    };

    Classification {
        is_pii_issue,
        pii_type,
        requires_encryption: ENCRYPTION_HINTS.iter().any(|hint| description.contains(hint)),
        requires_masking: MASKING_HINTS.iter().any(|hint| description.contains(hint)),
    }
}

fn pii_type_from_title(title: &str) -> PiiType {
    TITLE_HINTS
        .iter()
        .find(|(needle, _)| title.contains(needle))
        .map(|(_, tag)| PiiType::from_tag(tag))
        .unwrap_or(PiiType::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_pii_issue_defaults() {
        let column = Column::new("customer_ref");
        let issue = QualityIssue::new("pii_unencrypted");

        let result = classify(&column, &issue);
        assert!(result.is_pii_issue);
        assert_eq!(result.pii_type.as_str(), "default");
        assert!(!result.requires_encryption);
        assert!(!result.requires_masking);
        assert!(!result.needs_pii_script());
        assert_eq!(result.category(), RemediationCategory::None);
    }

    #[test]
    fn column_tag_beats_title() {
        let column = Column::new("contact").with_pii_type("phone");
        let issue = QualityIssue::new("other").with_title("PII Detected: Email address");

        let result = classify(&column, &issue);
        assert!(result.is_pii_issue);
        assert_eq!(result.pii_type, PiiType::Phone);
    }

    #[test]
    fn title_hints_are_ordered() {
        let column = Column::new("c");
        let cases = [
            ("PII Detected: SSN and Name", PiiType::Ssn),
            ("PII Detected: Credit Card", PiiType::CreditCard),
            ("PII Detected: Email", PiiType::Email),
            ("PII Detected: Phone Number", PiiType::Phone),
            ("PII Detected: Postal code", PiiType::ZipCode),
            ("PII Detected: DOB", PiiType::DateOfBirth),
            ("PII Detected: Customer Name", PiiType::Name),
            ("PII Detected: something else", PiiType::Default),
        ];
        for (title, expected) in cases {
            let issue = QualityIssue::new("other").with_title(title);
            assert_eq!(classify(&column, &issue).pii_type, expected, "{title}");
        }
    }

    #[test]
    fn description_marks_pii_and_requirements() {
        let column = Column::new("ssn").with_pii_type("ssn");
        let issue = QualityIssue::new("other").with_description(
            "PII data found. Requires Encryption: Yes. Requires Masking: Yes",
        );

        let result = classify(&column, &issue);
        assert!(result.is_pii_issue);
        assert!(result.requires_encryption);
        assert!(result.requires_masking);
        assert_eq!(result.category(), RemediationCategory::EncryptAndMask);

        let issue = QualityIssue::new("pii_detected")
            .with_description("Sensitive. ENCRYPT this column and MASK in UI");
        let result = classify(&column, &issue);
        assert_eq!(result.category(), RemediationCategory::EncryptAndMask);
    }

    #[test]
    fn non_pii_issue_ignores_column_tag() {
        let column = Column::new("email").with_pii_type("email");
        let issue = QualityIssue::new("null_values").with_title("Null values");

        let result = classify(&column, &issue);
        assert!(!result.is_pii_issue);
        assert_eq!(result.pii_type, PiiType::Default);
    }

    #[test]
    fn enabled_rule_adds_requirements() {
        let column = Column::new("email").with_pii_type("email");
        let issue = QualityIssue::new("pii_unencrypted")
            .with_description("Requires Masking: Yes");

        let mut rule = PiiRule::new("email", "Email");
        rule.requires_encryption = true;

        let result = classify(&column, &issue).with_rule(&rule);
        assert!(result.requires_encryption);
        assert!(result.requires_masking);

        rule.is_enabled = false;
        let result = classify(&column, &issue).with_rule(&rule);
        assert!(!result.requires_encryption);

        let other = PiiRule {
            requires_encryption: true,
            ..PiiRule::new("ssn", "SSN")
        };
        assert!(!classify(&column, &issue).with_rule(&other).requires_encryption);
    }

    #[test]
    fn unknown_tags_keep_their_name() {
        let pii = PiiType::from_tag("passport_number");
        assert_eq!(pii.as_str(), "passport_number");
        assert_eq!(pii.mask_pattern(), MaskPattern::Default);
        assert_eq!(PiiType::from_tag("DOB"), PiiType::DateOfBirth);
    }
}
