use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::issue::Severity;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Financial,
    Personal,
    Contact,
    Identifier,
    Health,
    #[default]
    Custom,
}

/// A PII classification rule as managed by the rule editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiRule {
    #[serde(default, deserialize_with = "super::id_from_any")]
    pub id: Option<String>,
    pub pii_type: String,
    pub display_name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(default)]
    pub category: RuleCategory,
    #[serde(default)]
    pub regex_pattern: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub column_name_hints: Vec<String>,
    #[serde(default)]
    pub sensitivity_level: Severity,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub compliance_flags: BTreeSet<String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub is_system_rule: bool,
    #[serde(default)]
    pub requires_encryption: bool,
    #[serde(default)]
    pub requires_masking: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub examples: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl PiiRule {
    pub fn new(pii_type: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            pii_type: pii_type.into(),
            display_name: display_name.into(),
            description: String::new(),
            category: RuleCategory::default(),
            regex_pattern: None,
            column_name_hints: Vec::new(),
            sensitivity_level: Severity::default(),
            compliance_flags: BTreeSet::new(),
            is_enabled: true,
            is_system_rule: false,
            requires_encryption: false,
            requires_masking: false,
            examples: Vec::new(),
        }
    }

    /// Checks an edit against the system-rule invariants: a system rule keeps
    /// its `pii_type`, `display_name` and system flag.
    pub fn validate_update(&self, proposed: &PiiRule) -> Result<()> {
        if proposed.pii_type.trim().is_empty() {
            return Err(Error::InvalidInput("pii_type must not be empty".into()));
        }
        if proposed.display_name.trim().is_empty() {
            return Err(Error::InvalidInput("display_name must not be empty".into()));
        }
        if !self.is_system_rule {
            return Ok(());
        }
        if proposed.pii_type != self.pii_type {
            return Err(Error::RuleViolation(format!(
                "system rule '{}' cannot change pii_type",
                self.pii_type
            )));
        }
        if proposed.display_name != self.display_name {
            return Err(Error::RuleViolation(format!(
                "system rule '{}' cannot change display_name",
                self.pii_type
            )));
        }
        if !proposed.is_system_rule {
            return Err(Error::RuleViolation(format!(
                "system rule '{}' cannot be demoted to a custom rule",
                self.pii_type
            )));
        }
        Ok(())
    }

    pub fn validate_delete(&self) -> Result<()> {
        if self.is_system_rule {
            return Err(Error::RuleViolation(format!(
                "system rule '{}' cannot be deleted",
                self.pii_type
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_ssn() -> PiiRule {
        let mut rule = PiiRule::new("ssn", "Social Security Number");
        rule.is_system_rule = true;
        rule.category = RuleCategory::Identifier;
        rule
    }

    #[test]
    fn system_rule_allows_flag_edits() {
        let rule = system_ssn();
        let mut edit = rule.clone();
        edit.requires_encryption = true;
        edit.column_name_hints.push("social".into());
        assert!(rule.validate_update(&edit).is_ok());
    }

    #[test]
    fn system_rule_rejects_identity_edits() {
        let rule = system_ssn();

        let mut renamed = rule.clone();
        renamed.display_name = "SSN".into();
        assert!(matches!(rule.validate_update(&renamed), Err(Error::RuleViolation(_))));

        let mut retagged = rule.clone();
        retagged.pii_type = "national_id".into();
        assert!(matches!(rule.validate_update(&retagged), Err(Error::RuleViolation(_))));

        let mut demoted = rule.clone();
        demoted.is_system_rule = false;
        assert!(matches!(rule.validate_update(&demoted), Err(Error::RuleViolation(_))));

        assert!(matches!(rule.validate_delete(), Err(Error::RuleViolation(_))));
    }

    #[test]
    fn custom_rule_is_freely_editable() {
        let rule = PiiRule::new("badge_id", "Badge ID");
        let mut edit = rule.clone();
        edit.pii_type = "employee_badge".into();
        edit.display_name = "Employee Badge".into();
        assert!(rule.validate_update(&edit).is_ok());
        assert!(rule.validate_delete().is_ok());

        edit.display_name = " ".into();
        assert!(matches!(rule.validate_update(&edit), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn deserializes_with_defaults() {
        let rule: PiiRule = serde_json::from_str(
            r#"{"id": 7, "pii_type": "email", "display_name": "Email", "category": "contact",
                "compliance_flags": ["GDPR", "CCPA", "GDPR"]}"#,
        )
        .unwrap();
        assert_eq!(rule.id.as_deref(), Some("7"));
        assert!(rule.is_enabled);
        assert!(!rule.is_system_rule);
        assert_eq!(rule.category, RuleCategory::Contact);
        assert_eq!(rule.compliance_flags.len(), 2);
    }

    #[test]
    fn null_lists_and_description_read_as_empty() {
        let rule: PiiRule = serde_json::from_str(
            r#"{"pii_type": "ssn", "display_name": "SSN", "description": null,
                "column_name_hints": null, "compliance_flags": null, "examples": null}"#,
        )
        .unwrap();
        assert_eq!(rule.description, "");
        assert!(rule.column_name_hints.is_empty());
        assert!(rule.compliance_flags.is_empty());
        assert!(rule.examples.is_empty());
    }
}
