//! Suggests which PII rule applies to a column, from its name and sample
//! values.

use common::models::{Column, PiiRule, Severity};
use common::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::classifier::PiiType;

const SAMPLE_MATCH_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    pub pii_type: String,
    pub display_name: String,
    pub sensitivity_level: Severity,
    pub name_hit: bool,
    /// Fraction of non-empty samples matching the rule's pattern.
    pub sample_ratio: f64,
    pub requires_encryption: bool,
    pub requires_masking: bool,
}

struct CompiledRule {
    rule: PiiRule,
    pattern: Option<Regex>,
    hints: Vec<String>,
}

pub struct RuleMatcher {
    rules: Vec<CompiledRule>,
}

impl RuleMatcher {
    pub fn new(rules: Vec<PiiRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let pattern = match rule.regex_pattern.as_deref().map(str::trim) {
                    Some(p) if !p.is_empty() => Some(Regex::new(p).map_err(|e| {
                        Error::InvalidInput(format!(
                            "rule '{}' has an invalid regex_pattern: {}",
                            rule.pii_type, e
                        ))
                    })?),
                    _ => None,
                };
                let hints = rule
                    .column_name_hints
                    .iter()
                    .map(|h| h.trim().to_lowercase())
                    .filter(|h| !h.is_empty())
                    .collect();
                Ok(CompiledRule { rule, pattern, hints })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(rules = rules.len(), "Compiled PII rules");
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The enabled rule for `pii_type`. Both tags are normalised first, so
    /// aliases such as `social_security_number` and `ssn` find each other.
    pub fn rule_for(&self, pii_type: &str) -> Option<&PiiRule> {
        let wanted = PiiType::from_tag(pii_type);
        self.rules
            .iter()
            .map(|c| &c.rule)
            .find(|r| {
                r.is_enabled
                    && PiiType::from_tag(&r.pii_type)
                        .as_str()
                        .eq_ignore_ascii_case(wanted.as_str())
            })
    }

    pub fn match_column(&self, column: &Column) -> Vec<RuleMatch> {
        let name = column.column_name.to_lowercase();
        let samples: Vec<&str> = column
            .samples()
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        let mut matches: Vec<RuleMatch> = self
            .rules
            .iter()
            .filter(|c| c.rule.is_enabled)
            .filter_map(|c| {
                let name_hit = c.hints.iter().any(|h| name.contains(h.as_str()));
                let sample_ratio = match (&c.pattern, samples.len()) {
                    (Some(re), n) if n > 0 => {
                        samples.iter().filter(|s| re.is_match(s)).count() as f64 / n as f64
                    }
                    _ => 0.0,
                };

                (name_hit || sample_ratio >= SAMPLE_MATCH_THRESHOLD).then(|| RuleMatch {
                    pii_type: c.rule.pii_type.clone(),
                    display_name: c.rule.display_name.clone(),
                    sensitivity_level: c.rule.sensitivity_level,
                    name_hit,
                    sample_ratio,
                    requires_encryption: c.rule.requires_encryption,
                    requires_masking: c.rule.requires_masking,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            a.sensitivity_level
                .cmp(&b.sensitivity_level)
                .then_with(|| {
                    b.sample_ratio
                        .partial_cmp(&a.sample_ratio)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.pii_type.cmp(&b.pii_type))
        });
        matches
    }
}
