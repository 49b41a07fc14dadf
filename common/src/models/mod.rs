// Shapes returned by the catalog backend and consumed by the remediation core.
mod asset;
mod column;
mod issue;
mod rule;

pub use asset::{Asset, AssetType};
pub use column::{Column, EncryptionStatus};
pub use issue::{IssueType, QualityIssue, Severity};
pub use rule::{PiiRule, RuleCategory};

use serde::{Deserialize, Deserializer};

/// Backend ids arrive as either UUID strings or integers.
pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// `null` reads as the field's default, like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
