use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Table,
    View,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, deserialize_with = "super::id_from_any")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub data_source_name: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub database_name: Option<String>,
    /// `None` or `-1` until the table has been profiled.
    #[serde(default)]
    pub row_count: Option<i64>,
    #[serde(default)]
    pub column_count: Option<u32>,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub bookmark_count: u64,
    #[serde(default)]
    pub pii_detected: bool,
    #[serde(default)]
    pub last_profiled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn is_profiled(&self) -> bool {
        !matches!(self.row_count, None | Some(-1))
    }

    /// A score of exactly zero means the backend has not scored the asset.
    pub fn quality_score_label(&self) -> String {
        match self.quality_score {
            Some(score) if score != 0.0 => format!("{:.0}%", score),
            _ => "N/A".to_string(),
        }
    }

    /// Physical table name, falling back to the display name.
    pub fn table_name(&self) -> &str {
        self.table
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.name)
    }
}
