use common::models::{Column, PiiRule, QualityIssue};
use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, RemediationCategory};

// Request models
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub column: Column,
    pub issue: QualityIssue,
}

#[derive(Debug, Deserialize)]
pub struct FixScriptRequest {
    pub column: Column,
    pub issue: QualityIssue,
    pub asset_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub dialect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchScriptRequest {
    pub columns: Vec<Column>,
    pub asset_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub dialect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RuleMatchRequest {
    pub column: Column,
}

#[derive(Debug, Deserialize)]
pub struct ClearPiiRequest {
    pub column: Column,
}

#[derive(Debug, Deserialize)]
pub struct ConfigChangeRequest {
    pub source: String,
    /// Set when relaying a change versioned by another node.
    #[serde(default)]
    pub version: Option<u64>,
}

/// Without `proposed` the request checks a deletion.
#[derive(Debug, Deserialize)]
pub struct RuleValidationRequest {
    pub current: PiiRule,
    #[serde(default)]
    pub proposed: Option<PiiRule>,
}

// Response models
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    #[serde(flatten)]
    pub classification: Classification,
    pub category: RemediationCategory,
}

#[derive(Debug, Serialize)]
pub struct BatchScriptResponse {
    pub script: String,
}

#[derive(Debug, Serialize)]
pub struct RuleValidationResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rules: usize,
    pub catalog: bool,
    pub config_version: u64,
}
