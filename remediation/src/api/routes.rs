use axum::{
    routing::{get, post},
    Router,
    extract::State,
    Json
};
use notification::ConfigChange;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::rules::RuleMatch;
use crate::services::{AppError, RemediationService};
use common::models::Column;
use crate::synthesizer::FixScript;
use super::models::{
    ApiResponse, BatchScriptRequest, BatchScriptResponse, ClassifyRequest, ClassifyResponse,
    ClearPiiRequest, ConfigChangeRequest, FixScriptRequest, HealthResponse, RuleMatchRequest,
    RuleValidationRequest, RuleValidationResponse,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub async fn health(State(service): State<Arc<RemediationService>>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        rules: service.rule_count().await,
        catalog: service.has_catalog(),
        config_version: service.bus().current_version(),
    }))
}

pub async fn classify(
    State(service): State<Arc<RemediationService>>,
    Json(request): Json<ClassifyRequest>,
) -> ApiResult<ClassifyResponse> {
    let classification = service.classify(&request.column, &request.issue).await;
    Ok(Json(ApiResponse::success(ClassifyResponse {
        category: classification.category(),
        classification,
    })))
}

pub async fn fix_script(
    State(service): State<Arc<RemediationService>>,
    Json(request): Json<FixScriptRequest>,
) -> ApiResult<FixScript> {
    let script = service
        .fix_script(
            &request.column,
            &request.issue,
            &request.asset_name,
            request.schema_name.as_deref(),
            request.dialect.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(script)))
}

pub async fn batch_script(
    State(service): State<Arc<RemediationService>>,
    Json(request): Json<BatchScriptRequest>,
) -> ApiResult<BatchScriptResponse> {
    let script = service
        .batch_script(
            &request.columns,
            &request.asset_name,
            request.schema_name.as_deref(),
            request.dialect.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(BatchScriptResponse { script })))
}

pub async fn rule_matches(
    State(service): State<Arc<RemediationService>>,
    Json(RuleMatchRequest { column }): Json<RuleMatchRequest>,
) -> ApiResult<Vec<RuleMatch>> {
    Ok(Json(ApiResponse::success(service.rule_matches(&column).await)))
}

pub async fn publish_change(
    State(service): State<Arc<RemediationService>>,
    Json(request): Json<ConfigChangeRequest>,
) -> ApiResult<ConfigChange> {
    let change = service.publish_change(&request.source, request.version)?;
    Ok(Json(ApiResponse::success(change)))
}

pub async fn clear_pii(
    State(service): State<Arc<RemediationService>>,
    Json(ClearPiiRequest { column }): Json<ClearPiiRequest>,
) -> ApiResult<Column> {
    Ok(Json(ApiResponse::success(service.clear_pii(column))))
}

pub async fn validate_rule(
    State(service): State<Arc<RemediationService>>,
    Json(request): Json<RuleValidationRequest>,
) -> ApiResult<RuleValidationResponse> {
    service.validate_rule_edit(&request.current, request.proposed.as_ref())?;
    Ok(Json(ApiResponse::success(RuleValidationResponse { valid: true })))
}

// Define all API routes
pub fn routes(service: Arc<RemediationService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/remediation/classify", post(classify))
        .route("/api/remediation/fix-script", post(fix_script))
        .route("/api/remediation/batch-script", post(batch_script))
        .route("/api/remediation/rule-matches", post(rule_matches))
        .route("/api/remediation/clear-pii", post(clear_pii))
        .route("/api/pii-rules/validate", post(validate_rule))
        .route("/api/pii-config/changes", post(publish_change))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
