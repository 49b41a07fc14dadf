pub mod remediation;
pub use remediation::RemediationService;

use axum::{
    response::IntoResponse,
    http::StatusCode,
    Json
};
use tracing::error;
use crate::api::models::ApiResponse;

pub struct AppError(pub common::Error);

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            common::Error::InvalidInput(_) | common::Error::RuleViolation(_) => StatusCode::BAD_REQUEST,
            common::Error::NotFound(_) => StatusCode::NOT_FOUND,
            common::Error::Forbidden => StatusCode::FORBIDDEN,
            common::Error::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            common::Error::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let body = Json(ApiResponse::<()>::error(self.0.to_string()));
        (status_code, body).into_response()
    }
}

impl From<common::Error> for AppError {
    fn from(err: common::Error) -> Self {
        AppError(err)
    }
}
