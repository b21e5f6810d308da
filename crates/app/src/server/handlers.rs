//! Route handlers and their error responses.

use assay_application::ApplicationError;
use assay_domain::testing::{SuiteReport, TestSuite};
use assay_domain::validation::{ValidationResult, validate};
use assay_infrastructure::persistence::suite_from_value;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{error, warn};

use super::AppState;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "assay";

/// Failure of a service request.
#[derive(Debug)]
pub enum ApiError {
    /// The body is not JSON or does not describe a suite.
    Malformed(String),
    /// The suite failed validation.
    Invalid(ValidationResult),
    /// The run itself broke down.
    Internal(String),
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Validation(result) => Self::Invalid(result),
            ApplicationError::Internal(message) => Self::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Malformed(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::Invalid(result) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "valid": false, "errors": result.errors })),
            )
                .into_response(),
            Self::Internal(message) => {
                error!(%message, "suite run failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

fn parse_suite_body(body: &Bytes) -> Result<TestSuite, ApiError> {
    let document: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::Malformed(format!("invalid JSON: {e}")))?;
    suite_from_value(document).map_err(|e| {
        warn!(error = %e, "rejected suite body");
        ApiError::Malformed(format!("invalid test suite: {e}"))
    })
}

/// `POST /api/v1/tests/run`
pub async fn run_suite(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuiteReport>, ApiError> {
    let suite = parse_suite_body(&body)?;
    let report = state.orchestrator.run(&suite).await?;
    Ok(Json(report))
}

/// `POST /api/v1/tests/validate`
pub async fn validate_suite(body: Bytes) -> Result<Json<Value>, ApiError> {
    let suite = parse_suite_body(&body)?;
    let result = validate(&suite);
    if !result.is_valid() {
        return Err(ApiError::Invalid(result));
    }
    Ok(Json(json!({
        "valid": true,
        "message": "Test suite is valid",
    })))
}

/// `GET /api/v1/health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
