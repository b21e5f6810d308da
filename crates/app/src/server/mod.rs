//! HTTP service exposing suite runs under `/api/v1`.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use assay_application::{HttpClient, SuiteOrchestrator};
use assay_domain::settings::RunnerSettings;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub use handlers::{ApiError, SERVICE_NAME};

/// Shared state of the service.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<SuiteOrchestrator<dyn HttpClient>>,
}

impl AppState {
    /// Creates the state around an HTTP client.
    pub fn new(client: Arc<dyn HttpClient>, settings: &RunnerSettings) -> Self {
        Self {
            orchestrator: Arc::new(SuiteOrchestrator::new(client, settings)),
        }
    }
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/tests/run", post(handlers::run_suite))
        .route("/tests/validate", post(handlers::validate_suite))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "assay service listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use assay_application::HttpClientError;
    use assay_domain::request::{Headers, RequestSpec};
    use assay_domain::response::ResponseSpec;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Answers every request with `200 {"id": 1}`, except hosts named
    /// `down.test`, which refuse the connection.
    struct StubClient;

    #[async_trait]
    impl HttpClient for StubClient {
        async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
            if request.url.contains("down.test") {
                return Err(HttpClientError::ConnectionRefused {
                    host: "down.test".to_string(),
                    port: 80,
                });
            }
            Ok(ResponseSpec::new(
                200,
                Headers::new().with("Content-Type", "application/json"),
                br#"{"id": 1}"#,
                Duration::from_millis(5),
            ))
        }
    }

    fn app() -> Router {
        router(AppState::new(Arc::new(StubClient), &RunnerSettings::default()))
    }

    async fn call(method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map_or_else(Body::empty, Body::from))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn smoke_suite() -> Value {
        json!({
            "test_suite": {
                "name": "Smoke",
                "base_url": "http://api.test",
                "tests": [
                    {
                        "name": "Get",
                        "method": "GET",
                        "url": "/posts/1",
                        "assertions": [
                            {"type": "status", "expected": 200},
                            {"type": "json_path", "target": "$.id", "expected": 1}
                        ]
                    },
                    {
                        "name": "Down",
                        "method": "GET",
                        "url": "http://down.test/",
                        "assertions": [{"type": "status", "expected": 200}]
                    }
                ]
            }
        })
    }

    #[tokio::test]
    async fn test_run_returns_report() {
        let (status, body) = call(
            Method::POST,
            "/api/v1/tests/run",
            Some(smoke_suite().to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suite_name"], "Smoke");
        assert_eq!(body["total_tests"], 2);
        assert_eq!(body["passed_tests"], 1);
        assert_eq!(body["failed_tests"], 1);
        assert_eq!(body["results"][0]["status"], "PASS");
        assert_eq!(body["results"][0]["response"]["status_code"], 200);
        assert_eq!(body["results"][1]["status"], "FAIL");
        assert_eq!(
            body["results"][1]["error"],
            "Connection Refused: connection refused by down.test:80"
        );
    }

    #[tokio::test]
    async fn test_run_rejects_malformed_json() {
        let (status, body) =
            call(Method::POST, "/api/v1/tests/run", Some("{nope".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid JSON"));
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_suite() {
        let suite = json!({"test_suite": {"name": "", "tests": []}});
        let (status, body) = call(Method::POST, "/api/v1/tests/run", Some(suite.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);
        assert_eq!(
            body["errors"],
            json!([
                {"field": "name", "message": "suite name is required"},
                {"field": "tests", "message": "suite must contain at least one test"}
            ])
        );
    }

    #[tokio::test]
    async fn test_validate_accepts_valid_suite() {
        let (status, body) = call(
            Method::POST,
            "/api/v1/tests/validate",
            Some(smoke_suite().to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"valid": true, "message": "Test suite is valid"}));
    }

    #[tokio::test]
    async fn test_validate_reports_field_errors() {
        let suite = json!({"test_suite": {
            "name": "Bad",
            "tests": [{"name": "t", "method": "FETCH", "url": "/relative"}]
        }});
        let (status, body) =
            call(Method::POST, "/api/v1/tests/validate", Some(suite.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["tests[0].method", "tests[0].url"]);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(Method::GET, "/api/v1/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_cors_preflight_is_allowed() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/tests/run")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
