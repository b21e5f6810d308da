//! `ReqwestHttpClient` against a live local server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::time::Duration;

use assay_application::ports::{HttpClient, HttpClientError};
use assay_domain::request::{Headers, HttpMethod, RequestSpec};
use assay_domain::settings::RunnerSettings;
use assay_infrastructure::ReqwestHttpClient;
use pretty_assertions::assert_eq;

fn client() -> ReqwestHttpClient {
    ReqwestHttpClient::new().expect("client")
}

#[tokio::test]
async fn get_json_response() {
    let base = common::spawn_fixture().await;
    let response = client()
        .execute(&RequestSpec::get(format!("{base}/posts/1")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("application/json"));
    assert!(response.body.contains("\"title\":\"sunt aut facere\""));
    assert_eq!(response.size, response.body.len());
    assert!(response.duration > Duration::ZERO);
}

#[tokio::test]
async fn error_status_is_not_a_transport_error() {
    let base = common::spawn_fixture().await;
    let response = client()
        .execute(&RequestSpec::get(format!("{base}/status/503")))
        .await
        .unwrap();
    assert_eq!(response.status, 503);
}

#[tokio::test]
async fn post_sends_body_and_headers() {
    let base = common::spawn_fixture().await;
    let request = RequestSpec::new(HttpMethod::Post, format!("{base}/echo"))
        .with_headers(Headers::new().with("Content-Type", "application/json"))
        .with_body(r#"{"title":"foo"}"#);

    let response = client().execute(&request).await.unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, r#"{"title":"foo"}"#);
    assert_eq!(
        response.get_header("X-Echo-Content-Type"),
        Some("application/json")
    );
}

#[tokio::test]
async fn redirects_are_followed() {
    let base = common::spawn_fixture().await;
    let response = client()
        .execute(&RequestSpec::get(format!("{base}/redirect")))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body.contains("sunt aut facere"));
}

#[tokio::test]
async fn redirect_limit_is_enforced() {
    let base = common::spawn_fixture().await;
    let settings = RunnerSettings {
        max_redirects: 0,
        ..RunnerSettings::default()
    };
    let client = ReqwestHttpClient::from_settings(&settings).unwrap();

    let result = client
        .execute(&RequestSpec::get(format!("{base}/redirect")))
        .await;
    assert_eq!(result, Err(HttpClientError::TooManyRedirects { max: 0 }));
}

#[tokio::test]
async fn repeated_headers_are_joined() {
    let base = common::spawn_fixture().await;
    let response = client()
        .execute(&RequestSpec::get(format!("{base}/cookies")))
        .await
        .unwrap();
    assert_eq!(response.get_header("set-cookie"), Some("a=1, b=2"));
}

#[tokio::test]
async fn slow_response_times_out() {
    let base = common::spawn_fixture().await;
    let request =
        RequestSpec::get(format!("{base}/slow")).with_timeout(Duration::from_millis(100));

    let result = client().execute(&request).await;
    assert_eq!(result, Err(HttpClientError::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn closed_port_is_a_connection_error() {
    let base = common::closed_port_url().await;
    let result = client().execute(&RequestSpec::get(format!("{base}/"))).await;

    assert!(
        matches!(
            result,
            Err(HttpClientError::ConnectionRefused { .. } | HttpClientError::ConnectionFailed(_))
        ),
        "{result:?}"
    );
}
