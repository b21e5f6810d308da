//! Local HTTP fixture server for adapter tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;

/// Starts the fixture on an ephemeral port and returns its base URL.
pub async fn spawn_fixture() -> String {
    let app = Router::new()
        .route("/posts/{id}", get(post_by_id))
        .route("/echo", post(echo))
        .route("/slow", get(slow))
        .route("/status/{code}", get(status))
        .route("/redirect", get(|| async { Redirect::temporary("/posts/1") }))
        .route("/cookies", get(cookies));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr: SocketAddr = listener.local_addr().expect("fixture address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture server");
    });

    format!("http://{addr}")
}

/// Returns a base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind spare listener");
    let addr = listener.local_addr().expect("spare address");
    drop(listener);
    format!("http://{addr}")
}

async fn post_by_id(Path(id): Path<u64>) -> impl IntoResponse {
    if id == 0 {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response();
    }
    Json(json!({
        "userId": 1,
        "id": id,
        "title": "sunt aut facere",
        "tags": ["a", "b"]
    }))
    .into_response()
}

async fn echo(headers: HeaderMap, body: String) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string();
    (
        StatusCode::CREATED,
        [("x-echo-content-type", content_type)],
        body,
    )
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(500)).await;
    "finally"
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn cookies() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, "a=1"), (header::SET_COOKIE, "b=2")]),
        "ok",
    )
}
