//! Request specification type

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod};

/// A fully resolved HTTP request, ready to hand to an HTTP client.
///
/// Built from a test case once the base URL and header defaults have been
/// applied. This is also what gets echoed back in a test result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: String,
    /// Merged request headers
    #[serde(default)]
    pub headers: Headers,
    /// Body to send, already dropped for methods that do not carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Per-request deadline
    #[serde(skip, default = "default_timeout")]
    pub timeout: Duration,
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl RequestSpec {
    /// Creates a request with no headers, no body and the default timeout.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            timeout: default_timeout(),
        }
    }

    /// Creates a GET request with the given URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Sets the headers (builder pattern).
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body (builder pattern). Ignored for methods that send no body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        if self.method.sends_body() {
            self.body = Some(body.into());
        }
        self
    }

    /// Sets the timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_drops_body() {
        let request = RequestSpec::get("https://api.example.com").with_body("{}");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_post_keeps_body() {
        let request = RequestSpec::new(HttpMethod::Post, "https://api.example.com")
            .with_body(r#"{"a":1}"#);
        assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_default_timeout() {
        let request = RequestSpec::get("https://api.example.com");
        assert_eq!(request.timeout, Duration::from_secs(30));
    }
}
