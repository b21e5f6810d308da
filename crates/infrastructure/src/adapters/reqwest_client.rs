//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! One client (and so one connection pool) is shared by every test in a run.

use std::error::Error as _;
use std::time::Instant;

use assay_application::ports::{HttpClient, HttpClientError};
use assay_domain::request::{Headers, HttpMethod, RequestSpec};
use assay_domain::response::ResponseSpec;
use assay_domain::settings::RunnerSettings;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Url};
use tracing::trace;

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    max_redirects: usize,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::from_settings(&RunnerSettings::default())
    }

    /// Creates a client configured from runner settings: user agent,
    /// redirect limit, TLS verification and a client-wide timeout matching
    /// the per-request one.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn from_settings(settings: &RunnerSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .danger_accept_invalid_certs(!settings.verify_tls)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            max_redirects: settings.max_redirects,
        })
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, max_redirects: usize) -> Self {
        Self {
            client,
            max_redirects,
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Collects response headers. Repeated headers are joined with `", "`.
    fn collect_headers(map: &HeaderMap) -> Headers {
        let mut headers = Headers::new();
        for name in map.keys() {
            let joined = map
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            headers.insert(name.as_str(), joined);
        }
        headers
    }

    /// Maps reqwest errors to port `HttpClientError`.
    fn map_error(&self, error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects {
                max: self.max_redirects,
            };
        }

        let message = error_chain(error);
        let lower = message.to_lowercase();
        let host = error
            .url()
            .and_then(Url::host_str)
            .unwrap_or("unknown")
            .to_string();

        if error.is_connect() {
            if lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup") {
                return HttpClientError::DnsError { host, message };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host,
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            if is_tls_message(&lower) {
                return HttpClientError::TlsError(message);
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if is_tls_message(&lower) {
            return HttpClientError::TlsError(message);
        }
        if error.is_body() || error.is_decode() {
            return HttpClientError::Body(message);
        }
        if error.is_builder() {
            return HttpClientError::InvalidRequest(message);
        }

        HttpClientError::Other(message)
    }
}

/// Joins an error with all of its sources; reqwest's top-level message
/// rarely names the actual cause.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_tls_message(lower: &str) -> bool {
    lower.contains("certificate") || lower.contains("tls") || lower.contains("handshake")
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;
        let timeout_ms = u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX);

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(request.timeout);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| self.map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers = Self::collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| match self.map_error(&e, timeout_ms) {
                timeout @ HttpClientError::Timeout { .. } => timeout,
                other => HttpClientError::Body(other.to_string()),
            })?;
        let duration = start.elapsed();

        trace!(
            method = %request.method,
            url = %request.url,
            status,
            bytes = body.len(),
            "response received"
        );

        Ok(ResponseSpec::new(status, headers, &body, duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());

        let settings = RunnerSettings {
            verify_tls: false,
            max_redirects: 0,
            ..RunnerSettings::default()
        };
        assert!(ReqwestHttpClient::from_settings(&settings).is_ok());
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut map = HeaderMap::new();
        let cookie = HeaderName::from_static("set-cookie");
        map.append(&cookie, HeaderValue::from_static("a=1"));
        map.append(&cookie, HeaderValue::from_static("b=2"));
        map.insert("content-type", HeaderValue::from_static("text/plain"));

        let headers = ReqwestHttpClient::collect_headers(&map);
        assert_eq!(headers.get("Set-Cookie"), Some("a=1, b=2"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let client = ReqwestHttpClient::new().unwrap_or_else(|e| panic!("{e}"));
        let result = client.execute(&RequestSpec::get("not a url")).await;
        assert!(matches!(result, Err(HttpClientError::InvalidUrl(_))));
    }
}
