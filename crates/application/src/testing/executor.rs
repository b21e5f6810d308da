//! Request execution for a single test case.

use std::sync::Arc;
use std::time::{Duration, Instant};

use assay_domain::request::{HttpMethod, RequestSpec};
use assay_domain::response::ResponseSpec;
use assay_domain::testing::{SuiteDefaults, TestCase};

use crate::ports::{HttpClient, HttpClientError};

/// What happened when a test case's request was sent.
#[derive(Debug, Clone)]
pub struct Execution {
    /// The request as built (or as far as it could be built).
    pub request: RequestSpec,
    /// The response, or the transport failure.
    pub outcome: Result<ResponseSpec, HttpClientError>,
    /// Wall-clock time of the exchange.
    pub elapsed: Duration,
}

/// Builds requests from test cases and sends them through an [`HttpClient`].
pub struct RequestExecutor<C: HttpClient + ?Sized> {
    client: Arc<C>,
    timeout: Duration,
}

impl<C: HttpClient + ?Sized> Clone for RequestExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            timeout: self.timeout,
        }
    }
}

impl<C: HttpClient + ?Sized> RequestExecutor<C> {
    /// Creates an executor with the given client and per-request timeout.
    pub fn new(client: Arc<C>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the final request for a test case.
    ///
    /// The URL is resolved against the suite base URL, suite headers are
    /// overlaid with the test's own headers, and the body is dropped for GET.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is not supported or the URL cannot be
    /// resolved.
    pub fn build_request(
        &self,
        test: &TestCase,
        defaults: &SuiteDefaults,
    ) -> Result<RequestSpec, HttpClientError> {
        let method = test
            .http_method()
            .map_err(|e| HttpClientError::InvalidRequest(e.to_string()))?;
        let url = test
            .resolve_url(defaults.base_url.as_deref())
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;

        let mut request = RequestSpec::new(method, url.as_str())
            .with_headers(defaults.headers.merged_with(&test.headers))
            .with_timeout(self.timeout);
        if let Some(body) = &test.body {
            request = request.with_body(body.clone());
        }
        Ok(request)
    }

    /// Sends the request for a test case. Never fails: build and transport
    /// errors are carried in [`Execution::outcome`].
    pub async fn execute(&self, test: &TestCase, defaults: &SuiteDefaults) -> Execution {
        let request = match self.build_request(test, defaults) {
            Ok(request) => request,
            Err(error) => {
                return Execution {
                    request: unresolved_request(test, defaults),
                    outcome: Err(error),
                    elapsed: Duration::ZERO,
                };
            }
        };

        let start = Instant::now();
        let outcome = self.client.execute(&request).await;
        let elapsed = match &outcome {
            Ok(response) if !response.duration.is_zero() => response.duration,
            _ => start.elapsed(),
        };

        Execution {
            request,
            outcome,
            elapsed,
        }
    }
}

/// Best-effort echo of a request that could not be built.
fn unresolved_request(test: &TestCase, defaults: &SuiteDefaults) -> RequestSpec {
    let method = test.http_method().unwrap_or(HttpMethod::Get);
    let url = match defaults.base_url.as_deref() {
        Some(base) if !test.url.contains("://") => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            test.url.trim_start_matches('/')
        ),
        _ => test.url.clone(),
    };
    RequestSpec::new(method, url).with_headers(defaults.headers.merged_with(&test.headers))
}
