//! Test suite definitions.

use serde::{Deserialize, Serialize};
use url::Url;

use super::AssertionSpec;
use crate::error::{DomainError, DomainResult};
use crate::request::{Headers, HttpMethod};

/// A named, ordered collection of test cases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name.
    #[serde(default)]
    pub name: String,
    /// Prefix for test URLs that have no scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Headers sent with every test unless the test overrides them.
    #[serde(default)]
    pub headers: Headers,
    /// Test cases, in execution and report order.
    #[serde(default)]
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    /// Create a new empty test suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the base URL (builder pattern).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Adds a default header (builder pattern).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a test case (builder pattern).
    #[must_use]
    pub fn with_test(mut self, test: TestCase) -> Self {
        self.tests.push(test);
        self
    }

    /// Returns the suite-level values every test inherits.
    #[must_use]
    pub fn defaults(&self) -> SuiteDefaults {
        SuiteDefaults {
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
        }
    }

    /// Check if the suite has no tests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Get the number of tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }
}

/// Suite-level values applied to each test case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuiteDefaults {
    /// Base URL for relative test URLs.
    pub base_url: Option<String>,
    /// Default headers.
    pub headers: Headers,
}

/// One HTTP request plus the assertions that must hold for its response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestCase {
    /// Test name.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// HTTP method, as written. Parsed with [`TestCase::http_method`].
    #[serde(default)]
    pub method: String,
    /// Absolute URL, or a path relative to the suite base URL.
    #[serde(default, alias = "path")]
    pub url: String,
    /// Headers layered over the suite defaults.
    #[serde(default)]
    pub headers: Headers,
    /// Raw request body. Not sent with GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Assertions, evaluated in order.
    #[serde(default)]
    pub assertions: Vec<AssertionSpec>,
}

impl TestCase {
    /// Creates a test case.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: method.as_str().to_string(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Adds a header (builder pattern).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds an assertion (builder pattern).
    #[must_use]
    pub fn with_assertion(mut self, assertion: AssertionSpec) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Parses the method.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnsupportedMethod` if the method is not one of
    /// GET, POST, PUT, PATCH or DELETE.
    pub fn http_method(&self) -> DomainResult<HttpMethod> {
        self.method.parse()
    }

    /// Resolves the final request URL against the suite base URL.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the result is not a well-formed
    /// absolute URL.
    pub fn resolve_url(&self, base_url: Option<&str>) -> DomainResult<Url> {
        resolve_url(base_url, &self.url)
    }
}

/// Combines a base URL and a test URL.
///
/// A `url` that carries a scheme is used as is. Anything else is appended to
/// `base_url` with exactly one `/` between them, so a base path such as
/// `https://api.example.com/v1` is kept.
///
/// # Errors
///
/// Returns `DomainError::InvalidUrl` when the URL is empty, relative with no
/// base, or does not parse.
pub fn resolve_url(base_url: Option<&str>, url: &str) -> DomainResult<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DomainError::InvalidUrl("URL is required".to_string()));
    }

    if has_scheme(url) {
        return parse_http_url(url);
    }

    let base = base_url
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| {
            DomainError::InvalidUrl(format!("'{url}' is relative and no base_url is set"))
        })?;

    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    );
    parse_http_url(&joined)
}

fn has_scheme(url: &str) -> bool {
    url.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn parse_http_url(raw: &str) -> DomainResult<Url> {
    let parsed = Url::parse(raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(DomainError::InvalidUrl(format!("missing host: {raw}"))),
        other => Err(DomainError::InvalidUrl(format!(
            "unsupported scheme '{other}': {raw}"
        ))),
    }
}
