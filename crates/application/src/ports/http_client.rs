//! HTTP Client port

use async_trait::async_trait;
use thiserror::Error;

use assay_domain::{request::RequestSpec, response::ResponseSpec};

/// Class of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request could not be built (bad URL, method or header).
    InvalidRequest,
    /// DNS resolution failed.
    Dns,
    /// Could not establish connection.
    ConnectionFailed,
    /// Connection was refused by the server.
    ConnectionRefused,
    /// Request timed out.
    Timeout,
    /// TLS/SSL error.
    Tls,
    /// Too many redirects.
    TooManyRedirects,
    /// The response body could not be read.
    Body,
    /// Unknown or unexpected error.
    Unknown,
}

impl TransportErrorKind {
    /// Returns a human-readable title for this error class.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid Request",
            Self::Dns => "DNS Resolution Failed",
            Self::ConnectionFailed => "Connection Failed",
            Self::ConnectionRefused => "Connection Refused",
            Self::Timeout => "Request Timeout",
            Self::Tls => "TLS/SSL Error",
            Self::TooManyRedirects => "Too Many Redirects",
            Self::Body => "Response Body Error",
            Self::Unknown => "Request Failed",
        }
    }
}

/// Errors an HTTP client can report for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpClientError {
    /// The request URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// DNS lookup failed.
    #[error("could not resolve host '{host}': {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying error message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request exceeded its deadline.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },

    /// TLS handshake or certificate failure.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// The redirect limit was hit.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Returns the failure class.
    #[must_use]
    pub const fn kind(&self) -> TransportErrorKind {
        match self {
            Self::InvalidUrl(_) | Self::InvalidRequest(_) => TransportErrorKind::InvalidRequest,
            Self::DnsError { .. } => TransportErrorKind::Dns,
            Self::ConnectionRefused { .. } => TransportErrorKind::ConnectionRefused,
            Self::ConnectionFailed(_) => TransportErrorKind::ConnectionFailed,
            Self::Timeout { .. } => TransportErrorKind::Timeout,
            Self::TlsError(_) => TransportErrorKind::Tls,
            Self::TooManyRedirects { .. } => TransportErrorKind::TooManyRedirects,
            Self::Body(_) => TransportErrorKind::Body,
            Self::Other(_) => TransportErrorKind::Unknown,
        }
    }

    /// Formats the error for a test result, prefixed with its class.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}: {self}", self.kind().title())
    }
}

/// Port for executing HTTP requests.
///
/// Implementations must be safe to share between concurrently running
/// tests. They must honour `request.timeout` and report an expired deadline
/// as [`HttpClientError::Timeout`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the response.
    ///
    /// The returned [`ResponseSpec::duration`] covers the whole exchange,
    /// redirects and body read included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails due to network issues,
    /// timeout, or other transport problems. HTTP error statuses are not
    /// errors.
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError>;
}
