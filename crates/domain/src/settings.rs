//! Runner settings.
//!
//! Knobs that shape how a suite is executed but are not part of the suite
//! itself. Loading them from files and the environment is an
//! infrastructure concern; this is just the shape and the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default number of tests in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Default redirect limit.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Settings for the HTTP client and the suite orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of tests running at once. `1` runs sequentially.
    pub concurrency: usize,
    /// Maximum number of redirects followed per request.
    pub max_redirects: usize,
    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            verify_tls: true,
            user_agent: format!("assay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RunnerSettings {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the worker count, never less than one.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Sets the timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the concurrency (builder pattern).
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = RunnerSettings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.max_redirects, 10);
        assert!(settings.verify_tls);
        assert!(settings.user_agent.starts_with("assay/"));
    }

    #[test]
    fn test_zero_concurrency_is_sequential() {
        let settings = RunnerSettings::default().with_concurrency(0);
        assert_eq!(settings.effective_concurrency(), 1);
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let settings: RunnerSettings =
            serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap_or_default();
        assert_eq!(settings.timeout_ms, 500);
        assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);
    }
}
