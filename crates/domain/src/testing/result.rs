//! Test outcomes: per-assertion, per-test and per-suite.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Assertion, AssertionSpec};
use crate::request::RequestSpec;
use crate::response::ResponseSpec;

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// The request completed and every assertion passed.
    Pass,
    /// The request failed or at least one assertion failed.
    Fail,
}

impl TestStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a single assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    /// Assertion type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// JSON path or header name, when the assertion has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Expected value.
    pub expected: Value,
    /// Actual value found, `null` if there was none.
    pub actual: Value,
    /// Whether the assertion passed.
    pub passed: bool,
    /// Human-readable explanation, present on pass and on fail.
    pub message: String,
}

impl AssertionResult {
    /// Create a passed result.
    #[must_use]
    pub fn pass(assertion: &Assertion, actual: impl Into<Value>, message: impl Into<String>) -> Self {
        Self::from_assertion(assertion, true, actual.into(), message.into())
    }

    /// Create a failed result with the actual value that was found.
    #[must_use]
    pub fn fail(assertion: &Assertion, actual: impl Into<Value>, message: impl Into<String>) -> Self {
        Self::from_assertion(assertion, false, actual.into(), message.into())
    }

    /// Create a pass or fail result from a boolean outcome.
    #[must_use]
    pub fn outcome(
        assertion: &Assertion,
        passed: bool,
        actual: impl Into<Value>,
        message: impl Into<String>,
    ) -> Self {
        Self::from_assertion(assertion, passed, actual.into(), message.into())
    }

    /// Create a failed result for an assertion that could not be interpreted.
    #[must_use]
    pub fn invalid(spec: &AssertionSpec, message: impl Into<String>) -> Self {
        Self {
            kind: spec.kind.clone(),
            target: spec.target.clone(),
            expected: spec.expected.clone(),
            actual: Value::Null,
            passed: false,
            message: message.into(),
        }
    }

    fn from_assertion(assertion: &Assertion, passed: bool, actual: Value, message: String) -> Self {
        Self {
            kind: assertion.kind().as_str().to_string(),
            target: assertion.target(),
            expected: assertion.expected_value(),
            actual,
            passed,
            message,
        }
    }
}

/// The recorded outcome of running one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the test case.
    pub test_name: String,
    /// PASS or FAIL.
    pub status: TestStatus,
    /// Wall-clock time of the request, in nanoseconds on the wire.
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    /// The request as actually sent.
    pub request: RequestSpec,
    /// The response received; empty when the request failed.
    pub response: ResponseSpec,
    /// Assertion outcomes, in declaration order.
    pub assertions: Vec<AssertionResult>,
    /// Transport failure, if the request could not be completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestResult {
    /// Builds a result from a completed exchange. The status is PASS iff
    /// every assertion passed.
    #[must_use]
    pub fn completed(
        test_name: impl Into<String>,
        request: RequestSpec,
        response: ResponseSpec,
        assertions: Vec<AssertionResult>,
    ) -> Self {
        let status = if assertions.iter().all(|a| a.passed) {
            TestStatus::Pass
        } else {
            TestStatus::Fail
        };
        Self {
            test_name: test_name.into(),
            status,
            duration: response.duration,
            request,
            response,
            assertions,
            error: None,
        }
    }

    /// Builds a FAIL result for a request that never produced a response.
    #[must_use]
    pub fn errored(
        test_name: impl Into<String>,
        request: RequestSpec,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            status: TestStatus::Fail,
            duration,
            request,
            response: ResponseSpec::default(),
            assertions: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Returns true if the test passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

/// Suite-level roll-up of all test results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite_name: String,
    /// Number of results.
    pub total_tests: usize,
    /// Number of PASS results.
    pub passed_tests: usize,
    /// Number of FAIL results.
    pub failed_tests: usize,
    /// Passed share as a percentage; 0 when there are no tests.
    pub success_rate: f64,
    /// Wall-clock time for the whole run, in nanoseconds on the wire.
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    /// Results in suite declaration order.
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    /// Create a report, folding the counts from `results`.
    #[must_use]
    pub fn new(suite_name: impl Into<String>, results: Vec<TestResult>, duration: Duration) -> Self {
        let (passed_tests, failed_tests) =
            results
                .iter()
                .fold((0, 0), |(passed, failed), result| match result.status {
                    TestStatus::Pass => (passed + 1, failed),
                    TestStatus::Fail => (passed, failed + 1),
                });
        let total_tests = results.len();
        #[allow(clippy::cast_precision_loss)]
        let success_rate = if total_tests == 0 {
            0.0
        } else {
            (passed_tests as f64 / total_tests as f64) * 100.0
        };

        Self {
            suite_name: suite_name.into(),
            total_tests,
            passed_tests,
            failed_tests,
            success_rate,
            duration,
            results,
        }
    }

    /// Check if all tests passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed_tests == 0
    }
}

mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
