//! Assertion evaluation.
//!
//! Checks one assertion against one captured response. Evaluation never
//! fails: every problem, including an assertion that cannot be interpreted,
//! is reported as a failing [`AssertionResult`] with a message.

use std::time::Duration;

use assay_domain::json_path::{JsonPath, json_equals};
use assay_domain::response::ResponseSpec;
use assay_domain::testing::{Assertion, AssertionResult, AssertionSpec, ComparisonOperator};
use assay_domain::DomainError;
use serde_json::Value;

const PREVIEW_CHARS: usize = 100;

/// Evaluates assertions against responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssertionEvaluator;

impl AssertionEvaluator {
    /// Create a new evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates an assertion as written in a suite.
    ///
    /// Unknown or malformed assertions produce a failing result instead of
    /// an error.
    #[must_use]
    pub fn evaluate(
        &self,
        spec: &AssertionSpec,
        response: &ResponseSpec,
        duration: Duration,
    ) -> AssertionResult {
        match Assertion::try_from(spec) {
            Ok(assertion) => self.evaluate_assertion(&assertion, response, duration),
            Err(DomainError::UnknownAssertionType(kind)) => {
                AssertionResult::invalid(spec, format!("Unknown assertion type: {kind}"))
            }
            Err(e) => AssertionResult::invalid(spec, format!("Invalid assertion: {e}")),
        }
    }

    /// Evaluates a typed assertion.
    #[must_use]
    pub fn evaluate_assertion(
        &self,
        assertion: &Assertion,
        response: &ResponseSpec,
        duration: Duration,
    ) -> AssertionResult {
        match assertion {
            Assertion::Status { expected } => self.check_status(assertion, response, *expected),
            Assertion::ResponseTime {
                threshold_ms,
                operator,
            } => self.check_response_time(assertion, duration, *threshold_ms, *operator),
            Assertion::ContentType { expected } => {
                self.check_content_type(assertion, response, expected)
            }
            Assertion::BodyContains { expected } => {
                self.check_body_contains(assertion, response, expected)
            }
            Assertion::JsonPath {
                path,
                operator,
                expected,
            } => self.check_json_path(assertion, response, path, *operator, expected),
            Assertion::Header {
                name,
                operator,
                expected,
            } => self.check_header(assertion, response, name, *operator, expected),
        }
    }

    fn check_status(
        &self,
        assertion: &Assertion,
        response: &ResponseSpec,
        expected: u16,
    ) -> AssertionResult {
        let actual = response.status;
        AssertionResult::outcome(
            assertion,
            actual == expected,
            actual,
            format!("Expected status {expected}, got {actual}"),
        )
    }

    fn check_response_time(
        &self,
        assertion: &Assertion,
        duration: Duration,
        threshold_ms: u64,
        operator: ComparisonOperator,
    ) -> AssertionResult {
        let elapsed_ms = duration.as_secs_f64() * 1000.0;
        #[allow(clippy::cast_precision_loss)]
        let threshold = threshold_ms as f64;
        let passed = match operator {
            ComparisonOperator::GreaterThan => elapsed_ms > threshold,
            ComparisonOperator::Equals => duration.as_millis() == u128::from(threshold_ms),
            _ => elapsed_ms < threshold,
        };
        let actual_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        AssertionResult::outcome(
            assertion,
            passed,
            actual_ms,
            format!(
                "Expected response time {} {threshold_ms}ms, got {elapsed_ms:.2}ms",
                operator.symbol()
            ),
        )
    }

    fn check_content_type(
        &self,
        assertion: &Assertion,
        response: &ResponseSpec,
        expected: &str,
    ) -> AssertionResult {
        let Some(raw) = response.content_type() else {
            return AssertionResult::fail(
                assertion,
                Value::Null,
                "No Content-Type header present",
            );
        };

        let actual = media_type(raw);
        let wanted = expected.trim().to_ascii_lowercase();
        if actual == wanted || actual.contains(&wanted) {
            AssertionResult::pass(
                assertion,
                actual.as_str(),
                format!("Content-Type '{actual}' matches '{expected}'"),
            )
        } else {
            AssertionResult::fail(
                assertion,
                actual.as_str(),
                format!("Content-Type '{actual}' does not contain '{expected}'"),
            )
        }
    }

    fn check_body_contains(
        &self,
        assertion: &Assertion,
        response: &ResponseSpec,
        text: &str,
    ) -> AssertionResult {
        let body = &response.body;
        if body.contains(text) {
            AssertionResult::pass(assertion, preview(body), format!("Body contains '{text}'"))
        } else {
            AssertionResult::fail(
                assertion,
                preview(body),
                format!("Body does not contain '{text}'"),
            )
        }
    }

    fn check_json_path(
        &self,
        assertion: &Assertion,
        response: &ResponseSpec,
        path: &JsonPath,
        operator: ComparisonOperator,
        expected: &Value,
    ) -> AssertionResult {
        let json = match serde_json::from_str::<Value>(&response.body) {
            Ok(json) => json,
            Err(e) => {
                return AssertionResult::fail(
                    assertion,
                    Value::Null,
                    format!("Failed to parse body as JSON: {e}"),
                );
            }
        };

        let Some(actual) = path.lookup(&json) else {
            return AssertionResult::fail(
                assertion,
                Value::Null,
                format!("JSON path '{path}' not found"),
            );
        };

        if compare_json_values(actual, operator, expected) {
            AssertionResult::pass(
                assertion,
                actual.clone(),
                format!(
                    "JSON path '{path}': {actual} {} {expected}",
                    operator.symbol()
                ),
            )
        } else {
            AssertionResult::fail(
                assertion,
                actual.clone(),
                format!(
                    "JSON path '{path}': expected {} {expected}, got {actual}",
                    operator.symbol()
                ),
            )
        }
    }

    fn check_header(
        &self,
        assertion: &Assertion,
        response: &ResponseSpec,
        name: &str,
        operator: ComparisonOperator,
        expected: &str,
    ) -> AssertionResult {
        let Some(actual) = response.get_header(name) else {
            return AssertionResult::fail(
                assertion,
                Value::Null,
                format!("Header '{name}' not found"),
            );
        };

        let passed = match operator {
            ComparisonOperator::Contains => actual.contains(expected),
            _ => actual == expected,
        };
        let message = if passed {
            format!("Header '{name}' is '{actual}'")
        } else {
            format!(
                "Header '{name}': expected {} '{expected}', got '{actual}'",
                operator.symbol()
            )
        };
        AssertionResult::outcome(assertion, passed, actual, message)
    }
}

/// Lower-cased media type without parameters, e.g. `application/json` for
/// `application/json; charset=utf-8`.
fn media_type(raw: &str) -> String {
    raw.parse::<mime::Mime>().map_or_else(
        |_| {
            raw.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        },
        |m| m.essence_str().to_ascii_lowercase(),
    )
}

fn preview(body: &str) -> String {
    if body.chars().count() > PREVIEW_CHARS {
        let head: String = body.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

/// Compare two JSON values using the given operator.
fn compare_json_values(actual: &Value, operator: ComparisonOperator, expected: &Value) -> bool {
    match operator {
        ComparisonOperator::Equals => json_equals(actual, expected),
        ComparisonOperator::NotEquals => !json_equals(actual, expected),
        ComparisonOperator::Contains => match (actual, expected) {
            (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
            (Value::String(s), Value::Number(_) | Value::Bool(_)) => {
                s.contains(&expected.to_string())
            }
            (Value::Array(items), _) => items.iter().any(|item| json_equals(item, expected)),
            _ => false,
        },
        ComparisonOperator::GreaterThan => compare_numeric(actual, expected, |a, b| a > b),
        ComparisonOperator::LessThan => compare_numeric(actual, expected, |a, b| a < b),
    }
}

fn compare_numeric(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}
