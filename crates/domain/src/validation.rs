//! Static suite validation.
//!
//! Validation never touches the network and never mutates the suite. It
//! collects every problem it finds as a [`FieldError`] addressed by a
//! dotted/indexed field path such as `tests[2].assertions[0]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::testing::{TestCase, TestSuite};

/// How strict validation is about an empty suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// The suite is about to run: it must contain at least one test.
    #[default]
    Execution,
    /// The suite is only being checked as a document: zero tests is fine.
    Definition,
}

/// A problem with one field of a suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating a suite. Empty means valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Every problem found, in suite order.
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Returns true if no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Validates a suite that is about to be executed.
#[must_use]
pub fn validate(suite: &TestSuite) -> ValidationResult {
    validate_with_mode(suite, ValidationMode::Execution)
}

/// Validates a suite as a document, allowing it to have no tests.
#[must_use]
pub fn validate_definition(suite: &TestSuite) -> ValidationResult {
    validate_with_mode(suite, ValidationMode::Definition)
}

/// Validates a suite under the given mode.
#[must_use]
pub fn validate_with_mode(suite: &TestSuite, mode: ValidationMode) -> ValidationResult {
    let mut result = ValidationResult::default();

    if suite.name.trim().is_empty() {
        result.push("name", "suite name is required");
    }
    if mode == ValidationMode::Execution && suite.tests.is_empty() {
        result.push("tests", "suite must contain at least one test");
    }

    for (index, test) in suite.tests.iter().enumerate() {
        validate_test(&mut result, index, test, suite.base_url.as_deref());
    }

    result
}

fn validate_test(result: &mut ValidationResult, index: usize, test: &TestCase, base_url: Option<&str>) {
    let prefix = format!("tests[{index}]");

    if test.name.trim().is_empty() {
        result.push(format!("{prefix}.name"), "test name is required");
    }

    if let Err(e) = test.http_method() {
        result.push(format!("{prefix}.method"), e.to_string());
    }

    if test.url.trim().is_empty() {
        result.push(format!("{prefix}.url"), "URL is required");
    } else if let Err(e) = test.resolve_url(base_url) {
        result.push(format!("{prefix}.url"), e.to_string());
    }

    for (position, spec) in test.assertions.iter().enumerate() {
        if let Err(e) = spec.to_assertion() {
            result.push(format!("{prefix}.assertions[{position}]"), e.to_string());
        }
    }
}
