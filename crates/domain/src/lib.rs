//! Assay Domain - Core types for the API test runner
//!
//! This crate defines suites, test cases, assertions, results and the
//! static validation rules. All types here are pure Rust with no I/O
//! dependencies.

pub mod error;
pub mod json_path;
pub mod request;
pub mod response;
pub mod settings;
pub mod testing;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use json_path::{JsonPath, json_equals};
pub use request::{Headers, HttpMethod, RequestSpec};
pub use response::ResponseSpec;
pub use settings::RunnerSettings;
pub use testing::{
    Assertion, AssertionKind, AssertionResult, AssertionSpec, ComparisonOperator, SuiteDefaults,
    SuiteReport, TestCase, TestResult, TestStatus, TestSuite,
};
pub use validation::{FieldError, ValidationMode, ValidationResult, validate, validate_definition};
