//! Test suites, assertions and their results.

mod assertion;
mod result;
mod suite;

pub use assertion::{Assertion, AssertionKind, AssertionSpec, ComparisonOperator};
pub use result::{AssertionResult, SuiteReport, TestResult, TestStatus};
pub use suite::{SuiteDefaults, TestCase, TestSuite, resolve_url};
