//! Assay Application - Test execution and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for external dependencies)
//! - Assertion evaluation, test case and suite execution
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod testing;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{HttpClient, HttpClientError, TransportErrorKind};
pub use testing::{
    AssertionEvaluator, Execution, RequestExecutor, SuiteOrchestrator, TestCaseRunner,
};
