//! Test execution: request executor, assertion evaluator, test case runner
//! and suite orchestrator.

mod case_runner;
mod evaluator;
mod executor;
#[cfg(test)]
pub(crate) mod mock;
mod suite_runner;

pub use case_runner::TestCaseRunner;
pub use evaluator::AssertionEvaluator;
pub use executor::{Execution, RequestExecutor};
pub use suite_runner::SuiteOrchestrator;
