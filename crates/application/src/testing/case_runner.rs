//! Runs one test case: request, then assertions.

use assay_domain::testing::{SuiteDefaults, TestCase, TestResult};
use tracing::{debug, warn};

use super::evaluator::AssertionEvaluator;
use super::executor::RequestExecutor;
use crate::ports::HttpClient;

/// Executes a test case and evaluates its assertions.
pub struct TestCaseRunner<C: HttpClient + ?Sized> {
    executor: RequestExecutor<C>,
    evaluator: AssertionEvaluator,
}

impl<C: HttpClient + ?Sized> Clone for TestCaseRunner<C> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            evaluator: self.evaluator,
        }
    }
}

impl<C: HttpClient + ?Sized> TestCaseRunner<C> {
    /// Creates a runner around an executor.
    pub const fn new(executor: RequestExecutor<C>) -> Self {
        Self {
            executor,
            evaluator: AssertionEvaluator::new(),
        }
    }

    /// Runs the test case. Always produces a result.
    ///
    /// A transport failure yields FAIL with `error` set and no assertion
    /// results. Otherwise every assertion is evaluated, in order, and the
    /// test passes iff all of them do.
    pub async fn run(&self, test: &TestCase, defaults: &SuiteDefaults) -> TestResult {
        let execution = self.executor.execute(test, defaults).await;

        let result = match execution.outcome {
            Err(error) => {
                warn!(
                    test = %test.name,
                    url = %execution.request.url,
                    error = %error,
                    "request failed"
                );
                TestResult::errored(
                    &test.name,
                    execution.request,
                    execution.elapsed,
                    error.describe(),
                )
            }
            Ok(mut response) => {
                response.duration = execution.elapsed;
                let assertions = test
                    .assertions
                    .iter()
                    .map(|spec| self.evaluator.evaluate(spec, &response, execution.elapsed))
                    .collect();
                TestResult::completed(&test.name, execution.request, response, assertions)
            }
        };

        debug!(
            test = %result.test_name,
            status = %result.status,
            duration_ms = result.duration.as_millis(),
            "test finished"
        );
        result
    }
}
