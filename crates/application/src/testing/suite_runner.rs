//! Suite orchestration.
//!
//! Validates a suite, runs every test case (concurrently up to a bound) and
//! rolls the results up into a [`SuiteReport`] in declaration order.

use std::sync::Arc;
use std::time::Instant;

use assay_domain::settings::RunnerSettings;
use assay_domain::testing::{SuiteDefaults, SuiteReport, TestResult, TestSuite};
use assay_domain::validation::validate;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::case_runner::TestCaseRunner;
use super::executor::RequestExecutor;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::HttpClient;

/// Runs whole suites.
///
/// The only state shared between runs is the HTTP client.
pub struct SuiteOrchestrator<C: HttpClient + ?Sized + 'static> {
    runner: TestCaseRunner<C>,
    concurrency: usize,
}

impl<C: HttpClient + ?Sized + 'static> SuiteOrchestrator<C> {
    /// Creates an orchestrator using the timeout and concurrency from
    /// `settings`.
    pub fn new(client: Arc<C>, settings: &RunnerSettings) -> Self {
        Self {
            runner: TestCaseRunner::new(RequestExecutor::new(client, settings.timeout())),
            concurrency: settings.effective_concurrency(),
        }
    }

    /// Returns the maximum number of tests run at once.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Validates and runs a suite.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` before sending anything if the
    /// suite is invalid, and `ApplicationError::Internal` if a test task
    /// dies. Failing tests are not errors.
    pub async fn run(&self, suite: &TestSuite) -> ApplicationResult<SuiteReport> {
        let validation = validate(suite);
        if !validation.is_valid() {
            return Err(ApplicationError::Validation(validation));
        }

        info!(
            suite = %suite.name,
            tests = suite.len(),
            concurrency = self.concurrency,
            "running suite"
        );
        let start = Instant::now();
        let defaults = suite.defaults();

        let results = if self.concurrency <= 1 || suite.len() <= 1 {
            self.run_sequential(suite, &defaults).await
        } else {
            self.run_concurrent(suite, defaults).await?
        };

        let report = SuiteReport::new(&suite.name, results, start.elapsed());
        info!(
            suite = %report.suite_name,
            passed = report.passed_tests,
            failed = report.failed_tests,
            duration_ms = report.duration.as_millis(),
            "suite finished"
        );
        Ok(report)
    }

    async fn run_sequential(&self, suite: &TestSuite, defaults: &SuiteDefaults) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(suite.len());
        for test in &suite.tests {
            results.push(self.runner.run(test, defaults).await);
        }
        results
    }

    async fn run_concurrent(
        &self,
        suite: &TestSuite,
        defaults: SuiteDefaults,
    ) -> ApplicationResult<Vec<TestResult>> {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let defaults = Arc::new(defaults);
        let mut tasks = JoinSet::new();

        for (index, test) in suite.tests.iter().enumerate() {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| ApplicationError::Internal(format!("worker pool closed: {e}")))?;
            let runner = self.runner.clone();
            let defaults = Arc::clone(&defaults);
            let test = test.clone();

            tasks.spawn(async move {
                let result = runner.run(&test, &defaults).await;
                drop(permit);
                (index, result)
            });
        }

        let mut slots: Vec<Option<TestResult>> = vec![None; suite.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) =
                joined.map_err(|e| ApplicationError::Internal(format!("test task failed: {e}")))?;
            debug!(index, test = %result.test_name, "collected result");
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    ApplicationError::Internal(format!("no result for test #{index}"))
                })
            })
            .collect()
    }
}
