//! Console rendering of suite reports and validation errors.

use std::io::{self, Write};
use std::time::Duration;

use assay_domain::testing::{SuiteReport, TestResult, TestStatus};
use assay_domain::validation::ValidationResult;
use colored::{ColoredString, Colorize};

const RULE_WIDTH: usize = 50;

/// Human-readable report writer.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
    color: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConsoleReporter {
    /// Creates a colored reporter.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            color: true,
        }
    }

    /// Turns coloring on or off.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Writes a suite report.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` cannot be written.
    pub fn write_report(&self, report: &SuiteReport, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{} {}", self.paint("Suite:", |s| s.bold()), report.suite_name)?;
        writeln!(out)?;

        for result in &report.results {
            self.write_result(result, out)?;
        }

        writeln!(out)?;
        writeln!(out, "{}", "─".repeat(RULE_WIDTH))?;
        let verdict = if report.all_passed() {
            self.paint("PASSED", |s| s.green().bold())
        } else {
            self.paint("FAILED", |s| s.red().bold())
        };
        let failed = report.failed_tests.to_string();
        let failed = if report.failed_tests > 0 {
            self.paint(&failed, |s| s.red().bold())
        } else {
            failed
        };
        writeln!(
            out,
            "Result: {verdict} | {} total, {} passed, {failed} failed ({:.1}%)",
            report.total_tests, report.passed_tests, report.success_rate
        )?;
        writeln!(out, "Time: {}", format_duration(report.duration))
    }

    /// Writes the field errors of an invalid suite.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` cannot be written.
    pub fn write_validation(
        &self,
        validation: &ValidationResult,
        out: &mut impl Write,
    ) -> io::Result<()> {
        if validation.is_valid() {
            return writeln!(out, "{} suite is valid", self.paint("✓", |s| s.green()));
        }
        writeln!(
            out,
            "{} suite is invalid ({} error{}):",
            self.paint("✗", |s| s.red().bold()),
            validation.errors.len(),
            if validation.errors.len() == 1 { "" } else { "s" }
        )?;
        for error in &validation.errors {
            writeln!(out, "  {}: {}", self.paint(&error.field, |s| s.bold()), error.message)?;
        }
        Ok(())
    }

    fn write_result(&self, result: &TestResult, out: &mut impl Write) -> io::Result<()> {
        let label = match result.status {
            TestStatus::Pass => self.paint("PASS", |s| s.green().bold()),
            TestStatus::Fail => self.paint("FAIL", |s| s.red().bold()),
        };
        writeln!(
            out,
            "  {label}  {} ({})",
            result.test_name,
            format_duration(result.duration)
        )?;

        if let Some(error) = &result.error {
            writeln!(out, "        {} {error}", self.paint("error:", |s| s.red()))?;
        }
        for assertion in &result.assertions {
            if assertion.passed && !self.verbose {
                continue;
            }
            let mark = if assertion.passed {
                self.paint("✓", |s| s.green())
            } else {
                self.paint("✗", |s| s.red())
            };
            writeln!(out, "        {mark} {}: {}", assertion.kind, assertion.message)?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, style: impl FnOnce(ColoredString) -> ColoredString) -> String {
        if self.color {
            style(text.normal()).to_string()
        } else {
            text.to_string()
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_secs_f64() * 1000.0;
    if millis >= 1000.0 {
        format!("{:.2}s", millis / 1000.0)
    } else {
        format!("{millis:.2}ms")
    }
}
