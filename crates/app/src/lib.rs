//! Assay - API test runner
//!
//! Command-line front end and HTTP service over the suite orchestrator.

pub mod cli;
pub mod commands;
pub mod report;
pub mod server;

pub use cli::{Cli, Command, OutputFormat};
pub use commands::{EXIT_FAILED, EXIT_INVALID, EXIT_OK, execute};
pub use report::ConsoleReporter;
