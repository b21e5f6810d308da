//! Command-line arguments.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use assay_domain::settings::RunnerSettings;
use assay_infrastructure::persistence::DEFAULT_SUITE_FILE;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Run API test suites from the command line or as an HTTP service.
///
/// EXAMPLES:
///     assay init                       Write a sample suite
///     assay run sample-tests.yaml      Run a suite
///     assay run suite.json -o json     Print the report as JSON
///     assay serve --port 9000          Start the HTTP service
///
/// ENVIRONMENT VARIABLES:
///     ASSAY_TIMEOUT_MS, ASSAY_CONCURRENCY, ...   Override runner settings
///     ASSAY_HOST, ASSAY_PORT                     Service bind address
///     RUST_LOG                                   Log filter (default: info)
#[derive(Debug, Parser)]
#[command(name = "assay", version, propagate_version = true)]
pub struct Cli {
    /// Settings file (defaults to assay.toml / assay.yaml if present)
    #[arg(long, global = true, env = "ASSAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load, validate and execute a suite file
    ///
    /// Exits with 0 when every test passed, 1 when any failed and 2 when the
    /// suite could not be loaded or is invalid.
    Run(RunArgs),

    /// Check a suite file without sending any requests
    Validate {
        /// Path to the suite file (.yaml, .yml or .json)
        file: PathBuf,
        /// Only check the suite's structure; a suite without tests is accepted
        #[arg(long)]
        definition: bool,
    },

    /// Write a sample suite file
    Init {
        /// Where to write the sample
        #[arg(default_value = DEFAULT_SUITE_FILE)]
        file: PathBuf,
        /// Overwrite the file if it exists
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Start the HTTP service
    Serve(ServeArgs),
}

/// How `run` prints its report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Console,
    /// The full report as JSON.
    Json,
}

/// Arguments of `run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the suite file (.yaml, .yml or .json)
    pub file: PathBuf,

    /// Report format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Console)]
    pub output: OutputFormat,

    /// Maximum number of tests in flight
    #[arg(long, short = 'c')]
    pub concurrency: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// List every assertion, not just the failing ones
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl RunArgs {
    /// Applies the flags on top of loaded settings.
    #[must_use]
    pub fn apply(&self, mut settings: RunnerSettings) -> RunnerSettings {
        if let Some(concurrency) = self.concurrency {
            settings = settings.with_concurrency(concurrency);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings = settings.with_timeout_ms(timeout_ms);
        }
        settings
    }
}

/// Arguments of `serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind (IP address or host name)
    #[arg(long, env = "ASSAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "ASSAY_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServeArgs {
    /// Resolves host and port into the first matching socket address.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not resolve.
    pub async fn addr(&self) -> io::Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} resolved to no addresses", self.host),
                )
            })
    }
}
