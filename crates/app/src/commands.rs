//! Subcommand execution.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use assay_application::{ApplicationError, HttpClient, SuiteOrchestrator};
use assay_domain::settings::RunnerSettings;
use assay_domain::validation::{validate, validate_definition};
use assay_infrastructure::{
    ReqwestHttpClient, SettingsLoader, load_suite, to_json_stable, write_sample_suite,
};
use tracing::info;

use crate::cli::{Cli, Command, OutputFormat, RunArgs, ServeArgs};
use crate::report::ConsoleReporter;
use crate::server::{self, AppState};

/// Every test passed, or the command succeeded.
pub const EXIT_OK: u8 = 0;
/// At least one test failed.
pub const EXIT_FAILED: u8 = 1;
/// The suite could not be loaded or is invalid.
pub const EXIT_INVALID: u8 = 2;

/// Runs the parsed command line.
///
/// # Errors
///
/// Returns an error for settings, load, I/O and startup failures. Test
/// failures and invalid suites are reported through the exit code instead.
pub async fn execute(cli: Cli) -> Result<ExitCode> {
    let config = cli.config.as_deref();
    let code = match cli.command {
        Command::Run(args) => run(&args, config).await?,
        Command::Validate { file, definition } => check(&file, definition).await?,
        Command::Init { file, force } => init(&file, force).await?,
        Command::Serve(args) => serve(&args, config).await?,
    };
    Ok(ExitCode::from(code))
}

fn load_settings(config: Option<&Path>) -> Result<RunnerSettings> {
    let loader = match config {
        Some(path) => SettingsLoader::new().with_file(path),
        None => SettingsLoader::new(),
    };
    loader.load().context("could not load settings")
}

async fn run(args: &RunArgs, config: Option<&Path>) -> Result<u8> {
    let settings = args.apply(load_settings(config)?);
    if settings.timeout_ms == 0 {
        bail!("--timeout-ms must be greater than zero");
    }
    let suite = load_suite(&args.file)
        .await
        .with_context(|| format!("could not load {}", args.file.display()))?;

    let client = ReqwestHttpClient::from_settings(&settings)
        .context("could not build HTTP client")?;
    let orchestrator = SuiteOrchestrator::new(Arc::new(client), &settings);
    let reporter = ConsoleReporter::new(args.verbose).with_color(!args.no_color);

    let report = match orchestrator.run(&suite).await {
        Ok(report) => report,
        Err(ApplicationError::Validation(validation)) => {
            reporter.write_validation(&validation, &mut io::stderr().lock())?;
            return Ok(EXIT_INVALID);
        }
        Err(err) => return Err(err.into()),
    };

    let mut out = io::stdout().lock();
    match args.output {
        OutputFormat::Console => reporter.write_report(&report, &mut out)?,
        OutputFormat::Json => out.write_all(to_json_stable(&report)?.as_bytes())?,
    }
    out.flush()?;

    Ok(if report.all_passed() {
        EXIT_OK
    } else {
        EXIT_FAILED
    })
}

async fn check(file: &Path, definition: bool) -> Result<u8> {
    let suite = load_suite(file)
        .await
        .with_context(|| format!("could not load {}", file.display()))?;
    let validation = if definition {
        validate_definition(&suite)
    } else {
        validate(&suite)
    };

    ConsoleReporter::default().write_validation(&validation, &mut io::stdout().lock())?;
    Ok(if validation.is_valid() {
        EXIT_OK
    } else {
        EXIT_INVALID
    })
}

async fn init(file: &Path, force: bool) -> Result<u8> {
    write_sample_suite(file, force).await?;
    println!("Wrote sample suite to {}", file.display());
    println!("Run it with: assay run {}", file.display());
    Ok(EXIT_OK)
}

async fn serve(args: &ServeArgs, config: Option<&Path>) -> Result<u8> {
    let settings = load_settings(config)?;
    let addr = args
        .addr()
        .await
        .with_context(|| format!("could not resolve bind address {}:{}", args.host, args.port))?;
    let client: Arc<dyn HttpClient> = Arc::new(
        ReqwestHttpClient::from_settings(&settings).context("could not build HTTP client")?,
    );

    info!("Starting assay service v{}", env!("CARGO_PKG_VERSION"));
    server::serve(addr, AppState::new(client, &settings))
        .await
        .with_context(|| format!("service on {addr} failed"))?;
    Ok(EXIT_OK)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use assay_infrastructure::persistence::SAMPLE_SUITE_YAML;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_init_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.yaml");

        assert_eq!(init(&path, false).await.unwrap(), EXIT_OK);
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            SAMPLE_SUITE_YAML
        );
        assert_eq!(check(&path, false).await.unwrap(), EXIT_OK);
        assert!(init(&path, false).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        tokio::fs::write(&path, r#"{"name": "Draft", "tests": []}"#)
            .await
            .unwrap();

        assert_eq!(check(&path, false).await.unwrap(), EXIT_INVALID);
        assert_eq!(check(&path, true).await.unwrap(), EXIT_OK);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check(&dir.path().join("nope.yaml"), false).await.is_err());
    }
}
