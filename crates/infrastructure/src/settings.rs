//! Layered runner settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional settings
//! file (`assay.toml`, `assay.yaml`, ... in the working directory unless a
//! path is given), then `ASSAY_*` environment variables. Command-line flags
//! are applied on top by the binary.

use std::collections::HashMap;
use std::path::PathBuf;

use assay_domain::settings::RunnerSettings;
use config::{Config, Environment, File};
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ASSAY";

/// File stem searched for when no explicit settings file is given.
pub const DEFAULT_SETTINGS_STEM: &str = "assay";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or did not deserialize.
    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    /// The merged settings are out of range.
    #[error("invalid setting {field}: {message}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Builds [`RunnerSettings`] from layered sources.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl SettingsLoader {
    /// Creates a loader that reads `assay.*` from the working directory and
    /// the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an explicit settings file, which must then exist.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    #[must_use]
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Loads and checks the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, a value has the wrong
    /// type, or the result is out of range.
    pub fn load(&self) -> Result<RunnerSettings, SettingsError> {
        let file = match &self.file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::with_name(DEFAULT_SETTINGS_STEM).required(false),
        };

        let settings: RunnerSettings = Config::builder()
            .add_source(Config::try_from(&RunnerSettings::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(self.env.clone()),
            )
            .build()?
            .try_deserialize()?;

        check(&settings)?;
        Ok(settings)
    }
}

fn check(settings: &RunnerSettings) -> Result<(), SettingsError> {
    if settings.timeout_ms == 0 {
        return Err(SettingsError::Invalid {
            field: "timeout_ms",
            message: "must be greater than zero".to_string(),
        });
    }
    if settings.user_agent.trim().is_empty() {
        return Err(SettingsError::Invalid {
            field: "user_agent",
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = SettingsLoader::new().with_env(HashMap::new()).load().unwrap();
        assert_eq!(settings, RunnerSettings::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "timeout_ms = 1500\nconcurrency = 8").unwrap();

        let settings = SettingsLoader::new()
            .with_file(file.path())
            .with_env(HashMap::new())
            .load()
            .unwrap();

        assert_eq!(settings.timeout_ms, 1500);
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.max_redirects, 10);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "timeout_ms: 1500\nverify_tls: true").unwrap();

        let settings = SettingsLoader::new()
            .with_file(file.path())
            .with_env(env(&[
                ("ASSAY_TIMEOUT_MS", "250"),
                ("ASSAY_VERIFY_TLS", "false"),
            ]))
            .load()
            .unwrap();

        assert_eq!(settings.timeout_ms, 250);
        assert!(!settings.verify_tls);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = SettingsLoader::new()
            .with_file("/definitely/not/here/assay.toml")
            .with_env(HashMap::new())
            .load();
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = SettingsLoader::new()
            .with_env(env(&[("ASSAY_TIMEOUT_MS", "0")]))
            .load();
        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                field: "timeout_ms",
                ..
            })
        ));
    }
}
