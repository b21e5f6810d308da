//! Suite files on disk.
//!
//! A suite file is YAML (`.yaml`/`.yml`) or JSON (`.json`) and holds either a
//! bare suite or one wrapped as `{"test_suite": ...}`, the shape the HTTP
//! service accepts.

use std::path::Path;

use assay_domain::testing::TestSuite;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Key under which a wrapped suite is stored.
pub const SUITE_WRAPPER_KEY: &str = "test_suite";

/// Default file name for `init`.
pub const DEFAULT_SUITE_FILE: &str = "sample-tests.yaml";

/// Sample suite written by `init`.
pub const SAMPLE_SUITE_YAML: &str = r#"name: "Sample API Tests"
base_url: "https://jsonplaceholder.typicode.com"
headers:
  Accept: "application/json"
tests:
  - name: "Get single post"
    description: "Fetch a post and check its shape"
    method: GET
    url: "/posts/1"
    assertions:
      - type: status
        expected: 200
      - type: response_time
        expected: 5000
      - type: content_type
        expected: "application/json"
      - type: json_path
        expected:
          path: "$.id"
          value: 1
  - name: "List posts"
    method: GET
    url: "/posts"
    assertions:
      - type: status
        expected: 200
      - type: json_path
        target: "$[0].userId"
        expected: 1
  - name: "Create post"
    method: POST
    url: "/posts"
    headers:
      Content-Type: "application/json"
    body: '{"title": "foo", "body": "bar", "userId": 1}'
    assertions:
      - type: status
        expected: 201
      - type: body_contains
        expected: "foo"
"#;

/// Errors that can occur while reading or writing suite files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not one we can parse.
    #[error("unsupported suite file format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// The document is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document is not valid JSON, or not a suite.
    #[error("invalid suite: {0}")]
    Json(#[from] serde_json::Error),

    /// `init` refused to overwrite an existing file.
    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(String),
}

/// Suite file syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// YAML.
    Yaml,
    /// JSON.
    Json,
}

impl SuiteFormat {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::UnsupportedFormat` for anything other than
    /// `yaml`, `yml` or `json`.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parses a suite document, bare or wrapped.
///
/// # Errors
///
/// Returns an error if the text is not valid in `format` or does not
/// describe a suite.
pub fn parse_suite(content: &str, format: SuiteFormat) -> Result<TestSuite, LoadError> {
    let document: Value = match format {
        SuiteFormat::Yaml => serde_yaml::from_str(content)?,
        SuiteFormat::Json => serde_json::from_str(content)?,
    };
    Ok(suite_from_value(document)?)
}

/// Interprets a JSON value as a suite, unwrapping `{"test_suite": ...}`.
///
/// # Errors
///
/// Returns an error if the value does not describe a suite.
pub fn suite_from_value(mut document: Value) -> Result<TestSuite, serde_json::Error> {
    if let Some(inner) = document
        .as_object_mut()
        .and_then(|map| map.remove(SUITE_WRAPPER_KEY))
    {
        document = inner;
    }
    serde_json::from_value(document)
}

/// Reads and parses a suite file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported
/// extension, or does not parse.
pub async fn load_suite(path: &Path) -> Result<TestSuite, LoadError> {
    let format = SuiteFormat::from_path(path)?;
    let content = fs::read_to_string(path).await.map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let suite = parse_suite(&content, format)?;
    debug!(path = %path.display(), suite = %suite.name, tests = suite.len(), "loaded suite");
    Ok(suite)
}

/// Writes the sample suite to `path`.
///
/// # Errors
///
/// Returns `LoadError::AlreadyExists` if the file exists and `force` is
/// false, or an I/O error if it cannot be written.
pub async fn write_sample_suite(path: &Path, force: bool) -> Result<(), LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.display().to_string(),
        source,
    };

    if !force && fs::try_exists(path).await.map_err(io_error)? {
        return Err(LoadError::AlreadyExists(path.display().to_string()));
    }
    fs::write(path, SAMPLE_SUITE_YAML).await.map_err(io_error)
}
