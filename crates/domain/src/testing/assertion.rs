//! Response assertions.
//!
//! Assertions arrive on the wire as loosely typed [`AssertionSpec`] records
//! (`type`, `expected`, plus optional `target` and `operator`). Before they
//! can be evaluated they are converted into the closed [`Assertion`] enum,
//! which is where unknown types and badly shaped `expected` values are
//! caught.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};
use crate::json_path::JsonPath;

/// An assertion as written in a suite document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionSpec {
    /// Assertion type tag, e.g. `status` or `json_path`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Expected value; its shape depends on the type.
    #[serde(default)]
    pub expected: Value,
    /// JSON path or header name, for the types that need one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Comparison operator; each type has a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl AssertionSpec {
    /// Creates a spec with just a type and an expected value.
    #[must_use]
    pub fn new(kind: impl Into<String>, expected: Value) -> Self {
        Self {
            kind: kind.into(),
            expected,
            target: None,
            operator: None,
        }
    }

    /// Sets the target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the operator (builder pattern).
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Converts this spec into a typed assertion.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or the fields do not have the
    /// shape the type requires.
    pub fn to_assertion(&self) -> DomainResult<Assertion> {
        Assertion::try_from(self)
    }
}

/// Recognized assertion types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    /// Exact status code.
    Status,
    /// Response time threshold in milliseconds.
    ResponseTime,
    /// Content-Type media type.
    ContentType,
    /// Case-sensitive substring of the body.
    BodyContains,
    /// Value at a JSON path.
    JsonPath,
    /// Response header value.
    Header,
}

impl AssertionKind {
    /// Returns all recognized kinds.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Status,
            Self::ResponseTime,
            Self::ContentType,
            Self::BodyContains,
            Self::JsonPath,
            Self::Header,
        ]
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::ResponseTime => "response_time",
            Self::ContentType => "content_type",
            Self::BodyContains => "body_contains",
            Self::JsonPath => "json_path",
            Self::Header => "header",
        }
    }

    /// Operators this kind accepts. The first one is the default.
    #[must_use]
    pub const fn operators(self) -> &'static [ComparisonOperator] {
        use ComparisonOperator as Op;
        match self {
            Self::Status => &[Op::Equals],
            Self::ResponseTime => &[Op::LessThan, Op::GreaterThan, Op::Equals],
            Self::ContentType | Self::BodyContains => &[Op::Contains],
            Self::JsonPath => &[
                Op::Equals,
                Op::NotEquals,
                Op::Contains,
                Op::GreaterThan,
                Op::LessThan,
            ],
            Self::Header => &[Op::Equals, Op::Contains],
        }
    }

    /// Returns the operator used when none is given.
    #[must_use]
    pub const fn default_operator(self) -> ComparisonOperator {
        self.operators()[0]
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssertionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownAssertionType(s.to_string()))
    }
}

/// Comparison operators for value assertions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Substring or array membership.
    Contains,
    /// Greater than.
    GreaterThan,
    /// Less than.
    LessThan,
}

impl ComparisonOperator {
    /// Returns the wire name of this operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
        }
    }

    /// Get the symbol for this operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::Contains => "contains",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim() {
            "equals" => Ok(Self::Equals),
            "not_equals" => Ok(Self::NotEquals),
            "contains" => Ok(Self::Contains),
            "greater_than" => Ok(Self::GreaterThan),
            "less_than" => Ok(Self::LessThan),
            other => Err(DomainError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// A typed assertion to run against a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    /// Status code equals `expected`.
    Status {
        /// Expected status code.
        expected: u16,
    },
    /// Response time compared against a threshold.
    ResponseTime {
        /// Threshold in milliseconds.
        threshold_ms: u64,
        /// `less_than` unless configured otherwise.
        operator: ComparisonOperator,
    },
    /// Content-Type media type contains `expected`, ignoring case.
    ContentType {
        /// Expected media type or fragment of it.
        expected: String,
    },
    /// Body contains `expected`.
    BodyContains {
        /// Substring to look for.
        expected: String,
    },
    /// Value at `path` compared against `expected`.
    JsonPath {
        /// Where to look.
        path: JsonPath,
        /// How to compare.
        operator: ComparisonOperator,
        /// What to compare against.
        expected: Value,
    },
    /// Header `name` compared against `expected`.
    Header {
        /// Header name (case-insensitive).
        name: String,
        /// `equals` or `contains`.
        operator: ComparisonOperator,
        /// Expected value.
        expected: String,
    },
}

impl Assertion {
    /// Returns the kind of this assertion.
    #[must_use]
    pub const fn kind(&self) -> AssertionKind {
        match self {
            Self::Status { .. } => AssertionKind::Status,
            Self::ResponseTime { .. } => AssertionKind::ResponseTime,
            Self::ContentType { .. } => AssertionKind::ContentType,
            Self::BodyContains { .. } => AssertionKind::BodyContains,
            Self::JsonPath { .. } => AssertionKind::JsonPath,
            Self::Header { .. } => AssertionKind::Header,
        }
    }

    /// Returns the JSON path or header name this assertion looks at.
    #[must_use]
    pub fn target(&self) -> Option<String> {
        match self {
            Self::JsonPath { path, .. } => Some(path.to_string()),
            Self::Header { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    /// Returns the expected value as JSON, for reporting.
    #[must_use]
    pub fn expected_value(&self) -> Value {
        match self {
            Self::Status { expected } => Value::from(*expected),
            Self::ResponseTime { threshold_ms, .. } => Value::from(*threshold_ms),
            Self::ContentType { expected }
            | Self::BodyContains { expected }
            | Self::Header { expected, .. } => Value::from(expected.as_str()),
            Self::JsonPath { expected, .. } => expected.clone(),
        }
    }

    /// Get a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Status { expected } => format!("Status code == {expected}"),
            Self::ResponseTime {
                threshold_ms,
                operator,
            } => format!("Response time {} {threshold_ms}ms", operator.symbol()),
            Self::ContentType { expected } => format!("Content-Type contains '{expected}'"),
            Self::BodyContains { expected } => format!("Body contains '{expected}'"),
            Self::JsonPath {
                path,
                operator,
                expected,
            } => format!("JSON {path} {} {expected}", operator.symbol()),
            Self::Header {
                name,
                operator,
                expected,
            } => format!("Header '{name}' {} '{expected}'", operator.symbol()),
        }
    }
}

impl TryFrom<&AssertionSpec> for Assertion {
    type Error = DomainError;

    fn try_from(spec: &AssertionSpec) -> DomainResult<Self> {
        let kind: AssertionKind = spec.kind.trim().parse()?;
        let invalid = |message: String| DomainError::InvalidAssertion {
            kind: kind.as_str().to_string(),
            message,
        };

        let operator = match spec.operator.as_deref() {
            None => kind.default_operator(),
            Some(raw) => {
                let op: ComparisonOperator = raw.parse()?;
                if !kind.operators().contains(&op) {
                    return Err(invalid(format!(
                        "operator '{}' is not supported",
                        op.as_str()
                    )));
                }
                op
            }
        };

        match kind {
            AssertionKind::Status => {
                let expected = positive_integer(&spec.expected)
                    .and_then(|n| u16::try_from(n).ok())
                    .ok_or_else(|| {
                        invalid(format!(
                            "expected must be a positive integer status code, got {}",
                            spec.expected
                        ))
                    })?;
                Ok(Self::Status { expected })
            }
            AssertionKind::ResponseTime => {
                let threshold_ms = positive_integer(&spec.expected).ok_or_else(|| {
                    invalid(format!(
                        "expected must be a positive integer in milliseconds, got {}",
                        spec.expected
                    ))
                })?;
                Ok(Self::ResponseTime {
                    threshold_ms,
                    operator,
                })
            }
            AssertionKind::ContentType => Ok(Self::ContentType {
                expected: non_empty_string(&spec.expected).ok_or_else(|| {
                    invalid(format!("expected must be a non-empty string, got {}", spec.expected))
                })?,
            }),
            AssertionKind::BodyContains => Ok(Self::BodyContains {
                expected: non_empty_string(&spec.expected).ok_or_else(|| {
                    invalid(format!("expected must be a non-empty string, got {}", spec.expected))
                })?,
            }),
            AssertionKind::JsonPath => {
                let (raw_path, expected) = json_path_parts(spec).ok_or_else(|| {
                    invalid(
                        "expected must be {\"path\": ..., \"value\": ...} or target must name the path"
                            .to_string(),
                    )
                })?;
                let path = JsonPath::parse(raw_path)?;
                if matches!(
                    operator,
                    ComparisonOperator::GreaterThan | ComparisonOperator::LessThan
                ) && !expected.is_number()
                {
                    return Err(invalid(format!(
                        "operator '{}' needs a numeric expected value, got {expected}",
                        operator.as_str()
                    )));
                }
                Ok(Self::JsonPath {
                    path,
                    operator,
                    expected,
                })
            }
            AssertionKind::Header => {
                let name = spec
                    .target
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| invalid("target must name the header".to_string()))?;
                let expected = scalar_to_string(&spec.expected).ok_or_else(|| {
                    invalid(format!("expected must be a scalar value, got {}", spec.expected))
                })?;
                Ok(Self::Header {
                    name: name.to_string(),
                    operator,
                    expected,
                })
            }
        }
    }
}

/// Accepts positive integers, including whole floats such as `200.0` that
/// YAML and some JSON producers emit.
fn positive_integer(value: &Value) -> Option<u64> {
    let n = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= 9_007_199_254_740_992.0)
            .map(|f| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = f as u64;
                n
            })
    })?;
    (n > 0).then_some(n)
}

fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_path_parts(spec: &AssertionSpec) -> Option<(&str, Value)> {
    if let Some(target) = spec.target.as_deref() {
        return Some((target, spec.expected.clone()));
    }
    let pair = spec.expected.as_object()?;
    let path = pair.get("path")?.as_str()?;
    let value = pair.get("value")?.clone();
    Some((path, value))
}
