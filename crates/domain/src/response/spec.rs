use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::Headers;

/// A captured HTTP response.
///
/// Serializes as the response snapshot of a test result: `status_code`,
/// `headers`, `body` and `size`. The measured duration is carried on the
/// test result instead and is not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code. Zero when no response was received.
    #[serde(rename = "status_code")]
    pub status: u16,
    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
    /// Response body, lossily decoded as UTF-8.
    #[serde(default)]
    pub body: String,
    /// Response size in bytes, before decoding.
    #[serde(default)]
    pub size: usize,
    /// Time from sending the request until the body was fully read.
    #[serde(skip)]
    pub duration: Duration,
}

impl ResponseSpec {
    /// Captures a response from its raw parts.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: &[u8], duration: Duration) -> Self {
        Self {
            status,
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
            size: body.len(),
            duration,
        }
    }

    /// Content-Type header, parameters included.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    /// Looks a header up case-insensitively.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_capture() {
        let headers = Headers::new().with("Content-Type", "application/json; charset=utf-8");
        let response = ResponseSpec::new(200, headers, br#"{"ok":true}"#, Duration::from_millis(40));

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"ok":true}"#);
        assert_eq!(response.size, 11);
        assert_eq!(response.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(response.get_header("CONTENT-TYPE"), response.content_type());
        assert_eq!(response.get_header("x-missing"), None);
    }

    #[test]
    fn test_size_counts_raw_bytes() {
        let bytes = [0x68, 0x69, 0xff];
        let response = ResponseSpec::new(200, Headers::new(), &bytes, Duration::ZERO);
        assert_eq!(response.size, 3);
        assert!(response.body.starts_with("hi"));
    }

    #[test]
    fn test_snapshot_serialization() {
        let response = ResponseSpec::new(201, Headers::new(), b"{}", Duration::from_secs(1));
        let json = serde_json::to_value(&response).unwrap_or_default();

        assert_eq!(json["status_code"], 201);
        assert_eq!(json["size"], 2);
        assert_eq!(json["body"], "{}");
        assert!(json.get("duration").is_none());
    }
}
