//! HTTP response types for the ODSS client.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

/// A response returned by the API.
///
/// The status code is available both as `status_code` and as `status`.
/// Both fields always hold the same value; `status` is kept for callers
/// written against the older field name.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseEnvelope {
    /// The HTTP status code.
    pub status_code: u16,
    /// The HTTP status code, mirrored from `status_code`.
    pub status: u16,
    /// Response headers, keyed by lowercase name (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The response body.
    ///
    /// JSON bodies are parsed; any other non-empty body is kept as a string
    /// value and an empty body is `null`.
    pub body: serde_json::Value,
}

impl ResponseEnvelope {
    /// Creates a new envelope.
    #[must_use]
    pub fn new(
        status_code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            status_code,
            status: status_code,
            headers,
            body,
        }
    }

    /// Parses a raw response body.
    #[must_use]
    pub fn parse_body(bytes: &[u8]) -> serde_json::Value {
        if bytes.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_slice(bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        })
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status_code >= 200 && self.status_code <= 299
    }

    /// Returns the first value of a header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_status_is_mirrored() {
        let response = ResponseEnvelope::new(201, HashMap::new(), json!({}));
        assert_eq!(response.status_code, 201);
        assert_eq!(response.status, 201);
    }

    #[test]
    fn test_is_ok_for_2xx_only() {
        assert!(ResponseEnvelope::new(200, HashMap::new(), json!(null)).is_ok());
        assert!(ResponseEnvelope::new(299, HashMap::new(), json!(null)).is_ok());
        assert!(!ResponseEnvelope::new(304, HashMap::new(), json!(null)).is_ok());
        assert!(!ResponseEnvelope::new(404, HashMap::new(), json!(null)).is_ok());
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(ResponseEnvelope::parse_body(b""), json!(null));
        assert_eq!(ResponseEnvelope::parse_body(br#"{"id":1}"#), json!({"id": 1}));
        assert_eq!(ResponseEnvelope::parse_body(b"plain text"), json!("plain text"));
    }

    #[test]
    fn test_header_lookup() {
        let mut headers = HashMap::new();
        headers.insert(
            "x-request-id".to_string(),
            vec!["abc".to_string(), "def".to_string()],
        );
        let response = ResponseEnvelope::new(200, headers, json!(null));

        assert_eq!(response.header("X-Request-Id"), Some("abc"));
        assert_eq!(response.header("missing"), None);
    }

    #[test]
    fn test_json_deserializes_body() {
        #[derive(Deserialize)]
        struct Incident {
            id: u64,
            name: String,
        }

        let response =
            ResponseEnvelope::new(200, HashMap::new(), json!({"id": 5, "name": "Flood"}));
        let incident: Incident = response.json().unwrap();
        assert_eq!(incident.id, 5);
        assert_eq!(incident.name, "Flood");
    }
}
