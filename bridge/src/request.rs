//! Immutable request snapshot for the legacy transport interface.

use http::{HeaderMap, Method};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Minimal read-only request shape a legacy transport consumes: the method
/// string and a lower-cased header map. Built once per request, never
/// mutated.
#[derive(Debug, Clone)]
pub struct BridgedRequest {
    method: String,
    headers: HashMap<String, String>,
}

impl BridgedRequest {
    /// Snapshot method and headers. Header names are normalized to lower
    /// case, repeated values are joined with `", "`, values that are not
    /// valid UTF-8 are skipped.
    pub fn new(method: &Method, headers: &HeaderMap) -> Self {
        let mut map: HashMap<String, String> = HashMap::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            match map.entry(name.as_str().to_ascii_lowercase()) {
                Entry::Occupied(mut entry) => {
                    let joined = entry.get_mut();
                    joined.push_str(", ");
                    joined.push_str(value);
                }
                Entry::Vacant(entry) => {
                    entry.insert(value.to_string());
                }
            }
        }
        Self {
            method: method.as_str().to_string(),
            headers: map,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Lookup by lower-cased header name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, HeaderValue};

    #[test]
    fn test_header_names_lowercased() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("mcp-session-id"),
            HeaderValue::from_static("abc-123"),
        );
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );

        let req = BridgedRequest::new(&Method::POST, &headers);
        assert_eq!(req.method(), "POST");
        assert_eq!(req.header("mcp-session-id"), Some("abc-123"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.headers().keys().all(|k| k.chars().all(|c| !c.is_ascii_uppercase())));
    }

    #[test]
    fn test_repeated_headers_joined() {
        let mut headers = HeaderMap::new();
        headers.append(
            HeaderName::from_static("accept"),
            HeaderValue::from_static("application/json"),
        );
        headers.append(
            HeaderName::from_static("accept"),
            HeaderValue::from_static("text/event-stream"),
        );

        let req = BridgedRequest::new(&Method::GET, &headers);
        assert_eq!(
            req.header("accept"),
            Some("application/json, text/event-stream")
        );
    }

    #[test]
    fn test_missing_header_is_none() {
        let req = BridgedRequest::new(&Method::DELETE, &HeaderMap::new());
        assert_eq!(req.header("origin"), None);
        assert!(req.headers().is_empty());
    }
}
