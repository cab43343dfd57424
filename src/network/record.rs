// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network record: one captured HTTP exchange

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error domain reported for exchanges that failed below HTTP
pub const CLIENT_ERROR_DOMAIN: &str = "ClientError";

/// One captured HTTP request/response exchange with timing.
///
/// Field names serialize in camelCase, which is the shape the native SDKs
/// expect. A record handed to the done callback is complete; the pipeline
/// only ever works on copies of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Request body, empty when none was sent
    #[serde(default)]
    pub request_body: String,
    /// Size of the request body in bytes
    #[serde(default)]
    pub request_body_size: u64,
    /// Request headers with names as the caller supplied them
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    /// Content type of the request body
    #[serde(default)]
    pub request_content_type: String,
    /// Response body; a string unless a hook replaced it with structured data
    #[serde(default = "empty_string")]
    pub response_body: Value,
    /// Size of the response body in bytes
    #[serde(default)]
    pub response_body_size: u64,
    /// Response status code, 0 when the exchange failed
    #[serde(default)]
    pub response_code: u16,
    /// Response headers, raw: a mapping, or an empty string when there were none
    #[serde(default = "empty_string")]
    pub response_headers: Value,
    /// Response content type
    #[serde(default)]
    pub content_type: String,
    /// Milliseconds from request start to completion or failure
    #[serde(default)]
    pub duration: u64,
    /// Request start, milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// GraphQL operation name, when issued through the link adapter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gql_query_name: Option<String>,
    /// Server-side error marker (GraphQL error responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_error_message: Option<String>,
    /// Error domain when the exchange failed below HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_domain: Option<String>,
    /// Error code when the exchange failed below HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
}

fn empty_string() -> Value {
    Value::String(String::new())
}

impl NetworkRecord {
    /// Start a record for a request that is about to be sent
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            request_body: String::new(),
            request_body_size: 0,
            request_headers: BTreeMap::new(),
            request_content_type: String::new(),
            response_body: empty_string(),
            response_body_size: 0,
            response_code: 0,
            response_headers: empty_string(),
            content_type: String::new(),
            duration: 0,
            start_time: None,
            gql_query_name: None,
            server_error_message: None,
            error_domain: None,
            error_code: None,
        }
    }

    /// Whether the exchange failed before an HTTP status was received
    pub fn is_failure(&self) -> bool {
        self.error_domain.is_some() || self.response_code == 0
    }

    /// Whether the exchange was issued through the GraphQL adapter
    pub fn is_graphql(&self) -> bool {
        self.gql_query_name.is_some()
    }

    /// Look up a request header by name, ignoring case
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Response body as text, if it is still a string
    pub fn response_text(&self) -> Option<&str> {
        self.response_body.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NetworkRecord {
        let mut record = NetworkRecord::new("https://api.instabug.com", "GET");
        record
            .request_headers
            .insert("Content-type".into(), "application/json".into());
        record.response_code = 200;
        record.content_type = "application/json".into();
        record
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["responseCode"], 200);
        assert_eq!(value["requestHeaders"]["Content-type"], "application/json");
        assert_eq!(value["responseHeaders"], "");
        assert!(value.get("gqlQueryName").is_none());
    }

    #[test]
    fn test_deserializes_minimal_record() {
        let record: NetworkRecord =
            serde_json::from_str(r#"{"url":"https://a.io","method":"POST"}"#).unwrap();
        assert_eq!(record.method, "POST");
        assert_eq!(record.response_body, Value::String(String::new()));
        assert!(record.is_failure());
    }

    #[test]
    fn test_request_header_lookup_ignores_case() {
        let record = sample();
        assert_eq!(record.request_header("content-type"), Some("application/json"));
        assert_eq!(record.request_header("accept"), None);
    }
}
