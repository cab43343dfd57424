// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use super::headers;
use crate::error::{Error, Result};

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Complete body; transports read it to the end before returning
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    pub response_time_ms: u64,
}

impl Response {
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            response_time_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Result<String> {
        std::str::from_utf8(&self.body)
            .map(str::to_string)
            .map_err(|e| Error::other(format!("response body is not UTF-8: {}", e)))
    }

    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// First value of a header, if it is valid text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(headers::CONTENT_TYPE)
    }

    /// JSON or a `+json` structured syntax suffix
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| ct.contains("application/json") || ct.contains("+json"))
            .unwrap_or(false)
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Headers as a JSON object, repeated headers joined with ", ".
    ///
    /// A response without headers yields an empty string, which is how
    /// native sinks expect "no headers".
    pub fn headers_json(&self) -> Value {
        if self.headers.is_empty() {
            return Value::String(String::new());
        }

        let mut map = Map::new();
        for (name, value) in self.headers.iter() {
            let value = String::from_utf8_lossy(value.as_bytes());
            match map.get_mut(name.as_str()) {
                Some(Value::String(existing)) => {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                _ => {
                    map.insert(name.to_string(), Value::String(value.into_owned()));
                }
            }
        }
        Value::Object(map)
    }

    /// Whether a JSON body carries a non-empty GraphQL `errors` array
    pub fn has_graphql_errors(&self) -> bool {
        if !self.is_json() {
            return false;
        }
        self.json::<Value>()
            .ok()
            .and_then(|body| body.get("errors").and_then(Value::as_array).map(|e| !e.is_empty()))
            .unwrap_or(false)
    }
}
