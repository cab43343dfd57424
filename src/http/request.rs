// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::Result;

/// Header entry as supplied by the caller.
///
/// Names keep their original casing so captured records show what the
/// application actually set; the wire request is built from these later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers, in the order they were set
    pub headers: Vec<HeaderEntry>,
    /// Request body
    pub body: Option<Bytes>,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: Vec::new(),
            body: None,
            timeout: Some(Duration::from_secs(30)),
        })
    }

    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Set a header, replacing any existing header with the same name
    /// (compared case-insensitively, as HTTP does)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set a header in place
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => {
                existing.name = name;
                existing.value = value;
            }
            None => self.headers.push(HeaderEntry { name, value }),
        }
    }

    /// Get a header value by name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_vec(data)?;
        self.body = Some(Bytes::from(json));
        Ok(self.header("Content-Type", "application/json"))
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable timeout
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Body length in bytes
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map(|b| b.len()).unwrap_or(0)
    }

    /// Build the wire header map.
    ///
    /// Entries that are not valid HTTP header names or values are skipped.
    pub fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for entry in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(entry.name.as_str()),
                HeaderValue::try_from(entry.value.as_str()),
            ) {
                map.insert(name, value);
            }
        }
        map
    }

    /// Get the URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = Request::get("https://example.com/path").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_header_case_is_preserved() {
        let req = Request::get("https://example.com")
            .unwrap()
            .header("Content-type", "application/json");
        assert_eq!(req.headers[0].name, "Content-type");
        assert_eq!(req.header_value("content-type"), Some("application/json"));
    }

    #[test]
    fn test_header_replaces_same_name() {
        let req = Request::get("https://example.com")
            .unwrap()
            .header("X-Token", "a")
            .header("x-token", "b");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers[0].value, "b");
    }

    #[test]
    fn test_header_map_skips_invalid() {
        let req = Request::get("https://example.com")
            .unwrap()
            .header("bad header", "x")
            .header("x-ok", "1");
        let map = req.header_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "1");
    }
}
