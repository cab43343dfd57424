// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Native SDK boundary
//!
//! Native modules are reached only through one-way sends. Each sink gets
//! the record in the form its platform expects: a structured value on iOS,
//! a JSON string on Android.

mod codec;
mod sinks;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use codec::{RecordCodec, DEFAULT_MAX_DEPTH};
pub use sinks::{MemorySink, TracingSink, UploadSink};

/// Target mobile platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    /// Platform this binary was built for; Android everywhere but iOS
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Android
        }
    }

    /// Payload shape the platform's native modules accept
    pub fn payload_format(self) -> PayloadFormat {
        match self {
            Platform::Ios => PayloadFormat::Structured,
            Platform::Android => PayloadFormat::Encoded,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(crate::error::Error::config(format!(
                "unknown platform '{}'",
                other
            ))),
        }
    }
}

/// How a record crosses the native boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Structured value passed as-is
    Structured,
    /// Pre-serialized JSON string
    Encoded,
}

/// Record as handed to a native sink
#[derive(Debug, Clone, PartialEq)]
pub enum SinkPayload {
    Structured(Value),
    Encoded(String),
}

impl SinkPayload {
    /// JSON text of the payload
    pub fn to_json_string(&self) -> String {
        match self {
            SinkPayload::Structured(value) => value.to_string(),
            SinkPayload::Encoded(text) => text.clone(),
        }
    }
}

/// A native module accepting network logs.
///
/// Calls are fire-and-forget: nothing is returned and the pipeline never
/// waits on a sink.
pub trait NativeSink: Send + Sync {
    /// Sink name used in logs
    fn name(&self) -> &str;

    /// Send one record
    fn network_log(&self, payload: SinkPayload);

    /// Notified when network logging is switched on or off
    fn set_network_logging_enabled(&self, _enabled: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_formats() {
        assert_eq!(Platform::Ios.payload_format(), PayloadFormat::Structured);
        assert_eq!(Platform::Android.payload_format(), PayloadFormat::Encoded);
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("android".parse::<Platform>().unwrap(), Platform::Android);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn test_payload_json_string() {
        let structured = SinkPayload::Structured(serde_json::json!({"a": 1}));
        assert_eq!(structured.to_json_string(), r#"{"a":1}"#);
        assert_eq!(SinkPayload::Encoded("x".into()).to_json_string(), "x");
    }
}
