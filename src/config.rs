// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network logger configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::native::{Platform, DEFAULT_MAX_DEPTH};
use crate::network::filter::DEFAULT_BINDING;

/// Network logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkLoggerConfig {
    /// Platform whose payload convention is used
    pub platform: Platform,
    /// Also send records to the APM sink
    pub apm_enabled: bool,
    /// Capture request and response bodies
    pub capture_bodies: bool,
    /// Maximum body bytes kept per record
    pub max_body_size: usize,
    /// Filter expression installed at startup
    pub filter_expression: Option<String>,
    /// Name the record is bound to in filter expressions
    pub filter_binding: String,
    /// Deepest payload nesting the sinks accept
    pub max_payload_depth: usize,
}

impl Default for NetworkLoggerConfig {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            apm_enabled: false,
            capture_bodies: true,
            max_body_size: 1024 * 1024, // 1MB
            filter_expression: None,
            filter_binding: DEFAULT_BINDING.to_string(),
            max_payload_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl NetworkLoggerConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set platform
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Enable/disable the APM sink
    pub fn apm_enabled(mut self, enabled: bool) -> Self {
        self.apm_enabled = enabled;
        self
    }

    /// Set body capture settings
    pub fn capture_bodies(mut self, capture: bool, max_size: usize) -> Self {
        self.capture_bodies = capture;
        self.max_body_size = max_size;
        self
    }

    /// Set the startup filter expression
    pub fn filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    /// Set the filter binding name
    pub fn filter_binding(mut self, binding: impl Into<String>) -> Self {
        self.filter_binding = binding.into();
        self
    }

    /// Set the payload nesting limit
    pub fn max_payload_depth(mut self, depth: usize) -> Self {
        self.max_payload_depth = depth;
        self
    }

    /// Headers and timing only, no bodies
    pub fn metadata_only() -> Self {
        Self {
            capture_bodies: false,
            max_body_size: 0,
            ..Default::default()
        }
    }

    /// Large bodies, APM on
    pub fn full_capture() -> Self {
        Self {
            apm_enabled: true,
            max_body_size: 10 * 1024 * 1024,
            ..Default::default()
        }
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check values that cannot be expressed in the type
    pub fn validate(&self) -> Result<()> {
        if self.filter_binding.is_empty()
            || !self
                .filter_binding
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            || self.filter_binding.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(Error::config(format!(
                "invalid filter binding '{}'",
                self.filter_binding
            )));
        }
        if self.max_payload_depth == 0 {
            return Err(Error::config("max_payload_depth must be at least 1"));
        }
        Ok(())
    }
}
