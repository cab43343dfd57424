// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # netlogger - Network logging bridge
//!
//! Captures HTTP exchanges made through an intercepted transport and forwards
//! them to native SDK sinks, after user-supplied filtering and obfuscation.
//!
//! ## Features
//!
//! - Transport interception: capture method, headers, bodies, status and timing
//! - Filter expressions: sandboxed JavaScript-style predicates over records
//! - Obfuscation hook: redact records before they leave the process
//! - Platform payloads: structured values (iOS) or JSON strings (Android)
//! - APM fan-out: optional second sink receiving identical payloads
//! - GraphQL link adapter: attribute exchanges to operation names
//! - Progress forwarding for response downloads
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use netlogger::{MemorySink, NetworkLogger, NetworkLoggerConfig, Platform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = MemorySink::new("core");
//!     let config = NetworkLoggerConfig::new().platform(Platform::Ios);
//!     let logger = NetworkLogger::from_config(config, Arc::new(sink.clone()))?;
//!
//!     logger.set_request_filter_expression(Some("network.url.includes('/health')"));
//!     logger.set_enabled(true);
//!
//!     logger.interceptor().get("https://example.com").await?;
//!     println!("{} record(s) logged", sink.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod native;
pub mod network;

// Re-exports for convenience

// Configuration
pub use config::NetworkLoggerConfig;

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig, ProgressCallback, Request, Response, Transport};

// Native boundary
pub use native::{
    MemorySink, NativeSink, PayloadFormat, Platform, RecordCodec, SinkPayload, TracingSink,
    UploadSink,
};

// Network
pub use network::{EventBus, Subscription, NETWORK_DATA_OBFUSCATION_HANDLER_EVENT};
pub use network::{FilterExpression, RecordPredicate, RequestFilter};
pub use network::{GraphQlOperation, Operation, OperationContext};
pub use network::{LoggerMetrics, MetricsReport};
pub use network::{NetworkInterceptor, NetworkLogger, NetworkRecord, ObfuscationHandler};
pub use network::ProgressReporter;

/// netlogger version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
