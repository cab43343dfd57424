// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP transport layer
//!
//! Provides the request/response types, the `Transport` seam that the
//! network interceptor wraps, and a reqwest-backed client implementing it.

mod client;
mod request;
mod response;
mod transport;

pub use client::{HttpClient, HttpClientConfig};
pub use request::{HeaderEntry, Request};
pub use response::Response;
pub use transport::{ProgressCallback, Transport};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("netlogger/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const USER_AGENT: &str = "user-agent";
}
