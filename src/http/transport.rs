// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The transport seam wrapped by the network interceptor

use std::sync::Arc;

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::Result;

/// Byte-level progress callback: `(bytes_transferred, total_expected)`.
///
/// `total_expected` is `None` when the peer did not announce a length.
pub type ProgressCallback = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Something that can carry an HTTP exchange.
///
/// Implementations must report download progress through `progress` as
/// response data arrives, if a callback is supplied.
///
/// # Example
///
/// ```rust,no_run
/// use netlogger::http::{ProgressCallback, Request, Response, Transport};
/// use async_trait::async_trait;
///
/// struct Canned;
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn execute(
///         &self,
///         request: Request,
///         _progress: Option<ProgressCallback>,
///     ) -> netlogger::Result<Response> {
///         Ok(Response::new(
///             reqwest::StatusCode::OK,
///             Default::default(),
///             bytes::Bytes::from_static(b"{}"),
///             request.url,
///             0,
///         ))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request, reporting download progress as it arrives
    async fn execute(&self, request: Request, progress: Option<ProgressCallback>)
        -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
    ) -> Result<Response> {
        (**self).execute(request, progress).await
    }
}
