// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Native sink implementations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{NativeSink, SinkPayload};
use crate::error::Result;
use crate::http::{HttpClient, Request, Transport};

/// Sink that keeps every payload in memory
#[derive(Clone)]
pub struct MemorySink {
    name: String,
    payloads: Arc<RwLock<Vec<SinkPayload>>>,
    enabled: Arc<AtomicBool>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payloads: Arc::new(RwLock::new(Vec::new())),
            enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// All payloads received so far
    pub fn payloads(&self) -> Vec<SinkPayload> {
        self.payloads.read().clone()
    }

    pub fn len(&self) -> usize {
        self.payloads.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.read().is_empty()
    }

    /// Last enable/disable notification
    pub fn logging_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.payloads.write().clear();
    }
}

impl NativeSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn network_log(&self, payload: SinkPayload) {
        self.payloads.write().push(payload);
    }

    fn set_network_logging_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

/// Sink that writes payloads to the log
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl NativeSink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn network_log(&self, payload: SinkPayload) {
        tracing::info!(sink = %self.name, payload = %payload.to_json_string(), "Network log");
    }

    fn set_network_logging_enabled(&self, enabled: bool) {
        tracing::info!(sink = %self.name, enabled, "Network logging toggled");
    }
}

/// Sink that POSTs payloads as JSON to a collector endpoint.
///
/// Each upload runs on its own spawned task. The client used here must not
/// be an intercepted one, otherwise uploads would be logged in turn.
pub struct UploadSink {
    name: String,
    template: Request,
    client: HttpClient,
}

impl UploadSink {
    pub fn new(name: impl Into<String>, endpoint: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            template: Request::post(endpoint)?.header("Content-Type", "application/json"),
            client: HttpClient::new()?,
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.template.url
    }
}

impl NativeSink for UploadSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn network_log(&self, payload: SinkPayload) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(sink = %self.name, "No async runtime, dropping network log upload");
            return;
        };

        let request = self.template.clone().body(payload.to_json_string());
        let client = self.client.clone();
        let name = self.name.clone();
        runtime.spawn(async move {
            match client.execute(request, None).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!(sink = %name, status = response.status_code(), "Network log uploaded");
                }
                Ok(response) => {
                    tracing::warn!(sink = %name, status = response.status_code(), "Network log upload rejected");
                }
                Err(e) => {
                    tracing::warn!(sink = %name, error = %e, "Network log upload failed");
                }
            }
        });
    }
}
