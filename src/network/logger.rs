// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network log pipeline
//!
//! Every record the interceptor completes goes through the same steps:
//!
//! 1. The request filter runs. A truthy result drops the record, an
//!    evaluation error forwards it.
//! 2. If an obfuscation handler is registered, the record is emitted on the
//!    event bus and the handler transforms a copy. A failing handler drops
//!    the record.
//! 3. The record is encoded once in the platform's payload format.
//! 4. The payload goes to the core sink, and to the APM sink when APM is
//!    enabled.
//!
//! Failures stay inside the pipeline: they are logged and counted, and the
//! next record is processed normally.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use super::event_bus::{EventBus, Subscription, NETWORK_DATA_OBFUSCATION_HANDLER_EVENT};
use super::filter::{FilterExpression, RecordPredicate, RequestFilter};
use super::graphql::{self, GraphQlOperation};
use super::interceptor::NetworkInterceptor;
use super::metrics::{LoggerMetrics, MetricsReport};
use super::record::NetworkRecord;
use crate::config::NetworkLoggerConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, ProgressCallback};
use crate::native::{NativeSink, Platform, RecordCodec, SinkPayload};

/// User transform applied to each record before dispatch.
///
/// Receives an owned copy. `Ok(None)` drops the record quietly; an error or
/// a panic drops it and is logged.
pub type ObfuscationHandler =
    Arc<dyn Fn(NetworkRecord) -> anyhow::Result<Option<NetworkRecord>> + Send + Sync>;

/// The network log pipeline.
///
/// Owns its configuration and event bus; clones share them. Requests must be
/// issued through [`NetworkLogger::interceptor`] (or a clone of the
/// interceptor it was built with) to be captured.
#[derive(Clone)]
pub struct NetworkLogger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    interceptor: NetworkInterceptor,
    core_sink: Arc<dyn NativeSink>,
    apm_sink: RwLock<Option<Arc<dyn NativeSink>>>,
    enabled: AtomicBool,
    apm_enabled: AtomicBool,
    filter: RwLock<Option<RequestFilter>>,
    filter_binding: String,
    bus: EventBus<NetworkRecord>,
    /// The installed obfuscation handler's bus registration
    obfuscation: Mutex<Option<Subscription>>,
    codec: RecordCodec,
    platform: Platform,
    metrics: LoggerMetrics,
}

impl NetworkLogger {
    /// Build a logger over an existing interceptor.
    ///
    /// Logging starts disabled. A filter expression in `config` is installed
    /// right away.
    pub fn new(
        interceptor: NetworkInterceptor,
        core_sink: Arc<dyn NativeSink>,
        config: NetworkLoggerConfig,
    ) -> Self {
        let codec = RecordCodec::new(config.platform.payload_format())
            .max_depth(config.max_payload_depth);

        let logger = Self {
            inner: Arc::new(LoggerInner {
                interceptor,
                core_sink,
                apm_sink: RwLock::new(None),
                enabled: AtomicBool::new(false),
                apm_enabled: AtomicBool::new(config.apm_enabled),
                filter: RwLock::new(None),
                filter_binding: config.filter_binding.clone(),
                bus: EventBus::new(),
                obfuscation: Mutex::new(None),
                codec,
                platform: config.platform,
                metrics: LoggerMetrics::new(),
            }),
        };

        if let Some(ref expression) = config.filter_expression {
            logger.set_request_filter_expression(Some(expression));
        }

        logger
    }

    /// Build a logger over a fresh default HTTP client, applying the
    /// config's body capture settings
    pub fn from_config(
        config: NetworkLoggerConfig,
        core_sink: Arc<dyn NativeSink>,
    ) -> Result<Self> {
        config.validate()?;
        let interceptor = NetworkInterceptor::new(Arc::new(HttpClient::new()?))
            .capture_bodies(config.capture_bodies, config.max_body_size);
        Ok(Self::new(interceptor, core_sink, config))
    }

    /// Attach the APM sink
    pub fn with_apm_sink(self, sink: Arc<dyn NativeSink>) -> Self {
        *self.inner.apm_sink.write() = Some(sink);
        self
    }

    /// Interceptor application requests should go through
    pub fn interceptor(&self) -> &NetworkInterceptor {
        &self.inner.interceptor
    }

    /// Event bus carrying records to the obfuscation listener
    pub fn event_bus(&self) -> &EventBus<NetworkRecord> {
        &self.inner.bus
    }

    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    /// Turn network logging on or off.
    ///
    /// Turning on enables interception, registers the completion handler
    /// and notifies the sinks. Setting the current value again does nothing.
    pub fn set_enabled(&self, enabled: bool) {
        let inner = &self.inner;
        if inner.enabled.swap(enabled, Ordering::SeqCst) == enabled {
            return;
        }

        if enabled {
            let weak: Weak<LoggerInner> = Arc::downgrade(inner);
            inner
                .interceptor
                .set_on_done_callback(Some(Arc::new(move |record| {
                    if let Some(inner) = weak.upgrade() {
                        inner.handle(record);
                    }
                })));
            inner.interceptor.enable_interception();
        } else {
            inner.interceptor.disable_interception();
        }

        inner.notify_sinks(enabled);
        tracing::info!(enabled, platform = %inner.platform, "Network logging toggled");
    }

    /// Install a filter expression; records it evaluates truthy for are
    /// dropped. `None` forwards everything.
    ///
    /// A malformed expression is rejected here and logged, leaving no
    /// filter installed.
    pub fn set_request_filter_expression(&self, expression: Option<&str>) {
        let filter = match expression {
            None => None,
            Some(source) => match FilterExpression::with_binding(source, &self.inner.filter_binding)
            {
                Ok(expr) => Some(RequestFilter::Expression(expr)),
                Err(e) => {
                    tracing::warn!(
                        expression = source,
                        error = %e,
                        "Rejected malformed request filter, forwarding all records"
                    );
                    None
                }
            },
        };
        *self.inner.filter.write() = filter;
    }

    /// Install a typed filter predicate; `true` drops the record
    pub fn set_request_filter(&self, predicate: Option<RecordPredicate>) {
        *self.inner.filter.write() = predicate.map(RequestFilter::Predicate);
    }

    /// Source of the installed filter expression, if any
    pub fn request_filter_expression(&self) -> Option<String> {
        match &*self.inner.filter.read() {
            Some(RequestFilter::Expression(expr)) => Some(expr.source().to_string()),
            _ => None,
        }
    }

    /// Replace the obfuscation handler; `None` removes it.
    ///
    /// The handler listens on the obfuscation event of the bus. Only its own
    /// registration is replaced; other subscribers to the event are kept.
    pub fn set_network_data_obfuscation_handler(&self, handler: Option<ObfuscationHandler>) {
        let bus = &self.inner.bus;
        let mut slot = self.inner.obfuscation.lock();

        if let Some(previous) = slot.take() {
            bus.unsubscribe(&previous);
        }

        let Some(handler) = handler else {
            return;
        };

        let weak = Arc::downgrade(&self.inner);
        *slot = Some(bus.subscribe(NETWORK_DATA_OBFUSCATION_HANDLER_EVENT, move |record| {
            if let Some(inner) = weak.upgrade() {
                inner.obfuscate_and_dispatch(&handler, record);
            }
        }));
    }

    /// Replace the download progress handler
    pub fn set_progress_handler_for_request(&self, handler: Option<ProgressCallback>) {
        self.inner.interceptor.set_on_progress_callback(handler);
    }

    /// Include or exclude the APM sink
    pub fn set_apm_enabled(&self, enabled: bool) {
        self.inner.apm_enabled.store(enabled, Ordering::SeqCst);
    }

    /// GraphQL link entry point, see [`graphql::apollo_link_request_handler`]
    pub fn apollo_link_request_handler<O, F, R>(&self, operation: O, forward: F) -> R
    where
        O: GraphQlOperation,
        F: FnOnce(O) -> R,
    {
        graphql::apollo_link_request_handler(operation, forward)
    }

    /// Run one record through the pipeline as if the interceptor had
    /// completed it
    pub fn log(&self, record: NetworkRecord) {
        self.inner.handle(record);
    }

    /// Current metrics
    pub fn metrics(&self) -> MetricsReport {
        self.inner.metrics.report()
    }
}

impl LoggerInner {
    /// Completion handler registered with the interceptor
    fn handle(&self, record: NetworkRecord) {
        self.metrics
            .record_captured(record.duration, record.is_failure());

        if self.should_drop(&record) {
            self.metrics.record_filtered();
            tracing::debug!(url = %record.url, "Record dropped by request filter");
            return;
        }

        let obfuscating = self.obfuscation.lock().is_some();
        if obfuscating {
            self.bus.emit(NETWORK_DATA_OBFUSCATION_HANDLER_EVENT, &record);
        } else {
            self.dispatch(record);
        }
    }

    /// Evaluate the filter; errors and panics mean "keep"
    fn should_drop(&self, record: &NetworkRecord) -> bool {
        let filter = self.filter.read().clone();
        let Some(filter) = filter else {
            return false;
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| filter.should_drop(record)))
            .unwrap_or_else(|_| Err(Error::filter_eval("filter predicate panicked")));

        match outcome {
            Ok(dropped) => dropped,
            Err(e) => {
                self.metrics.record_filter_error();
                tracing::warn!(
                    url = %record.url,
                    filter = ?filter,
                    error = %e,
                    "Request filter failed, forwarding record"
                );
                false
            }
        }
    }

    fn obfuscate_and_dispatch(&self, handler: &ObfuscationHandler, record: &NetworkRecord) {
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(record.clone())))
            .unwrap_or_else(|_| Err(anyhow::anyhow!("handler panicked")));

        match outcome {
            Ok(Some(obfuscated)) => self.dispatch(obfuscated),
            Ok(None) => {
                tracing::debug!(url = %record.url, "Obfuscation handler discarded record");
            }
            Err(e) => {
                self.metrics.record_obfuscation_failure();
                let error = Error::obfuscation(format!("{:#}", e));
                tracing::error!(url = %record.url, error = %error, "Dropping network record");
            }
        }
    }

    /// Encode once and hand the payload to each sink
    fn dispatch(&self, record: NetworkRecord) {
        let payload = match self.codec.encode(&record) {
            Ok(payload) => payload,
            Err(e) => {
                self.metrics.record_encode_failure();
                tracing::error!(url = %record.url, error = %e, "Failed to encode network record");
                return;
            }
        };

        let apm_sink = if self.apm_enabled.load(Ordering::SeqCst) {
            self.apm_sink.read().clone()
        } else {
            None
        };

        if let Some(ref apm) = apm_sink {
            send(apm.as_ref(), payload.clone());
        }
        send(self.core_sink.as_ref(), payload);

        self.metrics.record_dispatched(apm_sink.is_some());
    }

    fn notify_sinks(&self, enabled: bool) {
        self.core_sink.set_network_logging_enabled(enabled);
        if let Some(apm) = self.apm_sink.read().clone() {
            apm.set_network_logging_enabled(enabled);
        }
    }
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        if self.enabled.load(Ordering::SeqCst) {
            self.interceptor.disable_interception();
            self.interceptor.set_on_done_callback(None);
        }
    }
}

/// Fire-and-forget send; a panicking sink affects only this call
fn send(sink: &dyn NativeSink, payload: SinkPayload) {
    if catch_unwind(AssertUnwindSafe(|| sink.network_log(payload))).is_err() {
        tracing::error!(sink = sink.name(), "Native sink panicked");
    }
}
