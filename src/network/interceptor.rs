// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport interceptor: observes every exchange without altering it

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use base64::Engine;
use parking_lot::RwLock;
use serde_json::Value;

use super::record::{NetworkRecord, CLIENT_ERROR_DOMAIN};
use super::ProgressReporter;
use crate::error::{Error, Result};
use crate::http::{headers, HttpClient, ProgressCallback, Request, Response, Transport};

/// Header carrying the GraphQL operation name from the link adapter
pub const GRAPHQL_HEADER: &str = "ibg-graphql-header";

/// Server error marker for GraphQL responses carrying an `errors` array
pub const GRAPHQL_ERROR_MESSAGE: &str = "GraphQLError";

/// Completion callback type
pub type DoneCallback = Arc<dyn Fn(NetworkRecord) + Send + Sync>;

/// Network interceptor wrapping a transport.
///
/// Application code issues requests through the interceptor. While
/// interception is disabled it is a plain pass-through; while enabled every
/// exchange is captured into a [`NetworkRecord`] handed to the done callback
/// exactly once. Clones share state.
#[derive(Clone)]
pub struct NetworkInterceptor {
    /// Wrapped transport
    transport: Arc<dyn Transport>,
    /// Interception switch
    enabled: Arc<AtomicBool>,
    /// Completion handler slot
    on_done: Arc<RwLock<Option<DoneCallback>>>,
    /// Progress handler slot
    progress: ProgressReporter,
    /// Capture bodies
    capture_bodies: bool,
    /// Maximum body size to capture
    max_body_size: usize,
}

impl NetworkInterceptor {
    /// Create an interceptor over an arbitrary transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            enabled: Arc::new(AtomicBool::new(false)),
            on_done: Arc::new(RwLock::new(None)),
            progress: ProgressReporter::new(),
            capture_bodies: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }

    /// Create an interceptor over the default HTTP client
    pub fn with_default_client() -> Result<Self> {
        Ok(Self::new(Arc::new(HttpClient::new()?)))
    }

    /// Set body capture settings
    pub fn capture_bodies(mut self, capture: bool, max_size: usize) -> Self {
        self.capture_bodies = capture;
        self.max_body_size = max_size;
        self
    }

    /// Start capturing exchanges. Enabling twice is a no-op.
    pub fn enable_interception(&self) {
        if !self.enabled.swap(true, Ordering::SeqCst) {
            tracing::debug!("Network interception enabled");
        }
    }

    /// Stop capturing exchanges. Safe to call when not enabled.
    pub fn disable_interception(&self) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            tracing::debug!("Network interception disabled");
        }
    }

    /// Whether interception is currently active
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Replace the completion handler
    pub fn set_on_done_callback(&self, callback: Option<DoneCallback>) {
        *self.on_done.write() = callback;
    }

    /// Replace the progress handler
    pub fn set_on_progress_callback(&self, callback: Option<ProgressCallback>) {
        self.progress.set_handler(callback);
    }

    /// Execute a request, capturing it when interception is enabled.
    ///
    /// The transport's result is returned untouched either way.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        if !self.is_enabled() {
            return self.transport.execute(request, None).await;
        }

        let start = Instant::now();
        let mut record = self.begin_record(&request);

        let result = self
            .transport
            .execute(request, Some(self.progress.as_callback()))
            .await;
        record.duration = start.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => self.complete_record(&mut record, response),
            Err(e) => fail_record(&mut record, e),
        }

        self.finish(record);
        result
    }

    /// Execute a GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(Request::get(url)?).await
    }

    /// Execute a POST request
    pub async fn post(&self, url: &str, body: impl Into<bytes::Bytes>) -> Result<Response> {
        self.execute(Request::post(url)?.body(body)).await
    }

    /// Execute multiple requests concurrently.
    ///
    /// Records are emitted in completion order, not issue order.
    pub async fn execute_all(&self, requests: Vec<Request>) -> Vec<Result<Response>> {
        let futures: Vec<_> = requests.into_iter().map(|r| self.execute(r)).collect();
        futures::future::join_all(futures).await
    }

    /// Capture the request side of an exchange
    fn begin_record(&self, request: &Request) -> NetworkRecord {
        let mut record = NetworkRecord::new(request.url.as_str(), request.method.as_str());
        record.start_time = Some(chrono::Utc::now().timestamp_millis());

        for entry in &request.headers {
            if entry.name.eq_ignore_ascii_case(GRAPHQL_HEADER) {
                record.gql_query_name = Some(entry.value.clone());
            } else {
                record
                    .request_headers
                    .insert(entry.name.clone(), entry.value.clone());
            }
        }

        record.request_content_type = request
            .header_value(headers::CONTENT_TYPE)
            .unwrap_or_default()
            .to_string();

        if let Some(ref body) = request.body {
            record.request_body_size = body.len() as u64;
            record.request_body = self.body_text(body, &record.request_content_type);
        }

        record
    }

    /// Fill in the response side of a successful exchange
    fn complete_record(&self, record: &mut NetworkRecord, response: &Response) {
        record.response_code = response.status_code();
        record.content_type = response.content_type().unwrap_or_default().to_string();
        record.response_body_size = response.body_len() as u64;
        record.response_headers = response.headers_json();
        record.response_body = Value::String(self.body_text(&response.body, &record.content_type));

        if record.is_graphql() && response.has_graphql_errors() {
            record.server_error_message = Some(GRAPHQL_ERROR_MESSAGE.to_string());
        }
    }

    /// Hand the finished record to the done callback.
    ///
    /// A panicking callback is contained so the request's own outcome is
    /// unaffected.
    fn finish(&self, record: NetworkRecord) {
        let callback = self.on_done.read().clone();
        let Some(callback) = callback else {
            return;
        };

        let url = record.url.clone();
        if catch_unwind(AssertUnwindSafe(|| callback(record))).is_err() {
            tracing::error!(url = %url, "Network done callback panicked");
        }
    }

    /// Best-effort text representation of a body.
    ///
    /// Bodies over the capture limit are truncated at a character boundary.
    /// Bodies that are not UTF-8 become a base64 data URL.
    fn body_text(&self, body: &[u8], content_type: &str) -> String {
        if !self.capture_bodies || body.is_empty() {
            return String::new();
        }

        let slice = &body[..body.len().min(self.max_body_size)];
        match std::str::from_utf8(slice) {
            Ok(text) => text.to_string(),
            // Truncation split a multi-byte character
            Err(e) if e.error_len().is_none() => {
                String::from_utf8_lossy(&slice[..e.valid_up_to()]).into_owned()
            }
            Err(_) => {
                let media_type = if content_type.is_empty() {
                    "application/octet-stream"
                } else {
                    content_type
                };
                format!(
                    "data:{};base64,{}",
                    media_type,
                    base64::engine::general_purpose::STANDARD.encode(slice)
                )
            }
        }
    }
}

/// Mark a record as failed below HTTP
fn fail_record(record: &mut NetworkRecord, error: &Error) {
    tracing::debug!(url = %record.url, error = %error, "Intercepted request failed");
    record.response_code = 0;
    record.error_domain = Some(CLIENT_ERROR_DOMAIN.to_string());
    record.error_code = Some(0);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::network::test_support::StaticTransport;

    fn collect(interceptor: &NetworkInterceptor) -> Arc<Mutex<Vec<NetworkRecord>>> {
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = records.clone();
        interceptor.set_on_done_callback(Some(Arc::new(move |r| sink.lock().push(r))));
        records
    }

    #[tokio::test]
    async fn test_disabled_is_pass_through() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::ok(200, "ok")));
        let records = collect(&interceptor);

        let response = interceptor.get("https://example.com/").await.unwrap();

        assert_eq!(response.text().unwrap(), "ok");
        assert!(records.lock().is_empty());
    }

    #[tokio::test]
    async fn test_captures_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"id":1}"#),
            )
            .mount(&server)
            .await;

        let interceptor = NetworkInterceptor::with_default_client().unwrap();
        let records = collect(&interceptor);
        interceptor.enable_interception();

        let request = Request::post(format!("{}/users", server.uri()))
            .unwrap()
            .header("Content-type", "application/json")
            .body(r#"{"name":"a"}"#);
        let response = interceptor.execute(request).await.unwrap();
        assert_eq!(response.status_code(), 201);

        let records = records.lock();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.method, "POST");
        assert_eq!(record.response_code, 201);
        assert_eq!(record.request_body, r#"{"name":"a"}"#);
        assert_eq!(record.request_body_size, 12);
        assert_eq!(record.request_headers["Content-type"], "application/json");
        assert_eq!(record.request_content_type, "application/json");
        assert_eq!(record.content_type, "application/json");
        assert_eq!(record.response_body, Value::String(r#"{"id":1}"#.into()));
        assert_eq!(record.response_headers["content-type"], "application/json");
        assert!(record.start_time.is_some());
        assert!(!record.is_failure());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_and_error_returned() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::failing()));
        let records = collect(&interceptor);
        interceptor.enable_interception();

        let result = interceptor.get("https://unreachable.invalid/").await;
        assert!(result.is_err());

        let records = records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].response_code, 0);
        assert_eq!(records[0].error_domain.as_deref(), Some(CLIENT_ERROR_DOMAIN));
        assert_eq!(records[0].response_body, Value::String(String::new()));
    }

    #[test]
    fn test_blocking_execution() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::ok(204, "")));
        let records = collect(&interceptor);
        interceptor.enable_interception();

        let response = tokio_test::block_on(interceptor.get("https://example.com/")).unwrap();

        assert_eq!(response.status_code(), 204);
        assert_eq!(records.lock()[0].response_code, 204);
    }

    #[tokio::test]
    async fn test_enable_twice_emits_once() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::ok(200, "")));
        let records = collect(&interceptor);
        interceptor.enable_interception();
        interceptor.enable_interception();

        interceptor.get("https://example.com/").await.unwrap();
        assert_eq!(records.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_disable_then_reenable() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::ok(200, "")));
        let records = collect(&interceptor);

        interceptor.disable_interception();
        interceptor.enable_interception();
        interceptor.disable_interception();
        interceptor.get("https://example.com/a").await.unwrap();
        interceptor.enable_interception();
        interceptor.get("https://example.com/b").await.unwrap();

        let records = records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/b");
    }

    #[tokio::test]
    async fn test_graphql_header_moves_to_query_name() {
        let transport = StaticTransport::ok(200, r#"{"errors":[{"message":"nope"}]}"#)
            .with_content_type("application/json");
        let interceptor = NetworkInterceptor::new(Arc::new(transport));
        let records = collect(&interceptor);
        interceptor.enable_interception();

        let request = Request::post("https://example.com/graphql")
            .unwrap()
            .header(GRAPHQL_HEADER, "GetUser");
        interceptor.execute(request).await.unwrap();

        let records = records.lock();
        assert_eq!(records[0].gql_query_name.as_deref(), Some("GetUser"));
        assert!(!records[0].request_headers.contains_key(GRAPHQL_HEADER));
        assert_eq!(
            records[0].server_error_message.as_deref(),
            Some(GRAPHQL_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_binary_body_becomes_data_url() {
        let transport = StaticTransport::bytes(200, vec![0xff, 0xd8, 0xff, 0x00])
            .with_content_type("image/jpeg");
        let interceptor = NetworkInterceptor::new(Arc::new(transport));
        let records = collect(&interceptor);
        interceptor.enable_interception();

        interceptor.get("https://example.com/a.jpg").await.unwrap();

        let records = records.lock();
        assert_eq!(
            records[0].response_body,
            Value::String("data:image/jpeg;base64,/9j/AA==".into())
        );
        assert_eq!(records[0].response_body_size, 4);
    }

    #[tokio::test]
    async fn test_body_truncated_on_char_boundary() {
        let transport = StaticTransport::ok(200, "aé");
        let interceptor = NetworkInterceptor::new(Arc::new(transport)).capture_bodies(true, 2);
        let records = collect(&interceptor);
        interceptor.enable_interception();

        interceptor.get("https://example.com/").await.unwrap();

        let records = records.lock();
        assert_eq!(records[0].response_body, Value::String("a".into()));
        assert_eq!(records[0].response_body_size, 3);
    }

    #[tokio::test]
    async fn test_progress_is_forwarded() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::ok(200, "12345")));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        interceptor.set_on_progress_callback(Some(Arc::new(move |done, total| {
            s.lock().push((done, total))
        })));
        interceptor.enable_interception();

        interceptor.get("https://example.com/").await.unwrap();
        assert_eq!(*seen.lock(), vec![(5, Some(5))]);
    }

    #[tokio::test]
    async fn test_panicking_done_callback_is_contained() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::ok(200, "ok")));
        interceptor.set_on_done_callback(Some(Arc::new(|_| panic!("callback failure"))));
        interceptor.enable_interception();

        let response = interceptor.get("https://example.com/").await.unwrap();
        assert_eq!(response.text().unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_execute_all_emits_every_record() {
        let interceptor = NetworkInterceptor::new(Arc::new(StaticTransport::ok(200, "")));
        let records = collect(&interceptor);
        interceptor.enable_interception();

        let requests = (0..3)
            .map(|i| Request::get(format!("https://example.com/{}", i)).unwrap())
            .collect();
        let results = interceptor.execute_all(requests).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(records.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_execute_all_emits_in_completion_order() {
        let transport = StaticTransport::ok(200, "")
            .with_delay("/slow", Duration::from_millis(150))
            .with_delay("/medium", Duration::from_millis(75));
        let interceptor = NetworkInterceptor::new(Arc::new(transport));
        let records = collect(&interceptor);
        interceptor.enable_interception();

        let requests = ["slow", "medium", "fast"]
            .iter()
            .map(|path| Request::get(format!("https://example.com/{}", path)).unwrap())
            .collect();
        let results = interceptor.execute_all(requests).await;

        // Responses keep issue order
        let urls: Vec<_> = results
            .iter()
            .map(|r| r.as_ref().unwrap().url.path().to_string())
            .collect();
        assert_eq!(urls, vec!["/slow", "/medium", "/fast"]);

        let completed: Vec<_> = records.lock().iter().map(|r| r.url.clone()).collect();
        assert_eq!(
            completed,
            vec![
                "https://example.com/fast",
                "https://example.com/medium",
                "https://example.com/slow",
            ]
        );
    }
}
