// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interception and logging
//!
//! Captures every exchange issued through the interceptor, then filters,
//! obfuscates and forwards the resulting records to native sinks.

mod event_bus;
mod graphql;
mod interceptor;
mod logger;
mod metrics;
mod progress;
mod record;

pub mod filter;

pub use event_bus::{EventBus, Listener, Subscription, NETWORK_DATA_OBFUSCATION_HANDLER_EVENT};
pub use filter::{FilterExpression, RecordPredicate, RequestFilter};
pub use graphql::{apollo_link_request_handler, GraphQlOperation, Operation, OperationContext};
pub use interceptor::{DoneCallback, NetworkInterceptor, GRAPHQL_ERROR_MESSAGE, GRAPHQL_HEADER};
pub use logger::{NetworkLogger, ObfuscationHandler};
pub use metrics::{LoggerMetrics, MetricsReport};
pub use progress::ProgressReporter;
pub use record::{NetworkRecord, CLIENT_ERROR_DOMAIN};

#[cfg(test)]
pub(crate) mod test_support {
    //! Canned transport for exercising the interceptor without sockets

    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use reqwest::StatusCode;

    use super::NetworkRecord;
    use crate::error::{Error, Result};
    use crate::http::{ProgressCallback, Request, Response, Transport};

    /// Answers every request with the same response, or fails every time
    pub struct StaticTransport {
        status: u16,
        body: Bytes,
        content_type: Option<String>,
        fail: bool,
        delays: Vec<(String, Duration)>,
    }

    impl StaticTransport {
        pub fn ok(status: u16, body: &str) -> Self {
            Self::bytes(status, body.as_bytes().to_vec())
        }

        pub fn bytes(status: u16, body: Vec<u8>) -> Self {
            Self {
                status,
                body: Bytes::from(body),
                content_type: None,
                fail: false,
                delays: Vec::new(),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::bytes(0, Vec::new())
            }
        }

        pub fn with_content_type(mut self, content_type: &str) -> Self {
            self.content_type = Some(content_type.to_string());
            self
        }

        /// Hold back answers to URLs containing `fragment`
        pub fn with_delay(mut self, fragment: &str, delay: Duration) -> Self {
            self.delays.push((fragment.to_string(), delay));
            self
        }
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn execute(
            &self,
            request: Request,
            progress: Option<ProgressCallback>,
        ) -> Result<Response> {
            let delay = self
                .delays
                .iter()
                .find(|(fragment, _)| request.url.as_str().contains(fragment.as_str()))
                .map(|(_, delay)| *delay);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if self.fail {
                return Err(Error::other(format!(
                    "connection refused: {}",
                    request.url_str()
                )));
            }

            let mut headers = HeaderMap::new();
            if let Some(ref content_type) = self.content_type {
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
            }

            if let Some(progress) = progress {
                let len = self.body.len() as u64;
                progress(len, Some(len));
            }

            Ok(Response::new(
                StatusCode::from_u16(self.status).unwrap(),
                headers,
                self.body.clone(),
                request.url,
                0,
            ))
        }
    }

    /// The record used throughout the pipeline tests
    pub fn sample_record() -> NetworkRecord {
        let mut record = NetworkRecord::new("https://api.instabug.com", "GET");
        record
            .request_headers
            .insert("Content-type".into(), "application/json".into());
        record.response_code = 200;
        record.content_type = "application/json".into();
        record
    }
}
