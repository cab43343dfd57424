// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! GraphQL link adapter
//!
//! Tags outgoing GraphQL operations with their operation name so the
//! interceptor can attribute the resulting HTTP exchange.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::{json, Value};

use super::interceptor::GRAPHQL_HEADER;
use crate::error::Result;
use crate::http::Request;

/// Context carried alongside an operation through a link chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationContext {
    /// Headers added to the HTTP request for this operation
    pub headers: BTreeMap<String, String>,
}

/// An operation travelling through a GraphQL link chain
pub trait GraphQlOperation {
    /// Operation name, if the document names one
    fn operation_name(&self) -> Option<&str>;

    /// Update the operation context in place
    fn set_context(
        &mut self,
        update: &mut dyn FnMut(&mut OperationContext),
    ) -> anyhow::Result<()>;
}

/// A plain GraphQL operation
#[derive(Debug, Clone, Default)]
pub struct Operation {
    pub operation_name: Option<String>,
    pub query: String,
    pub variables: Value,
    context: OperationContext,
}

impl Operation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Null,
            ..Default::default()
        }
    }

    pub fn named(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            operation_name: Some(name.into()),
            ..Self::new(query)
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    /// Build the HTTP request that executes this operation against `url`.
    ///
    /// Context headers are copied onto the request.
    pub fn into_request(self, url: &str) -> Result<Request> {
        let payload = json!({
            "operationName": self.operation_name,
            "query": self.query,
            "variables": self.variables,
        });

        let mut request = Request::post(url)?.json(&payload)?;
        for (name, value) in self.context.headers {
            request.set_header(name, value);
        }
        Ok(request)
    }
}

impl GraphQlOperation for Operation {
    fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    fn set_context(
        &mut self,
        update: &mut dyn FnMut(&mut OperationContext),
    ) -> anyhow::Result<()> {
        update(&mut self.context);
        Ok(())
    }
}

/// Link handler: tag the operation, then hand it to `forward`.
///
/// A failing or panicking `set_context` is logged and ignored. `forward`
/// is called exactly once in every case and its result returned.
pub fn apollo_link_request_handler<O, F, R>(mut operation: O, forward: F) -> R
where
    O: GraphQlOperation,
    F: FnOnce(O) -> R,
{
    let name = operation.operation_name().unwrap_or("null").to_string();

    let tagged = catch_unwind(AssertUnwindSafe(|| {
        operation.set_context(&mut |context| {
            context
                .headers
                .insert(GRAPHQL_HEADER.to_string(), name.clone());
        })
    }));

    match tagged {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(operation = %name, error = %e, "Failed to tag GraphQL operation");
        }
        Err(_) => {
            tracing::error!(operation = %name, "GraphQL set_context panicked");
        }
    }

    forward(operation)
}
