// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request filter expressions
//!
//! A small sandboxed evaluator for JavaScript-style boolean expressions such
//! as `network.requestHeaders['Content-type'] === 'application/json'`. The
//! record is the only value in scope; there are no assignments, no globals
//! and no side effects. A record for which the expression is truthy is
//! dropped.

mod eval;
mod lexer;
mod parser;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use self::eval::{eval, truthy, Scope};
use self::parser::{parse, Expr};
use super::NetworkRecord;
use crate::error::Result;

/// Name the record is bound to unless configured otherwise
pub const DEFAULT_BINDING: &str = "network";

/// Typed alternative to an expression: return `true` to drop the record
pub type RecordPredicate = Arc<dyn Fn(&NetworkRecord) -> bool + Send + Sync>;

/// A compiled filter expression
#[derive(Clone)]
pub struct FilterExpression {
    source: String,
    binding: String,
    expr: Expr,
}

impl FilterExpression {
    /// Compile an expression with the default `network` binding
    pub fn parse(source: &str) -> Result<Self> {
        Self::with_binding(source, DEFAULT_BINDING)
    }

    /// Compile an expression binding the record to `binding`
    pub fn with_binding(source: &str, binding: &str) -> Result<Self> {
        Ok(Self {
            source: source.to_string(),
            binding: binding.to_string(),
            expr: parse(source)?,
        })
    }

    /// Original expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against an arbitrary JSON view
    pub fn evaluate(&self, view: &Value) -> Result<bool> {
        let scope = Scope {
            name: &self.binding,
            value: view,
        };
        eval(&self.expr, &scope).map(|v| truthy(&v))
    }

    /// Evaluate against a record
    pub fn matches(&self, record: &NetworkRecord) -> Result<bool> {
        let view = serde_json::to_value(record)?;
        self.evaluate(&view)
    }
}

impl fmt::Debug for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterExpression")
            .field("source", &self.source)
            .field("binding", &self.binding)
            .finish()
    }
}

/// The active request filter
#[derive(Clone)]
pub enum RequestFilter {
    /// Compiled expression
    Expression(FilterExpression),
    /// Typed predicate
    Predicate(RecordPredicate),
}

impl RequestFilter {
    /// Whether the record should be dropped
    pub fn should_drop(&self, record: &NetworkRecord) -> Result<bool> {
        match self {
            RequestFilter::Expression(expr) => expr.matches(record),
            RequestFilter::Predicate(predicate) => Ok(predicate(record)),
        }
    }
}

impl fmt::Debug for RequestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFilter::Expression(expr) => write!(f, "Expression({:?})", expr.source()),
            RequestFilter::Predicate(_) => write!(f, "Predicate"),
        }
    }
}
