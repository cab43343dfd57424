// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Evaluator with JavaScript truthiness and equality rules
//!
//! Values read from the record are borrowed. Only results computed by the
//! expression itself (method results, lengths, negations) are owned.

use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

use super::parser::{number, CompareOp, Expr};
use crate::error::{Error, Result};

/// Runtime value
#[derive(Debug, Clone)]
pub enum Val<'a> {
    Undefined,
    Json(Cow<'a, Value>),
    /// `NaN` and the infinities, which JSON cannot hold
    NonFinite(f64),
    Regex(&'a Regex),
}

impl<'a> Val<'a> {
    fn owned(value: Value) -> Self {
        Val::Json(Cow::Owned(value))
    }

    fn json(&self) -> Option<&Value> {
        match self {
            Val::Json(value) => Some(&**value),
            _ => None,
        }
    }

    fn is_nullish(&self) -> bool {
        matches!(self, Val::Undefined) || matches!(self.json(), Some(Value::Null))
    }

    fn describe(&self) -> &'static str {
        match self {
            Val::Undefined => "undefined",
            Val::NonFinite(_) => "number",
            Val::Regex(_) => "regexp",
            Val::Json(value) => match &**value {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            },
        }
    }
}

/// The single name visible to an expression and the value bound to it
pub struct Scope<'a> {
    pub name: &'a str,
    pub value: &'a Value,
}

/// Evaluate an expression within a scope
pub fn eval<'a>(expr: &'a Expr, scope: &Scope<'a>) -> Result<Val<'a>> {
    match expr {
        Expr::Literal(value) => Ok(Val::Json(Cow::Borrowed(value))),
        Expr::Undefined => Ok(Val::Undefined),
        Expr::Regex(re) => Ok(Val::Regex(re)),
        Expr::Ident(name) => {
            if name == scope.name {
                Ok(Val::Json(Cow::Borrowed(scope.value)))
            } else {
                Err(Error::filter_eval(format!("{} is not defined", name)))
            }
        }
        Expr::Member { object, property } => {
            let object = eval(object, scope)?;
            let key = to_js_string(&eval(property, scope)?);
            member(object, &key)
        }
        Expr::Call {
            object,
            method,
            args,
        } => {
            let object = eval(object, scope)?;
            let args = args
                .iter()
                .map(|a| eval(a, scope))
                .collect::<Result<Vec<_>>>()?;
            call(&object, method, &args)
        }
        Expr::Not(inner) => Ok(boolean(!truthy(&eval(inner, scope)?))),
        Expr::Neg(inner) => Ok(from_f64(-to_number(&eval(inner, scope)?))),
        Expr::And(left, right) => {
            let left = eval(left, scope)?;
            if truthy(&left) {
                eval(right, scope)
            } else {
                Ok(left)
            }
        }
        Expr::Or(left, right) => {
            let left = eval(left, scope)?;
            if truthy(&left) {
                Ok(left)
            } else {
                eval(right, scope)
            }
        }
        Expr::Compare { op, left, right } => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            Ok(boolean(compare(*op, &left, &right)))
        }
    }
}

fn boolean<'a>(b: bool) -> Val<'a> {
    Val::owned(Value::Bool(b))
}

fn from_f64<'a>(n: f64) -> Val<'a> {
    if n.is_finite() {
        Val::owned(number(n))
    } else {
        Val::NonFinite(n)
    }
}

fn member<'a>(object: Val<'a>, key: &str) -> Result<Val<'a>> {
    if object.is_nullish() {
        return Err(Error::filter_eval(format!(
            "Cannot read properties of {} (reading '{}')",
            object.describe(),
            key
        )));
    }

    let value = match object {
        Val::Json(Cow::Borrowed(value)) => property(value, key),
        Val::Json(Cow::Owned(value)) => property(&value, key).map(|v| Cow::Owned(v.into_owned())),
        Val::Regex(re) if key == "source" => Some(Cow::Owned(Value::String(re.as_str().to_string()))),
        _ => None,
    };
    Ok(value.map(Val::Json).unwrap_or(Val::Undefined))
}

/// Property lookup that borrows object fields and array items
fn property<'v>(value: &'v Value, key: &str) -> Option<Cow<'v, Value>> {
    match value {
        Value::Object(map) => map.get(key).map(Cow::Borrowed),
        Value::Array(items) => {
            if key == "length" {
                Some(Cow::Owned(Value::from(items.len())))
            } else {
                key.parse::<usize>().ok().and_then(|i| items.get(i)).map(Cow::Borrowed)
            }
        }
        Value::String(s) => {
            if key == "length" {
                Some(Cow::Owned(Value::from(s.encode_utf16().count())))
            } else {
                key.parse::<usize>()
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Cow::Owned(Value::String(c.to_string())))
            }
        }
        _ => None,
    }
}

fn call<'a>(object: &Val<'a>, method: &str, args: &[Val<'a>]) -> Result<Val<'a>> {
    let first = args.first().map(to_js_string).unwrap_or_else(|| "undefined".into());

    let result = match (object, method) {
        (Val::Regex(re), "test") => Some(boolean(re.is_match(&first))),
        (Val::Json(value), _) => match (&**value, method) {
            (Value::String(s), "includes") => Some(boolean(s.contains(first.as_str()))),
            (Value::String(s), "startsWith") => Some(boolean(s.starts_with(first.as_str()))),
            (Value::String(s), "endsWith") => Some(boolean(s.ends_with(first.as_str()))),
            (Value::String(s), "toLowerCase") => Some(Val::owned(Value::String(s.to_lowercase()))),
            (Value::String(s), "toUpperCase") => Some(Val::owned(Value::String(s.to_uppercase()))),
            (Value::String(s), "trim") => Some(Val::owned(Value::String(s.trim().to_string()))),
            (Value::Array(items), "includes") => {
                let undefined = Val::Undefined;
                let needle = args.first().unwrap_or(&undefined);
                Some(boolean(
                    items
                        .iter()
                        .any(|item| strict_equals(&Val::Json(Cow::Borrowed(item)), needle)),
                ))
            }
            _ => None,
        },
        _ => None,
    };

    result.ok_or_else(|| {
        if object.is_nullish() {
            Error::filter_eval(format!(
                "Cannot read properties of {} (reading '{}')",
                object.describe(),
                method
            ))
        } else {
            Error::filter_eval(format!("{}.{} is not a function", object.describe(), method))
        }
    })
}

/// JavaScript truthiness
pub fn truthy(value: &Val<'_>) -> bool {
    match value {
        Val::Undefined => false,
        Val::Regex(_) => true,
        Val::NonFinite(n) => !n.is_nan(),
        Val::Json(v) => match &**v {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        },
    }
}

fn compare(op: CompareOp, left: &Val<'_>, right: &Val<'_>) -> bool {
    match op {
        CompareOp::StrictEq => strict_equals(left, right),
        CompareOp::StrictNe => !strict_equals(left, right),
        CompareOp::LooseEq => loose_equals(left, right),
        CompareOp::LooseNe => !loose_equals(left, right),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            if let (Some(Value::String(a)), Some(Value::String(b))) = (left.json(), right.json()) {
                return match op {
                    CompareOp::Lt => a < b,
                    CompareOp::Le => a <= b,
                    CompareOp::Gt => a > b,
                    _ => a >= b,
                };
            }
            let (a, b) = (to_number(left), to_number(right));
            // NaN compares false either way
            match op {
                CompareOp::Lt => a < b,
                CompareOp::Le => a <= b,
                CompareOp::Gt => a > b,
                _ => a >= b,
            }
        }
    }
}

fn strict_equals(left: &Val<'_>, right: &Val<'_>) -> bool {
    match (left, right) {
        (Val::Undefined, Val::Undefined) => true,
        (Val::NonFinite(a), Val::NonFinite(b)) => a == b,
        (Val::Json(a), Val::Json(b)) => match (&**a, &**b) {
            (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
            (a, b) => a == b,
        },
        _ => false,
    }
}

fn loose_equals(left: &Val<'_>, right: &Val<'_>) -> bool {
    use Value::{Bool, Number, String};

    if left.is_nullish() || right.is_nullish() {
        return left.is_nullish() && right.is_nullish();
    }
    match (left, right) {
        (Val::NonFinite(_), _) | (_, Val::NonFinite(_)) => to_number(left) == to_number(right),
        _ => match (left.json(), right.json()) {
            (Some(Number(_)), Some(String(_)))
            | (Some(String(_)), Some(Number(_)))
            | (Some(Bool(_)), _)
            | (_, Some(Bool(_))) => to_number(left) == to_number(right),
            _ => strict_equals(left, right),
        },
    }
}

fn to_number(value: &Val<'_>) -> f64 {
    match value {
        Val::Undefined | Val::Regex(_) => f64::NAN,
        Val::NonFinite(n) => *n,
        Val::Json(v) => match &**v {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Array(_) | Value::Object(_) => f64::NAN,
        },
    }
}

/// JavaScript `String(value)`, close enough for keys and method arguments
pub fn to_js_string(value: &Val<'_>) -> String {
    match value {
        Val::Undefined => "undefined".into(),
        Val::Regex(re) => format!("/{}/", re.as_str()),
        Val::NonFinite(n) if n.is_nan() => "NaN".into(),
        Val::NonFinite(n) if *n > 0.0 => "Infinity".into(),
        Val::NonFinite(_) => "-Infinity".into(),
        Val::Json(v) => json_to_js_string(v),
    }
}

fn json_to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{}", f as i64),
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => json_to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}
