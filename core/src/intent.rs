//! Logical description of one API operation before it becomes a request.
//!
//! A [`CallIntent`] is pure data: verb, path template, positional path
//! arguments, ordered query pairs and an optional payload. The
//! [`RequestBuilder`](crate::RequestBuilder) turns it into an
//! [`HttpRequest`](crate::HttpRequest).

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::http::HttpMethod;

/// A scalar substituted into a path template placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum PathArg {
    Str(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for PathArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathArg::Str(s) => f.write_str(s),
            PathArg::Int(n) => write!(f, "{n}"),
            PathArg::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for PathArg {
    fn from(value: &str) -> Self {
        PathArg::Str(value.to_string())
    }
}

impl From<String> for PathArg {
    fn from(value: String) -> Self {
        PathArg::Str(value)
    }
}

impl From<i64> for PathArg {
    fn from(value: i64) -> Self {
        PathArg::Int(value)
    }
}

impl From<i32> for PathArg {
    fn from(value: i32) -> Self {
        PathArg::Int(value.into())
    }
}

impl From<u32> for PathArg {
    fn from(value: u32) -> Self {
        PathArg::Int(value.into())
    }
}

impl From<f64> for PathArg {
    fn from(value: f64) -> Self {
        PathArg::Float(value)
    }
}

/// A query parameter value. `Absent` pairs are dropped from the query string.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Absent,
}

impl QueryValue {
    /// Wire form of the value, `None` when the key must be omitted.
    ///
    /// Booleans use `1` / `0`.
    pub fn encode(&self) -> Option<String> {
        match self {
            QueryValue::Str(s) => Some(s.clone()),
            QueryValue::Int(n) => Some(n.to_string()),
            QueryValue::Float(x) => Some(x.to_string()),
            QueryValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            QueryValue::Absent => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Absent, Into::into)
    }
}

/// Request payload. At most one kind of body can be attached to a call.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Raw(Vec<u8>),
}

/// One API operation, before path expansion and encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CallIntent {
    pub method: HttpMethod,
    pub template: &'static str,
    pub path_args: Vec<PathArg>,
    pub query: Vec<(String, QueryValue)>,
    pub body: Body,
}

impl CallIntent {
    pub fn new(method: HttpMethod, template: &'static str) -> Self {
        Self {
            method,
            template,
            path_args: Vec::new(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(template: &'static str) -> Self {
        Self::new(HttpMethod::Get, template)
    }

    pub fn post(template: &'static str) -> Self {
        Self::new(HttpMethod::Post, template)
    }

    pub fn put(template: &'static str) -> Self {
        Self::new(HttpMethod::Put, template)
    }

    pub fn delete(template: &'static str) -> Self {
        Self::new(HttpMethod::Delete, template)
    }

    /// Append the next positional path argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<PathArg>) -> Self {
        self.path_args.push(value.into());
        self
    }

    /// Append a query pair. Insertion order is preserved on the wire.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Attach an already structured JSON payload, replacing any other body.
    #[must_use]
    pub fn json_value(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    /// Attach a typed JSON payload, replacing any other body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::InvalidRequest(format!("payload is not serializable: {e}")))?;
        Ok(self.json_value(value))
    }

    /// Attach opaque bytes, replacing any other body.
    #[must_use]
    pub fn raw(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Raw(bytes.into());
        self
    }
}
