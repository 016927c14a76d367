//! Driven port for sending one HTTP request to the grading API.
//!
//! Requests are immutable values: builders return a new request rather than
//! mutating a shared one, so a retry can be derived from the original without
//! touching what the caller holds.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::define_port_error;

/// Header carrying bearer credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// HTTP status signalling a missing, invalid, or expired access credential.
pub const UNAUTHORIZED_STATUS: u16 = 401;

/// HTTP methods used by the grading API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read-only fetch.
    Get,
    /// Create or exchange.
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Outbound API request.
///
/// `path` is relative to the configured API base URL, e.g. `directions/`.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: Option<Value>,
}

impl ApiRequest {
    /// Start a request for `method` on `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a `POST` request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_json(body)
    }

    /// Return a copy with `name` set to `value`, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Return a copy with one more query pair appended.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Return a copy carrying `body` as its JSON payload.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Query pairs in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// All headers set on the request.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Look up a header value by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// JSON payload, if any.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values may carry bearer tokens.
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Successful (2xx) API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body; `Value::Null` when the body was empty.
    pub body: Value,
}

impl ApiResponse {
    /// Build a response from its parts.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Decode the body into a typed payload.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        T::deserialize(&self.body).map_err(|error| {
            TransportError::decode(format!("unexpected response payload: {error}"))
        })
    }
}

define_port_error! {
    /// Failures surfaced while dispatching an API request.
    pub enum TransportError {
        /// The API answered with a non-success status.
        Status { status: u16, body: String } =>
            "api responded with status {status}",
        /// Network transport failed before a response arrived.
        Network { message: String } =>
            "api transport failed: {message}",
        /// The request exceeded the client timeout.
        Timeout { message: String } =>
            "api request timed out: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "api response decode failed: {message}",
    }
}

impl TransportError {
    /// HTTP status carried by the failure, if the API answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is an authorisation failure (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(UNAUTHORIZED_STATUS)
    }
}

/// Base dispatch: send one request exactly as given.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the decoded response, or a failure for
    /// transport errors and non-2xx statuses.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
