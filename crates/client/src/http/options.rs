//! Per-request configuration.

use std::time::Duration;

use serde::Serialize;

use crate::error::ApiError;

pub use reqwest::Method;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Request body payloads the client knows how to serialize.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// JSON-encoded object (the default content type).
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` fields (the OAuth2 login shape).
    Form(Vec<(String, String)>),
    /// Raw `text/plain` payload.
    Text(String),
}

/// Options for a single request.
///
/// `with_auth` defaults to true: a bearer token is attached whenever the
/// store holds one.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Extra headers merged over the client defaults.
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to the URL.
    pub params: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
    pub with_auth: bool,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            with_auth: true,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body. Serialization failure is a client-side error.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Client(format!("Cannot serialize request body: {e}")))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn auth(mut self, with_auth: bool) -> Self {
        self.with_auth = with_auth;
        self
    }
}
