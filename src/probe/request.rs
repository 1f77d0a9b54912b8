use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

/// A single outbound diagnostic request. Built once per call site with the
/// builder methods below and consumed by the runner; not reused.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub session_token: Option<String>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

impl ProbeRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            bearer: None,
            session_token: None,
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches `Authorization: Bearer <token>`. An empty token is sent as
    /// `Bearer ` with nothing after it, which some gateways treat
    /// differently from a missing header.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Attaches the admin session token as `X-Auth-Token`.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides the client-wide timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
