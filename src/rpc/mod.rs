//! Remote procedure surface over the dialog coordinator
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! -> {"id": 1, "method": "dialogCreateAlert", "params": ["Title", "Message"]}
//! <- {"id": 1, "result": null, "error": null}
//! ```

pub mod methods;
pub mod params;

use crate::dialog::DialogCoordinator;
use crate::errors::RpcError;
use params::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Incoming call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Echoed back in the response; any JSON value
    #[serde(default)]
    pub id: Value,
    pub method: String,
    /// Positional array or named object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    pub fn parse(line: &str) -> Result<Self, RpcError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Parse either a JSON envelope or the `method [params-json]` shorthand
    pub fn parse_loose(line: &str, id: u64) -> Result<Self, RpcError> {
        let line = line.trim();
        if line.starts_with('{') {
            return Self::parse(line);
        }
        let (method, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(m, r)| (m, r.trim()));
        let params = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest)?)
        };
        Ok(Self {
            id: Value::from(id),
            method: method.to_string(),
            params,
        })
    }
}

/// Outgoing reply; exactly one of `result`/`error` is meaningful
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: Value,
    pub result: Value,
    pub error: Option<String>,
}

impl Response {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    pub fn err(id: Value, error: &RpcError) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Bind and run one call against the coordinator. May block on show/response.
pub fn dispatch(
    coordinator: &DialogCoordinator,
    method: &str,
    params: Option<Value>,
) -> Result<Value, RpcError> {
    let spec =
        methods::lookup(method).ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;
    let args = Args::bind(spec, params)?;
    (spec.handler)(coordinator, &args)
}

/// Run a request and wrap the outcome in a response envelope
pub fn handle(coordinator: &DialogCoordinator, request: Request) -> Response {
    let Request { id, method, params } = request;
    match dispatch(coordinator, &method, params) {
        Ok(result) => {
            tracing::debug!(method = %method, "Call succeeded");
            Response::ok(id, result)
        }
        Err(e) => {
            tracing::warn!(method = %method, error = %e, "Call failed");
            Response::err(id, &e)
        }
    }
}
