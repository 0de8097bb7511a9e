// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use http::StatusCode;
use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

/// Result type of CloudAPI calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Structured payload attached to a failed response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorDetails {
    /// Error code supplied directly by the transport.
    pub code: Option<String>,
    /// Error message supplied directly by the transport.
    pub message: Option<String>,
    /// Decoded response body, if it was JSON.
    pub object: Option<Value>,
    /// Raw response body.
    pub body: Option<String>,
}

/// A failed call as reported by the transport.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Response status. `None` if no response was received.
    pub status: Option<StatusCode>,
    /// Human readable summary.
    pub message: String,
    /// Payload of the failed response.
    pub details: Option<ErrorDetails>,
    /// Underlying I/O or decoding failure.
    #[source]
    pub source: Option<smartdc_core::Error>,
}

impl TransportError {
    /// Error for a response whose status was not the expected one.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let details = if body.is_empty() {
            None
        } else {
            let raw = String::from_utf8_lossy(body).to_string();
            Some(ErrorDetails {
                object: serde_json::from_slice(body).ok(),
                body: Some(raw),
                ..Default::default()
            })
        };

        let message = details
            .as_ref()
            .and_then(|d| d.object.as_ref())
            .and_then(|o| o.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {status}"));

        Self {
            status: Some(status),
            message,
            details,
            source: None,
        }
    }

    /// Error for a request that never produced a usable response.
    pub fn from_source(message: impl Into<String>, source: smartdc_core::Error) -> Self {
        Self {
            status: None,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    fn code(&self) -> Option<&str> {
        let details = self.details.as_ref()?;
        details.code.as_deref().or_else(|| {
            details
                .object
                .as_ref()
                .and_then(|o| o.get("code"))
                .and_then(Value::as_str)
        })
    }
}

/// Error reported by the service in its own `{code, message}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// Stable short identifier, e.g. `InvalidArgument`.
    pub code: String,
    /// Human readable message.
    pub message: String,
}

/// Every failure a CloudAPI call can end with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A server error carrying a recognizable `{code, message}` payload.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Any other transport failure, unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The resource was deleted through this client and the deletion is still cached.
    #[error("{path} has been deleted")]
    Deleted {
        /// Request path of the deleted resource.
        path: String,
    },
    /// Configuration, credential or signing failure.
    #[error(transparent)]
    Core(#[from] smartdc_core::Error),
}

impl ApiError {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(e) => e.status,
            ApiError::Deleted { .. } => Some(StatusCode::GONE),
            _ => None,
        }
    }

    /// Service error code, when the service sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Service(e) => Some(&e.code),
            ApiError::Transport(e) => e.code(),
            _ => None,
        }
    }

    /// Whether the resource is known to be gone.
    pub fn is_gone(&self) -> bool {
        self.status() == Some(StatusCode::GONE)
    }

    /// Whether the caller passed invalid arguments or config.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, ApiError::Core(e) if e.is_argument_error())
    }
}

/// Turn a transport error into a [`ServiceError`] when it is a 5xx carrying one.
///
/// The payload is looked up in order:
///
/// 1. `code` and `message` on the details themselves
/// 2. `code` and `message` on the decoded body object
/// 3. the raw body, or a JSON object embedded in it
///
/// Anything else, 4xx errors included, is returned unchanged as [`ApiError::Transport`].
pub fn normalize(err: TransportError) -> ApiError {
    if !err.status.is_some_and(|s| s.is_server_error()) {
        return ApiError::Transport(err);
    }
    let Some(details) = &err.details else {
        return ApiError::Transport(err);
    };

    if let (Some(code), Some(message)) = (&details.code, &details.message) {
        return ServiceError {
            code: code.clone(),
            message: message.clone(),
        }
        .into();
    }

    if let Some(found) = details.object.as_ref().and_then(code_and_message) {
        return found.into();
    }

    if let Some(found) = details.body.as_deref().and_then(parse_body) {
        return found.into();
    }

    debug!("no service error found in {err:?}");
    ApiError::Transport(err)
}

fn code_and_message(v: &Value) -> Option<ServiceError> {
    let code = v.get("code")?.as_str()?;
    let message = v.get("message")?.as_str()?;
    Some(ServiceError {
        code: code.to_string(),
        message: message.to_string(),
    })
}

fn parse_body(body: &str) -> Option<ServiceError> {
    let body = body.trim();
    let json = if body.starts_with('{') {
        body
    } else {
        let start = body.find('{')?;
        let end = body.rfind('}')?;
        if end < start {
            return None;
        }
        &body[start..=end]
    };

    match serde_json::from_str::<Value>(json) {
        Ok(v) => code_and_message(&v),
        Err(e) => {
            warn!("failed to parse error body as json: {e}");
            None
        }
    }
}
