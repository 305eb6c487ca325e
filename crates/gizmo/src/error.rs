//! Error types for the request pipeline.
//!
//! Every failure the client can report is a [`RequestError`] carrying a
//! stable [`ErrorCode`]. Lower layers have their own narrow error enums
//! ([`TransportError`], [`HydrateError`]) that convert into it.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type RequestResult<T> = Result<T, RequestError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-readable classification of a [`RequestError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The channel could not be opened, or failed mid-exchange.
    #[serde(rename = "E_CONNECTION")]
    Connection,
    /// The envelope could not be encoded or the reply could not be decoded.
    #[serde(rename = "E_PROTOCOL")]
    Protocol,
    /// The server answered with a non-success status.
    #[serde(rename = "E_STATUS")]
    Status,
    /// A bound entity rejected the row it was refreshed from.
    #[serde(rename = "E_HYDRATION")]
    Hydration,
    /// Client configuration was malformed.
    #[serde(rename = "E_CONFIG")]
    Config,
    #[serde(rename = "E_IO")]
    Io,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "E_CONNECTION",
            Self::Protocol => "E_PROTOCOL",
            Self::Status => "E_STATUS",
            Self::Hydration => "E_HYDRATION",
            Self::Config => "E_CONFIG",
            Self::Io => "E_IO",
        }
    }

    /// Look up a code by its wire name.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "E_CONNECTION" => Some(Self::Connection),
            "E_PROTOCOL" => Some(Self::Protocol),
            "E_STATUS" => Some(Self::Status),
            "E_HYDRATION" => Some(Self::Hydration),
            "E_CONFIG" => Some(Self::Config),
            "E_IO" => Some(Self::Io),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable summary of a [`RequestError`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    pub context: Option<Value>,
}

/// Error returned by every fallible client operation.
///
/// Nothing in the crate retries: the caller of `send` decides whether to.
#[derive(Debug, Error, Diagnostic)]
#[error("{code}: {message}")]
#[diagnostic(code(gizmo::request))]
pub struct RequestError {
    pub code: ErrorCode,
    pub message: String,
    pub context: Option<Value>,
    #[source]
    source: Option<BoxedSource>,
}

impl RequestError {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        context: impl Into<Option<Value>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            context: context.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        let source = source.into();
        if self.context.is_none() {
            self.context = Some(serde_json::json!({ "source": source.to_string() }));
        }
        self.source = Some(source);
        self
    }

    pub fn connection(message: impl Into<String>, err: TransportError) -> Self {
        let context = err.context();
        Self::new(ErrorCode::Connection, message, context).with_source(err)
    }

    pub fn protocol(message: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(ErrorCode::Protocol, message, None).with_source(err)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::Status,
            format!("server returned status {code}"),
            serde_json::json!({ "status_code": code, "status_message": message }),
        )
    }

    pub fn hydration(err: HydrateError) -> Self {
        Self::new(ErrorCode::Hydration, "failed to hydrate bound entity", None).with_source(err)
    }

    pub fn config(message: impl Into<String>, context: impl Into<Option<Value>>) -> Self {
        Self::new(ErrorCode::Config, message, context)
    }

    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, message, None).with_source(err)
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code,
            message: self.message.clone(),
            context: self.context.clone(),
        }
    }
}

impl From<HydrateError> for RequestError {
    fn from(err: HydrateError) -> Self {
        Self::hydration(err)
    }
}

/// Failure inside a [`Transport`](crate::transport::Transport) or its channel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint '{endpoint}'")]
    InvalidEndpoint { endpoint: String },
    #[error("failed to connect to {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: BoxedSource,
    },
    #[error("failed to write request frame")]
    Send(#[source] BoxedSource),
    #[error("failed to read response frame")]
    Receive(#[source] BoxedSource),
    #[error("channel closed before a response arrived")]
    Closed,
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl TransportError {
    fn context(&self) -> Option<Value> {
        match self {
            Self::InvalidEndpoint { endpoint } | Self::Connect { endpoint, .. } => {
                Some(serde_json::json!({ "endpoint": endpoint }))
            }
            Self::Timeout(limit) => Some(serde_json::json!({
                "timeout_ms": u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
            })),
            Self::Send(_) | Self::Receive(_) | Self::Closed => None,
        }
    }
}

/// Failure raised by an [`Entity`](crate::entity::Entity) while being refreshed.
#[derive(Debug, Error, PartialEq)]
pub enum HydrateError {
    #[error("entity does not define field '{field}'")]
    UnknownField { field: String },
    #[error("bound variable '{binding}' is not a mapping: {found}")]
    NotAMapping { binding: String, found: Value },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_round_trip_through_names() {
        for code in [
            ErrorCode::Connection,
            ErrorCode::Protocol,
            ErrorCode::Status,
            ErrorCode::Hydration,
            ErrorCode::Config,
            ErrorCode::Io,
        ] {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(ErrorCode::parse("E_UNKNOWN"), None);
    }

    #[test]
    fn connection_error_keeps_cause() {
        let err = RequestError::connection(
            "request failed",
            TransportError::Timeout(Duration::from_millis(250)),
        );
        assert_eq!(err.code, ErrorCode::Connection);
        assert_eq!(err.to_string(), "E_CONNECTION: request failed");
        assert_eq!(
            err.context,
            Some(serde_json::json!({ "timeout_ms": 250 }))
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("no response within 250ms"));
    }

    #[test]
    fn status_error_records_server_message() {
        let err = RequestError::status(597, "script evaluation error");
        assert_eq!(err.code, ErrorCode::Status);
        let info = err.to_error_info();
        assert_eq!(info.context.unwrap()["status_code"], 597);
    }
}
