//! Channels to the graph server.
//!
//! A [`Transport`] opens one logical connection per request; the
//! [`Channel`] it returns carries exactly one request frame and yields one
//! aggregated response frame. Pooling, if ever wanted, belongs in a
//! `Transport` implementation; the client does not care.

pub mod websocket;

pub use websocket::WebSocketTransport;

use crate::error::TransportError;
use crate::model::status::STATUS_PARTIAL_CONTENT;
use async_trait::async_trait;
use serde_json::Value;

pub type TransportResult<T> = Result<T, TransportError>;

/// Connection factory for the request engine.
#[async_trait]
pub trait Transport: Send + Sync {
    type Channel: Channel;

    /// Open a fresh channel to the configured endpoint.
    async fn connect(&self) -> TransportResult<Self::Channel>;
}

/// One open connection, used for a single exchange.
#[async_trait]
pub trait Channel: Send {
    /// Write `frame` and wait for the response.
    ///
    /// Implementations that receive a result in several chunks must return
    /// them merged into one frame.
    async fn send(&mut self, frame: String) -> TransportResult<String>;

    /// Release the connection.
    async fn close(&mut self) -> TransportResult<()>;
}

/// Accumulates streamed response frames into one.
///
/// Frames are pushed in arrival order. `result.data` arrays are concatenated;
/// the last frame supplies the status, request id and everything else.
#[derive(Debug, Default)]
pub struct PartialFrames {
    data: Vec<Value>,
    last: Option<LastFrame>,
}

#[derive(Debug)]
enum LastFrame {
    Raw(String),
    Decoded(Value),
}

impl PartialFrames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame. Returns `true` when more frames should follow.
    ///
    /// A frame that is not a JSON object ends the stream; it is returned
    /// verbatim by [`PartialFrames::finish`] so the caller reports the decode
    /// failure.
    pub fn push(&mut self, frame: &str) -> bool {
        let Ok(value) = serde_json::from_str::<Value>(frame) else {
            self.last = Some(LastFrame::Raw(frame.to_string()));
            return false;
        };
        let partial = value
            .pointer("/status/code")
            .and_then(Value::as_u64)
            .is_some_and(|code| code == u64::from(STATUS_PARTIAL_CONTENT));
        match value.pointer("/result/data") {
            Some(Value::Array(items)) => self.data.extend(items.iter().cloned()),
            Some(Value::Null) | None => {}
            Some(other) => self.data.push(other.clone()),
        }
        let is_object = value.is_object();
        self.last = Some(LastFrame::Decoded(value));
        partial && is_object
    }

    /// Merged frame text, or `None` if nothing was pushed.
    #[must_use]
    pub fn finish(self) -> Option<String> {
        match self.last? {
            LastFrame::Raw(raw) => Some(raw),
            LastFrame::Decoded(Value::Object(mut frame)) => {
                let result = frame
                    .entry("result")
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                if let Value::Object(result) = result {
                    result.insert("data".to_string(), Value::Array(self.data));
                }
                Some(Value::Object(frame).to_string())
            }
            LastFrame::Decoded(other) => Some(other.to_string()),
        }
    }
}
