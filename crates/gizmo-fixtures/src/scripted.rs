//! In-memory [`Transport`] that replays canned replies and records requests.

use async_trait::async_trait;
use gizmo::error::TransportError;
use gizmo::model::Envelope;
use gizmo::transport::{Channel, Transport, TransportResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// What the next connection should do.
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    /// Connect, then answer with this frame.
    Frame(String),
    /// Fail to connect.
    RefuseConnect,
    /// Connect, then lose the channel before answering.
    DropChannel,
}

#[derive(Debug, Default)]
struct State {
    replies: VecDeque<ScriptedReply>,
    sent: Vec<Envelope>,
    connects: usize,
    closes: usize,
}

/// Transport whose connections consume [`ScriptedReply`] values in order.
///
/// Once the script runs out every connection is refused.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<State>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reply(self, frame: impl Into<String>) -> Self {
        self.push(ScriptedReply::Frame(frame.into()))
    }

    #[must_use]
    pub fn push(self, reply: ScriptedReply) -> Self {
        self.state.lock().unwrap().replies.push_back(reply);
        self
    }

    /// Envelopes written so far, decoded.
    #[must_use]
    pub fn sent(&self) -> Vec<Envelope> {
        self.state.lock().unwrap().sent.clone()
    }

    #[must_use]
    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    #[must_use]
    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Channel = ScriptedChannel;

    async fn connect(&self) -> TransportResult<ScriptedChannel> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        match state.replies.pop_front() {
            Some(ScriptedReply::RefuseConnect) | None => Err(TransportError::Connect {
                endpoint: "scripted://".to_string(),
                source: "connection refused".into(),
            }),
            Some(reply) => Ok(ScriptedChannel {
                reply,
                state: Arc::clone(&self.state),
            }),
        }
    }
}

pub struct ScriptedChannel {
    reply: ScriptedReply,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl Channel for ScriptedChannel {
    async fn send(&mut self, frame: String) -> TransportResult<String> {
        let envelope: Envelope =
            serde_json::from_str(&frame).map_err(|err| TransportError::Send(Box::new(err)))?;
        self.state.lock().unwrap().sent.push(envelope);
        match &self.reply {
            ScriptedReply::Frame(reply) => Ok(reply.clone()),
            ScriptedReply::RefuseConnect | ScriptedReply::DropChannel => {
                Err(TransportError::Closed)
            }
        }
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}
