//! WebSocket transport built on `tokio-tungstenite`.

use super::{Channel, PartialFrames, Transport, TransportResult};
use crate::config::{ClientConfig, StreamMode};
use crate::error::TransportError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a new WebSocket connection for every request.
#[derive(Clone, Debug)]
pub struct WebSocketTransport {
    endpoint: String,
    timeout: Option<Duration>,
    mode: StreamMode,
}

impl WebSocketTransport {
    /// Transport for `endpoint` (a `ws://` or `wss://` URL) with no timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: None,
            mode: StreamMode::Single,
        }
    }

    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint(),
            timeout: config.timeout(),
            mode: config.stream,
        }
    }

    /// Bound connecting plus the whole exchange by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_stream_mode(mut self, mode: StreamMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    type Channel = WebSocketChannel;

    async fn connect(&self) -> TransportResult<WebSocketChannel> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(TransportError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
            });
        }
        let deadline = self.timeout.map(|limit| (Instant::now() + limit, limit));
        let connect = connect_async(self.endpoint.as_str());
        let (socket, _) = within(deadline, connect)
            .await?
            .map_err(|err| TransportError::Connect {
                endpoint: self.endpoint.clone(),
                source: Box::new(err),
            })?;
        debug!(endpoint = %self.endpoint, "websocket connected");
        Ok(WebSocketChannel {
            socket,
            deadline,
            mode: self.mode,
        })
    }
}

/// One open WebSocket connection.
pub struct WebSocketChannel {
    socket: Socket,
    deadline: Option<(Instant, Duration)>,
    mode: StreamMode,
}

impl WebSocketChannel {
    async fn next_text(&mut self) -> TransportResult<String> {
        loop {
            let message = within(self.deadline, self.socket.next()).await?;
            match message {
                None | Some(Ok(Message::Close(_))) => return Err(TransportError::Closed),
                Some(Err(err)) => return Err(TransportError::Receive(Box::new(err))),
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(bytes))) => {
                    return String::from_utf8(bytes)
                        .map_err(|err| TransportError::Receive(Box::new(err)));
                }
                Some(Ok(other)) => trace!(?other, "skipping control frame"),
            }
        }
    }
}

#[async_trait]
impl Channel for WebSocketChannel {
    async fn send(&mut self, frame: String) -> TransportResult<String> {
        within(self.deadline, self.socket.send(Message::Text(frame)))
            .await?
            .map_err(|err| TransportError::Send(Box::new(err)))?;

        match self.mode {
            StreamMode::Single => self.next_text().await,
            StreamMode::Aggregate => {
                let mut frames = PartialFrames::new();
                while frames.push(&self.next_text().await?) {}
                frames.finish().ok_or(TransportError::Closed)
            }
        }
    }

    async fn close(&mut self) -> TransportResult<()> {
        within(self.deadline, self.socket.close(None))
            .await?
            .map_err(|err| TransportError::Send(Box::new(err)))
    }
}

async fn within<F: Future>(
    deadline: Option<(Instant, Duration)>,
    future: F,
) -> TransportResult<F::Output> {
    match deadline {
        Some((at, limit)) => tokio::time::timeout_at(at, future)
            .await
            .map_err(|_| TransportError::Timeout(limit)),
        None => Ok(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_websocket_endpoint_is_rejected() {
        let transport = WebSocketTransport::new("http://localhost:8182/gremlin");
        let err = transport.connect().await.err();
        assert!(matches!(
            err,
            Some(TransportError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn config_carries_timeout_and_mode() {
        let config = ClientConfig {
            timeout_ms: Some(1500),
            stream: StreamMode::Aggregate,
            ..ClientConfig::default()
        };
        let transport = WebSocketTransport::from_config(&config);
        assert_eq!(transport.endpoint(), "ws://localhost:8182/gremlin");
        assert_eq!(transport.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(transport.mode, StreamMode::Aggregate);
    }
}
