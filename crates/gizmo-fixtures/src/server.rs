//! In-process WebSocket server speaking the envelope protocol.

use futures::{SinkExt, StreamExt};
use gizmo::model::Envelope;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

type Handler = dyn Fn(&Envelope) -> Vec<String> + Send + Sync;

/// Accepts connections on an ephemeral local port, reads one envelope per
/// connection and answers with the frames the handler returns.
///
/// The server task is aborted when the value is dropped.
pub struct FakeGraphServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Envelope>>>,
    connections: Arc<Mutex<usize>>,
    task: JoinHandle<()>,
}

impl FakeGraphServer {
    /// Start a server answering every envelope with `handler`'s frames.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Envelope) -> Vec<String> + Send + Sync + 'static,
    {
        Self::start_with_delay(handler, Duration::ZERO).await
    }

    /// Like [`FakeGraphServer::start`], but waits `delay` before answering.
    pub async fn start_with_delay<F>(handler: F, delay: Duration) -> Self
    where
        F: Fn(&Envelope) -> Vec<String> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().expect("fake server address");
        let handler: Arc<Handler> = Arc::new(handler);
        let received = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(Mutex::new(0));

        let task = {
            let received = Arc::clone(&received);
            let connections = Arc::clone(&connections);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    *connections.lock().unwrap() += 1;
                    let handler = Arc::clone(&handler);
                    let received = Arc::clone(&received);
                    tokio::spawn(async move {
                        let Ok(mut socket) = tokio_tungstenite::accept_async(stream).await else {
                            return;
                        };
                        let Some(Ok(Message::Text(text))) = socket.next().await else {
                            return;
                        };
                        let Ok(envelope) = serde_json::from_str::<Envelope>(&text) else {
                            return;
                        };
                        received.lock().unwrap().push(envelope.clone());
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        for frame in handler(&envelope) {
                            if socket.send(Message::Text(frame)).await.is_err() {
                                return;
                            }
                        }
                        let _ = socket.close(None).await;
                    });
                }
            })
        };

        Self {
            addr,
            received,
            connections,
            task,
        }
    }

    /// `ws://` URL of the server's gremlin endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("ws://{}/gremlin", self.addr)
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Envelopes received so far.
    #[must_use]
    pub fn received(&self) -> Vec<Envelope> {
        self.received.lock().unwrap().clone()
    }

    /// Connections accepted so far.
    #[must_use]
    pub fn connections(&self) -> usize {
        *self.connections.lock().unwrap()
    }
}

impl Drop for FakeGraphServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
