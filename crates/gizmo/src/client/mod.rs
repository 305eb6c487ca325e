//! Request engine: one query in, one [`Response`] out.
//!
//! Each call to [`Client::send`] opens a fresh channel through the
//! configured [`Transport`], writes a single envelope, waits for a single
//! (possibly aggregated) reply and closes the channel. There is no retry at
//! this layer.

mod response;

pub use response::Response;

use crate::config::ClientConfig;
use crate::entity::Bindings;
use crate::error::{RequestError, RequestResult, TransportError};
use crate::model::{Envelope, Query, ResponseFrame, DEFAULT_LANGUAGE};
use crate::trace::QueryTracer;
use crate::transport::{Channel, Transport, WebSocketTransport};
use crate::util::{as_millis_f64, render_query, Timer};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client for a graph server reachable through `T`.
#[derive(Debug)]
pub struct Client<T: Transport = WebSocketTransport> {
    transport: T,
    language: String,
    tracer: Option<Arc<QueryTracer>>,
}

impl Client<WebSocketTransport> {
    /// WebSocket client for `config`, with a tracer when `log_requests` is set.
    pub fn from_config(config: &ClientConfig) -> RequestResult<Self> {
        config.validate()?;
        let mut client =
            Self::new(WebSocketTransport::from_config(config)).with_language(&config.language);
        if config.log_requests {
            client = client.with_tracer(Arc::new(QueryTracer::new()));
        }
        Ok(client)
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            language: DEFAULT_LANGUAGE.to_string(),
            tracer: None,
        }
    }

    /// Record every successful request in `tracer`.
    ///
    /// The tracer can be shared between clients.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Arc<QueryTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Default script dialect for queries that do not name one.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn tracer(&self) -> Option<&Arc<QueryTracer>> {
        self.tracer.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `query` and return its response.
    pub async fn send(&self, query: &Query) -> RequestResult<Response> {
        self.execute(query, BTreeSet::new()).await
    }

    /// Execute `query`, then refresh every entity in `bindings` from the row
    /// produced for its script variable.
    ///
    /// A hydration failure is returned as an `E_HYDRATION` error; the request
    /// itself has already completed and is traced.
    pub async fn send_with_bindings(
        &self,
        query: &Query,
        bindings: &mut Bindings<'_>,
    ) -> RequestResult<Response> {
        let bound = bindings.keys().cloned().collect();
        let response = self.execute(query, bound).await?;
        response.hydrate(bindings)?;
        Ok(response)
    }

    async fn execute(&self, query: &Query, bound: BTreeSet<String>) -> RequestResult<Response> {
        let envelope = Envelope::from_query(query, &self.language);
        let payload = envelope
            .to_json()
            .map_err(|err| RequestError::protocol("failed to encode request envelope", err))?;
        let rendered = render_query(query.script(), query.bound_params());

        debug!(
            request_id = %envelope.request_id,
            script = query.script(),
            params = %serde_json::Value::Object(query.bound_params().clone()),
            query = %rendered,
            "running query"
        );

        let mut timer = Timer::start();
        let exchanged = self.exchange(payload).await;
        let elapsed = timer.stop();
        let frame = exchanged.map_err(|err| RequestError::connection("request failed", err))?;

        let decoded = ResponseFrame::parse(&frame)
            .map_err(|err| RequestError::protocol("failed to decode response frame", err))?;
        let status = decoded.status_or_default();

        debug!(
            request_id = %envelope.request_id,
            status = status.code,
            runtime_ms = as_millis_f64(elapsed),
            "query finished"
        );

        if let Some(tracer) = &self.tracer {
            tracer.add(
                query.script(),
                query.bound_params().clone(),
                rendered,
                elapsed,
            );
        }

        Ok(Response::new(
            decoded.request_id,
            status,
            decoded.result,
            bound,
            query.script(),
            query.bound_params().clone(),
        ))
    }

    async fn exchange(&self, payload: String) -> Result<String, TransportError> {
        let mut channel = self.transport.connect().await?;
        let reply = channel.send(payload).await;
        if let Err(err) = channel.close().await {
            warn!(error = %err, "failed to close channel");
        }
        reply
    }
}
