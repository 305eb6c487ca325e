//! Gizmo: an async client for Gremlin-speaking graph services.
//!
//! The crate sends textual traversal scripts to a remote graph server over a
//! WebSocket channel (one fresh connection per request), decodes the server's
//! generic result rows into a flat uniform shape, and can refresh caller-owned
//! entities from those rows.
//!
//! The pipeline is split in two explicit steps:
//!
//! - [`Response::translate`] is pure and can be called any number of times.
//! - [`Response::hydrate`] applies the translated rows to bound entities.
//!
//! ```no_run
//! use gizmo::{Client, ClientConfig, Query};
//!
//! # async fn example() -> gizmo::RequestResult<()> {
//! let client = Client::from_config(&ClientConfig::default())?;
//! let query = Query::new("g.V().has('name', name)").param("name", "alice");
//! let response = client.send(&query).await?;
//! for row in response.data() {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
// Public API types have docs; accessors and builder methods are
// self-describing.
#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod model;
pub mod trace;
pub mod translate;
pub mod transport;
pub mod util;

pub use crate::client::{Client, Response};
pub use crate::config::{load_config_file, ClientConfig, StreamMode};
pub use crate::entity::{hydrate, Bindings, Entity, GenericEntity};
pub use crate::error::{ErrorCode, HydrateError, RequestError, RequestResult, TransportError};
pub use crate::model::*;
pub use crate::trace::{QueryTracer, TraceEntry};
pub use crate::translate::{translate, BoundValue, RawRow, Record, Row};
pub use crate::transport::{Channel, Transport, WebSocketTransport};
