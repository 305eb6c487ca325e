pub mod envelope;
pub mod ids;
pub mod query;
pub mod status;

pub use envelope::{Envelope, EnvelopeArgs, ResponseFrame};
pub use ids::RequestId;
pub use query::Query;
pub use status::ResponseStatus;

/// Script dialect used when neither the query nor the client names one.
pub const DEFAULT_LANGUAGE: &str = "gremlin-groovy";

/// Operation requested when the query does not override it.
pub const DEFAULT_OPERATION: &str = "eval";
