use crate::model::{Query, RequestId, ResponseStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Request envelope written to the channel, one per query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub request_id: RequestId,
    pub op: String,
    pub processor: String,
    pub args: EnvelopeArgs,
}

/// Script payload of an [`Envelope`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeArgs {
    pub gremlin: String,
    pub bindings: Map<String, Value>,
    pub language: String,
    #[serde(default)]
    pub rebindings: BTreeMap<String, String>,
}

impl Envelope {
    /// Build an envelope with a fresh request id.
    ///
    /// The query's own language wins over `default_language`.
    #[must_use]
    pub fn from_query(query: &Query, default_language: &str) -> Self {
        Self {
            request_id: RequestId::new(),
            op: query.operation_name().to_string(),
            processor: query.processor_name().to_string(),
            args: EnvelopeArgs {
                gremlin: query.script().to_string(),
                bindings: query.bound_params().clone(),
                language: query
                    .language_override()
                    .unwrap_or(default_language)
                    .to_string(),
                rebindings: query.rebindings().clone(),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Response payload as read off the channel.
///
/// Every field is optional: absent fields are filled in by the caller
/// rather than rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    #[serde(default, alias = "requestId")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub status: Option<ResponseStatus>,
}

impl ResponseFrame {
    pub fn parse(frame: &str) -> serde_json::Result<Self> {
        serde_json::from_str(frame)
    }

    /// Status reported by the server, or the internal-error default.
    #[must_use]
    pub fn status_or_default(&self) -> ResponseStatus {
        self.status.clone().unwrap_or_default()
    }
}
