use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Status code for a fully delivered result.
pub const STATUS_SUCCESS: u16 = 200;
/// Status code for a successful request that produced no data.
pub const STATUS_NO_CONTENT: u16 = 204;
/// Status code for one chunk of a result streamed over several frames.
pub const STATUS_PARTIAL_CONTENT: u16 = 206;
/// Status assumed when the server omits one.
pub const STATUS_SERVER_ERROR: u16 = 500;

/// Protocol-level outcome reported by the server, independent of whether
/// any data came back.
///
/// Missing or `null` fields read as their defaults: code 500, an empty
/// message and no attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseStatus {
    #[serde(
        default = "server_error_code",
        deserialize_with = "code_or_server_error"
    )]
    pub code: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Map<String, Value>,
}

fn server_error_code() -> u16 {
    STATUS_SERVER_ERROR
}

fn code_or_server_error<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u16>::deserialize(deserializer)?.unwrap_or(STATUS_SERVER_ERROR))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResponseStatus {
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(
            self.code,
            STATUS_SUCCESS | STATUS_NO_CONTENT | STATUS_PARTIAL_CONTENT
        )
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.code == STATUS_PARTIAL_CONTENT
    }
}

impl Default for ResponseStatus {
    fn default() -> Self {
        Self::new(STATUS_SERVER_ERROR, "")
    }
}
