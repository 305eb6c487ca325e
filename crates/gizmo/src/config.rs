//! Client configuration and config-file loading.

use crate::error::{RequestError, RequestResult};
use crate::model::DEFAULT_LANGUAGE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8182;
/// Endpoint path used by servers from 3.2 on; older servers use an empty path.
pub const DEFAULT_PATH: &str = "/gremlin";

/// How a channel turns response frames into one raw result.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    /// The first frame is the whole result.
    #[default]
    Single,
    /// Keep reading while the server reports partial content and
    /// concatenate the chunks.
    Aggregate,
}

/// Connection and request settings.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Script dialect sent when a query does not name one.
    pub language: String,
    /// Upper bound on connecting plus the full exchange. `None` waits forever.
    pub timeout_ms: Option<u64>,
    /// Attach a [`QueryTracer`](crate::trace::QueryTracer) to the client.
    pub log_requests: bool,
    pub stream: StreamMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_ms: None,
            log_requests: false,
            stream: StreamMode::Single,
        }
    }
}

impl ClientConfig {
    /// WebSocket URL for this config, e.g. `ws://localhost:8182/gremlin`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let path = self.path.trim();
        if path.is_empty() {
            format!("ws://{}:{}", self.host, self.port)
        } else if path.starts_with('/') {
            format!("ws://{}:{}{}", self.host, self.port, path)
        } else {
            format!("ws://{}:{}/{}", self.host, self.port, path)
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> RequestResult<()> {
        if self.host.trim().is_empty() {
            return Err(RequestError::config("host must not be empty", None));
        }
        if self.port == 0 {
            return Err(RequestError::config(
                "port must be non-zero",
                serde_json::json!({ "port": self.port }),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(RequestError::config("language must not be empty", None));
        }
        Ok(())
    }
}

/// Load a [`ClientConfig`] from a JSON file, or YAML for `.yaml`/`.yml`.
pub fn load_config_file(path: &Path) -> RequestResult<ClientConfig> {
    let data = fs::read_to_string(path)
        .map_err(|err| RequestError::io("failed to read config file", err))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let config: ClientConfig = if is_yaml {
        serde_yml::from_str(&data).map_err(|err| {
            RequestError::config(
                "failed to parse yaml config",
                serde_json::json!({ "path": path.display().to_string(), "parse_error": err.to_string() }),
            )
        })?
    } else {
        serde_json::from_str(&data).map_err(|err| {
            RequestError::config(
                "failed to parse json config",
                serde_json::json!({ "path": path.display().to_string(), "parse_error": err.to_string() }),
            )
        })?
    };
    config.validate()?;
    Ok(config)
}
