use crate::model::DEFAULT_OPERATION;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A traversal script plus everything the server needs to evaluate it.
///
/// # Example
///
/// ```
/// use gizmo::Query;
///
/// let query = Query::new("g.V(vid).valueMap()")
///     .param("vid", 7)
///     .rebinding("g", "graph_traversal");
/// assert_eq!(query.script(), "g.V(vid).valueMap()");
/// assert_eq!(query.operation_name(), "eval");
/// assert_eq!(query.bound_params()["vid"], 7);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    script: String,
    #[serde(default)]
    params: Map<String, Value>,
    #[serde(default)]
    rebindings: BTreeMap<String, String>,
    #[serde(default = "default_operation")]
    operation: String,
    #[serde(default)]
    processor: String,
    #[serde(default)]
    language: Option<String>,
}

fn default_operation() -> String {
    DEFAULT_OPERATION.to_string()
}

impl Query {
    /// Create a query for `script` with no parameters.
    #[must_use]
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            params: Map::new(),
            rebindings: BTreeMap::new(),
            operation: default_operation(),
            processor: String::new(),
            language: None,
        }
    }

    /// Bind a script variable to a value.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replace all parameters at once.
    #[must_use]
    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Alias a traversal source on the server side.
    #[must_use]
    pub fn rebinding(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.rebindings.insert(alias.into(), target.into());
        self
    }

    #[must_use]
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    #[must_use]
    pub fn processor(mut self, processor: impl Into<String>) -> Self {
        self.processor = processor.into();
        self
    }

    /// Override the client's script dialect for this query only.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn bound_params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn rebindings(&self) -> &BTreeMap<String, String> {
        &self.rebindings
    }

    pub fn operation_name(&self) -> &str {
        &self.operation
    }

    pub fn processor_name(&self) -> &str {
        &self.processor
    }

    pub fn language_override(&self) -> Option<&str> {
        self.language.as_deref()
    }
}
