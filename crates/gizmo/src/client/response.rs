use crate::entity::{self, Bindings};
use crate::error::{HydrateError, RequestError, RequestResult};
use crate::model::ResponseStatus;
use crate::translate::{translate, Row};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Result of one request.
///
/// Holds the raw result exactly as the server sent it; translated rows are
/// recomputed on every call to [`Response::translate`], so repeated reads
/// always agree. Bound entities are never owned here, only refreshed through
/// [`Response::hydrate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    request_id: Option<String>,
    status: ResponseStatus,
    result: Value,
    bound: BTreeSet<String>,
    script: String,
    params: Map<String, Value>,
}

impl Response {
    /// Build a response. A missing `result` is treated as an empty object.
    pub fn new(
        request_id: Option<String>,
        status: ResponseStatus,
        result: Option<Value>,
        bound: BTreeSet<String>,
        script: impl Into<String>,
        params: Map<String, Value>,
    ) -> Self {
        Self {
            request_id,
            status,
            result: result.unwrap_or_else(|| Value::Object(Map::new())),
            bound,
            script: script.into(),
            params,
        }
    }

    /// Request id echoed by the server. Informational only; it is not
    /// checked against the id that was sent.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn status(&self) -> &ResponseStatus {
        &self.status
    }

    pub fn result(&self) -> &Value {
        &self.result
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Script variables whose rows are split out as bound records.
    pub fn bound_keys(&self) -> &BTreeSet<String> {
        &self.bound
    }

    /// `result.data` as a sequence. Absent or `null` data is empty; any other
    /// non-array value is read as a single row.
    pub fn raw_data(&self) -> &[Value] {
        match self.result.get("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => &[],
            Some(other) => std::slice::from_ref(other),
        }
    }

    /// Translate the raw result. Pure; safe to call repeatedly.
    pub fn translate(&self) -> Vec<Row> {
        translate(self.raw_data(), &self.bound)
    }

    /// Alias for [`Response::translate`].
    pub fn data(&self) -> Vec<Row> {
        self.translate()
    }

    /// Translated row at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Row> {
        self.translate().into_iter().nth(index)
    }

    pub fn len(&self) -> usize {
        self.translate().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refresh every entity in `bindings` from its bound record.
    ///
    /// Returns the number of entities refreshed.
    pub fn hydrate(&self, bindings: &mut Bindings<'_>) -> Result<usize, HydrateError> {
        entity::hydrate(bindings, &self.translate())
    }

    /// Turn a non-success server status into an error.
    pub fn error_for_status(self) -> RequestResult<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(RequestError::status(self.status.code, self.status.message))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::entity::GenericEntity;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn response(result: Value, bound: &[&str]) -> Response {
        Response::new(
            Some("r-1".to_string()),
            ResponseStatus::new(200, ""),
            Some(result),
            bound.iter().map(ToString::to_string).collect(),
            "g.V()",
            Map::new(),
        )
    }

    #[test]
    fn missing_result_translates_to_nothing() {
        let response = Response::new(
            None,
            ResponseStatus::default(),
            None,
            BTreeSet::new(),
            "g.V()",
            Map::new(),
        );
        assert!(response.translate().is_empty());
        assert!(response.is_empty());
    }

    #[test]
    fn non_array_data_is_a_single_row() {
        let response = response(json!({"data": {"a": 1}}), &[]);
        assert_eq!(response.len(), 1);
        assert_eq!(response.get(0).unwrap().get("a"), Some(&json!(1)));
    }

    #[test]
    fn get_out_of_range_is_none() {
        let response = response(json!({"data": [{"a": 1}]}), &[]);
        assert!(response.get(1).is_none());
    }

    #[test]
    fn translation_is_repeatable() {
        let response = response(json!({"data": [{"a": 1, "properties": {"b": 2}}]}), &[]);
        assert_eq!(response.translate(), response.translate());
        assert_eq!(response.result()["data"][0]["properties"]["b"], 2);
    }

    #[test]
    fn hydrating_twice_gives_the_same_entity() {
        let response = response(
            json!({"data": [{"v": {"id": 7, "label": "person", "properties": {"name": ["x"]}}}]}),
            &["v"],
        );
        let mut person = GenericEntity::new();
        let mut bindings = Bindings::new();
        bindings.insert("v".to_string(), &mut person);
        response.hydrate(&mut bindings).unwrap();
        response.hydrate(&mut bindings).unwrap();
        drop(bindings);

        assert_eq!(
            Value::Object(person.fields().clone()),
            json!({"id": 7, "type": null, "label": "person", "name": ["x"]})
        );
    }

    #[test]
    fn error_for_status_rejects_server_errors() {
        let failed = Response::new(
            None,
            ResponseStatus::new(597, "boom"),
            None,
            BTreeSet::new(),
            "g.V()",
            Map::new(),
        );
        let err = failed.error_for_status().unwrap_err();
        assert_eq!(err.code, ErrorCode::Status);

        assert!(response(json!({}), &[]).error_for_status().is_ok());
    }
}
