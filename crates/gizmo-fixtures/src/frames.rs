//! Response frame builders.

use serde_json::{json, Value};

/// A 200 frame carrying `data`.
#[must_use]
pub fn success(data: Value) -> String {
    with_status(data, 200, "")
}

/// A 206 frame carrying one chunk of a streamed result.
#[must_use]
pub fn partial(data: Value) -> String {
    with_status(data, 206, "")
}

/// A frame with no data and the given status.
#[must_use]
pub fn failure(code: u16, message: &str) -> String {
    json!({
        "requestId": "00000000-0000-0000-0000-000000000000",
        "status": {"code": code, "message": message, "attributes": {}},
        "result": {"data": null, "meta": {}}
    })
    .to_string()
}

#[must_use]
pub fn with_status(data: Value, code: u16, message: &str) -> String {
    json!({
        "requestId": "00000000-0000-0000-0000-000000000000",
        "status": {"code": code, "message": message, "attributes": {}},
        "result": {"data": data, "meta": {}}
    })
    .to_string()
}

/// Vertex in the shape the server returns it.
#[must_use]
pub fn vertex(id: i64, label: &str, properties: Value) -> Value {
    json!({"id": id, "label": label, "type": "vertex", "properties": properties})
}
