//! Normalization of raw server rows into a flat, uniform shape.
//!
//! Each raw row is decoded once into a [`RawRow`] and then dispatched:
//!
//! - scalars replace the whole result with a single `{"response": value}` row
//! - mappings are flattened (their `properties` merged up, `id`/`type`/`label`
//!   always present), or split per bound variable when a key names a binding
//! - anything else passes through untouched
//!
//! Translation never mutates its input and never touches entities; see
//! [`crate::entity::hydrate`] for the effecting half.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Key under which a bare scalar result is surfaced.
pub const SCALAR_RESPONSE_KEY: &str = "response";

/// Keys that every flattened record carries, `null` when the server omitted them.
pub const NORMALIZED_KEYS: [&str; 3] = ["id", "type", "label"];

const PROPERTIES_KEY: &str = "properties";

/// A raw result row, classified once.
#[derive(Clone, Debug, PartialEq)]
pub enum RawRow {
    /// `null`, a boolean or a number.
    Scalar(Value),
    Mapping(Map<String, Value>),
    /// A mapping the server sent as a list of `{key, value}` objects.
    RepairedMapping(Map<String, Value>),
    /// Strings, and arrays that are not key/value pair lists.
    Other(Value),
}

impl RawRow {
    #[must_use]
    pub fn decode(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::Scalar(value.clone()),
            Value::Object(map) => Self::Mapping(map.clone()),
            Value::Array(items) => match repair_pairs(items) {
                Some(map) => Self::RepairedMapping(map),
                None => Self::Other(value.clone()),
            },
            Value::String(_) => Self::Other(value.clone()),
        }
    }
}

/// Decode a whole `result.data` sequence.
///
/// Some servers serialize a single map result as a top-level list of
/// `{key, value}` objects; when every element has that shape the sequence is
/// read back as one mapping row. Pairs are applied in order, so when a key
/// repeats only its last value is kept. A list of real entries that happen to
/// be pair-shaped is therefore merged rather than returned one row per pair.
#[must_use]
pub fn decode_rows(data: &[Value]) -> Vec<RawRow> {
    if let Some(map) = repair_pairs(data) {
        return vec![RawRow::RepairedMapping(map)];
    }
    data.iter().map(RawRow::decode).collect()
}

/// Rebuild a mapping from a list of `{key, value}` objects.
///
/// Returns `None` unless the list is non-empty and every element is such a
/// pair, so the caller keeps the original list instead of losing data.
/// Non-string keys are keyed by their JSON text.
#[must_use]
pub fn repair_pairs(items: &[Value]) -> Option<Map<String, Value>> {
    if items.is_empty() {
        return None;
    }
    let mut repaired = Map::new();
    for item in items {
        let pair = item.as_object()?;
        let key = pair.get("key")?;
        let value = pair.get("value")?;
        let key = match key {
            Value::String(key) => key.clone(),
            other => other.to_string(),
        };
        repaired.insert(key, value.clone());
    }
    Some(repaired)
}

/// Merge a mapping's `properties` sub-map into the top level and normalize
/// `id`, `type` and `label` from the mapping's own top-level values.
#[must_use]
pub fn flatten_properties(source: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = source.clone();
    if let Some(Value::Object(properties)) = source.get(PROPERTIES_KEY) {
        flat.remove(PROPERTIES_KEY);
        for (name, value) in properties {
            flat.insert(name.clone(), value.clone());
        }
    }
    for key in NORMALIZED_KEYS {
        let value = source.get(key).cloned().unwrap_or(Value::Null);
        flat.insert(key.to_string(), value);
    }
    flat
}

/// A flattened mapping row.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    #[serde(skip)]
    binding: Option<String>,
    fields: Map<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            binding: None,
            fields,
        }
    }

    /// A record produced from the value of bound script variable `binding`.
    #[must_use]
    pub fn bound(binding: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            binding: Some(binding.into()),
            fields,
        }
    }

    /// Script variable this record was produced from, if it was bound.
    pub fn binding(&self) -> Option<&str> {
        self.binding.as_deref()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn id(&self) -> Option<&Value> {
        self.get("id").filter(|value| !value.is_null())
    }

    pub fn label(&self) -> Option<&str> {
        self.get("label").and_then(Value::as_str)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// The value of a bound script variable that is not a mapping.
///
/// It serializes as the bare value but keeps its binding, so hydration can
/// report it instead of leaving the entity untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundValue {
    #[serde(skip)]
    binding: String,
    value: Value,
}

impl BoundValue {
    #[must_use]
    pub fn new(binding: impl Into<String>, value: Value) -> Self {
        Self {
            binding: binding.into(),
            value,
        }
    }

    pub fn binding(&self) -> &str {
        &self.binding
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// One translated row.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Record(Record),
    /// A bound variable whose value is not a mapping.
    BoundValue(BoundValue),
    /// A non-mapping row passed through as-is.
    Value(Value),
}

impl Row {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::BoundValue(_) | Self::Value(_) => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_record().and_then(|record| record.get(field))
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Record(record) => Value::Object(record.fields.clone()),
            Self::BoundValue(bound) => bound.value.clone(),
            Self::Value(value) => value.clone(),
        }
    }
}

/// Translate a raw data sequence.
///
/// `bound` names the script variables whose values should be split out as
/// bound records. A single matching key marks the whole row as a binding row;
/// its other keys are not surfaced.
///
/// A scalar row discards every row translated before it. This mirrors the
/// service returning a lone value instead of a list of values; with several
/// scalars only the last survives.
#[must_use]
pub fn translate(data: &[Value], bound: &BTreeSet<String>) -> Vec<Row> {
    let mut rows = Vec::new();
    for raw in decode_rows(data) {
        match raw {
            RawRow::Scalar(value) => {
                let mut fields = Map::new();
                fields.insert(SCALAR_RESPONSE_KEY.to_string(), value);
                rows = vec![Row::Record(Record::new(fields))];
            }
            RawRow::Mapping(map) | RawRow::RepairedMapping(map) => {
                if map.keys().any(|key| bound.contains(key)) {
                    translate_bound(&map, bound, &mut rows);
                } else {
                    rows.push(Row::Record(Record::new(flatten_properties(&map))));
                }
            }
            RawRow::Other(value) => rows.push(Row::Value(value)),
        }
    }
    rows
}

fn translate_bound(map: &Map<String, Value>, bound: &BTreeSet<String>, rows: &mut Vec<Row>) {
    for (name, value) in map {
        if !bound.contains(name) {
            continue;
        }
        match value {
            Value::Object(fields) => {
                rows.push(Row::Record(Record::bound(
                    name.clone(),
                    flatten_properties(fields),
                )));
            }
            other => {
                rows.push(Row::BoundValue(BoundValue::new(name.clone(), other.clone())));
            }
        }
    }
}
