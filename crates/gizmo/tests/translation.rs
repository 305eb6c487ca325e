// Test module - relaxed lint rules
#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

//! Behavioral tests for result translation and hydration.

use std::collections::BTreeSet;
use std::time::Duration;

use gizmo::translate::{decode_rows, repair_pairs};
use gizmo::{
    hydrate, translate, Bindings, GenericEntity, QueryTracer, RawRow, Response, ResponseStatus,
    Row,
};
use serde_json::{json, Map, Value};

fn data(value: Value) -> Vec<Value> {
    value.as_array().cloned().unwrap()
}

fn bound(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(ToString::to_string).collect()
}

fn values(rows: &[Row]) -> Vec<Value> {
    rows.iter().map(Row::to_value).collect()
}

// =============================================================================
// Plain rows
// =============================================================================

#[test]
fn plain_mapping_gains_only_normalized_keys() {
    let raw = json!({"name": "alice", "age": 30, "id": 4});
    let rows = translate(&data(json!([raw.clone()])), &BTreeSet::new());

    let mut expected = raw.as_object().cloned().unwrap();
    expected.insert("type".to_string(), Value::Null);
    expected.insert("label".to_string(), Value::Null);
    assert_eq!(values(&rows), vec![Value::Object(expected)]);
}

#[test]
fn empty_result_yields_empty_rows() {
    assert!(translate(&[], &BTreeSet::new()).is_empty());
    assert!(translate(&[], &bound(&["v"])).is_empty());
}

#[test]
fn translation_is_idempotent_over_the_same_input() {
    let raw = data(json!([
        {"id": 1, "properties": {"name": ["a"]}},
        "text",
        [1, 2]
    ]));
    let first = translate(&raw, &BTreeSet::new());
    let second = translate(&raw, &BTreeSet::new());
    assert_eq!(first, second);
    assert_eq!(first[1], Row::Value(json!("text")));
    assert_eq!(first[2], Row::Value(json!([1, 2])));
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn scalar_rows_keep_only_the_last() {
    let rows = translate(&data(json!([1, 2, 3])), &BTreeSet::new());
    assert_eq!(values(&rows), vec![json!({"response": 3})]);
}

#[test]
fn null_and_bool_rows_are_scalars() {
    let rows = translate(&data(json!([true, null])), &BTreeSet::new());
    assert_eq!(values(&rows), vec![json!({"response": null})]);
}

// =============================================================================
// Pair-list repair
// =============================================================================

#[test]
fn pair_list_payload_becomes_one_mapping() {
    let raw = data(json!([
        {"key": "name", "value": "alice"},
        {"key": "age", "value": 30}
    ]));
    let decoded = decode_rows(&raw);
    let mut expected = Map::new();
    expected.insert("name".to_string(), json!("alice"));
    expected.insert("age".to_string(), json!(30));
    assert_eq!(decoded, vec![RawRow::RepairedMapping(expected)]);

    let rows = translate(&raw, &BTreeSet::new());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&json!("alice")));
    assert_eq!(rows[0].get("age"), Some(&json!(30)));
}

#[test]
fn pair_list_row_is_repaired_in_place() {
    let raw = data(json!([
        {"id": 1},
        [{"key": "name", "value": "bob"}]
    ]));
    let rows = translate(&raw, &BTreeSet::new());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("name"), Some(&json!("bob")));
}

#[test]
fn unrepairable_list_is_kept_untouched() {
    let raw = data(json!([{"key": "name"}, {"other": 1}]));
    assert!(repair_pairs(&raw).is_none());
    let decoded = decode_rows(&raw);
    assert!(matches!(decoded[0], RawRow::Mapping(_)));
    assert!(matches!(decoded[1], RawRow::Mapping(_)));
}

#[test]
fn repaired_mapping_can_trigger_hydration() {
    let raw = data(json!([{"key": "v", "value": {"id": 9, "label": "thing"}}]));
    let rows = translate(&raw, &bound(&["v"]));
    assert_eq!(rows[0].as_record().unwrap().binding(), Some("v"));
}

// =============================================================================
// Hydration
// =============================================================================

#[test]
fn bound_row_refreshes_entity() {
    let response = Response::new(
        None,
        ResponseStatus::new(200, ""),
        Some(json!({"data": [
            {"v": {"id": 7, "label": "person", "properties": {"name": ["x"]}}}
        ]})),
        bound(&["v"]),
        "v",
        Map::new(),
    );

    let mut person = GenericEntity::new();
    person.set("email", json!("old@example.com")).unwrap();
    let mut bindings = Bindings::new();
    bindings.insert("v".to_string(), &mut person);
    assert_eq!(response.hydrate(&mut bindings).unwrap(), 1);
    drop(bindings);

    assert_eq!(
        Value::Object(person.fields().clone()),
        json!({"id": 7, "type": null, "label": "person", "name": ["x"]})
    );
}

#[test]
fn one_matching_key_splits_every_bound_key() {
    let raw = data(json!([{
        "a": {"id": 1},
        "b": {"id": 2},
        "extra": {"id": 3}
    }]));
    let rows = translate(&raw, &bound(&["a", "b"]));

    let mut first = GenericEntity::new();
    let mut second = GenericEntity::new();
    let mut bindings = Bindings::new();
    bindings.insert("a".to_string(), &mut first);
    bindings.insert("b".to_string(), &mut second);
    assert_eq!(hydrate(&mut bindings, &rows).unwrap(), 2);
    drop(bindings);

    assert_eq!(rows.len(), 2);
    assert_eq!(first.id(), Some(&json!(1)));
    assert_eq!(second.id(), Some(&json!(2)));
}

#[test]
fn translation_without_entities_does_not_need_them() {
    let raw = data(json!([{"v": {"id": 1}}]));
    let rows = translate(&raw, &bound(&["v"]));
    let mut bindings = Bindings::new();
    assert_eq!(hydrate(&mut bindings, &rows).unwrap(), 0);
    assert_eq!(rows[0].get("id"), Some(&json!(1)));
}

// =============================================================================
// Tracer accounting
// =============================================================================

#[test]
fn tracer_accounts_time_and_count() {
    let tracer = QueryTracer::new();
    for millis in [10, 20, 30] {
        tracer.add("g.V()", Map::new(), "g.V()", Duration::from_millis(millis));
    }
    assert_eq!(tracer.len(), 3);
    assert_eq!(tracer.total_time(), Duration::from_millis(60));

    tracer.reset();
    assert_eq!(tracer.len(), 0);
    assert_eq!(tracer.total_time(), Duration::ZERO);
}
