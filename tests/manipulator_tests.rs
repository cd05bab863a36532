use pathwright::{get_value, set_value, MapperError, MAX_ARRAY_INDEX};
use serde_json::{json, Value};
use yare::parameterized;

fn people() -> Value {
    json!({
        "people": [
            {"name": "Ada", "langs": [{"name": "en"}, {"name": "fr"}]},
            {"name": "Linus", "langs": [{"name": "fi"}]},
            {"name": "Grace"}
        ],
        "meta": {"count": 3, "empty": null}
    })
}

#[parameterized(
    root = { "", Some(people()) },
    nested_key = { "meta.count", Some(json!(3)) },
    explicit_null = { "meta.empty", Some(Value::Null) },
    missing_key = { "meta.missing", None },
    missing_parent = { "nope.at.all", None },
    through_null = { "meta.empty.deeper", None },
    distribute = { "people[].name", Some(json!(["Ada", "Linus", "Grace"])) },
    key_on_array = { "people.name", Some(json!(["Ada", "Linus", "Grace"])) },
    indexed = { "people[1].name", Some(json!("Linus")) },
    out_of_bounds = { "people[9].name", None },
    nested_distribution = { "people[].langs[].name", Some(json!([["en", "fr"], ["fi"], null])) },
    indexed_then_distribute = { "people[0].langs[].name", Some(json!(["en", "fr"])) },
    partial_values = { "people[].langs", Some(json!([[{"name": "en"}, {"name": "fr"}], [{"name": "fi"}], null])) },
    all_missing = { "people[].age", None },
)]
fn test_get_value(path: &str, expected: Option<Value>) {
    assert_eq!(get_value(&people(), path).unwrap(), expected);
}

#[parameterized(
    bare_distribution = { json!([{"x": 1}, {"y": 2}, {"x": 3}]), "[].x", Some(json!([1, null, 3])) },
    bare_index = { json!(["a", "b", "c"]), "[1]", Some(json!("b")) },
    bare_whole = { json!(["a", "b"]), "[]", Some(json!(["a", "b"])) },
    empty_objects = { json!({"a": [{}, {}]}), "a[].b", None },
    empty_array = { json!({"a": []}), "a[]", None },
    deep_all_missing = { json!({"a": [{"b": [{}, {}]}, {"b": []}]}), "a[].b[].c", None },
    null_source = { Value::Null, "a.b", None },
    scalar_source = { json!(42), "a", None },
    quoted_key = { json!({"complex.key": {"v": 1}}), "\"complex.key\".v", Some(json!(1)) },
)]
fn test_get_value_shapes(source: Value, path: &str, expected: Option<Value>) {
    assert_eq!(get_value(&source, path).unwrap(), expected);
}

#[test]
fn test_get_value_malformed_path() {
    let err = get_value(&people(), "people[").unwrap_err();
    assert!(matches!(err, MapperError::MalformedPath { .. }));
}

#[allow(clippy::approx_constant)] // Since we use 3.14 as a test value
#[parameterized(
    simple_key = { Value::Null, "key", json!("value"), json!({"key": "value"}) },
    nested_keys = { Value::Null, "parent.child", json!("value"), json!({"parent": {"child": "value"}}) },
    array_index = { Value::Null, "array[0]", json!(1), json!({"array": [1]}) },
    complex_path = { Value::Null, "foo[1].bar[2]", json!("value"), json!({"foo": [null, {"bar": [null, null, "value"]}]}) },
    array_of_objects = { Value::Null, "items[0].name", json!("Item1"), json!({"items": [{"name": "Item1"}]}) },
    float_value = { Value::Null, "pi", json!(3.14), json!({"pi": 3.14}) },
    quoted_key = { Value::Null, "\"complex.key\"", json!(123), json!({"complex.key": 123}) },
    sparse_bare = { Value::Null, "[1]", json!("bar"), json!([null, "bar"]) },
    null_skipped = { json!({}), "bar", Value::Null, json!({}) },
    null_nullable = { json!({}), "bar?", Value::Null, json!({"bar": null}) },
    distribute = { Value::Null, "x[].y", json!([1, 2]), json!({"x": [{"y": 1}, {"y": 2}]}) },
    distribute_with_gap = { Value::Null, "a[].b", json!([1, null, 3]), json!({"a": [{"b": 1}, {}, {"b": 3}]}) },
    distribute_nullable = { Value::Null, "a[].b?", json!([1, null]), json!({"a": [{"b": 1}, {"b": null}]}) },
    bare_distribute = { Value::Null, "[].x", json!([1, 2]), json!([{"x": 1}, {"x": 2}]) },
    bare_distribute_with_gap = { Value::Null, "[].x", json!([1, null, 3]), json!([{"x": 1}, null, {"x": 3}]) },
    nested_distribution = {
        Value::Null, "one[].two[].v", json!([["A", "B"], ["C"]]),
        json!({"one": [{"two": [{"v": "A"}, {"v": "B"}]}, {"two": [{"v": "C"}]}]})
    },
    into_existing = {
        json!({"a": [{"b": 1}, {"b": 2}]}), "a[].c", json!(["x", "y"]),
        json!({"a": [{"b": 1, "c": "x"}, {"b": 2, "c": "y"}]})
    },
    overwrite_index = { json!({"a": [1, 2, 3]}), "a[1]", json!(9), json!({"a": [1, 9, 3]}) },
    replace_whole_array = { json!({"a": [1, 2, 3]}), "a[]", json!([4]), json!({"a": [4]}) },
    array_into_slot = { Value::Null, "a[0]", json!([1, 2]), json!({"a": [[1, 2]]}) },
    bare_replace = { Value::Null, "[]", json!(["a", "b"]), json!(["a", "b"]) },
    append_terminal = { json!({"a": [1]}), "a[]+", json!(2), json!({"a": [1, 2]}) },
    append_array = { json!({"a": [1]}), "a[]+", json!([2, 3]), json!({"a": [1, [2, 3]]}) },
    append_nested = { json!({"a": [{"b": 1}]}), "a[]+.b", json!(2), json!({"a": [{"b": 1}, {"b": 2}]}) },
    root_replace = { json!({"a": 1}), "", json!({"b": 2}), json!({"b": 2}) },
    root_null = { json!({"a": 1}), "", Value::Null, json!({"a": 1}) },
    merge_keys = { json!({"a": {"b": 1}}), "a.c", json!(2), json!({"a": {"b": 1, "c": 2}}) },
    scalar_kept = { json!({"a": 5}), "a.b", json!(1), json!({"a": 5}) },
    scalar_elements_kept = { json!([{"a": 1}, 3]), "[].b", json!([2, 4]), json!([{"a": 1, "b": 2}, 3]) },
)]
fn test_set_value(destination: Value, path: &str, value: Value, expected: Value) {
    let result = set_value(destination, path, &value).expect("Failed to set value");

    assert_eq!(result, expected);
}

#[test]
fn test_set_value_appends_on_each_call() {
    let once = set_value(Value::Null, "a[]+", &json!(1)).unwrap();
    let twice = set_value(once, "a[]+", &json!(2)).unwrap();

    assert_eq!(twice, json!({"a": [1, 2]}));
}

#[parameterized(
    usize_max = { "a[18446744073709551615]" },
    bare_usize_max = { "[18446744073709551615].b" },
    very_large = { "a[100000000000]" },
    just_above_bound = { "[1048577]" },
)]
fn test_oversized_index_is_rejected(path: &str) {
    let set = set_value(Value::Null, path, &json!("x"));
    let get = get_value(&json!({"a": ["x"]}), path);

    assert!(matches!(set, Err(MapperError::MalformedPath { .. })));
    assert!(matches!(get, Err(MapperError::MalformedPath { .. })));
}

#[test]
fn test_set_value_at_index_bound() {
    let path = format!("a[{}]", MAX_ARRAY_INDEX);
    let result = set_value(Value::Null, &path, &json!("x")).unwrap();

    let items = result["a"].as_array().unwrap();
    assert_eq!(items.len(), MAX_ARRAY_INDEX + 1);
    assert_eq!(items[MAX_ARRAY_INDEX], json!("x"));
    assert!(items[..MAX_ARRAY_INDEX].iter().all(Value::is_null));
}

#[test]
fn test_set_value_malformed_path() {
    let err = set_value(Value::Null, "a]", &json!(1)).unwrap_err();
    assert!(matches!(err, MapperError::MalformedPath { .. }));
}

#[parameterized(
    single_key = { "key", json!("value") },
    nested = { "a.b.c", json!({"d": [1, 2]}) },
    number = { "count", json!(0) },
    boolean = { "flags.on", json!(false) },
    array = { "list", json!([1, "two", null]) },
)]
fn test_set_then_get_round_trip(path: &str, value: Value) {
    let destination = set_value(json!({}), path, &value).unwrap();

    assert_eq!(get_value(&destination, path).unwrap(), Some(value));
}
