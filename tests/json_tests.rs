use propstore::{
    NativeFunction, PlainMapping, PropertyStore, StoreErrorKind, Value, from_json_str, new_array_ptr, new_store_ptr, parse_store,
    store_to_json, store_to_json_string, to_json, to_json_string,
};
use serde_json::json;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

#[test]
fn plain_mapping_holds_enumerable_values_in_order() {
    let mut store = PropertyStore::new();
    store.set("z", 1).unwrap();
    store.define("hidden", 2, true, false, true).unwrap();
    store.set("a", "two").unwrap();

    let mapping = store.to_plain_mapping();
    let keys: Vec<&str> = mapping.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "a"]);
    assert_eq!(mapping["a"], Value::from("two"));
}

#[test]
fn from_plain_mapping_builds_default_slots() {
    let mut mapping = PlainMapping::new();
    mapping.insert("b".to_string(), Value::from(1));
    mapping.insert("a".to_string(), Value::Null);
    let store = PropertyStore::from_plain_mapping(mapping);

    let keys: Vec<String> = store.keys().into_iter().map(|k| k.into_string()).collect();
    assert_eq!(keys, vec!["b", "a"]);
    let slot = store.slot("a").unwrap();
    assert!(slot.is_writable() && slot.enumerable && slot.configurable);
}

#[test]
fn extend_from_plain_mapping_is_all_or_nothing() {
    let mut store = PropertyStore::strict();
    store.define("locked", 0, false, true, false).unwrap();
    let mut mapping = PlainMapping::new();
    mapping.insert("open".to_string(), Value::from(1));
    mapping.insert("locked".to_string(), Value::from(1));
    let err = store.extend_from_plain_mapping(mapping).unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::DescriptorError { key, .. } if key == "locked"));
    assert!(!store.has("open"));
    assert_eq!(store.get("locked"), Value::Number(0.0));

    let mut mapping = PlainMapping::new();
    mapping.insert("open".to_string(), Value::from(1));
    mapping.insert("other".to_string(), Value::from(2));
    store.extend_from_plain_mapping(mapping).unwrap();
    let keys: Vec<String> = store.own_keys().into_iter().map(|k| k.into_string()).collect();
    assert_eq!(keys, vec!["locked", "open", "other"]);
    assert!(store.slot("other").unwrap().configurable);
}

#[test]
fn store_serializes_to_json_object() {
    let nested = new_store_ptr(PropertyStore::new());
    nested.borrow_mut().set("ok", true).unwrap();

    let mut store = PropertyStore::new();
    store.set("name", "widget").unwrap();
    store.set("count", 3).unwrap();
    store.set("ratio", 0.5).unwrap();
    store.set("nested", Value::Object(nested)).unwrap();
    store.set("list", vec![Value::from(1), Value::Undefined, Value::from(f64::NAN)]).unwrap();
    store.set("missing", Value::Undefined).unwrap();
    store.set("callback", NativeFunction::new("callback", |_| Value::Null)).unwrap();
    store.define("hidden", 1, true, false, true).unwrap();

    let json = store_to_json(&store).unwrap();
    assert_eq!(
        json,
        json!({
            "name": "widget",
            "count": 3,
            "ratio": 0.5,
            "nested": { "ok": true },
            "list": [1, null, null]
        })
    );
    assert_eq!(
        store_to_json_string(&store).unwrap(),
        r#"{"name":"widget","count":3,"ratio":0.5,"nested":{"ok":true},"list":[1,null,null]}"#
    );
}

#[test]
fn top_level_values_project_to_json() {
    assert_eq!(to_json(&Value::Undefined).unwrap(), serde_json::Value::Null);
    assert_eq!(to_json(&Value::from(f64::INFINITY)).unwrap(), serde_json::Value::Null);
    assert_eq!(to_json(&Value::from(-2)).unwrap(), json!(-2));
    assert_eq!(to_json_string(&Value::from("q\"uote")).unwrap(), r#""q\"uote""#);
}

#[test]
fn cyclic_store_cannot_be_serialized() {
    let node = new_store_ptr(PropertyStore::new());
    node.borrow_mut().set("self", Value::Object(node.clone())).unwrap();
    let err = to_json(&Value::Object(node)).unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::CyclicStructureError { path } if path == "self"));

    let array = new_array_ptr(Vec::new());
    array.borrow_mut().push(Value::Array(array.clone()));
    assert!(to_json(&Value::Array(array)).is_err());
}

#[test]
fn shared_but_acyclic_references_serialize_twice() {
    let shared = new_store_ptr(PropertyStore::new());
    shared.borrow_mut().set("v", 1).unwrap();
    let mut store = PropertyStore::new();
    store.set("left", Value::Object(shared.clone())).unwrap();
    store.set("right", Value::Object(shared)).unwrap();
    assert_eq!(store_to_json(&store).unwrap(), json!({ "left": { "v": 1 }, "right": { "v": 1 } }));
}

#[test]
fn parse_store_keeps_document_order() {
    let store = parse_store(r#"{"b": 1, "a": [true, null], "c": {"d": "e"}}"#).unwrap();
    let keys: Vec<String> = store.keys().into_iter().map(|k| k.into_string()).collect();
    assert_eq!(keys, vec!["b", "a", "c"]);
    assert_eq!(store.get("b"), Value::Number(1.0));

    let list = store.get("a");
    let items = list.as_array().unwrap().borrow();
    assert_eq!(items.as_slice(), &[Value::Boolean(true), Value::Null]);

    let c = store.get("c");
    assert_eq!(c.as_object().unwrap().borrow().get("d"), Value::from("e"));

    assert_eq!(store_to_json_string(&store).unwrap(), r#"{"b":1,"a":[true,null],"c":{"d":"e"}}"#);
}

#[test]
fn parse_store_rejects_non_objects_and_bad_input() {
    let err = parse_store("[1, 2]").unwrap_err();
    match err.kind() {
        StoreErrorKind::JsonError { message } => assert_eq!(message, "expected a JSON object, found array"),
        other => panic!("Expected JsonError, got {:?}", other),
    }
    let err = parse_store("{not json").unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::JsonError { .. }));
}

#[test]
fn from_json_str_accepts_any_value() {
    assert_eq!(from_json_str("12.5").unwrap(), Value::Number(12.5));
    assert_eq!(from_json_str("\"s\"").unwrap(), Value::from("s"));
    assert_eq!(from_json_str("null").unwrap(), Value::Null);
    assert!(from_json_str("{\"a\": 1}").unwrap().as_object().is_some());
}
