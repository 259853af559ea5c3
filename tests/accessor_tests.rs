use propstore::{IntegrityLevel, Mode, PropertyStore, StoreErrorKind, Value, getter, setter};
use std::cell::Cell;
use std::rc::Rc;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn doubled(v: &Value) -> Value {
    Value::Number(v.as_number().unwrap_or(f64::NAN) * 2.0)
}

#[test]
fn getter_reads_through_owning_store() {
    let mut store = PropertyStore::new();
    store.define_accessor("a", Some(getter(|_| Value::Number(2.0))), None, true, true).unwrap();
    store
        .define_accessor("b", Some(getter(|this| doubled(&this.get("a")))), None, true, true)
        .unwrap();

    assert_eq!(store.get("a"), Value::Number(2.0));
    assert_eq!(store.get("b"), Value::Number(4.0));
}

#[test]
fn setter_writes_backing_slot() {
    let mut store = PropertyStore::new();
    store
        .define_accessor(
            "a",
            Some(getter(|this| this.get("_a_"))),
            Some(setter(|this, v| this.set("_a_", doubled(&v)))),
            true,
            true,
        )
        .unwrap();

    assert_eq!(store.get("a"), Value::Undefined);
    store.set("a", 2).unwrap();
    assert_eq!(store.get("a"), Value::Number(4.0));
    assert_eq!(store.get("_a_"), Value::Number(4.0));
}

#[test]
fn write_to_getter_only_accessor_is_ignored_when_permissive() {
    let mut store = PropertyStore::new();
    store.define_accessor("a", Some(getter(|_| Value::Number(2.0))), None, true, true).unwrap();
    store.set("a", 3).unwrap();
    assert_eq!(store.get("a"), Value::Number(2.0));
}

#[test]
fn write_to_getter_only_accessor_throws_when_strict() {
    let mut store = PropertyStore::strict();
    store.define_accessor("r", Some(getter(|_| Value::Number(1.0))), None, true, true).unwrap();
    let err = store.set("r", 2).unwrap_err();
    match err.kind() {
        StoreErrorKind::ReadOnlyError { .. } => (),
        other => panic!("Expected ReadOnlyError for assignment to read-only accessor, got {:?}", other),
    }
}

#[test]
fn read_write_only_accessor_returns_undefined() {
    let mut store = PropertyStore::new();
    store
        .define_accessor("r", None, Some(setter(|this, v| this.set("_r", v))), true, true)
        .unwrap();
    store.set("r", 5).unwrap();
    assert_eq!(store.get("r"), Value::Undefined);
    assert_eq!(store.get("_r"), Value::Number(5.0));
}

#[test]
fn setter_errors_propagate() {
    let mut store = PropertyStore::strict();
    store.define("_locked", 0, false, false, false).unwrap();
    store
        .define_accessor("locked", None, Some(setter(|this, v| this.set("_locked", v))), true, true)
        .unwrap();
    let err = store.set("locked", 1).unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::ReadOnlyError { key } if key == "_locked"));
}

#[test]
fn accessor_descriptor_reports_presence_of_functions() {
    let mut store = PropertyStore::new();
    store.define_accessor("a", Some(getter(|_| Value::Null)), None, false, true).unwrap();
    let desc = store.get_own_property_descriptor("a").unwrap();
    assert!(desc.get.is_some());
    assert!(desc.set.is_none());
    assert!(desc.value.is_none());
    assert_eq!(desc.enumerable, Some(false));
    assert!(store.slot("a").unwrap().is_accessor());
    assert!(!store.slot("a").unwrap().is_writable());
}

#[test]
fn non_configurable_accessor_keeps_its_functions() {
    let mut store = PropertyStore::new();
    let get = getter(|_| Value::Number(1.0));
    store.define_accessor("a", Some(get.clone()), None, true, false).unwrap();

    // the same function is not a change
    store.define_accessor("a", Some(get), None, true, false).unwrap();
    assert!(store.define_accessor("a", Some(getter(|_| Value::Number(2.0))), None, true, false).is_err());
    assert!(store.define("a", 1, true, true, false).is_err());
    assert_eq!(store.get("a"), Value::Number(1.0));
}

#[test]
fn configurable_accessor_converts_to_data() {
    let mut store = PropertyStore::new();
    store.define_accessor("a", Some(getter(|_| Value::Number(1.0))), None, true, true).unwrap();
    store.define("a", 9, true, true, true).unwrap();
    assert!(!store.slot("a").unwrap().is_accessor());
    assert_eq!(store.get("a"), Value::Number(9.0));
}

fn cell_backed_store(mode: Mode) -> (PropertyStore, Rc<Cell<f64>>) {
    let cell = Rc::new(Cell::new(1.0));
    let (read, write) = (cell.clone(), cell.clone());
    let mut store = PropertyStore::with_mode(mode);
    store
        .define_accessor(
            "x",
            Some(getter(move |_| Value::Number(read.get()))),
            Some(setter(move |_, v| {
                write.set(v.as_number().unwrap_or(f64::NAN));
                Ok(())
            })),
            true,
            true,
        )
        .unwrap();
    (store, cell)
}

#[test]
fn frozen_accessor_ignores_writes_when_permissive() {
    let (mut store, cell) = cell_backed_store(Mode::Permissive);
    store.set("x", 5.0).unwrap();
    assert_eq!(store.get("x"), Value::Number(5.0));

    store.freeze();
    assert!(store.is_frozen());
    assert!(!store.slot("x").unwrap().is_writable());
    let before = store.get("x");
    store.set("x", 2.0).unwrap();
    assert_eq!(store.get("x"), before);
    assert_eq!(cell.get(), 5.0);
}

#[test]
fn frozen_accessor_write_fails_when_strict() {
    let (mut store, cell) = cell_backed_store(Mode::Strict);
    store.freeze();
    let err = store.set("x", 2.0).unwrap_err();
    assert!(matches!(err.kind(), StoreErrorKind::ReadOnlyError { key } if key == "x"));
    assert_eq!(store.get("x"), Value::Number(1.0));
    assert_eq!(cell.get(), 1.0);
}

#[test]
fn sealed_accessor_with_setter_is_not_frozen() {
    let (mut store, _) = cell_backed_store(Mode::Permissive);
    store.seal();
    assert!(!store.is_frozen());
    assert_eq!(store.integrity_level(), IntegrityLevel::Sealed);
    store.set("x", 3.0).unwrap();
    assert_eq!(store.get("x"), Value::Number(3.0));
}
