use crate::core::{PlainMapping, PropertyStore, Value, new_array_ptr, new_store_ptr};
use crate::{StoreError, StoreErrorKind, make_store_error, raise_cyclic_structure_error};
use std::collections::HashSet;

/// JSON projection of a value. Inside stores, undefined and function values
/// are skipped; inside arrays they become `null`, as do non-finite numbers.
/// A non-serializable top-level value projects to `null`.
pub fn to_json(value: &Value) -> Result<serde_json::Value, StoreError> {
    let mut encoder = JsonEncoder::default();
    Ok(encoder.encode(value)?.unwrap_or(serde_json::Value::Null))
}

pub fn to_json_string(value: &Value) -> Result<String, StoreError> {
    let json = to_json(value)?;
    let text = serde_json::to_string(&json)?;
    log::debug!("to_json_string produced: {}", text);
    Ok(text)
}

pub fn to_json_string_pretty(value: &Value) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&to_json(value)?)?)
}

/// JSON projection of the enumerable own slots of `store`.
pub fn store_to_json(store: &PropertyStore) -> Result<serde_json::Value, StoreError> {
    let mut encoder = JsonEncoder::default();
    encoder.encode_store(store)
}

pub fn store_to_json_string(store: &PropertyStore) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&store_to_json(store)?)?)
}

/// Objects become stores with default slots in document order, arrays become
/// arrays.
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(new_array_ptr(items.into_iter().map(from_json).collect())),
        serde_json::Value::Object(map) => {
            let mapping: PlainMapping = map.into_iter().map(|(k, v)| (k, from_json(v))).collect();
            Value::Object(new_store_ptr(PropertyStore::from_plain_mapping(mapping)))
        }
    }
}

pub fn from_json_str(text: &str) -> Result<Value, StoreError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json(json))
}

/// Parse a JSON object into a store; other top-level JSON values are an error.
pub fn parse_store(text: &str) -> Result<PropertyStore, StoreError> {
    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Object(map) => {
            let mapping: PlainMapping = map.into_iter().map(|(k, v)| (k, from_json(v))).collect();
            Ok(PropertyStore::from_plain_mapping(mapping))
        }
        other => Err(make_store_error!(StoreErrorKind::JsonError {
            message: format!("expected a JSON object, found {}", json_type_name(&other)),
        })),
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[derive(Default)]
struct JsonEncoder {
    // Stores and arrays on the current path
    active: HashSet<usize>,
    path: Vec<String>,
}

impl JsonEncoder {
    fn enter(&mut self, addr: usize) -> Result<(), StoreError> {
        if !self.active.insert(addr) {
            let path = if self.path.is_empty() { "<root>".to_string() } else { self.path.join(".") };
            return Err(raise_cyclic_structure_error!(path));
        }
        Ok(())
    }

    fn encode(&mut self, value: &Value) -> Result<Option<serde_json::Value>, StoreError> {
        let json = match value {
            Value::Undefined | Value::Function(_) => return Ok(None),
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Object(store) => self.encode_store(&store.borrow())?,
            Value::Array(array) => {
                let addr = array.as_ptr() as usize;
                self.enter(addr)?;
                let items = array.borrow().clone();
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    self.path.push(index.to_string());
                    let encoded = self.encode(item);
                    self.path.pop();
                    // Undefined, Function in array -> null
                    out.push(encoded?.unwrap_or(serde_json::Value::Null));
                }
                self.active.remove(&addr);
                serde_json::Value::Array(out)
            }
        };
        Ok(Some(json))
    }

    fn encode_store(&mut self, store: &PropertyStore) -> Result<serde_json::Value, StoreError> {
        let addr = store as *const PropertyStore as usize;
        self.enter(addr)?;
        let mut map = serde_json::Map::new();
        for (key, value) in store.to_plain_mapping() {
            self.path.push(key.clone());
            let encoded = self.encode(&value);
            self.path.pop();
            // If None (undefined, function), skip property
            if let Some(json) = encoded? {
                map.insert(key, json);
            }
        }
        self.active.remove(&addr);
        Ok(serde_json::Value::Object(map))
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n == n.trunc() && n.abs() < 9.007_199_254_740_992e15 {
        serde_json::Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
    }
}
