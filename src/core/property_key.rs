use crate::core::{Value, format_number, value_to_string};

/// A property name. Every key is a string; other primitives are coerced to
/// their canonical string form on the way in (`true` -> "true", `3` -> "3").
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey(String);

impl PropertyKey {
    pub fn new(s: impl Into<String>) -> Self {
        PropertyKey(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey(s)
    }
}

impl From<&String> for PropertyKey {
    fn from(s: &String) -> Self {
        PropertyKey(s.clone())
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(k: &PropertyKey) -> Self {
        k.clone()
    }
}

impl From<bool> for PropertyKey {
    fn from(b: bool) -> Self {
        PropertyKey(b.to_string())
    }
}

impl From<f64> for PropertyKey {
    fn from(n: f64) -> Self {
        PropertyKey(format_number(n))
    }
}

impl From<i64> for PropertyKey {
    fn from(n: i64) -> Self {
        PropertyKey(n.to_string())
    }
}

impl From<i32> for PropertyKey {
    fn from(n: i32) -> Self {
        PropertyKey(n.to_string())
    }
}

impl From<u32> for PropertyKey {
    fn from(n: u32) -> Self {
        PropertyKey(n.to_string())
    }
}

impl From<usize> for PropertyKey {
    fn from(n: usize) -> Self {
        PropertyKey(n.to_string())
    }
}

impl From<&Value> for PropertyKey {
    fn from(v: &Value) -> Self {
        match v {
            Value::String(s) => PropertyKey(s.clone()),
            other => PropertyKey(value_to_string(other)),
        }
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PropertyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for PropertyKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
