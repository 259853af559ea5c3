use crate::core::PropertyStore;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a store. Cloning the handle aliases the store; the store
/// lives as long as the last handle.
pub type StoreHandle = Rc<RefCell<PropertyStore>>;

/// Shared handle to an array of values.
pub type ArrayHandle = Rc<RefCell<Vec<Value>>>;

#[inline]
pub fn new_store_ptr(store: PropertyStore) -> StoreHandle {
    Rc::new(RefCell::new(store))
}

#[inline]
pub fn new_array_ptr(items: Vec<Value>) -> ArrayHandle {
    Rc::new(RefCell::new(items))
}

/// A host function stored as a property value. Functions are plain values:
/// they are not owned by the store that references them.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    func: Rc<dyn Fn(&[Value]) -> Value>,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, func: impl Fn(&[Value]) -> Value + 'static) -> Self {
        NativeFunction {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    pub fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Function: {}]", self.name)
    }
}

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Object(StoreHandle),
    Array(ArrayHandle),
    Function(NativeFunction),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&StoreHandle> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayHandle> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn to_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !(n.is_nan() || *n == 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Array(_) | Value::Function(_) => true,
        }
    }

    /// The `typeof` classification. `null` reports "object".
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) | Value::Array(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Handles print by identity; their contents may be cyclic.
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Object(obj) => write!(f, "Object({:p})", Rc::as_ptr(obj)),
            Value::Array(arr) => write!(f, "Array({:p})", Rc::as_ptr(arr)),
            Value::Function(func) => write!(f, "{func:?}"),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", value_to_string(self))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<StoreHandle> for Value {
    fn from(obj: StoreHandle) -> Self {
        Value::Object(obj)
    }
}

impl From<&StoreHandle> for Value {
    fn from(obj: &StoreHandle) -> Self {
        Value::Object(obj.clone())
    }
}

impl From<ArrayHandle> for Value {
    fn from(arr: ArrayHandle) -> Self {
        Value::Array(arr)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(new_array_ptr(items))
    }
}

impl From<NativeFunction> for Value {
    fn from(func: NativeFunction) -> Self {
        Value::Function(func)
    }
}

/// SameValue: NaN equals NaN, handles compare by identity.
pub fn values_equal(v1: &Value, v2: &Value) -> bool {
    match (v1, v2) {
        (Value::Number(n1), Value::Number(n2)) => {
            if n1.is_nan() && n2.is_nan() {
                true
            } else {
                n1 == n2 && n1.is_sign_negative() == n2.is_sign_negative()
            }
        }
        (Value::String(s1), Value::String(s2)) => s1 == s2,
        (Value::Boolean(b1), Value::Boolean(b2)) => b1 == b2,
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Object(o1), Value::Object(o2)) => Rc::ptr_eq(o1, o2),
        (Value::Array(a1), Value::Array(a2)) => Rc::ptr_eq(a1, a2),
        (Value::Function(f1), Value::Function(f2)) => f1.ptr_eq(f2),
        _ => false,
    }
}

pub fn value_to_string(val: &Value) -> String {
    let mut seen = Vec::new();
    value_to_string_inner(val, &mut seen)
}

fn value_to_string_inner(val: &Value, seen: &mut Vec<*const RefCell<Vec<Value>>>) -> String {
    match val {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Array(arr) => {
            // A self-containing array renders the inner reference as empty
            let ptr = Rc::as_ptr(arr);
            if seen.contains(&ptr) {
                return String::new();
            }
            seen.push(ptr);
            let parts: Vec<String> = arr
                .borrow()
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => value_to_string_inner(other, seen),
                })
                .collect();
            seen.pop();
            parts.join(",")
        }
        Value::Function(func) => format!("function {}() {{ [native code] }}", func.name),
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n.is_sign_negative() { "-Infinity" } else { "Infinity" }.to_string();
    }
    // ToString(-0) is "0"
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let precision = if abs >= 1e21 { 16 } else { 15 };
        let s = format!("{:.*e}", precision, n);
        if let Some((mant, exp)) = s.split_once('e') {
            let mant = mant.trim_end_matches('0').trim_end_matches('.');
            if let Ok(exp_int) = exp.parse::<i32>() {
                return format!("{}e{:+}", mant, exp_int);
            }
        }
        return s;
    }

    let mut s = format!("{}", n);
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    s
}
