use crate::core::{ArrayHandle, PropertyKey, StoreHandle, Value};
use std::iter::FusedIterator;

/// One step of the iterator protocol.
#[derive(Clone, Debug, PartialEq)]
pub struct IteratorResult {
    pub value: Value,
    pub done: bool,
}

impl IteratorResult {
    fn yielded(value: Value) -> Self {
        IteratorResult { value, done: false }
    }

    fn done() -> Self {
        IteratorResult {
            value: Value::Undefined,
            done: true,
        }
    }
}

enum Cursor {
    Keys {
        store: StoreHandle,
        keys: Vec<PropertyKey>,
        position: usize,
    },
    Array {
        array: ArrayHandle,
        position: usize,
    },
    Custom(Box<dyn Iterator<Item = Value>>),
    Done,
}

/// Stateful cursor produced by [`Iterable::iterate`].
///
/// Once exhausted it keeps reporting `done` and never errors. A cursor over a
/// custom enumerator ends only when the enumerator does; bound unbounded
/// sequences on the consumer side, e.g. with [`Iterator::take`].
pub struct StoreIterator {
    cursor: Cursor,
}

impl StoreIterator {
    /// Advance one step, returning the value and whether the sequence is done.
    pub fn next_result(&mut self) -> IteratorResult {
        let result = match &mut self.cursor {
            Cursor::Keys { store, keys, position } => match keys.get(*position) {
                Some(key) => {
                    *position += 1;
                    // Values are read at step time; a key deleted since the
                    // snapshot reads as undefined.
                    let value = store.borrow().get(key);
                    log::trace!("iterator step: key={} position={}", key, position);
                    Some(value)
                }
                None => None,
            },
            Cursor::Array { array, position } => {
                let item = array.borrow().get(*position).cloned();
                if item.is_some() {
                    *position += 1;
                }
                item
            }
            Cursor::Custom(values) => values.next(),
            Cursor::Done => None,
        };
        match result {
            Some(value) => IteratorResult::yielded(value),
            None => {
                self.cursor = Cursor::Done;
                IteratorResult::done()
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.cursor, Cursor::Done)
    }
}

impl Iterator for StoreIterator {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let IteratorResult { value, done } = self.next_result();
        (!done).then_some(value)
    }
}

impl FusedIterator for StoreIterator {}

impl std::fmt::Debug for StoreIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cursor {
            Cursor::Keys { keys, position, .. } => f
                .debug_struct("StoreIterator")
                .field("keys", keys)
                .field("position", position)
                .finish(),
            Cursor::Array { position, .. } => f.debug_struct("StoreIterator").field("position", position).finish(),
            Cursor::Custom(_) => write!(f, "StoreIterator(custom)"),
            Cursor::Done => write!(f, "StoreIterator(done)"),
        }
    }
}

pub trait Iterable {
    /// Start a fresh iteration. Each call restarts from the beginning.
    fn iterate(&self) -> StoreIterator;
}

impl Iterable for StoreHandle {
    /// Iterates the values of the enumerable keys captured now, unless the
    /// store has a custom enumerator, which then fully replaces it.
    fn iterate(&self) -> StoreIterator {
        let store = self.borrow();
        let cursor = match store.enumerator() {
            Some(enumerator) => {
                let enumerator = enumerator.clone();
                Cursor::Custom(enumerator(&*store))
            }
            None => Cursor::Keys {
                store: self.clone(),
                keys: store.keys(),
                position: 0,
            },
        };
        StoreIterator { cursor }
    }
}

impl Iterable for ArrayHandle {
    /// Array iteration reads the live length at every step.
    fn iterate(&self) -> StoreIterator {
        StoreIterator {
            cursor: Cursor::Array {
                array: self.clone(),
                position: 0,
            },
        }
    }
}

pub fn iterate(store: &StoreHandle) -> StoreIterator {
    store.iterate()
}

/// Iterate any iterable value; primitives and functions are not iterable.
pub fn iterate_value(value: &Value) -> Option<StoreIterator> {
    match value {
        Value::Object(store) => Some(store.iterate()),
        Value::Array(array) => Some(array.iterate()),
        _ => None,
    }
}

/// Unbounded sequence of pseudo-random numbers in `[0, 1)`.
#[derive(Clone, Debug)]
pub struct RandomValues {
    state: u64,
}

impl Iterator for RandomValues {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        // Simple linear congruential generator
        let a = 1664525u64;
        let c = 1013904223u64;
        let m = 2u64.pow(32);
        self.state = (self.state.wrapping_mul(a).wrapping_add(c)) % m;
        Some(Value::Number(self.state as f64 / m as f64))
    }
}

/// Never signals the end; `None` seeds from the clock.
pub fn random_values(seed: Option<u64>) -> RandomValues {
    let state = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0)
    });
    RandomValues { state }
}
