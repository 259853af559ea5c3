pub(crate) mod copy;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod iterator;
pub(crate) mod json;

pub use self::core::{
    ArrayHandle, Enumerator, Getter, IntegrityLevel, Mode, NativeFunction, PlainMapping, PropertyDescriptor, PropertyKey, PropertyStore,
    Setter, Slot, SlotKind, StoreHandle, Value, format_number, getter, new_array_ptr, new_store_ptr, setter, validate_descriptor_for_define,
    value_to_string, values_equal,
};
pub use error::{StoreError, StoreErrorData, StoreErrorKind};
pub use iterator::{Iterable, IteratorResult, RandomValues, StoreIterator, iterate, iterate_value, random_values};
pub use json::{from_json, from_json_str, parse_store, store_to_json, store_to_json_string, to_json, to_json_string, to_json_string_pretty};
pub use copy::{CyclePolicy, assign, deep_copy, deep_copy_value, shallow_copy};
