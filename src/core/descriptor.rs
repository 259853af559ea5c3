use crate::core::{PropertyKey, PropertyStore, Value};
use crate::{StoreError, raise_descriptor_error};
use std::rc::Rc;

/// Getter of an accessor slot. Receives the store that owns the slot.
pub type Getter = Rc<dyn Fn(&PropertyStore) -> Value>;

/// Setter of an accessor slot. Receives the store that owns the slot.
pub type Setter = Rc<dyn Fn(&mut PropertyStore, Value) -> Result<(), StoreError>>;

pub fn getter(f: impl Fn(&PropertyStore) -> Value + 'static) -> Getter {
    Rc::new(f)
}

pub fn setter(f: impl Fn(&mut PropertyStore, Value) -> Result<(), StoreError> + 'static) -> Setter {
    Rc::new(f)
}

#[derive(Clone)]
pub enum SlotKind {
    Data { value: Value, writable: bool },
    Accessor { getter: Option<Getter>, setter: Option<Setter> },
}

/// A named storage location and the descriptor controlling it.
#[derive(Clone)]
pub struct Slot {
    pub kind: SlotKind,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Slot {
    pub fn new_data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Slot {
            kind: SlotKind::Data { value, writable },
            enumerable,
            configurable,
        }
    }

    /// Slot created by a plain assignment: writable, enumerable and configurable.
    pub fn new_default(value: Value) -> Self {
        Slot::new_data(value, true, true, true)
    }

    pub fn new_accessor(getter: Option<Getter>, setter: Option<Setter>, enumerable: bool, configurable: bool) -> Self {
        Slot {
            kind: SlotKind::Accessor { getter, setter },
            enumerable,
            configurable,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, SlotKind::Accessor { .. })
    }

    /// For accessor slots, "writable" means "has a setter".
    pub fn is_writable(&self) -> bool {
        match &self.kind {
            SlotKind::Data { writable, .. } => *writable,
            SlotKind::Accessor { setter, .. } => setter.is_some(),
        }
    }

    pub fn to_descriptor(&self) -> PropertyDescriptor {
        match &self.kind {
            SlotKind::Data { value, writable } => PropertyDescriptor::new_data(value.clone(), *writable, self.enumerable, self.configurable),
            SlotKind::Accessor { getter, setter } => {
                PropertyDescriptor::new_accessor(getter.clone(), setter.clone(), self.enumerable, self.configurable)
            }
        }
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("Slot");
        match &self.kind {
            SlotKind::Data { value, writable } => {
                d.field("value", value).field("writable", writable);
            }
            SlotKind::Accessor { getter, setter } => {
                d.field("get", &getter.is_some()).field("set", &setter.is_some());
            }
        }
        d.field("enumerable", &self.enumerable).field("configurable", &self.configurable).finish()
    }
}

/// A property descriptor as accepted by `define_property`.
/// Fields are optional to support "partial" descriptors: missing fields keep
/// the current attribute of an existing slot, or default to `false` /
/// `Undefined` for a new one.
#[derive(Clone, Default)]
pub struct PropertyDescriptor {
    // Data fields
    pub value: Option<Value>,
    pub writable: Option<bool>,
    // Accessor fields
    pub get: Option<Getter>,
    pub set: Option<Setter>,
    // Common flags
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Construct a full data descriptor from explicit values
    pub fn new_data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor {
            value: Some(value),
            writable: Some(writable),
            get: None,
            set: None,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// Construct an accessor descriptor
    pub fn new_accessor(get: Option<Getter>, set: Option<Setter>, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor {
            value: None,
            writable: None,
            get,
            set,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Neither data nor accessor fields: only flags are touched.
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// Read a descriptor out of a store shaped like
    /// `{ value, writable, enumerable, configurable }`. Fields are taken by
    /// truthiness; absent fields stay `None`.
    pub fn from_object(obj: &PropertyStore) -> Self {
        let flag = |name: &str| obj.has(name).then(|| obj.get(name).to_truthy());
        PropertyDescriptor {
            value: obj.has("value").then(|| obj.get("value")),
            writable: flag("writable"),
            get: None,
            set: None,
            enumerable: flag("enumerable"),
            configurable: flag("configurable"),
        }
    }

    /// Materialize a complete slot for a key that does not exist yet.
    pub(crate) fn into_new_slot(self) -> Slot {
        let enumerable = self.enumerable.unwrap_or(false);
        let configurable = self.configurable.unwrap_or(false);
        if self.is_accessor_descriptor() {
            Slot::new_accessor(self.get, self.set, enumerable, configurable)
        } else {
            Slot::new_data(self.value.unwrap_or_default(), self.writable.unwrap_or(false), enumerable, configurable)
        }
    }
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("value", &self.value)
            .field("writable", &self.writable)
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("enumerable", &self.enumerable)
            .field("configurable", &self.configurable)
            .finish()
    }
}

/// Ensures the descriptor is NOT both a data and an accessor descriptor.
pub fn validate_descriptor_for_define(key: &PropertyKey, pd: &PropertyDescriptor) -> Result<(), StoreError> {
    if pd.is_accessor_descriptor() && pd.is_data_descriptor() {
        return Err(raise_descriptor_error!(
            key,
            "Invalid property descriptor: cannot be both a data and an accessor descriptor"
        ));
    }
    Ok(())
}
