use crate::core::{Getter, PropertyDescriptor, PropertyKey, Setter, Slot, SlotKind, Value, validate_descriptor_for_define, values_equal};
use crate::{StoreError, raise_descriptor_error, raise_not_configurable_error, raise_not_extensible_error, raise_read_only_error};
use indexmap::IndexMap;
use std::rc::Rc;

/// How `set` and `delete` report a refused operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Refused writes, deletes and additions are silent no-ops.
    #[default]
    Permissive,
    /// Refused writes, deletes and additions return an error.
    Strict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegrityLevel {
    Extensible,
    NonExtensible,
    Sealed,
    Frozen,
}

/// Enumerable own key/value pairs, shallow and without descriptor metadata.
pub type PlainMapping = IndexMap<String, Value>;

/// A custom enumerator. When registered on a store it replaces the default
/// enumerable-values iteration; the sequence it returns may be unbounded.
pub type Enumerator = Rc<dyn Fn(&PropertyStore) -> Box<dyn Iterator<Item = Value>>>;

#[derive(Clone)]
pub struct PropertyStore {
    properties: IndexMap<PropertyKey, Slot>,
    // Whether new own properties can be added to this store. Default true.
    extensible: bool,
    mode: Mode,
    enumerator: Option<Enumerator>,
}

impl Default for PropertyStore {
    fn default() -> Self {
        PropertyStore::new()
    }
}

impl PropertyStore {
    pub fn new() -> Self {
        PropertyStore::with_mode(Mode::Permissive)
    }

    pub fn with_mode(mode: Mode) -> Self {
        PropertyStore {
            properties: IndexMap::new(),
            extensible: true,
            mode,
            enumerator: None,
        }
    }

    pub fn strict() -> Self {
        PropertyStore::with_mode(Mode::Strict)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn is_strict(&self) -> bool {
        self.mode == Mode::Strict
    }

    /// Define (or redefine) a data slot with a complete descriptor.
    pub fn define(
        &mut self,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Result<(), StoreError> {
        self.define_property(key, PropertyDescriptor::new_data(value.into(), writable, enumerable, configurable))
    }

    pub fn define_accessor(
        &mut self,
        key: impl Into<PropertyKey>,
        getter: Option<Getter>,
        setter: Option<Setter>,
        enumerable: bool,
        configurable: bool,
    ) -> Result<(), StoreError> {
        self.define_property(key, PropertyDescriptor::new_accessor(getter, setter, enumerable, configurable))
    }

    /// Define a slot from a (possibly partial) descriptor.
    ///
    /// A configurable slot is updated with whatever the descriptor carries.
    /// A non-configurable slot only accepts requests that leave its shape
    /// intact: it may not become configurable, change enumerability, switch
    /// between data and accessor, regain writability, or change the value
    /// while non-writable. Violations fail with `DescriptorError` in every
    /// mode.
    pub fn define_property(&mut self, key: impl Into<PropertyKey>, desc: PropertyDescriptor) -> Result<(), StoreError> {
        let key = key.into();
        validate_descriptor_for_define(&key, &desc)?;

        let Some(current) = self.properties.get(&key) else {
            if !self.extensible {
                return Err(raise_not_extensible_error!(key));
            }
            log::debug!("define_property: new key={} desc={:?}", key, desc);
            self.properties.insert(key, desc.into_new_slot());
            return Ok(());
        };

        if !current.configurable {
            check_non_configurable_redefinition(&key, current, &desc)?;
        }

        log::debug!("define_property: update key={} desc={:?}", key, desc);
        let merged = merge_descriptor(current, desc);
        // Overwriting an existing key keeps its insertion position.
        self.properties.insert(key, merged);
        Ok(())
    }

    /// Returns the value of `key`, running the getter for accessor slots.
    /// Absent keys yield `Value::Undefined`.
    pub fn get(&self, key: impl Into<PropertyKey>) -> Value {
        let key = key.into();
        match self.properties.get(&key).map(|slot| &slot.kind) {
            Some(SlotKind::Data { value, .. }) => value.clone(),
            Some(SlotKind::Accessor { getter: Some(getter), .. }) => {
                let getter = getter.clone();
                getter(self)
            }
            Some(SlotKind::Accessor { getter: None, .. }) | None => Value::Undefined,
        }
    }

    /// Assignment. Creates a default slot for an unknown key when the store is
    /// extensible, updates writable data slots and calls accessor setters.
    pub fn set(&mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<(), StoreError> {
        let key = key.into();
        let value = value.into();
        let setter = match self.properties.get_mut(&key) {
            None => {
                if self.extensible {
                    log::trace!("set: new key={} value={:?}", key, value);
                    self.properties.insert(key, Slot::new_default(value));
                    return Ok(());
                }
                if self.is_strict() {
                    return Err(raise_not_extensible_error!(key));
                }
                log::debug!("set: ignored new key={} on non-extensible store", key);
                return Ok(());
            }
            Some(slot) => match &mut slot.kind {
                SlotKind::Data { value: current, writable: true } => {
                    log::trace!("set: key={} value={:?}", key, value);
                    *current = value;
                    return Ok(());
                }
                SlotKind::Data { writable: false, .. } | SlotKind::Accessor { setter: None, .. } => {
                    if self.mode == Mode::Strict {
                        return Err(raise_read_only_error!(key));
                    }
                    log::debug!("set: ignored write to read-only key={}", key);
                    return Ok(());
                }
                SlotKind::Accessor { setter: Some(setter), .. } => setter.clone(),
            },
        };
        setter(self, value)
    }

    /// Removes a configurable slot. Deleting an absent key succeeds.
    pub fn delete(&mut self, key: impl Into<PropertyKey>) -> Result<(), StoreError> {
        let key = key.into();
        match self.properties.get(&key) {
            None => Ok(()),
            Some(slot) if slot.configurable => {
                log::trace!("delete: key={}", key);
                self.properties.shift_remove(&key);
                Ok(())
            }
            Some(_) => {
                if self.is_strict() {
                    return Err(raise_not_configurable_error!(key));
                }
                log::debug!("delete: ignored non-configurable key={}", key);
                Ok(())
            }
        }
    }

    /// True iff the slot exists, enumerable or not.
    pub fn has(&self, key: impl Into<PropertyKey>) -> bool {
        self.properties.contains_key(&key.into())
    }

    pub fn is_enumerable(&self, key: impl Into<PropertyKey>) -> bool {
        self.properties.get(&key.into()).is_some_and(|slot| slot.enumerable)
    }

    /// Enumerable keys in insertion order.
    pub fn keys(&self) -> Vec<PropertyKey> {
        self.properties.iter().filter(|(_, slot)| slot.enumerable).map(|(k, _)| k.clone()).collect()
    }

    /// All keys in insertion order, enumerable or not.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.properties.keys().cloned().collect()
    }

    /// Values of the enumerable keys, in insertion order.
    pub fn values(&self) -> Vec<Value> {
        self.keys().into_iter().map(|k| self.get(k)).collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn get_own_property_descriptor(&self, key: impl Into<PropertyKey>) -> Option<PropertyDescriptor> {
        self.properties.get(&key.into()).map(Slot::to_descriptor)
    }

    pub fn slot(&self, key: impl Into<PropertyKey>) -> Option<&Slot> {
        self.properties.get(&key.into())
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = (&PropertyKey, &Slot)> {
        self.properties.iter()
    }

    /// Insert a slot as-is, bypassing descriptor validation and extensibility.
    pub(crate) fn insert_slot(&mut self, key: PropertyKey, slot: Slot) {
        self.properties.insert(key, slot);
    }

    // Plain mappings

    /// Flatten the enumerable own slots into a key/value mapping. Getters run;
    /// nested handles are shared, not copied.
    pub fn to_plain_mapping(&self) -> PlainMapping {
        self.keys().into_iter().map(|k| (k.as_str().to_string(), self.get(&k))).collect()
    }

    /// A new extensible store holding one default slot per mapping entry.
    pub fn from_plain_mapping(mapping: PlainMapping) -> Self {
        let mut store = PropertyStore::new();
        for (k, v) in mapping {
            store.insert_slot(PropertyKey::from(k), Slot::new_default(v));
        }
        store
    }

    /// Bulk `define` of default-descriptor slots into this store. All or
    /// nothing: if any entry is refused the store is left unchanged.
    pub fn extend_from_plain_mapping(&mut self, mapping: PlainMapping) -> Result<(), StoreError> {
        let mut staged = self.clone();
        for (k, v) in mapping {
            staged.define(k, v, true, true, true)?;
        }
        *self = staged;
        Ok(())
    }

    // Integrity levels

    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    pub fn prevent_extensions(&mut self) {
        if self.extensible {
            log::debug!("prevent_extensions: store={:p}", self as *const _);
        }
        self.extensible = false;
    }

    /// Prevents extensions and marks every slot non-configurable.
    pub fn seal(&mut self) {
        self.prevent_extensions();
        for slot in self.properties.values_mut() {
            slot.configurable = false;
        }
        log::debug!("seal: store={:p} slots={}", self as *const _, self.properties.len());
    }

    /// Seals and marks every slot non-writable: data slots lose `writable`,
    /// accessor slots lose their setter.
    pub fn freeze(&mut self) {
        self.seal();
        for slot in self.properties.values_mut() {
            match &mut slot.kind {
                SlotKind::Data { writable, .. } => *writable = false,
                SlotKind::Accessor { setter, .. } => *setter = None,
            }
        }
        log::debug!("freeze: store={:p}", self as *const _);
    }

    pub fn is_sealed(&self) -> bool {
        !self.extensible && self.properties.values().all(|slot| !slot.configurable)
    }

    pub fn is_frozen(&self) -> bool {
        self.is_sealed() && self.properties.values().all(|slot| !slot.is_writable())
    }

    pub fn integrity_level(&self) -> IntegrityLevel {
        if self.extensible {
            IntegrityLevel::Extensible
        } else if self.is_frozen() {
            IntegrityLevel::Frozen
        } else if self.is_sealed() {
            IntegrityLevel::Sealed
        } else {
            IntegrityLevel::NonExtensible
        }
    }

    // Custom enumeration

    pub fn set_enumerator(&mut self, enumerator: impl Fn(&PropertyStore) -> Box<dyn Iterator<Item = Value>> + 'static) {
        self.enumerator = Some(Rc::new(enumerator));
    }

    pub fn clear_enumerator(&mut self) {
        self.enumerator = None;
    }

    pub fn enumerator(&self) -> Option<&Enumerator> {
        self.enumerator.as_ref()
    }

    pub(crate) fn replace_enumerator(&mut self, enumerator: Option<Enumerator>) {
        self.enumerator = enumerator;
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("properties", &self.properties)
            .field("extensible", &self.extensible)
            .field("mode", &self.mode)
            .field("enumerator", &self.enumerator.is_some())
            .finish()
    }
}

fn check_non_configurable_redefinition(key: &PropertyKey, current: &Slot, desc: &PropertyDescriptor) -> Result<(), StoreError> {
    if desc.configurable == Some(true) {
        return Err(raise_descriptor_error!(key, "Cannot make non-configurable property configurable"));
    }
    if let Some(enumerable) = desc.enumerable
        && enumerable != current.enumerable
    {
        return Err(raise_descriptor_error!(key, "Cannot change enumerability of non-configurable property"));
    }
    if desc.is_generic_descriptor() {
        return Ok(());
    }

    match &current.kind {
        SlotKind::Data { value, writable } => {
            if desc.is_accessor_descriptor() {
                return Err(raise_descriptor_error!(key, "Cannot convert non-configurable data property to an accessor"));
            }
            if !*writable {
                if desc.writable == Some(true) {
                    return Err(raise_descriptor_error!(key, "Cannot make non-writable property writable"));
                }
                if let Some(new_value) = &desc.value
                    && !values_equal(value, new_value)
                {
                    return Err(raise_descriptor_error!(
                        key,
                        "Cannot change value of non-writable, non-configurable property"
                    ));
                }
            }
        }
        SlotKind::Accessor { getter, setter } => {
            if desc.is_data_descriptor() {
                return Err(raise_descriptor_error!(key, "Cannot convert non-configurable accessor to a data property"));
            }
            let same_getter = match (&desc.get, getter) {
                (None, _) => true,
                (Some(new), Some(old)) => Rc::ptr_eq(new, old),
                (Some(_), None) => false,
            };
            let same_setter = match (&desc.set, setter) {
                (None, _) => true,
                (Some(new), Some(old)) => Rc::ptr_eq(new, old),
                (Some(_), None) => false,
            };
            if !same_getter || !same_setter {
                return Err(raise_descriptor_error!(
                    key,
                    "Cannot change getter/setter of non-configurable accessor property"
                ));
            }
        }
    }
    Ok(())
}

/// Apply `desc` on top of `current`. Switching between data and accessor
/// resets the kind-specific fields; flags carry over unless given.
fn merge_descriptor(current: &Slot, desc: PropertyDescriptor) -> Slot {
    let enumerable = desc.enumerable.unwrap_or(current.enumerable);
    let configurable = desc.configurable.unwrap_or(current.configurable);
    let kind = match &current.kind {
        SlotKind::Data { value, writable } => {
            if desc.is_accessor_descriptor() {
                SlotKind::Accessor {
                    getter: desc.get,
                    setter: desc.set,
                }
            } else {
                SlotKind::Data {
                    value: desc.value.unwrap_or_else(|| value.clone()),
                    writable: desc.writable.unwrap_or(*writable),
                }
            }
        }
        SlotKind::Accessor { getter, setter } => {
            if desc.is_data_descriptor() {
                SlotKind::Data {
                    value: desc.value.unwrap_or_default(),
                    writable: desc.writable.unwrap_or(false),
                }
            } else {
                SlotKind::Accessor {
                    getter: desc.get.or_else(|| getter.clone()),
                    setter: desc.set.or_else(|| setter.clone()),
                }
            }
        }
    };
    Slot {
        kind,
        enumerable,
        configurable,
    }
}
