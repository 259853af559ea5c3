use crate::core::{ArrayHandle, PropertyKey, PropertyStore, Slot, SlotKind, StoreHandle, Value, new_array_ptr, new_store_ptr};
use crate::{StoreError, raise_cyclic_structure_error};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// What a deep copy does when it meets a reference back to a store or array
/// it is still copying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Fail with `CyclicStructureError`.
    #[default]
    Reject,
    /// Point the back-reference at the copy under construction, so the copy
    /// has the same cycle as the original.
    Relink,
}

/// Copy the enumerable own values of every source into `target`, in order,
/// through `set` (so the target's descriptors and mode apply). Returns the
/// target.
pub fn assign(target: &StoreHandle, sources: &[StoreHandle]) -> Result<StoreHandle, StoreError> {
    for source in sources {
        let entries = source.borrow().to_plain_mapping();
        let mut target_ref = target.borrow_mut();
        for (k, v) in entries {
            target_ref.set(k, v)?;
        }
    }
    Ok(target.clone())
}

/// A new store with the enumerable own values of `store` as default slots.
/// Nested stores and arrays are shared with the original.
pub fn shallow_copy(store: &PropertyStore) -> PropertyStore {
    let mut copy = PropertyStore::from_plain_mapping(store.to_plain_mapping());
    copy.set_mode(store.mode());
    copy
}

/// Duplicate `store` and everything reachable from it. Descriptors,
/// extensibility and mode are preserved; accessor functions and custom
/// enumerators are shared. A store or array reachable through two paths is
/// copied once.
pub fn deep_copy(store: &StoreHandle, policy: CyclePolicy) -> Result<StoreHandle, StoreError> {
    let mut copier = DeepCopier::new(policy);
    copier.copy_store(store)
}

pub fn deep_copy_value(value: &Value, policy: CyclePolicy) -> Result<Value, StoreError> {
    let mut copier = DeepCopier::new(policy);
    copier.copy_value(value)
}

struct DeepCopier {
    policy: CyclePolicy,
    stores: HashMap<usize, StoreHandle>,
    arrays: HashMap<usize, ArrayHandle>,
    // Originals on the current traversal path
    active: HashSet<usize>,
    path: Vec<String>,
}

impl DeepCopier {
    fn new(policy: CyclePolicy) -> Self {
        DeepCopier {
            policy,
            stores: HashMap::new(),
            arrays: HashMap::new(),
            active: HashSet::new(),
            path: Vec::new(),
        }
    }

    fn copy_value(&mut self, value: &Value) -> Result<Value, StoreError> {
        match value {
            Value::Object(store) => Ok(Value::Object(self.copy_store(store)?)),
            Value::Array(array) => Ok(Value::Array(self.copy_array(array)?)),
            other => Ok(other.clone()),
        }
    }

    fn check_cycle(&self, addr: usize) -> Result<(), StoreError> {
        if self.active.contains(&addr) && self.policy == CyclePolicy::Reject {
            return Err(raise_cyclic_structure_error!(self.path_string()));
        }
        Ok(())
    }

    fn path_string(&self) -> String {
        if self.path.is_empty() { "<root>".to_string() } else { self.path.join(".") }
    }

    fn copy_store(&mut self, original: &StoreHandle) -> Result<StoreHandle, StoreError> {
        let addr = Rc::as_ptr(original) as usize;
        self.check_cycle(addr)?;
        if let Some(done) = self.stores.get(&addr) {
            log::trace!("deep_copy: reusing store copy at {}", self.path_string());
            return Ok(done.clone());
        }

        let (slots, extensible, mode, enumerator) = {
            let src = original.borrow();
            let slots: Vec<(PropertyKey, Slot)> = src.slots().map(|(k, s)| (k.clone(), s.clone())).collect();
            (slots, src.is_extensible(), src.mode(), src.enumerator().cloned())
        };

        let copy = new_store_ptr(PropertyStore::with_mode(mode));
        self.stores.insert(addr, copy.clone());
        self.active.insert(addr);

        for (key, mut slot) in slots {
            if let SlotKind::Data { value, .. } = &mut slot.kind {
                self.path.push(key.to_string());
                let copied = self.copy_value(value);
                self.path.pop();
                *value = copied?;
            }
            copy.borrow_mut().insert_slot(key, slot);
        }

        {
            let mut dst = copy.borrow_mut();
            dst.replace_enumerator(enumerator);
            if !extensible {
                dst.prevent_extensions();
            }
        }
        self.active.remove(&addr);
        Ok(copy)
    }

    fn copy_array(&mut self, original: &ArrayHandle) -> Result<ArrayHandle, StoreError> {
        let addr = Rc::as_ptr(original) as usize;
        self.check_cycle(addr)?;
        if let Some(done) = self.arrays.get(&addr) {
            return Ok(done.clone());
        }

        let items: Vec<Value> = original.borrow().clone();
        let copy = new_array_ptr(Vec::with_capacity(items.len()));
        self.arrays.insert(addr, copy.clone());
        self.active.insert(addr);

        for (index, item) in items.iter().enumerate() {
            self.path.push(index.to_string());
            let copied = self.copy_value(item);
            self.path.pop();
            copy.borrow_mut().push(copied?);
        }

        self.active.remove(&addr);
        Ok(copy)
    }
}
