//! The shadow heap: per-object flag state, parallel to the target's heap.
//!
//! Both tables here are shared by all target threads, as they model the target's
//! shared heap. They are sharded by key, so a read-modify-write on one identity only
//! locks the shard holding it. Descriptors are copied out before a reference they
//! hold is resolved; no shard lock is held while another identity is looked up.

mod object;

use dashmap::DashMap;

use common::log_trace;

use crate::{
    abs::{ArrayIndex, FieldId, Flag, ObjectId, ShadowValue},
    config::HeapConfig,
};

pub use object::HeapObjectDescriptor;

/// A key inside one heap object. Fields and elements are independent keyspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HeapKey {
    #[display("#{_0}")]
    Field(FieldId),
    #[display("[{_0}]")]
    Element(ArrayIndex),
}

pub struct ShadowHeap {
    objects: DashMap<ObjectId, HeapObjectDescriptor>,
    skip_concrete_allocation: bool,
    dense_elements_limit: ArrayIndex,
}

impl ShadowHeap {
    pub fn new(config: &HeapConfig) -> Self {
        Self {
            objects: new_sharded_map(config),
            skip_concrete_allocation: config.skip_concrete_allocation,
            dense_elements_limit: config.dense_elements_limit,
        }
    }

    /// Returns the descriptor stored under the key, or concrete if there is none.
    pub fn value(&self, id: ObjectId, key: HeapKey) -> ShadowValue {
        self.objects
            .get(&id)
            .map(|obj| obj.get(key))
            .unwrap_or_default()
    }

    /// Returns the flag stored under the key, resolving references through the heap.
    /// Absence means concrete.
    pub fn get(&self, id: ObjectId, key: HeapKey) -> Flag {
        // The shard guard is dropped here, before a possible resolution.
        let value = self.value(id, key);
        self.resolve(value)
    }

    pub fn put(&self, id: ObjectId, key: HeapKey, value: ShadowValue) {
        if value.is_concrete() && self.skip_concrete_allocation {
            if let Some(mut obj) = self.objects.get_mut(&id) {
                obj.set(key, value, self.dense_elements_limit);
            }
            return;
        }

        log_trace!("Shadow heap put @{:#x}{} <- {}", id, key, value);
        self.objects
            .entry(id)
            .or_default()
            .set(key, value, self.dense_elements_limit);
    }

    /// The flag that references to the object resolve to.
    pub fn object_flag(&self, id: ObjectId) -> Flag {
        self.objects
            .get(&id)
            .map(|obj| obj.flag())
            .unwrap_or_default()
    }

    pub fn set_object_flag(&self, id: ObjectId, flag: Flag) {
        if flag.is_concrete() && self.skip_concrete_allocation {
            if let Some(mut obj) = self.objects.get_mut(&id) {
                obj.set_flag(flag);
            }
            return;
        }

        self.objects.entry(id).or_default().set_flag(flag);
    }

    #[inline]
    pub fn resolve(&self, value: ShadowValue) -> Flag {
        match value {
            ShadowValue::Concrete => Flag::CONCRETE,
            ShadowValue::Symbolic => Flag::SYMBOLIC,
            ShadowValue::Reference(id) => self.object_flag(id),
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&self) {
        self.objects.clear();
    }
}

/// Flags of static fields. Independent of any object identity.
pub struct StaticFieldTable {
    fields: DashMap<FieldId, ShadowValue>,
}

impl StaticFieldTable {
    pub fn new(config: &HeapConfig) -> Self {
        Self {
            fields: new_sharded_map(config),
        }
    }

    pub fn value(&self, field: FieldId) -> ShadowValue {
        self.fields
            .get(&field)
            .map(|v| *v)
            .unwrap_or_default()
    }

    pub fn put(&self, field: FieldId, value: ShadowValue) {
        if value.is_concrete() {
            // Removing keeps the table proportional to the symbolic state.
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, value);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&self) {
        self.fields.clear();
    }
}

fn new_sharded_map<K: Eq + core::hash::Hash, V>(config: &HeapConfig) -> DashMap<K, V> {
    match config.shards {
        Some(shards) => DashMap::with_shard_amount(shards.get()),
        None => DashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap() -> ShadowHeap {
        ShadowHeap::new(&HeapConfig::default())
    }

    #[test]
    fn absent_entries_are_concrete() {
        let heap = heap();
        assert_eq!(heap.get(7, HeapKey::Field(0)), Flag::CONCRETE);
        assert_eq!(heap.get(7, HeapKey::Element(100)), Flag::CONCRETE);
        assert_eq!(heap.object_flag(7), Flag::CONCRETE);
    }

    #[test]
    fn no_cross_identity_leakage() {
        let heap = heap();
        heap.put(7, HeapKey::Field(3), ShadowValue::Symbolic);
        assert!(heap.get(7, HeapKey::Field(3)).is_symbolic());
        assert!(heap.get(9, HeapKey::Field(3)).is_concrete());
    }

    #[test]
    fn fields_and_elements_are_separate_keyspaces() {
        let heap = heap();
        heap.put(1, HeapKey::Field(2), ShadowValue::Symbolic);
        assert!(heap.get(1, HeapKey::Element(2)).is_concrete());
        heap.put(1, HeapKey::Element(5), ShadowValue::Symbolic);
        assert!(heap.get(1, HeapKey::Field(5)).is_concrete());
    }

    #[test]
    fn concrete_writes_do_not_allocate() {
        let heap = heap();
        heap.put(4, HeapKey::Field(0), ShadowValue::Concrete);
        heap.set_object_flag(4, Flag::CONCRETE);
        assert!(!heap.contains(4));
        assert!(heap.is_empty());
    }

    #[test]
    fn concrete_writes_allocate_when_configured() {
        let heap = ShadowHeap::new(&HeapConfig {
            skip_concrete_allocation: false,
            ..Default::default()
        });
        heap.put(4, HeapKey::Field(0), ShadowValue::Concrete);
        assert!(heap.contains(4));
    }

    #[test]
    fn concrete_write_overwrites_symbolic() {
        let heap = heap();
        heap.put(4, HeapKey::Element(1), ShadowValue::Symbolic);
        heap.put(4, HeapKey::Element(1), ShadowValue::Concrete);
        assert!(heap.get(4, HeapKey::Element(1)).is_concrete());
    }

    #[test]
    fn stored_references_resolve_through_target_object() {
        let heap = heap();
        heap.put(1, HeapKey::Field(0), ShadowValue::Reference(2));
        assert!(heap.get(1, HeapKey::Field(0)).is_concrete());
        heap.set_object_flag(2, Flag::SYMBOLIC);
        assert!(heap.get(1, HeapKey::Field(0)).is_symbolic());
    }

    #[test]
    fn self_reference_does_not_deadlock() {
        let heap = heap();
        heap.set_object_flag(1, Flag::SYMBOLIC);
        heap.put(1, HeapKey::Field(0), ShadowValue::Reference(1));
        assert!(heap.get(1, HeapKey::Field(0)).is_symbolic());
    }

    #[test]
    fn static_fields_are_independent_of_objects() {
        let heap = heap();
        let statics = StaticFieldTable::new(&HeapConfig::default());
        statics.put(3, ShadowValue::Symbolic);
        assert_eq!(statics.value(3), ShadowValue::Symbolic);
        assert!(heap.get(3, HeapKey::Field(3)).is_concrete());
        statics.put(3, ShadowValue::Concrete);
        assert!(statics.is_empty());
    }
}
