use std::collections::HashMap;

use crate::abs::{ArrayIndex, FieldId, Flag, ShadowValue};

use super::HeapKey;

/// The shadow state of a single heap object.
#[derive(Debug, Default, Clone)]
pub struct HeapObjectDescriptor {
    /// The flag that references to this object resolve to.
    flag: Flag,
    fields: HashMap<FieldId, ShadowValue>,
    elements: ElementStore,
}

impl HeapObjectDescriptor {
    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub(super) fn set_flag(&mut self, flag: Flag) {
        self.flag = flag;
    }

    pub fn get(&self, key: HeapKey) -> ShadowValue {
        match key {
            HeapKey::Field(field) => self.fields.get(&field).copied().unwrap_or_default(),
            HeapKey::Element(index) => self.elements.get(index),
        }
    }

    pub(super) fn set(&mut self, key: HeapKey, value: ShadowValue, dense_limit: ArrayIndex) {
        match key {
            HeapKey::Field(field) => {
                if value.is_concrete() {
                    self.fields.remove(&field);
                } else {
                    self.fields.insert(field, value);
                }
            }
            HeapKey::Element(index) => self.elements.set(index, value, dense_limit),
        }
    }
}

/// Element descriptors stored by value.
/// Indices below the dense limit live in a buffer that grows to the highest
/// written index; the rest are kept sparse.
#[derive(Debug, Default, Clone)]
struct ElementStore {
    dense: Vec<ShadowValue>,
    sparse: HashMap<ArrayIndex, ShadowValue>,
}

impl ElementStore {
    fn get(&self, index: ArrayIndex) -> ShadowValue {
        self.dense
            .get(index as usize)
            .or_else(|| self.sparse.get(&index))
            .copied()
            .unwrap_or_default()
    }

    fn set(&mut self, index: ArrayIndex, value: ShadowValue, dense_limit: ArrayIndex) {
        let i = index as usize;
        if let Some(slot) = self.dense.get_mut(i) {
            *slot = value;
        } else if index < dense_limit {
            if value.is_concrete() {
                // Beyond the buffer means concrete already.
                return;
            }
            self.dense.resize(i + 1, ShadowValue::Concrete);
            self.dense[i] = value;
        } else if value.is_concrete() {
            self.sparse.remove(&index);
        } else {
            self.sparse.insert(index, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_beyond_dense_limit_are_sparse() {
        let mut obj = HeapObjectDescriptor::default();
        obj.set(HeapKey::Element(1_000_000), ShadowValue::Symbolic, 16);
        assert!(obj.elements.dense.is_empty());
        assert_eq!(obj.get(HeapKey::Element(1_000_000)), ShadowValue::Symbolic);
        obj.set(HeapKey::Element(1_000_000), ShadowValue::Concrete, 16);
        assert!(obj.elements.sparse.is_empty());
    }

    #[test]
    fn dense_elements_survive_growth() {
        let mut obj = HeapObjectDescriptor::default();
        for i in (0..200).step_by(3) {
            obj.set(HeapKey::Element(i), ShadowValue::Reference(i as u64), 1024);
        }
        for i in 0..200 {
            let expected = if i % 3 == 0 {
                ShadowValue::Reference(i as u64)
            } else {
                ShadowValue::Concrete
            };
            assert_eq!(obj.get(HeapKey::Element(i)), expected);
        }
    }
}
