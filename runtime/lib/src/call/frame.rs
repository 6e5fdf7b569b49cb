use crate::abs::{ArgIndex, LocalIndex, ShadowValue};

/// The shadow state of one active call: receiver, arguments, and locals.
/// Slots are stored by value and grow on demand; unwritten slots are concrete.
#[derive(Debug, Default, Clone)]
pub struct Frame {
    /// `None` for static calls.
    receiver: Option<ShadowValue>,
    args: Vec<ShadowValue>,
    locals: Vec<ShadowValue>,
}

impl Frame {
    pub(super) fn from_seed(seed: CallSeed) -> Self {
        Self {
            receiver: seed.receiver,
            args: seed.args,
            locals: Vec::new(),
        }
    }

    pub fn receiver(&self) -> ShadowValue {
        self.receiver.unwrap_or_default()
    }

    pub fn has_receiver(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn set_receiver(&mut self, value: ShadowValue) {
        self.receiver = Some(value);
    }

    pub fn arg(&self, index: ArgIndex) -> ShadowValue {
        get_slot(&self.args, index)
    }

    pub fn set_arg(&mut self, index: ArgIndex, value: ShadowValue) {
        set_slot(&mut self.args, index, value)
    }

    pub fn local(&self, index: LocalIndex) -> ShadowValue {
        get_slot(&self.locals, index)
    }

    pub fn set_local(&mut self, index: LocalIndex, value: ShadowValue) {
        set_slot(&mut self.locals, index, value)
    }
}

#[inline]
fn get_slot(slots: &[ShadowValue], index: u32) -> ShadowValue {
    slots.get(index as usize).copied().unwrap_or_default()
}

fn set_slot(slots: &mut Vec<ShadowValue>, index: u32, value: ShadowValue) {
    let index = index as usize;
    if index >= slots.len() {
        if value.is_concrete() {
            return;
        }
        slots.resize(index + 1, ShadowValue::Concrete);
    }
    slots[index] = value;
}

/// The state the caller hands over to the callee's frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CallSeed {
    pub receiver: Option<ShadowValue>,
    pub args: Vec<ShadowValue>,
}

impl CallSeed {
    pub fn with_receiver(mut self, receiver: ShadowValue) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = ShadowValue>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn set_arg(&mut self, index: ArgIndex, value: ShadowValue) {
        set_slot(&mut self.args, index, value)
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_none() && self.args.is_empty()
    }
}
