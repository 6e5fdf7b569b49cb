//! The flag propagation engine.
//!
//! Read hooks merge operand flags into the accumulator of the instruction being
//! processed; write hooks store the accumulator at the written location.
//! An instruction is closed when another instruction id is observed, when the
//! call stack becomes empty, or when the instrumentation closes it explicitly.
//! Closed instructions with a symbolic accumulator are appended to the trace.

mod instruction;

use std::sync::Arc;

use common::{log_debug, log_trace};

use crate::{
    abs::{
        CallPosition, Flag, InstructionId, Location, Operand, ShadowValue, WrittenValue,
    },
    call::{CallSeed, CallStack},
    collector::SharedState,
    error::Result,
    heap::HeapKey,
    trace::{InstructionRecord, SymbolicTrace},
};

use instruction::InstructionState;

/// The collector as seen by one target thread.
/// Owns the thread's call stack, instruction scratch state, and trace,
/// and shares the shadow heap with all other threads.
pub struct ThreadCollector {
    shared: Arc<SharedState>,
    stack: CallStack,
    instruction: InstructionState,
    /// Filled by reads forwarded into a call, consumed by the callee's entrance.
    pending_call: CallSeed,
    /// The descriptor of the latest returned value.
    /// Only readable by the instruction that opens right after the return.
    returned: Option<ShadowValue>,
    trace: SymbolicTrace,
}

impl ThreadCollector {
    pub(crate) fn new(shared: Arc<SharedState>, thread_name: &str) -> Self {
        let stack = CallStack::with_capacity(shared.config.stack.initial_capacity);
        let trace = SymbolicTrace::new(&shared.config.trace, thread_name);
        Self {
            shared,
            stack,
            instruction: Default::default(),
            pending_call: Default::default(),
            returned: None,
            trace,
        }
    }

    /// Pushes a frame seeded with the values forwarded by the latest reads.
    #[tracing::instrument(level = "trace", skip(self), fields(depth = self.stack.depth()))]
    pub fn enter_call(&mut self) {
        let seed = core::mem::take(&mut self.pending_call);
        self.returned = None;
        self.stack.push(seed);
    }

    /// Pushes a frame seeded explicitly.
    #[tracing::instrument(level = "trace", skip(self), fields(depth = self.stack.depth()))]
    pub fn enter_call_with(&mut self, seed: CallSeed) {
        self.drop_pending_call();
        self.returned = None;
        self.stack.push(seed);
    }

    #[tracing::instrument(level = "trace", skip(self), fields(depth = self.stack.depth()))]
    pub fn exit_call(&mut self) -> Result<()> {
        self.stack.pop()?;
        if self.stack.is_empty() {
            // No more reads can reach the pending instruction at this level.
            self.finalize_instruction();
            self.drop_pending_call();
        }
        Ok(())
    }

    pub fn read(&mut self, operand: Operand, location: Location) -> Result<Flag> {
        let value = self.load(location)?;
        self.observe(operand.instruction, location);

        if matches!(location, Location::ReturnValue) {
            self.returned = None;
        }

        let flag = self.shared.heap.resolve(value);
        self.instruction
            .add_operand(operand.position, flag, operand.value);
        log_trace!(
            "Read {} as operand {} of {}: {}",
            location,
            operand.position,
            operand.instruction,
            flag
        );

        if let Some(position) = operand.forward {
            self.forward(position, value);
        }

        Ok(flag)
    }

    pub fn write(
        &mut self,
        instruction: InstructionId,
        location: Location,
        value: WrittenValue,
    ) -> Result<()> {
        self.stack.top()?;
        self.observe(instruction, location);

        let acc = self.instruction.accumulator();
        let stored = match value {
            WrittenValue::Primitive | WrittenValue::Reference(None) => ShadowValue::from_flag(acc),
            WrittenValue::Reference(Some(id)) => {
                self.shared.heap.set_object_flag(id, acc.without_reserved());
                ShadowValue::Reference(id)
            }
        };
        log_trace!("Write {} at {} by {}", stored, location, instruction);
        self.store(location, stored)
    }

    /// Stores the descriptor at the location, bypassing the accumulator.
    pub fn assign(&mut self, location: Location, value: ShadowValue) -> Result<()> {
        self.stack.top()?;
        self.store(location, value)
    }

    /// Marks the value at the location as symbolic.
    /// For references, the referenced object is marked, so all its aliases observe it.
    pub fn mark_symbolic(&mut self, location: Location) -> Result<()> {
        match self.load(location)? {
            ShadowValue::Reference(id) => {
                self.shared.heap.set_object_flag(id, Flag::SYMBOLIC);
                Ok(())
            }
            _ => self.store(location, ShadowValue::Symbolic),
        }
    }

    /// The current flag of the location, without affecting the instruction state.
    pub fn resolve(&self, location: Location) -> Result<Flag> {
        self.load(location).map(|v| self.shared.heap.resolve(v))
    }

    /// Closes the pending instruction before another instruction id is observed.
    pub fn close_instruction(&mut self, instruction: InstructionId) -> Result<()> {
        if let Some(record) = self.instruction.close(instruction)? {
            self.trace.push(record);
        }
        Ok(())
    }

    pub fn accumulator(&self) -> Flag {
        self.instruction.accumulator()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn trace(&self) -> &SymbolicTrace {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut SymbolicTrace {
        &mut self.trace
    }

    pub fn drain_trace(&mut self) -> Vec<InstructionRecord> {
        self.trace.drain()
    }

    /// Brings the thread state back to its initial state.
    /// The shared heap is not touched.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.instruction.clear();
        self.pending_call = Default::default();
        self.returned = None;
        self.trace.clear();
    }
}

impl ThreadCollector {
    /// Moves to the given instruction, closing the previous one if it differs.
    /// A returned value not picked up by the first access of the new instruction
    /// was discarded by the caller.
    fn observe(&mut self, id: InstructionId, location: Location) {
        if self.instruction.is_pending(id) {
            return;
        }

        self.finalize_instruction();
        self.drop_pending_call();
        if !matches!(location, Location::ReturnValue) {
            self.returned = None;
        }
        self.instruction.open(id);
    }

    fn finalize_instruction(&mut self) {
        if let Some(record) = self.instruction.finalize() {
            self.trace.push(record);
        }
    }

    fn drop_pending_call(&mut self) {
        if !self.pending_call.is_empty() {
            log_debug!(
                "Dropping the values forwarded to a call that was not entered: {:?}",
                self.pending_call
            );
            self.pending_call = Default::default();
        }
    }

    fn forward(&mut self, position: CallPosition, value: ShadowValue) {
        match position {
            CallPosition::Receiver => self.pending_call.receiver = Some(value),
            CallPosition::Argument(index) => self.pending_call.set_arg(index, value),
            CallPosition::Return => self.returned = Some(value),
        }
    }

    fn load(&self, location: Location) -> Result<ShadowValue> {
        let frame = self.stack.top()?;
        let heap = &self.shared.heap;
        Ok(match location {
            Location::This => frame.receiver(),
            Location::Argument(index) => frame.arg(index),
            Location::Local(index) => frame.local(index),
            Location::Static(field) => self.shared.statics.value(field),
            Location::Field(id, field) => heap.value(id, HeapKey::Field(field)),
            Location::Element(id, index) => heap.value(id, HeapKey::Element(index)),
            Location::ReturnValue => self.returned.unwrap_or_default(),
        })
    }

    fn store(&mut self, location: Location, value: ShadowValue) -> Result<()> {
        let heap = &self.shared.heap;
        match location {
            Location::This => self.stack.top_mut()?.set_receiver(value),
            Location::Argument(index) => self.stack.top_mut()?.set_arg(index, value),
            Location::Local(index) => self.stack.top_mut()?.set_local(index, value),
            Location::Static(field) => self.shared.statics.put(field, value),
            Location::Field(id, field) => heap.put(id, HeapKey::Field(field), value),
            Location::Element(id, index) => heap.put(id, HeapKey::Element(index), value),
            Location::ReturnValue => self.returned = Some(value),
        }
        Ok(())
    }
}
