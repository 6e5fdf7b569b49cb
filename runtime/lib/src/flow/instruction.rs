use common::log_trace;

use crate::{
    abs::{ConcreteValue, Flag, InstructionId, OperandIndex},
    error::{CollectorError, Result},
    trace::InstructionRecord,
};

/// The instruction currently being processed on a thread.
struct PendingInstruction {
    /// The expression accumulator: symbolicity seen so far for this instruction.
    acc: Flag,
    record: InstructionRecord,
}

/// Per-thread scratch state of the instruction boundary.
#[derive(Default)]
pub(super) struct InstructionState {
    pending: Option<PendingInstruction>,
    /// The last finalized instruction, as long as no other one has opened since.
    last_finalized: Option<InstructionId>,
}

impl InstructionState {
    #[inline]
    pub(super) fn is_pending(&self, id: InstructionId) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.record.instruction == id)
    }

    pub(super) fn pending_id(&self) -> Option<InstructionId> {
        self.pending.as_ref().map(|p| p.record.instruction)
    }

    /// Starts a new instruction with a zero accumulator.
    /// The previous one must have been finalized.
    pub(super) fn open(&mut self, id: InstructionId) {
        debug_assert!(self.pending.is_none(), "Opening over a pending instruction");
        self.last_finalized = None;
        self.pending = Some(PendingInstruction {
            acc: Flag::CONCRETE,
            record: InstructionRecord::new(id),
        });
    }

    #[inline]
    pub(super) fn accumulator(&self) -> Flag {
        self.pending.as_ref().map(|p| p.acc).unwrap_or_default()
    }

    pub(super) fn add_operand(&mut self, position: OperandIndex, flag: Flag, value: ConcreteValue) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.acc |= flag;
        if flag.is_concrete() {
            pending.record.add_concrete_operand(position, value);
        }
    }

    /// Closes the pending instruction, if any.
    /// Returns its record if the accumulator ended up symbolic.
    pub(super) fn finalize(&mut self) -> Option<InstructionRecord> {
        let PendingInstruction { acc, record } = self.pending.take()?;
        self.last_finalized = Some(record.instruction);
        if acc.is_symbolic() {
            log_trace!("Instruction {} is symbolic", record);
            Some(record)
        } else {
            None
        }
    }

    /// Explicitly closes the instruction with the given id.
    pub(super) fn close(&mut self, id: InstructionId) -> Result<Option<InstructionRecord>> {
        if self.is_pending(id) {
            return Ok(self.finalize());
        }

        if self.pending.is_none() && self.last_finalized == Some(id) {
            Err(CollectorError::InstructionFinalizedTwice(id))
        } else {
            Err(CollectorError::InstructionMismatch {
                pending: self.pending_id(),
                closed: id,
            })
        }
    }

    pub(super) fn clear(&mut self) {
        *self = Self::default();
    }
}
