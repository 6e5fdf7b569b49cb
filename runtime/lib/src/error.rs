use derive_more as dm;

use crate::abs::InstructionId;

/// Integrity violations: the instrumentation and the collector have desynchronized.
/// None of them is recoverable; continuing would produce an incorrect trace.
#[derive(Debug, Clone, PartialEq, Eq, dm::Display)]
pub enum CollectorError {
    #[display("Call stack underflow: exit from a call with no active frame")]
    StackUnderflow,
    #[display("No active frame: hook called outside of any instrumented call")]
    NoActiveFrame,
    #[display("Instruction {_0} is finalized twice")]
    InstructionFinalizedTwice(InstructionId),
    #[display("Closing instruction {closed} while {pending:?} is pending")]
    InstructionMismatch {
        pending: Option<InstructionId>,
        closed: InstructionId,
    },
}

impl core::error::Error for CollectorError {}

pub type Result<T> = core::result::Result<T, CollectorError>;
