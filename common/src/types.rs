//! Identifiers handed over by the instrumentation.
//! They are opaque: the collector only compares and hashes them.

/// Id of a target instruction, unique within the instrumented program.
pub type InstructionId = u64;

/// Stable identity token of a heap object.
pub type ObjectId = u64;

/// Id of a field, resolved once at instrumentation time.
/// Instance fields and static fields use separate id spaces.
pub type FieldId = u32;

pub type LocalIndex = u32;
pub type ArgIndex = u32;
pub type ArrayIndex = u32;

/// Position of an operand within its instruction.
pub type OperandIndex = u32;
