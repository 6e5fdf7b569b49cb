//! The flat hook interface called by the instrumented program.
//! One process-wide collector is created on first use; every target thread
//! gets its own engine.

mod instance;

use crate::{
    abs::{
        ArgIndex, ArrayIndex, FieldId, Flag, InstructionId, LocalIndex, Location, ObjectId,
        Operand, WrittenValue,
    },
    trace::InstructionRecord,
};

use self::instance::{init_collector, perform_on_engine};

pub fn init_runtime() {
    init_collector();
}

#[tracing::instrument(target = "pri::call", level = "debug")]
pub fn enter_call() {
    perform_on_engine(|e| {
        e.enter_call();
        Ok(())
    })
}

#[tracing::instrument(target = "pri::call", level = "debug")]
pub fn exit_call() {
    perform_on_engine(|e| e.exit_call())
}

macro_rules! location_hooks {
    ($($suffix:ident($($param:ident: $ty:ty),*) => $location:expr;)*) => {
        /// Read hooks: merge the flag of the location into the accumulator of the
        /// operand's instruction and return it.
        pub mod read {
            use super::*;
            $(
                #[tracing::instrument(target = "pri::read", level = "debug", ret)]
                pub fn $suffix(operand: Operand, $($param: $ty),*) -> Flag {
                    perform_on_engine(|e| e.read(operand, $location))
                }
            )*
        }

        /// Write hooks: store the accumulator of the instruction at the location.
        pub mod write {
            use super::*;
            $(
                #[tracing::instrument(target = "pri::write", level = "debug")]
                pub fn $suffix(instruction: InstructionId, $($param: $ty,)* value: WrittenValue) {
                    perform_on_engine(|e| e.write(instruction, $location, value))
                }
            )*
        }

        /// Marks the value at the location as symbolic, e.g., for the inputs of the target.
        pub mod mark_symbolic {
            use super::*;
            $(
                #[tracing::instrument(target = "pri::mark", level = "debug")]
                pub fn $suffix($($param: $ty),*) {
                    perform_on_engine(|e| e.mark_symbolic($location))
                }
            )*
        }
    };
}

location_hooks! {
    this() => Location::This;
    argument(index: ArgIndex) => Location::Argument(index);
    local(index: LocalIndex) => Location::Local(index);
    static_field(field: FieldId) => Location::Static(field);
    field(object: ObjectId, field: FieldId) => Location::Field(object, field);
    element(array: ObjectId, index: ArrayIndex) => Location::Element(array, index);
    returned() => Location::ReturnValue;
}

#[tracing::instrument(target = "pri::call", level = "debug")]
pub fn close_instruction(instruction: InstructionId) {
    perform_on_engine(|e| e.close_instruction(instruction))
}

/// Takes the symbolic trace of the current thread recorded so far.
pub fn take_trace() -> Vec<InstructionRecord> {
    perform_on_engine(|e| Ok(e.drain_trace()))
}

/// Resets the current thread's state and the shared shadow state.
pub fn reset() {
    perform_on_engine(|e| {
        e.reset();
        Ok(())
    });
    init_collector().reset_shared();
}
