mod dump;

use core::fmt::{self, Display};

use delegate::delegate;
use itertools::Itertools;
use serde::Serialize;

use common::log_warn;

use crate::{
    abs::{ConcreteValue, InstructionId, OperandIndex},
    config::TraceConfig,
};

pub(crate) use dump::{RecordDumper, create_dumper};

/// A concrete operand snapshot of a symbolic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcreteOperand {
    pub position: OperandIndex,
    pub value: ConcreteValue,
}

impl Display for ConcreteOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.value)
    }
}

/// An instruction whose result depended on a symbolic value,
/// with the concrete values of its other operands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionRecord {
    pub instruction: InstructionId,
    pub concrete_operands: Vec<ConcreteOperand>,
}

impl InstructionRecord {
    pub fn new(instruction: InstructionId) -> Self {
        Self {
            instruction,
            concrete_operands: Vec::new(),
        }
    }

    pub(crate) fn add_concrete_operand(&mut self, position: OperandIndex, value: ConcreteValue) {
        self.concrete_operands
            .push(ConcreteOperand { position, value });
    }

    /// The latest concrete snapshot taken for the operand position, if any.
    pub fn operand(&self, position: OperandIndex) -> Option<&ConcreteValue> {
        self.concrete_operands
            .iter()
            .rev()
            .find(|op| op.position == position)
            .map(|op| &op.value)
    }
}

impl Display for InstructionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{{}}}",
            self.instruction,
            self.concrete_operands.iter().join(", ")
        )
    }
}

/// The ordered, append-only sequence of symbolic instruction records of one thread.
/// The consumer drains it per symbolic-execution step.
pub struct SymbolicTrace {
    records: Vec<InstructionRecord>,
    dumper: Option<RecordDumper>,
}

impl SymbolicTrace {
    pub fn new(config: &TraceConfig, thread_name: &str) -> Self {
        Self {
            records: Vec::with_capacity(config.initial_capacity),
            dumper: create_dumper(config.dump.as_ref(), thread_name),
        }
    }

    pub(crate) fn push(&mut self, record: InstructionRecord) {
        if let Some(dumper) = self.dumper.as_mut() {
            dumper
                .dump(&record)
                .unwrap_or_else(|e| log_warn!("Could not dump instruction record: {e}"));
        }
        self.records.push(record);
    }

    delegate! {
        to self.records {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn iter(&self) -> core::slice::Iter<'_, InstructionRecord>;
            pub fn clear(&mut self);
            #[call(as_slice)]
            pub fn records(&self) -> &[InstructionRecord];
        }
    }

    /// The ids of the recorded instructions, in order.
    pub fn instruction_ids(&self) -> impl Iterator<Item = InstructionId> + '_ {
        self.records.iter().map(|r| r.instruction)
    }

    /// Takes all the records, leaving the trace empty.
    pub fn drain(&mut self) -> Vec<InstructionRecord> {
        core::mem::take(&mut self.records)
    }
}

impl Default for SymbolicTrace {
    fn default() -> Self {
        Self {
            records: Vec::with_capacity(TraceConfig::default().initial_capacity),
            dumper: None,
        }
    }
}

impl<'a> IntoIterator for &'a SymbolicTrace {
    type Item = &'a InstructionRecord;
    type IntoIter = core::slice::Iter<'a, InstructionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: InstructionId, operands: &[(OperandIndex, i32)]) -> InstructionRecord {
        let mut record = InstructionRecord::new(id);
        for (position, value) in operands {
            record.add_concrete_operand(*position, (*value).into());
        }
        record
    }

    #[test]
    fn keeps_insertion_order_across_growth() {
        let mut trace = SymbolicTrace::default();
        for id in 0..1000 {
            trace.push(InstructionRecord::new(id));
        }
        assert_eq!(trace.len(), 1000);
        assert!(trace.instruction_ids().eq(0..1000));
    }

    #[test]
    fn drain_empties_the_trace() {
        let mut trace = SymbolicTrace::default();
        trace.push(record(1, &[(0, 5)]));
        trace.push(record(2, &[]));
        let drained = trace.drain();
        assert_eq!(drained.len(), 2);
        assert!(trace.is_empty());
        trace.push(record(3, &[]));
        assert_eq!(trace.records()[0].instruction, 3);
    }

    #[test]
    fn operand_lookup_prefers_latest_snapshot() {
        let record = record(9, &[(0, 1), (2, 3), (0, 4)]);
        assert_eq!(record.operand(0), Some(&ConcreteValue::Int(4)));
        assert_eq!(record.operand(2), Some(&ConcreteValue::Int(3)));
        assert_eq!(record.operand(1), None);
    }

    #[test]
    fn record_display() {
        assert_eq!(record(7, &[(1, 2), (3, -1)]).to_string(), "7 {1: 2i32, 3: -1i32}");
    }
}
