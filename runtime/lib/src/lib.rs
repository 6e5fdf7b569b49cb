pub mod abs;
pub mod call;
mod collector;
pub mod config;
pub mod error;
pub mod flow;
pub mod heap;
pub mod pri;
pub mod trace;
pub(crate) mod utils;

use common::log_info;

pub use abs::{
    CallPosition, ConcreteValue, Flag, Location, Operand, ShadowValue, WrittenValue,
};
pub use call::{CallSeed, CallStack, Frame};
pub use collector::Collector;
pub use crate::config::{
    CollectorConfig, FileFormat, FileGenConfig, HeapConfig, OutputConfig, StackConfig, TraceConfig,
};
pub use error::{CollectorError, Result};
pub use flow::ThreadCollector;
pub use heap::{HeapKey, HeapObjectDescriptor, ShadowHeap, StaticFieldTable};
pub use trace::{ConcreteOperand, InstructionRecord, SymbolicTrace};

fn init() {
    utils::logging::init_logging();
    log_info!("Initializing the runtime collector");
}
