use std::{cell::RefCell, sync::OnceLock};

use common::log_info;

use crate::{collector::Collector, error::Result, flow::ThreadCollector};

static COLLECTOR: OnceLock<Collector> = OnceLock::new();

thread_local! {
    // Call stacks and instruction state are per thread and must not be shared.
    static ENGINE: RefCell<Option<ThreadCollector>> = const { RefCell::new(None) };
}

pub(super) fn init_collector() -> &'static Collector {
    COLLECTOR.get_or_init(|| {
        crate::init();
        let collector = Collector::from_env().expect("Failed to load config");
        log_info!("Runtime collector initialized");
        collector
    })
}

/// Runs the action on the current thread's engine, creating it on first use.
/// Integrity violations are fatal: the instrumentation and the collector
/// are out of sync and every further record would be unreliable.
pub(super) fn perform_on_engine<T>(action: impl FnOnce(&mut ThreadCollector) -> Result<T>) -> T {
    ENGINE.with_borrow_mut(|engine| {
        let engine = engine.get_or_insert_with(|| init_collector().thread());
        action(engine).unwrap_or_else(|e| panic!("Collector integrity violation: {e}"))
    })
}
