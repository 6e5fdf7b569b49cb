use std::sync::Arc;

use common::log_info;

use crate::{
    config::{self, CollectorConfig},
    flow::ThreadCollector,
    heap::{ShadowHeap, StaticFieldTable},
};

/// The section of the collector state shared by all target threads.
pub(crate) struct SharedState {
    pub(crate) heap: ShadowHeap,
    pub(crate) statics: StaticFieldTable,
    pub(crate) config: CollectorConfig,
}

/// The process-wide collector.
/// Constructed once when the target process starts and handed to every thread,
/// each of which gets its own [`ThreadCollector`].
#[derive(Clone)]
pub struct Collector {
    shared: Arc<SharedState>,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        log_info!("Initializing collector");
        let shared = SharedState {
            heap: ShadowHeap::new(&config.heap),
            statics: StaticFieldTable::new(&config.heap),
            config,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Creates the collector with the configuration loaded from the file and
    /// environment sources.
    pub fn from_env() -> Result<Self, ::config::ConfigError> {
        config::load_config().map(Self::new)
    }

    /// Creates the state for the current thread.
    pub fn thread(&self) -> ThreadCollector {
        let current = std::thread::current();
        let name = current
            .name()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("{:?}", current.id()));
        self.thread_named(&name)
    }

    /// Creates the state for a thread with the given name.
    /// The name only distinguishes the thread's outputs.
    pub fn thread_named(&self, name: &str) -> ThreadCollector {
        ThreadCollector::new(self.shared.clone(), name)
    }

    pub fn heap(&self) -> &ShadowHeap {
        &self.shared.heap
    }

    pub fn statics(&self) -> &StaticFieldTable {
        &self.shared.statics
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.shared.config
    }

    /// Forgets all the shared shadow state, e.g., between two executions of the target.
    /// Thread states are reset separately.
    pub fn reset_shared(&self) {
        self.shared.heap.clear();
        self.shared.statics.clear();
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}
