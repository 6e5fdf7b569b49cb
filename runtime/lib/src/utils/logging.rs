use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use common::{log_debug, log_warn};

use crate::config::CONFIG_ENV_PREFIX;

const ENV_LOG: &str = const_format::concatcp!(CONFIG_ENV_PREFIX, "_LOG");

static INIT: Once = Once::new();

/// Installs the global subscriber once per process.
/// A host that has already installed its own subscriber keeps it.
pub(crate) fn init_logging() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::builder()
            .with_env_var(ENV_LOG)
            .from_env_lossy();

        let tree_layer = tracing_tree::HierarchicalLayer::new(2)
            .with_writer(std::io::stderr)
            .with_targets(true)
            .with_bracketed_fields(true);

        let result = tracing_subscriber::registry()
            .with(env_filter)
            .with(tree_layer)
            .try_init();

        match result {
            Ok(()) => log_debug!("Logging initialized"),
            Err(err) => log_warn!("Using the existing global subscriber: {}", err),
        }
    });
}
