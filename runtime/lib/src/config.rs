use core::num::NonZero;

use serde::Deserialize;

use common::{log_debug, log_warn};

pub use crate::utils::file::{FileFormat, FileGenConfig};

pub(crate) const CONFIG_FILENAME: &str = "collector_config";
pub(crate) const CONFIG_ENV_PREFIX: &str = "COLLECTOR";

impl TryFrom<::config::Config> for CollectorConfig {
    type Error = ::config::ConfigError;

    fn try_from(value: ::config::Config) -> Result<Self, Self::Error> {
        let config: CollectorConfig = value.try_deserialize()?;
        log_debug!("Loaded configurations: {:?}", config);

        if !config.heap.skip_concrete_allocation {
            log_warn!(
                "Allocating shadow heap entries for concrete writes. The shadow heap will grow with every written object."
            );
        }

        Ok(config)
    }
}

pub(crate) fn load_config() -> Result<CollectorConfig, ::config::ConfigError> {
    common::config::load_config(CONFIG_FILENAME, CONFIG_ENV_PREFIX, Ok)
        .and_then(CollectorConfig::try_from)
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default)]
    pub heap: HeapConfig,

    #[serde(default)]
    pub stack: StackConfig,

    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeapConfig {
    /// Skips creating an entry when a concrete value is written to an object
    /// that has no entry yet. Absence already means concrete.
    #[serde(default = "default_skip_concrete_allocation")]
    pub skip_concrete_allocation: bool,
    /// Element indices below this limit are kept in a dense buffer per object,
    /// the rest in a sparse map.
    #[serde(default = "default_dense_elements_limit")]
    pub dense_elements_limit: u32,
    /// The number of shards of the shadow heap and the static field table.
    /// Must be a power of two. Defaults to the choice of the map implementation.
    #[serde(default)]
    pub shards: Option<NonZero<usize>>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            skip_concrete_allocation: default_skip_concrete_allocation(),
            dense_elements_limit: default_dense_elements_limit(),
            shards: None,
        }
    }
}

fn default_skip_concrete_allocation() -> bool {
    true
}

fn default_dense_elements_limit() -> u32 {
    1 << 16
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceConfig {
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Streams every appended instruction record to a per-thread file.
    #[serde(default)]
    pub dump: Option<OutputConfig>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            dump: None,
        }
    }
}

fn default_initial_capacity() -> usize {
    32
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum OutputConfig {
    File(FileGenConfig),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> CollectorConfig {
        let raw = ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()
            .unwrap();
        CollectorConfig::try_from(raw).unwrap()
    }

    #[test]
    fn empty_source_gives_defaults() {
        let config = parse("");
        assert!(config.heap.skip_concrete_allocation);
        assert_eq!(config.heap.dense_elements_limit, 1 << 16);
        assert_eq!(config.stack.initial_capacity, 32);
        assert!(config.trace.dump.is_none());
    }

    #[test]
    fn dump_output_is_parsed() {
        let config = parse(
            r#"
            [heap]
            shards = 8

            [trace.dump]
            type = "file"
            directory = "out"
            format = "txt"
            "#,
        );
        assert_eq!(config.heap.shards.map(NonZero::get), Some(8));
        let Some(OutputConfig::File(file)) = config.trace.dump else {
            panic!("Expected a file output");
        };
        assert_eq!(file.format, FileFormat::Text);
        assert_eq!(file.directory.as_deref(), Some(std::path::Path::new("out")));
    }
}
