use std::{env, format, string::ToString};

use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, FileStoredFormat,
    builder::DefaultState,
};

use crate::{log_debug, log_warn};

pub const CONFIG_STR: &str = "CONFIG_STR";
pub const CONFIG_STR_FORMAT: &str = "CONFIG_STR_FMT";

type Builder = ConfigBuilder<DefaultState>;

/// Loads the layered configuration.
/// Sources in the increasing order of precedence:
/// - The file whose name starts with `file_name` in the current directory or its ancestors.
/// - The inline string in `{env_prefix}_CONFIG_STR` with its format in `{env_prefix}_CONFIG_STR_FMT`.
/// - Environment variables prefixed with `{env_prefix}_`, nested keys separated by `__`.
pub fn load_config(
    file_name: &str,
    env_prefix: &str,
    config_builder: impl FnOnce(Builder) -> Result<Builder, ConfigError>,
) -> Result<Config, ConfigError> {
    let mut builder = config_builder(Config::builder())?;
    builder = add_file_source(builder, file_name);
    builder = add_inline_source(builder, env_prefix);
    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__"),
    );

    builder
        .build()
        .inspect(|c| log_debug!("Loaded raw configurations: {:?}", c))
}

fn add_file_source(builder: Builder, file_name: &str) -> Builder {
    let path = crate::utils::search_current_ancestor_dirs_for(file_name)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    builder.add_source(File::with_name(&path).required(false))
}

fn add_inline_source(builder: Builder, env_prefix: &str) -> Builder {
    let Some((content, format)) = Option::zip(
        env::var(format!("{env_prefix}_{CONFIG_STR}")).ok(),
        env::var(format!("{env_prefix}_{CONFIG_STR_FORMAT}")).ok(),
    ) else {
        return builder;
    };

    match try_parse_format(&format) {
        Ok(format) => builder.add_source(File::from_str(content.as_str(), format)),
        Err(format) => {
            log_warn!("Unknown format for config string: {}", format);
            builder
        }
    }
}

fn try_parse_format(format: &str) -> Result<FileFormat, &str> {
    use FileFormat::*;
    let all_formats = [Toml, Json, Json5, Yaml, Ron, Ini];
    all_formats
        .into_iter()
        .find(|f| f.file_extensions().contains(&format))
        .ok_or(format)
}
