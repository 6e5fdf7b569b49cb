use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileGenConfig {
    /// The folder to write file outputs to.
    /// Defaults to the current working directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// The format to write the file outputs in.
    #[serde(default)]
    pub format: FileFormat,
    /// The prefix to use for the name of the output files.
    #[serde(default)]
    pub prefix: Option<String>,
    /// The extension to use for the name of the output files.
    #[serde(default)]
    pub extension: Option<String>,
}

impl FileGenConfig {
    pub(crate) fn dir_or_default(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// # Remarks
    /// The name is appended to the prefix, so that multiple outputs of the same
    /// kind (e.g., one per thread) end up next to each other.
    pub(crate) fn file_path(&self, default_prefix: &str, name: &str) -> PathBuf {
        let prefix = self.prefix.as_deref().unwrap_or(default_prefix);
        self.dir_or_default()
            .join(format!("{prefix}{name}"))
            .with_extension(self.extension_or_default())
    }

    #[tracing::instrument(level = "debug")]
    pub(crate) fn create(&self, default_prefix: &str, name: &str) -> io::Result<(PathBuf, fs::File)> {
        let dir = self.dir_or_default();
        fs::create_dir_all(&dir)?;
        let path = self.file_path(default_prefix, name);
        let file = create_truncated(&path)?;
        Ok((path, file))
    }

    pub(crate) fn extension_or_default(&self) -> &str {
        self.extension
            .as_deref()
            .unwrap_or_else(|| self.format.default_extension())
    }
}

fn create_truncated(path: &Path) -> io::Result<fs::File> {
    fs::File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    #[serde(alias = "txt")]
    Text,
    #[default]
    #[serde(alias = "jsonl")]
    JsonLines,
}

impl FileFormat {
    pub(crate) fn default_extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::JsonLines => "jsonl",
        }
    }
}
