//! Output sinks for generated files.

use crate::gofile::GoFile;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Destination for rendered output units.
pub trait OutputSink {
    /// Writes `file` to `path`, replacing any previous content.
    ///
    /// # Errors
    /// Returns the underlying IO error if the file cannot be written.
    fn write(&mut self, file: &GoFile, path: &Path) -> io::Result<()>;
}

/// Writes generated files to the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    root: Option<PathBuf>,
}

impl FileSink {
    /// Creates a sink resolving relative paths against the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink resolving relative paths against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => path.to_path_buf(),
        }
    }
}

impl OutputSink for FileSink {
    fn write(&mut self, file: &GoFile, path: &Path) -> io::Result<()> {
        let path = self.resolve(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, file.render())?;
        tracing::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Keeps rendered files in memory, keyed by destination path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the content written to `path`, if any.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Returns every written file by path.
    #[must_use]
    pub fn files(&self) -> &BTreeMap<PathBuf, String> {
        &self.files
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, file: &GoFile, path: &Path) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), file.render());
        Ok(())
    }
}
