//! Run configuration.

use resgen_codegen::Filenames;
use std::path::{Path, PathBuf};

/// Everything a generation run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Declaration document to load.
    pub input: PathBuf,
    /// Package selection pattern.
    pub pattern: String,
    /// File whose content heads every generated file.
    pub header_file: Option<PathBuf>,
    /// Output filename per category.
    pub filenames: Filenames,
    /// Fail when a declaration matches more than one category.
    pub strict: bool,
    /// Directory package directories are resolved against. Defaults to the
    /// working directory.
    pub output_root: Option<PathBuf>,
}

impl RunConfig {
    /// Creates a configuration with default filenames and no header.
    #[must_use]
    pub fn new(input: impl AsRef<Path>, pattern: impl Into<String>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            pattern: pattern.into(),
            header_file: None,
            filenames: Filenames::default(),
            strict: false,
            output_root: None,
        }
    }
}
