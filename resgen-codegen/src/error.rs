//! Error types for method set generation.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Declaration loading error.
    #[error("cannot load packages: {0}")]
    Schema(#[from] resgen_schema::SchemaError),

    /// The configured header file could not be read.
    #[error("cannot read header file {}: {source}", path.display())]
    Header {
        /// Header file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A method name was registered twice in one method set.
    #[error("duplicate method '{name}' in method set")]
    DuplicateMethod {
        /// Method name.
        name: String,
    },

    /// A generated file could not be written.
    #[error("cannot write {category} method set for package {package} to {}: {source}", path.display())]
    Write {
        /// Category name.
        category: String,
        /// Package import path.
        package: String,
        /// Destination path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A declaration matched more than one category in strict mode.
    #[error("declaration {declaration} matches more than one category: {}", categories.join(", "))]
    CategoryOverlap {
        /// Qualified declaration name.
        declaration: String,
        /// Names of the matching categories.
        categories: Vec<String>,
    },
}

impl CodegenError {
    /// Creates a duplicate method error.
    pub fn duplicate_method(name: impl Into<String>) -> Self {
        Self::DuplicateMethod { name: name.into() }
    }
}
