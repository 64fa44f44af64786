//! # resgen Codegen
//!
//! Method set generation for resource-shaped declarations.
//!
//! This crate provides:
//! - Composable field and declaration matchers
//! - Comment marker parsing
//! - Method templates and ordered method sets
//! - Go file assembly and output sinks
//! - Per-category generation over loaded packages

pub mod category;
pub mod error;
pub mod fields;
pub mod generate;
pub mod generator;
pub mod gofile;
pub mod markers;
pub mod matcher;
pub mod method;
pub mod sink;

#[cfg(test)]
pub(crate) mod fixtures;

pub use category::Category;
pub use error::CodegenError;
pub use fields::{FieldMatcher, ObjectRef, Vocabulary};
pub use generate::MethodWriter;
pub use generator::{Filenames, GenerationReport, Generator, GeneratorConfig, read_header};
pub use gofile::{GoFile, GoMethod};
pub use markers::{DISABLE_MARKER, LEGACY_DISABLE_MARKER, Markers};
pub use matcher::ObjectMatcher;
pub use method::{Filter, MethodSet, NewMethod, defined_outside};
pub use sink::{FileSink, MemorySink, OutputSink};

use resgen_schema::DeclarationSource;

/// Loads `pattern` from `source` and generates every category into `sink`.
///
/// # Errors
/// Returns `CodegenError` if loading, configuration or writing fails.
pub fn generate_methodsets(
    source: &dyn DeclarationSource,
    pattern: &str,
    config: GeneratorConfig,
    sink: &mut dyn OutputSink,
) -> Result<GenerationReport, CodegenError> {
    let generator = Generator::new(config)?;
    let loaded = source.load(pattern)?;
    generator.generate(&loaded, sink)
}
