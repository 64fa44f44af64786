//! # resgen
//!
//! Generates Go accessor method sets for resource-shaped declarations.
//!
//! resgen reads a declaration document describing Go packages, recognizes
//! declarations shaped like managed resources, managed resource lists,
//! target configs, target config usages and target config usage lists, and
//! writes the boilerplate methods those types need next to them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use resgen::prelude::*;
//!
//! let config = RunConfig::new("declarations.xml", "example.com/apis/...");
//! let report = resgen::run(&config)?;
//! println!("wrote {} files", report.written.len());
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Declaration graph, document loading and package selection
//! - [`codegen`] - Shape matching, method templates and file generation

pub mod config;
pub mod prelude;

/// Declaration graph, document loading and package selection.
pub mod schema {
    pub use resgen_schema::*;
}

/// Shape matching, method templates and file generation.
pub mod codegen {
    pub use resgen_codegen::*;
}

pub use config::RunConfig;

use anyhow::{Context, Result};
use resgen_codegen::{FileSink, GenerationReport, GeneratorConfig, generate_methodsets, read_header};
use resgen_schema::XmlDeclarationSource;

/// Runs method set generation as described by `config`, writing files to
/// the package directories named in the declaration document.
///
/// # Errors
/// Returns an error if the header cannot be read, the declarations cannot
/// be loaded, or a file cannot be written.
pub fn run(config: &RunConfig) -> Result<GenerationReport> {
    tracing::info!("resgen started");

    let header = read_header(config.header_file.as_deref())?;
    let source = XmlDeclarationSource::File(config.input.clone());
    let generator_config = GeneratorConfig {
        header,
        filenames: config.filenames.clone(),
        strict: config.strict,
        ..GeneratorConfig::default()
    };

    let mut sink = match &config.output_root {
        Some(root) => FileSink::with_root(root),
        None => FileSink::new(),
    };
    let report = generate_methodsets(&source, &config.pattern, generator_config, &mut sink)
        .with_context(|| format!("cannot generate method sets for {}", config.pattern))?;

    tracing::info!("resgen finished");
    Ok(report)
}
