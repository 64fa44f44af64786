//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use resgen::prelude::*;
//! ```

pub use crate::config::RunConfig;

// Declaration graph
pub use resgen_schema::{
    DeclarationSource, Declaration, Field, LoadedPackages, Package, PackagePattern, QualifiedName,
    SchemaError, TypeGraph, TypeRef, XmlDeclarationSource,
};

// Generation
pub use resgen_codegen::{
    Category, CodegenError, FieldMatcher, FileSink, Filenames, GenerationReport, Generator,
    GeneratorConfig, MemorySink, MethodSet, ObjectMatcher, OutputSink, Vocabulary,
};
