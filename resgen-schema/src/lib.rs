//! # resgen Schema
//!
//! Declaration graph model and loader.
//!
//! This crate provides:
//! - Type definitions for packages, declarations, fields and type references
//! - Go type expression parsing
//! - XML declaration document parsing
//! - Graph resolution, method inventories and validation
//! - Package selection by Go-style patterns

pub mod error;
pub mod graph;
pub mod parser;
pub mod source;
pub mod types;
pub mod validation;

pub use error::{ParseError, SchemaError};
pub use graph::TypeGraph;
pub use parser::{parse_declarations, parse_declarations_file};
pub use source::{DeclarationSource, LoadedPackages, PackagePattern, XmlDeclarationSource};
pub use types::{DeclKind, Declaration, Field, MethodDecl, Package, QualifiedName, TypeRef};
pub use validation::validate_graph;
