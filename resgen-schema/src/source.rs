//! Declaration sources and package selection.

use crate::error::SchemaError;
use crate::graph::TypeGraph;
use crate::parser::{parse_declarations, parse_declarations_file};
use crate::types::Package;
use crate::validation::validate_graph;
use std::path::PathBuf;

/// Go-style package selection pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagePattern {
    /// Every package (`...` or `./...`).
    All,
    /// Exactly one import path.
    Exact(String),
    /// An import path and every package beneath it (`prefix/...`).
    Tree(String),
}

impl PackagePattern {
    /// Parses a selection pattern.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim().trim_end_matches('/');
        match pattern {
            "" | "..." | "./..." => Self::All,
            _ => match pattern.strip_suffix("/...") {
                Some(prefix) => Self::Tree(prefix.to_string()),
                None => Self::Exact(pattern.to_string()),
            },
        }
    }

    /// Returns true if the import path is selected.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(exact) => path == exact,
            Self::Tree(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// A loaded graph together with the packages selected for generation.
#[derive(Debug, Clone)]
pub struct LoadedPackages {
    /// Every loaded package, selected or not.
    pub graph: TypeGraph,
    /// Import paths of the selected packages, sorted.
    pub selected: Vec<String>,
}

impl LoadedPackages {
    /// Selects packages from a graph.
    ///
    /// # Errors
    /// Returns `SchemaError::NoPackages` if nothing matches.
    pub fn select(graph: TypeGraph, pattern: &str) -> Result<Self, SchemaError> {
        let matcher = PackagePattern::parse(pattern);
        let selected: Vec<String> = graph
            .packages()
            .filter(|p| matcher.matches(&p.path))
            .map(|p| p.path.clone())
            .collect();

        if selected.is_empty() {
            return Err(SchemaError::NoPackages {
                pattern: pattern.to_string(),
            });
        }

        tracing::debug!("pattern {} selected {} package(s)", pattern, selected.len());
        Ok(Self { graph, selected })
    }

    /// Iterates the selected packages in import path order.
    pub fn selected_packages(&self) -> impl Iterator<Item = &Package> {
        self.selected
            .iter()
            .filter_map(|path| self.graph.package(path))
    }
}

/// Supplies resolved declarations for a selection pattern.
pub trait DeclarationSource {
    /// Loads, validates and selects packages.
    ///
    /// # Errors
    /// Returns `SchemaError` if the input cannot be loaded or nothing matches.
    fn load(&self, pattern: &str) -> Result<LoadedPackages, SchemaError>;
}

/// Declaration source backed by an XML declaration document.
#[derive(Debug, Clone)]
pub enum XmlDeclarationSource {
    /// Document read from a file on every load.
    File(PathBuf),
    /// Document held in memory.
    Inline(String),
}

impl DeclarationSource for XmlDeclarationSource {
    fn load(&self, pattern: &str) -> Result<LoadedPackages, SchemaError> {
        let graph = match self {
            Self::File(path) => parse_declarations_file(path)?,
            Self::Inline(xml) => parse_declarations(xml)?,
        };
        validate_graph(&graph)?;
        LoadedPackages::select(graph, pattern)
    }
}
