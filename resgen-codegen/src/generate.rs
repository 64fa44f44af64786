//! Writes method sets for the declarations of one package.

use crate::fields::ObjectRef;
use crate::gofile::GoFile;
use crate::matcher::ObjectMatcher;
use crate::method::{MethodSet, defined_outside};
use crate::sink::OutputSink;
use resgen_schema::{Package, TypeGraph};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// Writes a method set for every matching declaration of a package into a
/// single file.
#[derive(Debug, Clone)]
pub struct MethodWriter {
    header: String,
    aliases: BTreeMap<String, String>,
    matcher: ObjectMatcher,
}

impl MethodWriter {
    /// Creates a writer for declarations accepted by `matcher`.
    #[must_use]
    pub fn new(matcher: ObjectMatcher) -> Self {
        Self {
            header: String::new(),
            aliases: BTreeMap::new(),
            matcher,
        }
    }

    /// Sets the header placed at the top of the file.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Sets preferred import aliases by import path.
    #[must_use]
    pub fn with_import_aliases(mut self, aliases: BTreeMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Builds the output unit for `pkg` without writing it.
    ///
    /// Exported declarations are visited in name order. Methods already
    /// declared outside `path` are left out.
    #[must_use]
    pub fn build(&self, graph: &TypeGraph, pkg: &Package, methods: &MethodSet, path: &Path) -> GoFile {
        let mut file = GoFile::new(&pkg.name, &pkg.path)
            .with_header(&self.header)
            .with_import_aliases(&self.aliases);
        let filter = defined_outside(path);

        for decl in pkg.exported_declarations() {
            let obj = ObjectRef::new(decl, graph);
            if !self.matcher.matches(obj) {
                continue;
            }
            let written = methods.write(&mut file, obj, &filter);
            tracing::debug!("{}.{}: {} method(s)", pkg.path, decl.name, written);
        }

        file
    }

    /// Builds the output unit for `pkg` and hands it to `sink`.
    ///
    /// Returns false, writing nothing, when no method was generated.
    ///
    /// # Errors
    /// Returns the sink's IO error.
    pub fn write(
        &self,
        graph: &TypeGraph,
        pkg: &Package,
        methods: &MethodSet,
        path: &Path,
        sink: &mut dyn OutputSink,
    ) -> io::Result<bool> {
        let file = self.build(graph, pkg, methods, path);
        if file.is_empty() {
            return Ok(false);
        }
        sink.write(&file, path)?;
        Ok(true)
    }
}
