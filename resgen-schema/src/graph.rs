//! Resolved declaration graph.
//!
//! This module ties every loaded package together so that type references
//! can be followed across package boundaries, and answers the method
//! inventory queries used to detect hand-written methods.

use crate::error::{ParseError, SchemaError};
use crate::types::{Declaration, MethodDecl, Package, QualifiedName, TypeRef};
use std::collections::{BTreeMap, HashMap, HashSet};

/// All packages of a loaded declaration document.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    packages: BTreeMap<String, Package>,
}

impl TypeGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a list of packages.
    ///
    /// # Errors
    /// Returns `ParseError::DuplicateDefinition` if two packages share an
    /// import path.
    pub fn from_packages(packages: Vec<Package>) -> Result<Self, ParseError> {
        let mut graph = Self::new();
        for pkg in packages {
            graph.add_package(pkg)?;
        }
        Ok(graph)
    }

    /// Adds a package to the graph.
    ///
    /// # Errors
    /// Returns `ParseError::DuplicateDefinition` if the import path is taken.
    pub fn add_package(&mut self, pkg: Package) -> Result<(), ParseError> {
        if self.packages.contains_key(&pkg.path) {
            return Err(ParseError::duplicate("package", pkg.path));
        }
        self.packages.insert(pkg.path.clone(), pkg);
        Ok(())
    }

    /// Gets a package by import path.
    #[must_use]
    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.get(path)
    }

    /// Iterates packages in import path order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Looks up a declaration by qualified name.
    #[must_use]
    pub fn lookup(&self, name: &QualifiedName) -> Option<&Declaration> {
        self.packages
            .get(&name.package)
            .and_then(|pkg| pkg.get_declaration(&name.name))
    }

    /// Resolves the declaration a type reference names, looking through
    /// pointers, slices and arrays.
    ///
    /// Returns `None` for basic types, maps and names whose package was
    /// not loaded.
    #[must_use]
    pub fn resolve(&self, ty: &TypeRef) -> Option<&Declaration> {
        ty.base_name().and_then(|name| self.lookup(name))
    }

    /// Returns the method inventory of a pointer to `decl`: its own methods
    /// plus methods promoted through embedded fields.
    ///
    /// Embedded types are visited breadth-first. A name found at a
    /// shallower depth hides the same name deeper down. A name declared by
    /// more than one type at the same depth is ambiguous: it is left out
    /// and still hides deeper declarations.
    #[must_use]
    pub fn method_set<'a>(&'a self, decl: &'a Declaration) -> Vec<&'a MethodDecl> {
        let mut methods = Vec::new();
        let mut shadowed: HashSet<&str> = HashSet::new();
        let mut visited: HashSet<QualifiedName> = HashSet::new();
        visited.insert(decl.qualified_name());

        let mut level = vec![decl];
        while !level.is_empty() {
            let mut found = Vec::new();
            let mut next = Vec::new();

            for &d in &level {
                for method in &d.methods {
                    if !shadowed.contains(method.name.as_str()) {
                        found.push(method);
                    }
                }
                for field in d.fields().iter().filter(|f| f.embedded) {
                    if let Some(embedded) = self.resolve(&field.ty) {
                        if visited.insert(embedded.qualified_name()) {
                            next.push(embedded);
                        }
                    }
                }
            }

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for &method in &found {
                *counts.entry(method.name.as_str()).or_default() += 1;
            }
            methods.extend(
                found
                    .iter()
                    .copied()
                    .filter(|m| counts.get(m.name.as_str()) == Some(&1)),
            );
            shadowed.extend(counts.into_keys());
            level = next;
        }

        methods
    }

    /// Checks that every same-package type reference resolves.
    ///
    /// References into packages that were not loaded are opaque and
    /// accepted as-is.
    ///
    /// # Errors
    /// Returns `SchemaError::UnresolvedType` for the first dangling reference.
    pub fn check_references(&self) -> Result<(), SchemaError> {
        for pkg in self.packages() {
            for decl in &pkg.declarations {
                for field in decl.fields() {
                    let Some(name) = field.ty.base_name() else {
                        continue;
                    };
                    if name.package == pkg.path && pkg.get_declaration(&name.name).is_none() {
                        return Err(SchemaError::UnresolvedType {
                            declaration: decl.qualified_name().to_string(),
                            field: field.name.clone(),
                            type_name: name.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
