//! Declaration graph type definitions.
//!
//! This module contains the data structures describing a loaded package
//! unit: its declarations, their fields and type references, the comment
//! text attached to them and the methods already declared on them.

use crate::error::ParseError;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Predeclared Go identifiers that never name a package-level declaration.
const PREDECLARED: &[&str] = &[
    "any",
    "bool",
    "byte",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// Fully-qualified name of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Import path of the declaring package. Empty until resolved.
    pub package: String,
    /// Type name.
    pub name: String,
}

impl QualifiedName {
    /// Creates a qualified name.
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Parses `import/path.Name` or a bare `Name`.
    ///
    /// The qualifier is everything before the last `.` that follows the
    /// last `/`, so dotted host names in the import path are preserved.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let tail_start = s.rfind('/').map_or(0, |i| i + 1);
        let (package, name) = match s[tail_start..].rfind('.') {
            Some(dot) => {
                let split = tail_start + dot;
                (&s[..split], &s[split + 1..])
            }
            None if tail_start == 0 => ("", s),
            None => return None,
        };

        if !is_identifier(name) {
            return None;
        }

        Some(Self::new(package, name))
    }

    /// Returns true if the name carries a package import path.
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        !self.package.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// Reference to a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Predeclared type such as `bool` or `int64`.
    Basic(String),
    /// Named type declared in some package.
    Named(QualifiedName),
    /// Pointer to another type.
    Pointer(Box<TypeRef>),
    /// Slice of another type.
    Slice(Box<TypeRef>),
    /// Fixed-length array of another type.
    Array(usize, Box<TypeRef>),
    /// Map from key type to value type.
    Map(Box<TypeRef>, Box<TypeRef>),
}

impl TypeRef {
    /// Parses a Go type expression.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidType` if the expression is malformed.
    pub fn parse(expr: &str) -> Result<Self, ParseError> {
        let s = expr.trim();
        if s.is_empty() {
            return Err(ParseError::invalid_type(expr, "empty type expression"));
        }

        if let Some(rest) = s.strip_prefix('*') {
            return Ok(Self::Pointer(Box::new(Self::parse(rest)?)));
        }
        if let Some(rest) = s.strip_prefix("[]") {
            return Ok(Self::Slice(Box::new(Self::parse(rest)?)));
        }
        if let Some(rest) = s.strip_prefix("map[") {
            let close = matching_bracket(rest)
                .ok_or_else(|| ParseError::invalid_type(expr, "unterminated map key"))?;
            let key = Self::parse(&rest[..close])?;
            let value = Self::parse(&rest[close + 1..])?;
            return Ok(Self::Map(Box::new(key), Box::new(value)));
        }
        if let Some(rest) = s.strip_prefix('[') {
            let close = rest
                .find(']')
                .ok_or_else(|| ParseError::invalid_type(expr, "unterminated array length"))?;
            let len = rest[..close]
                .trim()
                .parse()
                .map_err(|_| ParseError::invalid_type(expr, "array length is not a number"))?;
            return Ok(Self::Array(len, Box::new(Self::parse(&rest[close + 1..])?)));
        }

        if PREDECLARED.contains(&s) {
            return Ok(Self::Basic(s.to_string()));
        }

        QualifiedName::parse(s)
            .map(Self::Named)
            .ok_or_else(|| ParseError::invalid_type(expr, "not a type name"))
    }

    /// Returns true for slices and arrays.
    #[must_use]
    pub fn is_slice(&self) -> bool {
        matches!(self, Self::Slice(_) | Self::Array(..))
    }

    /// Returns the element type of a pointer, slice or array.
    #[must_use]
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            Self::Pointer(elem) | Self::Slice(elem) | Self::Array(_, elem) => Some(elem),
            _ => None,
        }
    }

    /// Returns the name this reference denotes once pointers, slices and
    /// arrays are stripped.
    #[must_use]
    pub fn base_name(&self) -> Option<&QualifiedName> {
        match self {
            Self::Named(name) => Some(name),
            Self::Pointer(elem) | Self::Slice(elem) | Self::Array(_, elem) => elem.base_name(),
            _ => None,
        }
    }

    /// Qualifies every bare name in this reference with `package`.
    pub fn qualify(&mut self, package: &str) {
        match self {
            Self::Basic(_) => {}
            Self::Named(name) => {
                if !name.is_qualified() {
                    name.package = package.to_string();
                }
            }
            Self::Pointer(elem) | Self::Slice(elem) | Self::Array(_, elem) => elem.qualify(package),
            Self::Map(key, value) => {
                key.qualify(package);
                value.qualify(package);
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(name) => write!(f, "{}", name),
            Self::Named(name) => write!(f, "{}", name),
            Self::Pointer(elem) => write!(f, "*{}", elem),
            Self::Slice(elem) => write!(f, "[]{}", elem),
            Self::Array(len, elem) => write!(f, "[{}]{}", len, elem),
            Self::Map(key, value) => write!(f, "map[{}]{}", key, value),
        }
    }
}

/// Returns the index of the `]` closing an already-opened `[`.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Returns true if `s` is a valid Go identifier.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Field of a struct declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name. For embedded fields this is the bare type name.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    /// Whether the field is embedded.
    pub embedded: bool,
}

impl Field {
    /// Creates a named field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
        }
    }

    /// Creates an embedded field named after its type.
    ///
    /// Returns `None` if the type does not denote a named type.
    #[must_use]
    pub fn embedded(ty: TypeRef) -> Option<Self> {
        let name = ty.base_name()?.name.clone();
        Some(Self {
            name,
            ty,
            embedded: true,
        })
    }

    /// Returns true if the field is a slice or array.
    #[must_use]
    pub fn is_slice(&self) -> bool {
        self.ty.is_slice()
    }
}

/// Method already declared on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Source file holding the method.
    pub file: PathBuf,
}

impl MethodDecl {
    /// Creates a method declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

/// Shape of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    /// Struct with an ordered field list.
    Struct(Vec<Field>),
    /// Any other named type, described by its underlying type.
    Other(TypeRef),
}

/// Named type declaration within a package.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Declaration name, unique within its package.
    pub name: String,
    /// Import path of the declaring package.
    pub package: String,
    /// Source file holding the declaration.
    pub file: PathBuf,
    /// Declaration shape.
    pub kind: DeclKind,
    /// Comment attached directly to the declaration.
    pub doc: String,
    /// Comment immediately preceding the declaration.
    pub before: String,
    /// Methods declared on the type (or its pointer).
    pub methods: Vec<MethodDecl>,
}

impl Declaration {
    /// Creates a struct declaration with no fields.
    #[must_use]
    pub fn new_struct(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            package: String::new(),
            file: file.into(),
            kind: DeclKind::Struct(Vec::new()),
            doc: String::new(),
            before: String::new(),
            methods: Vec::new(),
        }
    }

    /// Creates a non-struct declaration with the given underlying type.
    #[must_use]
    pub fn new_other(name: impl Into<String>, file: impl Into<PathBuf>, underlying: TypeRef) -> Self {
        Self {
            kind: DeclKind::Other(underlying),
            ..Self::new_struct(name, file)
        }
    }

    /// Adds a field. Has no effect on non-struct declarations.
    pub fn add_field(&mut self, field: Field) {
        if let DeclKind::Struct(fields) = &mut self.kind {
            fields.push(field);
        }
    }

    /// Adds a method declaration.
    pub fn add_method(&mut self, method: MethodDecl) {
        self.methods.push(method);
    }

    /// Returns the struct fields, or an empty slice for non-struct types.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            DeclKind::Struct(fields) => fields,
            DeclKind::Other(_) => &[],
        }
    }

    /// Returns true if the declaration is a struct.
    #[must_use]
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, DeclKind::Struct(_))
    }

    /// Returns true if the declaration is visible outside its package.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }

    /// Returns the fully-qualified name of the declaration.
    #[must_use]
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.package.clone(), self.name.clone())
    }
}

/// A package unit: one import path and its declarations.
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name used in the `package` clause.
    pub name: String,
    /// Import path.
    pub path: String,
    /// Directory generated files are written to.
    pub dir: PathBuf,
    /// Declarations in document order.
    pub declarations: Vec<Declaration>,
    /// Declaration lookup map.
    decl_map: HashMap<String, usize>,
}

impl Package {
    /// Creates a new empty package.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            dir: dir.into(),
            declarations: Vec::new(),
            decl_map: HashMap::new(),
        }
    }

    /// Adds a declaration, stamping it with this package's path and
    /// qualifying its bare type references.
    ///
    /// # Errors
    /// Returns `ParseError::DuplicateDefinition` if the name is taken.
    pub fn add_declaration(&mut self, mut decl: Declaration) -> Result<(), ParseError> {
        if self.decl_map.contains_key(&decl.name) {
            return Err(ParseError::duplicate(
                "declaration",
                format!("{}.{}", self.path, decl.name),
            ));
        }

        decl.package = self.path.clone();
        match &mut decl.kind {
            DeclKind::Struct(fields) => {
                for field in fields {
                    field.ty.qualify(&self.path);
                }
            }
            DeclKind::Other(underlying) => underlying.qualify(&self.path),
        }

        self.decl_map
            .insert(decl.name.clone(), self.declarations.len());
        self.declarations.push(decl);
        Ok(())
    }

    /// Looks up a declaration by name.
    #[must_use]
    pub fn get_declaration(&self, name: &str) -> Option<&Declaration> {
        self.decl_map.get(name).map(|&idx| &self.declarations[idx])
    }

    /// Returns exported declarations sorted by name.
    #[must_use]
    pub fn exported_declarations(&self) -> Vec<&Declaration> {
        let mut decls: Vec<_> = self
            .declarations
            .iter()
            .filter(|d| d.is_exported())
            .collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        decls
    }
}
