//! Field predicates.
//!
//! Resource shapes are recognized structurally: a declaration is a managed
//! resource because of the fields it has, not because it says so. This
//! module holds the composable field predicates those recognizers are built
//! from.

use resgen_schema::{Declaration, Field, QualifiedName, TypeGraph};
use std::fmt;
use std::sync::Arc;

/// Conventional name of the desired state field.
pub const NAME_SPEC: &str = "Spec";
/// Conventional name of the observed state field.
pub const NAME_STATUS: &str = "Status";
/// Conventional name of a list's element field.
pub const NAME_ITEMS: &str = "Items";

/// Import path of the Kubernetes apimachinery metadata package.
pub const IMPORT_META: &str = "k8s.io/apimachinery/pkg/apis/meta/v1";
/// Import path of the runtime's common API types.
pub const IMPORT_RUNTIME: &str = "github.com/netw-device-driver/ndd-runtime/apis/common/v1";

/// Qualified names of the framework base types resource shapes embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Kubernetes type metadata.
    pub type_meta: QualifiedName,
    /// Kubernetes object metadata.
    pub object_meta: QualifiedName,
    /// Common managed resource spec.
    pub resource_spec: QualifiedName,
    /// Common managed resource status.
    pub resource_status: QualifiedName,
    /// Common target config status.
    pub target_config_status: QualifiedName,
    /// Common target config usage.
    pub target_config_usage: QualifiedName,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            type_meta: QualifiedName::new(IMPORT_META, "TypeMeta"),
            object_meta: QualifiedName::new(IMPORT_META, "ObjectMeta"),
            resource_spec: QualifiedName::new(IMPORT_RUNTIME, "ResourceSpec"),
            resource_status: QualifiedName::new(IMPORT_RUNTIME, "ResourceStatus"),
            target_config_status: QualifiedName::new(IMPORT_RUNTIME, "TargetConfigStatus"),
            target_config_usage: QualifiedName::new(IMPORT_RUNTIME, "TargetConfigUsage"),
        }
    }
}

/// A field under test, together with the graph it can be resolved in.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    /// The field.
    pub field: &'a Field,
    /// Graph used to resolve the field's type.
    pub graph: &'a TypeGraph,
}

/// A declaration under test, together with the graph it lives in.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef<'a> {
    /// The declaration.
    pub decl: &'a Declaration,
    /// Graph used to resolve field types.
    pub graph: &'a TypeGraph,
}

impl<'a> ObjectRef<'a> {
    /// Creates a declaration view.
    #[must_use]
    pub fn new(decl: &'a Declaration, graph: &'a TypeGraph) -> Self {
        Self { decl, graph }
    }

    /// Iterates the declaration's direct fields.
    pub fn fields(self) -> impl Iterator<Item = FieldRef<'a>> {
        let graph = self.graph;
        self.decl
            .fields()
            .iter()
            .map(move |field| FieldRef { field, graph })
    }
}

/// A predicate over a single field.
#[derive(Clone)]
pub struct FieldMatcher(Arc<dyn Fn(FieldRef<'_>) -> bool + Send + Sync>);

impl FieldMatcher {
    /// Wraps a closure as a matcher.
    pub fn new(f: impl Fn(FieldRef<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluates the matcher.
    #[must_use]
    pub fn matches(&self, field: FieldRef<'_>) -> bool {
        (self.0)(field)
    }

    /// Returns a matcher that is true when both matchers are. The second
    /// matcher is not evaluated when the first fails.
    #[must_use]
    pub fn and(self, other: FieldMatcher) -> FieldMatcher {
        FieldMatcher::new(move |f| self.matches(f) && other.matches(f))
    }
}

impl fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldMatcher")
    }
}

/// Returns true if, for every matcher, at least one of the declaration's
/// direct fields satisfies it.
#[must_use]
pub fn has(obj: ObjectRef<'_>, matchers: &[FieldMatcher]) -> bool {
    matchers
        .iter()
        .all(|m| obj.fields().any(|f| m.matches(f)))
}

/// Matches embedded fields.
#[must_use]
pub fn is_embedded() -> FieldMatcher {
    FieldMatcher::new(|f| f.field.embedded)
}

/// Matches fields with the given name.
#[must_use]
pub fn is_named(name: &str) -> FieldMatcher {
    let name = name.to_string();
    FieldMatcher::new(move |f| f.field.name == name)
}

/// Matches slice and array fields.
#[must_use]
pub fn is_slice() -> FieldMatcher {
    FieldMatcher::new(|f| f.field.is_slice())
}

/// Matches fields whose type (or element type) is exactly `name`.
#[must_use]
pub fn is_type_named(name: QualifiedName) -> FieldMatcher {
    FieldMatcher::new(move |f| f.field.ty.base_name() == Some(&name))
}

/// Matches fields whose type resolves to a struct having, for every
/// supplied matcher, a field satisfying it.
///
/// Descends exactly one level, through pointers, slices and arrays. Types
/// that are not loaded or not structs never match.
#[must_use]
pub fn has_field_that(matchers: Vec<FieldMatcher>) -> FieldMatcher {
    FieldMatcher::new(move |f| match f.graph.resolve(&f.field.ty) {
        Some(decl) if decl.is_struct() => has(ObjectRef::new(decl, f.graph), &matchers),
        _ => false,
    })
}

/// Matches the Kubernetes type metadata field type.
#[must_use]
pub fn is_type_meta(v: &Vocabulary) -> FieldMatcher {
    is_type_named(v.type_meta.clone())
}

/// Matches the Kubernetes object metadata field type.
#[must_use]
pub fn is_object_meta(v: &Vocabulary) -> FieldMatcher {
    is_type_named(v.object_meta.clone())
}

/// Matches the common resource spec type.
#[must_use]
pub fn is_resource_spec(v: &Vocabulary) -> FieldMatcher {
    is_type_named(v.resource_spec.clone())
}

/// Matches the common resource status type.
#[must_use]
pub fn is_resource_status(v: &Vocabulary) -> FieldMatcher {
    is_type_named(v.resource_status.clone())
}

/// Matches the common target config status type.
#[must_use]
pub fn is_target_config_status(v: &Vocabulary) -> FieldMatcher {
    is_type_named(v.target_config_status.clone())
}

/// Matches the common target config usage type.
#[must_use]
pub fn is_target_config_usage(v: &Vocabulary) -> FieldMatcher {
    is_type_named(v.target_config_usage.clone())
}

/// Matches a field named `Spec`.
#[must_use]
pub fn is_spec() -> FieldMatcher {
    is_named(NAME_SPEC)
}

/// Matches a field named `Status`.
#[must_use]
pub fn is_status() -> FieldMatcher {
    is_named(NAME_STATUS)
}

/// Matches a field named `Items`.
#[must_use]
pub fn is_items() -> FieldMatcher {
    is_named(NAME_ITEMS)
}
