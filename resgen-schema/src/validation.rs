//! Declaration graph validation.
//!
//! This module checks a loaded graph for inputs a Go compiler would have
//! rejected, so that generation never runs on a broken package.

use crate::error::SchemaError;
use crate::graph::TypeGraph;
use crate::types::{Package, is_identifier};

/// Validates a loaded declaration graph.
///
/// # Arguments
/// * `graph` - The graph to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the issue.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_graph(graph: &TypeGraph) -> Result<(), SchemaError> {
    for pkg in graph.packages() {
        validate_package(pkg)?;
    }
    graph.check_references()
}

/// Validates names within a package.
fn validate_package(pkg: &Package) -> Result<(), SchemaError> {
    if !is_identifier(&pkg.name) {
        return Err(SchemaError::Validation {
            message: format!("Invalid package name '{}' for '{}'", pkg.name, pkg.path),
        });
    }

    for decl in &pkg.declarations {
        if !is_identifier(&decl.name) {
            return Err(SchemaError::Validation {
                message: format!("Invalid declaration name '{}' in '{}'", decl.name, pkg.path),
            });
        }

        if let Some(field) = decl.fields().iter().find(|f| !is_identifier(&f.name)) {
            return Err(SchemaError::Validation {
                message: format!("Invalid field name '{}' in '{}'", field.name, decl.name),
            });
        }

        if let Some(method) = decl.methods.iter().find(|m| !is_identifier(&m.name)) {
            return Err(SchemaError::Validation {
                message: format!("Invalid method name '{}' on '{}'", method.name, decl.name),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_declarations;

    #[test]
    fn test_validate_valid_graph() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Widget" file="v1/types.go">
            <field name="Spec" type="WidgetSpec"/>
        </struct>
        <struct name="WidgetSpec" file="v1/types.go"/>
    </package>
</declarations>"#;

        let graph = parse_declarations(xml).expect("Failed to parse");
        assert!(validate_graph(&graph).is_ok());
    }

    #[test]
    fn test_validate_invalid_package_name() {
        let xml = r#"<declarations>
    <package name="v1-alpha" path="example.com/v1" dir="v1"/>
</declarations>"#;

        let graph = parse_declarations(xml).expect("Failed to parse");
        assert!(matches!(
            validate_graph(&graph),
            Err(SchemaError::Validation { .. })
        ));
    }

    #[test]
    fn test_validate_unresolved_local_type() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Widget" file="v1/types.go">
            <field name="Status" type="WidgetStatus"/>
        </struct>
    </package>
</declarations>"#;

        let graph = parse_declarations(xml).expect("Failed to parse");
        assert!(matches!(
            validate_graph(&graph),
            Err(SchemaError::UnresolvedType { .. })
        ));
    }
}
