//! Declaration document parser.
//!
//! This module parses the XML declaration document produced by a build
//! system front end into packages of resolved declarations.

use crate::error::ParseError;
use crate::graph::TypeGraph;
use crate::types::{Declaration, Field, MethodDecl, Package, TypeRef};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::{Path, PathBuf};

/// Parses a declaration document from a string.
///
/// # Arguments
/// * `xml` - Declaration document content
///
/// # Returns
/// The graph of every package in the document.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or contains invalid elements.
pub fn parse_declarations(xml: &str) -> Result<TypeGraph, ParseError> {
    let mut reader = Reader::from_str(xml);

    let mut graph: Option<TypeGraph> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match (element_name(e)?.as_str(), &mut graph) {
                ("declarations", graph @ None) => *graph = Some(TypeGraph::new()),
                ("package", Some(graph)) => graph.add_package(parse_package(&mut reader, e)?)?,
                (other, _) => return Err(ParseError::unknown_element(other, "document")),
            },
            Ok(Event::Empty(ref e)) => match (element_name(e)?.as_str(), &mut graph) {
                ("declarations", graph @ None) => *graph = Some(TypeGraph::new()),
                ("package", Some(graph)) => graph.add_package(package_header(e)?)?,
                (other, _) => return Err(ParseError::unknown_element(other, "document")),
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    graph.ok_or_else(|| ParseError::InvalidStructure {
        message: "No declarations element found".to_string(),
    })
}

/// Parses a declaration document from a file.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn parse_declarations_file(path: &Path) -> Result<TypeGraph, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_declarations(&xml)
}

/// Attributes of one element, decoded to strings.
struct Attributes {
    element: String,
    values: Vec<(String, String)>,
}

impl Attributes {
    fn read(e: &BytesStart<'_>) -> Result<Self, ParseError> {
        let element = element_name(e)?;
        let mut values = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr.unescape_value()?;
            values.push((key.to_string(), value.into_owned()));
        }
        Ok(Self { element, values })
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required(&self, key: &str) -> Result<&str, ParseError> {
        self.get(key)
            .ok_or_else(|| ParseError::missing_attr(&self.element, key))
    }

    fn flag(&self, key: &str) -> Result<bool, ParseError> {
        match self.get(key) {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(ParseError::invalid_attr(&self.element, key, other)),
        }
    }
}

fn element_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    let name_bytes = e.name().as_ref().to_vec();
    Ok(std::str::from_utf8(&name_bytes)?.to_string())
}

/// Reads the attributes of a package element.
fn package_header(e: &BytesStart<'_>) -> Result<Package, ParseError> {
    let attrs = Attributes::read(e)?;
    let name = attrs.required("name")?;
    let path = attrs.required("path")?;
    let dir = attrs.get("dir").unwrap_or_default();
    Ok(Package::new(name, path, dir))
}

/// Parses a package element and its declarations.
fn parse_package(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Package, ParseError> {
    let mut package = package_header(e)?;
    let explicit_dir = !package.dir.as_os_str().is_empty();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let decl = match element_name(e)?.as_str() {
                    "struct" => parse_struct(reader, e)?,
                    "type" => {
                        let decl = parse_other(e)?;
                        skip_to_end(reader, "type")?;
                        decl
                    }
                    other => return Err(ParseError::unknown_element(other, "package")),
                };
                package.add_declaration(decl)?;
            }
            Ok(Event::Empty(ref e)) => {
                let decl = match element_name(e)?.as_str() {
                    "struct" => struct_header(e)?,
                    "type" => parse_other(e)?,
                    other => return Err(ParseError::unknown_element(other, "package")),
                };
                package.add_declaration(decl)?;
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated package '{}'", package.path),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !explicit_dir {
        package.dir = package
            .declarations
            .first()
            .and_then(|d| d.file.parent())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    }

    Ok(package)
}

/// Reads the attributes of a struct element.
fn struct_header(e: &BytesStart<'_>) -> Result<Declaration, ParseError> {
    let attrs = Attributes::read(e)?;
    Ok(Declaration::new_struct(
        attrs.required("name")?,
        attrs.required("file")?,
    ))
}

/// Parses a struct element with its fields, methods and comments.
fn parse_struct(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Declaration, ParseError> {
    let mut decl = struct_header(e)?;
    let mut field_names: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match element_name(e)?.as_str() {
                "doc" => decl.doc = read_text(reader, "doc")?,
                "before" => decl.before = read_text(reader, "before")?,
                member @ ("field" | "method") => {
                    add_member(&mut decl, &mut field_names, e)?;
                    skip_to_end(reader, member)?;
                }
                other => return Err(ParseError::unknown_element(other, "struct")),
            },
            Ok(Event::Empty(ref e)) => match element_name(e)?.as_str() {
                "field" | "method" => add_member(&mut decl, &mut field_names, e)?,
                "doc" | "before" => {}
                other => return Err(ParseError::unknown_element(other, "struct")),
            },
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated struct '{}'", decl.name),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(decl)
}

/// Adds a field or method element to a struct declaration.
fn add_member(
    decl: &mut Declaration,
    field_names: &mut Vec<String>,
    e: &BytesStart<'_>,
) -> Result<(), ParseError> {
    if e.name().as_ref() == b"field" {
        let field = parse_field(e)?;
        if field_names.contains(&field.name) {
            return Err(ParseError::duplicate(
                "field",
                format!("{}.{}", decl.name, field.name),
            ));
        }
        field_names.push(field.name.clone());
        decl.add_field(field);
        return Ok(());
    }

    let attrs = Attributes::read(e)?;
    let name = attrs.required("name")?;
    if decl.methods.iter().any(|m| m.name == name) {
        return Err(ParseError::duplicate(
            "method",
            format!("{}.{}", decl.name, name),
        ));
    }
    decl.add_method(MethodDecl::new(name, attrs.required("file")?));
    Ok(())
}

/// Parses a field element.
fn parse_field(e: &BytesStart<'_>) -> Result<Field, ParseError> {
    let attrs = Attributes::read(e)?;
    let ty = TypeRef::parse(attrs.required("type")?)?;

    if !attrs.flag("embedded")? {
        return Ok(Field::new(attrs.required("name")?, ty));
    }

    let field = Field::embedded(ty)
        .ok_or_else(|| ParseError::invalid_attr("field", "type", attrs.get("type").unwrap_or_default()))?;
    match attrs.get("name") {
        Some(name) if name != field.name => Err(ParseError::invalid_attr("field", "name", name)),
        _ => Ok(field),
    }
}

/// Parses a non-struct type element.
fn parse_other(e: &BytesStart<'_>) -> Result<Declaration, ParseError> {
    let attrs = Attributes::read(e)?;
    let underlying = TypeRef::parse(attrs.required("underlying")?)?;
    Ok(Declaration::new_other(
        attrs.required("name")?,
        attrs.required("file")?,
        underlying,
    ))
}

/// Reads the text content of an element up to its end tag.
fn read_text(reader: &mut Reader<&[u8]>, element: &str) -> Result<String, ParseError> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(ref t)) => text.push_str(std::str::from_utf8(t.as_ref())?),
            Ok(Event::CData(ref t)) => text.push_str(std::str::from_utf8(t.as_ref())?),
            Ok(Event::GeneralRef(ref r)) => {
                let entity = std::str::from_utf8(r.as_ref())?;
                text.push(resolve_entity(entity)?);
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                return Err(ParseError::unknown_element(element_name(e)?, element));
            }
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated '{}' element", element),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}

/// Resolves a predefined or numeric character entity.
fn resolve_entity(entity: &str) -> Result<char, ParseError> {
    let c = match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => entity
            .strip_prefix("#x")
            .map(|hex| u32::from_str_radix(hex, 16))
            .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
            .and_then(Result::ok)
            .and_then(char::from_u32),
    };
    c.ok_or_else(|| ParseError::InvalidStructure {
        message: format!("unknown entity '&{};'", entity),
    })
}

/// Skips everything up to the end tag of the current element.
fn skip_to_end(reader: &mut Reader<&[u8]>, element: &str) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated '{}' element", element),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeclKind, QualifiedName};

    const WIDGET_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<declarations>
    <package name="v1alpha1" path="example.com/apis/widget/v1alpha1" dir="apis/widget/v1alpha1">
        <struct name="Widget" file="apis/widget/v1alpha1/widget_types.go">
            <doc>+kubebuilder:object:root=true
+resgen:generate:methods=false</doc>
            <before>Widget is a &lt;managed&gt; resource.</before>
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.TypeMeta" embedded="true"/>
            <field name="Spec" type="WidgetSpec"/>
            <method name="GetActive" file="apis/widget/v1alpha1/widget.go"/>
        </struct>
        <struct name="WidgetSpec" file="apis/widget/v1alpha1/widget_types.go">
            <field name="Active" type="bool"/>
        </struct>
        <type name="Policy" underlying="string" file="apis/widget/v1alpha1/policy.go"/>
    </package>
</declarations>"#;

    #[test]
    fn test_parse_widget_document() {
        let graph = parse_declarations(WIDGET_DOC).expect("Failed to parse");
        let pkg = graph.package("example.com/apis/widget/v1alpha1").unwrap();

        assert_eq!(pkg.name, "v1alpha1");
        assert_eq!(pkg.dir, PathBuf::from("apis/widget/v1alpha1"));
        assert_eq!(pkg.declarations.len(), 3);

        let widget = pkg.get_declaration("Widget").unwrap();
        assert!(widget.doc.contains("+resgen:generate:methods=false"));
        assert_eq!(widget.before, "Widget is a <managed> resource.");
        assert_eq!(widget.fields().len(), 2);
        assert!(widget.fields()[0].embedded);
        assert_eq!(widget.fields()[0].name, "TypeMeta");
        assert_eq!(
            widget.fields()[1].ty.base_name().unwrap(),
            &QualifiedName::new("example.com/apis/widget/v1alpha1", "WidgetSpec")
        );
        assert_eq!(widget.methods.len(), 1);

        let policy = pkg.get_declaration("Policy").unwrap();
        assert!(matches!(policy.kind, DeclKind::Other(TypeRef::Basic(_))));
    }

    #[test]
    fn test_package_dir_defaults_to_first_file() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1">
        <struct name="Thing" file="apis/v1/thing.go"/>
    </package>
</declarations>"#;
        let graph = parse_declarations(xml).unwrap();
        let pkg = graph.package("example.com/v1").unwrap();
        assert_eq!(pkg.dir, PathBuf::from("apis/v1"));
    }

    #[test]
    fn test_cdata_comment() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="apis/v1">
        <struct name="Thing" file="apis/v1/thing.go">
            <doc><![CDATA[+resgen:generate:methods=false]]></doc>
        </struct>
    </package>
</declarations>"#;
        let graph = parse_declarations(xml).unwrap();
        let thing = graph.package("example.com/v1").unwrap().get_declaration("Thing").unwrap();
        assert_eq!(thing.doc, "+resgen:generate:methods=false");
    }

    #[test]
    fn test_missing_attribute() {
        let xml = r#"<declarations><package name="v1"/></declarations>"#;
        let err = parse_declarations(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { ref attribute, .. } if attribute == "path"));
    }

    #[test]
    fn test_unknown_element() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <interface name="Thing" file="thing.go"/>
    </package>
</declarations>"#;
        let err = parse_declarations(xml).unwrap_err();
        assert!(matches!(err, ParseError::UnknownElement { .. }));
    }

    #[test]
    fn test_embedded_name_must_match_type() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Thing" file="thing.go">
            <field name="Meta" type="example.com/meta.ObjectMeta" embedded="true"/>
        </struct>
    </package>
</declarations>"#;
        let err = parse_declarations(xml).unwrap_err();
        assert!(matches!(err, ParseError::InvalidAttribute { ref attribute, .. } if attribute == "name"));
    }

    #[test]
    fn test_duplicate_field() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Thing" file="thing.go">
            <field name="Spec" type="string"/>
            <field name="Spec" type="int64"/>
        </struct>
    </package>
</declarations>"#;
        let err = parse_declarations(xml).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateDefinition { ref kind, .. } if kind == "field"));
    }

    #[test]
    fn test_invalid_type_expression() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Thing" file="thing.go">
            <field name="Items" type="map[string"/>
        </struct>
    </package>
</declarations>"#;
        let err = parse_declarations(xml).unwrap_err();
        assert!(matches!(err, ParseError::InvalidType { .. }));
    }

    #[test]
    fn test_end_tagged_field_and_method() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Thing" file="thing.go">
            <field name="Spec" type="string"></field>
            <method name="GetSpec" file="thing.go"></method>
        </struct>
    </package>
</declarations>"#;
        let graph = parse_declarations(xml).unwrap();
        let thing = graph.package("example.com/v1").unwrap().get_declaration("Thing").unwrap();
        assert_eq!(thing.fields().len(), 1);
        assert_eq!(thing.fields()[0].name, "Spec");
        assert_eq!(thing.methods.len(), 1);
        assert_eq!(thing.methods[0].name, "GetSpec");
    }

    #[test]
    fn test_attribute_entities_unescaped() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Thing" file="a&amp;b.go"/>
    </package>
</declarations>"#;
        let graph = parse_declarations(xml).unwrap();
        let thing = graph.package("example.com/v1").unwrap().get_declaration("Thing").unwrap();
        assert_eq!(thing.file, PathBuf::from("a&b.go"));
    }

    #[test]
    fn test_malformed_attribute_rejected() {
        let xml = r#"<declarations>
    <package name="v1" path="example.com/v1" dir="v1">
        <struct name="Thing" file="thing.go" file="other.go"/>
    </package>
</declarations>"#;
        let err = parse_declarations(xml).unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn test_no_declarations_element() {
        let err = parse_declarations("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure { .. }));
    }

    #[test]
    fn test_parse_declarations_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decls.xml");
        std::fs::write(&path, WIDGET_DOC).unwrap();

        let graph = parse_declarations_file(&path).unwrap();
        assert_eq!(graph.packages().count(), 1);
    }
}
