//! Method templates and method sets.
//!
//! Every `new_*` function returns a [`NewMethod`] bound to a receiver name
//! and the import paths its signature refers to. A template always writes
//! the same field path; which declarations get it is decided elsewhere.

use crate::error::CodegenError;
use crate::fields::{NAME_ITEMS, NAME_SPEC, NAME_STATUS, ObjectRef};
use crate::gofile::{GoFile, GoMethod};
use resgen_schema::Declaration;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Adds one method for a declaration to a file.
#[derive(Clone)]
pub struct NewMethod(Arc<dyn Fn(&mut GoFile, &Declaration) + Send + Sync>);

impl NewMethod {
    /// Wraps a closure as a method template.
    pub fn new(f: impl Fn(&mut GoFile, &Declaration) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Writes the method for `decl` into `file`.
    pub fn write(&self, file: &mut GoFile, decl: &Declaration) {
        (self.0)(file, decl)
    }
}

impl fmt::Debug for NewMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewMethod")
    }
}

/// Decides whether a method is skipped for a declaration. Returns true to
/// skip.
#[derive(Clone)]
pub struct Filter(Arc<dyn Fn(ObjectRef<'_>, &str) -> bool + Send + Sync>);

impl Filter {
    /// Wraps a closure as a filter.
    pub fn new(f: impl Fn(ObjectRef<'_>, &str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Returns true if `method` should not be written for `obj`.
    #[must_use]
    pub fn skips(&self, obj: ObjectRef<'_>, method: &str) -> bool {
        (self.0)(obj, method)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter")
    }
}

/// Returns a filter that skips a method when the declaration already has a
/// method of that name, own or promoted, declared in a file other than
/// `filename`.
///
/// A method previously generated into `filename` itself does not count, so
/// regenerating a file replaces its own output.
#[must_use]
pub fn defined_outside(filename: impl AsRef<Path>) -> Filter {
    let filename = normalize(filename.as_ref());
    Filter::new(move |obj, name| {
        obj.graph
            .method_set(obj.decl)
            .iter()
            .filter(|m| m.name == name)
            .any(|m| normalize(&m.file) != filename)
    })
}

/// Drops `.` components so that `./a/b.go` and `a/b.go` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Method templates keyed by method name.
///
/// Methods are always written in name order.
#[derive(Debug, Clone, Default)]
pub struct MethodSet {
    methods: BTreeMap<String, NewMethod>,
}

impl MethodSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method.
    ///
    /// # Errors
    /// Returns `CodegenError::DuplicateMethod` if the name is already taken.
    pub fn insert(&mut self, name: &str, method: NewMethod) -> Result<(), CodegenError> {
        if self.methods.contains_key(name) {
            return Err(CodegenError::duplicate_method(name));
        }
        self.methods.insert(name.to_string(), method);
        Ok(())
    }

    /// Registers a method, builder style.
    ///
    /// # Errors
    /// Returns `CodegenError::DuplicateMethod` if the name is already taken.
    pub fn with(mut self, name: &str, method: NewMethod) -> Result<Self, CodegenError> {
        self.insert(name, method)?;
        Ok(self)
    }

    /// Iterates method names in emission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Returns the number of methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true if the set has no methods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Writes every method not skipped by `filter` for `obj` into `file`.
    ///
    /// Returns the number of methods written.
    pub fn write(&self, file: &mut GoFile, obj: ObjectRef<'_>, filter: &Filter) -> usize {
        let mut written = 0;
        for (name, method) in &self.methods {
            if filter.skips(obj, name) {
                tracing::debug!("{}: {} is defined elsewhere, skipping", obj.decl.name, name);
                continue;
            }
            method.write(file, obj.decl);
            written += 1;
        }
        written
    }
}

/// Writes a `SetActive` method.
#[must_use]
pub fn new_set_active(receiver: &str) -> NewMethod {
    let r = receiver.to_string();
    NewMethod::new(move |f, o| {
        f.add(
            GoMethod::new(&r, &o.name, "SetActive")
                .params("b bool")
                .line(format!("{}.{}.Active = b", r, NAME_SPEC)),
        );
    })
}

/// Writes a `GetActive` method.
#[must_use]
pub fn new_get_active(receiver: &str) -> NewMethod {
    let r = receiver.to_string();
    NewMethod::new(move |f, o| {
        f.add(
            GoMethod::new(&r, &o.name, "GetActive")
                .returns("bool")
                .line(format!("return {}.{}.Active", r, NAME_SPEC)),
        );
    })
}

/// Writes a `SetConditions` method delegating to the status.
#[must_use]
pub fn new_set_conditions(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let condition = f.qual(&runtime, "Condition");
        f.add(
            GoMethod::new(&r, &o.name, "SetConditions")
                .params(format!("c ...{}", condition))
                .line(format!("{}.{}.SetConditions(c...)", r, NAME_STATUS)),
        );
    })
}

/// Writes a `GetCondition` method delegating to the status.
#[must_use]
pub fn new_get_condition(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let kind = f.qual(&runtime, "ConditionKind");
        let condition = f.qual(&runtime, "Condition");
        f.add(
            GoMethod::new(&r, &o.name, "GetCondition")
                .params(format!("ck {}", kind))
                .returns(condition)
                .line(format!("return {}.{}.GetCondition(ck)", r, NAME_STATUS)),
        );
    })
}

/// Writes a `SetTargetConfigReference` method for a reference held in the
/// spec.
#[must_use]
pub fn new_set_target_config_reference(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let reference = f.qual(&runtime, "Reference");
        f.add(
            GoMethod::new(&r, &o.name, "SetTargetConfigReference")
                .params(format!("r *{}", reference))
                .line(format!("{}.{}.TargetConfigReference = r", r, NAME_SPEC)),
        );
    })
}

/// Writes a `GetTargetConfigReference` method for a reference held in the
/// spec.
#[must_use]
pub fn new_get_target_config_reference(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let reference = f.qual(&runtime, "Reference");
        f.add(
            GoMethod::new(&r, &o.name, "GetTargetConfigReference")
                .returns(format!("*{}", reference))
                .line(format!("return {}.{}.TargetConfigReference", r, NAME_SPEC)),
        );
    })
}

/// Writes a `SetDeletionPolicy` method.
#[must_use]
pub fn new_set_deletion_policy(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let policy = f.qual(&runtime, "DeletionPolicy");
        f.add(
            GoMethod::new(&r, &o.name, "SetDeletionPolicy")
                .params(format!("r {}", policy))
                .line(format!("{}.{}.DeletionPolicy = r", r, NAME_SPEC)),
        );
    })
}

/// Writes a `GetDeletionPolicy` method.
#[must_use]
pub fn new_get_deletion_policy(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let policy = f.qual(&runtime, "DeletionPolicy");
        f.add(
            GoMethod::new(&r, &o.name, "GetDeletionPolicy")
                .returns(policy)
                .line(format!("return {}.{}.DeletionPolicy", r, NAME_SPEC)),
        );
    })
}

/// Writes an `InitializeTargetConditions` method.
#[must_use]
pub fn new_initialize_target_conditions(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let conditions = f.qual(&runtime, "TargetConditions");
        f.add(
            GoMethod::new(&r, &o.name, "InitializeTargetConditions").line(format!(
                "{}.{}.TargetConditions = make(map[string]*{})",
                r, NAME_STATUS, conditions
            )),
        );
    })
}

/// Writes a `DeleteTargetCondition` method.
#[must_use]
pub fn new_delete_target_condition(receiver: &str) -> NewMethod {
    let r = receiver.to_string();
    NewMethod::new(move |f, o| {
        f.add(
            GoMethod::new(&r, &o.name, "DeleteTargetCondition")
                .params("target string")
                .line(format!("delete({}.{}.TargetConditions, target)", r, NAME_STATUS)),
        );
    })
}

/// Writes a `GetTargetCondition` method.
#[must_use]
pub fn new_get_target_condition(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let kind = f.qual(&runtime, "ConditionKind");
        let condition = f.qual(&runtime, "Condition");
        f.add(
            GoMethod::new(&r, &o.name, "GetTargetCondition")
                .params(format!("target string, ck {}", kind))
                .returns(condition)
                .line(format!(
                    "return {}.{}.TargetConditions[target].GetCondition(ck)",
                    r, NAME_STATUS
                )),
        );
    })
}

/// Writes a `SetTargetConditions` method. The per-target entry is created
/// on first use.
#[must_use]
pub fn new_set_target_conditions(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let condition = f.qual(&runtime, "Condition");
        let conditions = f.qual(&runtime, "TargetConditions");
        let entry = format!("{}.{}.TargetConditions[target]", r, NAME_STATUS);
        f.add(
            GoMethod::new(&r, &o.name, "SetTargetConditions")
                .params(format!("target string, c ...{}", condition))
                .line(format!("if {} == nil {{", entry))
                .line(format!("\t{} = new({})", entry, conditions))
                .line("}")
                .line(format!("{}.SetConditions(c...)", entry)),
        );
    })
}

/// Writes a `SetUsers` method.
#[must_use]
pub fn new_set_users(receiver: &str) -> NewMethod {
    let r = receiver.to_string();
    NewMethod::new(move |f, o| {
        f.add(
            GoMethod::new(&r, &o.name, "SetUsers")
                .params("i int64")
                .line(format!("{}.{}.Users = i", r, NAME_STATUS)),
        );
    })
}

/// Writes a `GetUsers` method.
#[must_use]
pub fn new_get_users(receiver: &str) -> NewMethod {
    let r = receiver.to_string();
    NewMethod::new(move |f, o| {
        f.add(
            GoMethod::new(&r, &o.name, "GetUsers")
                .returns("int64")
                .line(format!("return {}.{}.Users", r, NAME_STATUS)),
        );
    })
}

/// Writes a `GetItems` method returning a pointer to every element of
/// `Items`, viewed as `element` from the `resource` package.
fn new_get_items(receiver: &str, resource: &str, element: &'static str) -> NewMethod {
    let (r, resource) = (receiver.to_string(), resource.to_string());
    NewMethod::new(move |f, o| {
        let item = f.qual(&resource, element);
        f.add(
            GoMethod::new(&r, &o.name, "GetItems")
                .returns(format!("[]{}", item))
                .line(format!("items := make([]{}, len({}.{}))", item, r, NAME_ITEMS))
                .line(format!("for i := range {}.{} {{", r, NAME_ITEMS))
                .line(format!("\titems[i] = &{}.{}[i]", r, NAME_ITEMS))
                .line("}")
                .line("return items"),
        );
    })
}

/// Writes a `GetItems` method for a list of managed resources.
#[must_use]
pub fn new_managed_get_items(receiver: &str, resource: &str) -> NewMethod {
    new_get_items(receiver, resource, "Managed")
}

/// Writes a `GetItems` method for a list of target config usages.
#[must_use]
pub fn new_target_config_usage_get_items(receiver: &str, resource: &str) -> NewMethod {
    new_get_items(receiver, resource, "TargetConfigUsage")
}

/// Writes a `SetTargetConfigReference` method for a reference held at the
/// root of the struct, by value.
#[must_use]
pub fn new_set_root_target_config_reference(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let reference = f.qual(&runtime, "Reference");
        f.add(
            GoMethod::new(&r, &o.name, "SetTargetConfigReference")
                .params(format!("r {}", reference))
                .line(format!("{}.TargetConfigReference = r", r)),
        );
    })
}

/// Writes a `GetTargetConfigReference` method for a reference held at the
/// root of the struct, by value.
#[must_use]
pub fn new_get_root_target_config_reference(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let reference = f.qual(&runtime, "Reference");
        f.add(
            GoMethod::new(&r, &o.name, "GetTargetConfigReference")
                .returns(reference)
                .line(format!("return {}.TargetConfigReference", r)),
        );
    })
}

/// Writes a `SetResourceReference` method.
#[must_use]
pub fn new_set_root_resource_reference(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let reference = f.qual(&runtime, "TypedReference");
        f.add(
            GoMethod::new(&r, &o.name, "SetResourceReference")
                .params(format!("r {}", reference))
                .line(format!("{}.ResourceReference = r", r)),
        );
    })
}

/// Writes a `GetResourceReference` method.
#[must_use]
pub fn new_get_root_resource_reference(receiver: &str, runtime: &str) -> NewMethod {
    let (r, runtime) = (receiver.to_string(), runtime.to_string());
    NewMethod::new(move |f, o| {
        let reference = f.qual(&runtime, "TypedReference");
        f.add(
            GoMethod::new(&r, &o.name, "GetResourceReference")
                .returns(reference)
                .line(format!("return {}.ResourceReference", r)),
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::IMPORT_RUNTIME;
    use crate::fixtures::{self, API, WIDGET, WIDGET_LIST, decl};

    const RESOURCE: &str = "github.com/netw-device-driver/ndd-runtime/pkg/resource";

    fn render(method: &NewMethod, decl: &Declaration) -> String {
        let mut file = GoFile::new("v1alpha1", API);
        method.write(&mut file, decl);
        file.methods().iter().map(GoMethod::render).collect()
    }

    fn named(name: &'static str) -> NewMethod {
        NewMethod::new(move |f, o| f.add(GoMethod::new("mg", &o.name, name)))
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let err = MethodSet::new()
            .with("GetActive", new_get_active("mg"))
            .unwrap()
            .with("GetActive", new_get_active("mg"))
            .unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateMethod { ref name } if name == "GetActive"));
    }

    #[test]
    fn test_write_in_name_order() {
        let graph = fixtures::graph(WIDGET);
        let obj = ObjectRef::new(decl(&graph, "Widget"), &graph);
        let set = MethodSet::new()
            .with("Zeta", named("Zeta"))
            .unwrap()
            .with("Alpha", named("Alpha"))
            .unwrap()
            .with("Mid", named("Mid"))
            .unwrap();

        for _ in 0..2 {
            let mut file = GoFile::new("v1alpha1", API);
            let written = set.write(&mut file, obj, &Filter::new(|_, _| false));
            assert_eq!(written, 3);
            let names: Vec<_> = file.methods().iter().map(GoMethod::name).collect();
            assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
        }
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_filter_skips_methods() {
        let graph = fixtures::graph(WIDGET);
        let obj = ObjectRef::new(decl(&graph, "Widget"), &graph);
        let set = MethodSet::new()
            .with("GetActive", new_get_active("mg"))
            .unwrap()
            .with("SetActive", new_set_active("mg"))
            .unwrap();

        let mut file = GoFile::new("v1alpha1", API);
        let written = set.write(&mut file, obj, &Filter::new(|_, name| name == "GetActive"));
        assert_eq!(written, 1);
        assert_eq!(file.methods()[0].name(), "SetActive");
    }

    #[test]
    fn test_defined_outside() {
        let body = WIDGET.replacen(
            r#"<field name="Spec" type="WidgetSpec"/>"#,
            r#"<field name="Spec" type="WidgetSpec"/>
            <method name="GetActive" file="apis/widget/v1alpha1/widget.go"/>
            <method name="SetActive" file="./apis/widget/v1alpha1/zz_generated.managed.go"/>"#,
            1,
        );
        let graph = fixtures::graph(&body);
        let obj = ObjectRef::new(decl(&graph, "Widget"), &graph);
        let filter = defined_outside("apis/widget/v1alpha1/zz_generated.managed.go");

        assert!(filter.skips(obj, "GetActive"));
        assert!(!filter.skips(obj, "SetActive"));
        assert!(!filter.skips(obj, "GetCondition"));
    }

    #[test]
    fn test_defined_outside_sees_promoted_methods() {
        let body = r#"
        <struct name="Base" file="apis/widget/v1alpha1/base.go">
            <method name="GetDeletionPolicy" file="apis/widget/v1alpha1/base.go"/>
        </struct>
        <struct name="Gadget" file="apis/widget/v1alpha1/gadget.go">
            <field type="Base" embedded="true"/>
        </struct>"#;
        let graph = fixtures::graph(body);
        let obj = ObjectRef::new(decl(&graph, "Gadget"), &graph);
        let filter = defined_outside("apis/widget/v1alpha1/zz_generated.managed.go");
        assert!(filter.skips(obj, "GetDeletionPolicy"));
    }

    #[test]
    fn test_defined_outside_ignores_ambiguous_promotion() {
        let body = r#"
        <struct name="Left" file="apis/widget/v1alpha1/left.go">
            <method name="GetActive" file="apis/widget/v1alpha1/left.go"/>
        </struct>
        <struct name="Right" file="apis/widget/v1alpha1/right.go">
            <method name="GetActive" file="apis/widget/v1alpha1/right.go"/>
        </struct>
        <struct name="Gadget" file="apis/widget/v1alpha1/gadget.go">
            <field type="Left" embedded="true"/>
            <field type="Right" embedded="true"/>
        </struct>"#;
        let graph = fixtures::graph(body);
        let obj = ObjectRef::new(decl(&graph, "Gadget"), &graph);
        let filter = defined_outside("apis/widget/v1alpha1/zz_generated.managed.go");
        assert!(!filter.skips(obj, "GetActive"));
    }

    #[test]
    fn test_condition_templates() {
        let graph = fixtures::graph(WIDGET);
        let widget = decl(&graph, "Widget");

        assert_eq!(
            render(&new_set_conditions("mg", IMPORT_RUNTIME), widget),
            "// SetConditions of this Widget.\n\
             func (mg *Widget) SetConditions(c ...v1.Condition) {\n\
             \tmg.Status.SetConditions(c...)\n}\n"
        );
        assert_eq!(
            render(&new_get_condition("mg", IMPORT_RUNTIME), widget),
            "// GetCondition of this Widget.\n\
             func (mg *Widget) GetCondition(ck v1.ConditionKind) v1.Condition {\n\
             \treturn mg.Status.GetCondition(ck)\n}\n"
        );
    }

    #[test]
    fn test_target_condition_templates() {
        let graph = fixtures::graph(WIDGET);
        let widget = decl(&graph, "Widget");

        assert_eq!(
            render(&new_set_target_conditions("mg", IMPORT_RUNTIME), widget),
            "// SetTargetConditions of this Widget.\n\
             func (mg *Widget) SetTargetConditions(target string, c ...v1.Condition) {\n\
             \tif mg.Status.TargetConditions[target] == nil {\n\
             \t\tmg.Status.TargetConditions[target] = new(v1.TargetConditions)\n\
             \t}\n\
             \tmg.Status.TargetConditions[target].SetConditions(c...)\n}\n"
        );
        assert!(
            render(&new_initialize_target_conditions("mg", IMPORT_RUNTIME), widget)
                .contains("\tmg.Status.TargetConditions = make(map[string]*v1.TargetConditions)\n")
        );
        assert!(
            render(&new_delete_target_condition("mg"), widget)
                .contains("\tdelete(mg.Status.TargetConditions, target)\n")
        );
    }

    #[test]
    fn test_reference_templates() {
        let graph = fixtures::graph(WIDGET);
        let widget = decl(&graph, "Widget");

        assert!(
            render(&new_set_target_config_reference("mg", IMPORT_RUNTIME), widget)
                .contains("SetTargetConfigReference(r *v1.Reference) {\n\tmg.Spec.TargetConfigReference = r\n")
        );
        assert!(
            render(&new_get_root_target_config_reference("p", IMPORT_RUNTIME), widget)
                .contains("GetTargetConfigReference() v1.Reference {\n\treturn p.TargetConfigReference\n")
        );
        assert!(
            render(&new_set_root_resource_reference("p", IMPORT_RUNTIME), widget)
                .contains("SetResourceReference(r v1.TypedReference) {\n\tp.ResourceReference = r\n")
        );
    }

    #[test]
    fn test_get_items_references_elements() {
        let graph = fixtures::graph(&[WIDGET, WIDGET_LIST].concat());
        let list = decl(&graph, "WidgetList");

        assert_eq!(
            render(&new_managed_get_items("l", RESOURCE), list),
            "// GetItems of this WidgetList.\n\
             func (l *WidgetList) GetItems() []resource.Managed {\n\
             \titems := make([]resource.Managed, len(l.Items))\n\
             \tfor i := range l.Items {\n\
             \t\titems[i] = &l.Items[i]\n\
             \t}\n\
             \treturn items\n}\n"
        );
        assert!(
            render(&new_target_config_usage_get_items("p", RESOURCE), list)
                .contains("GetItems() []resource.TargetConfigUsage {\n")
        );
    }

    #[test]
    fn test_users_templates() {
        let graph = fixtures::graph(WIDGET);
        let widget = decl(&graph, "Widget");
        assert!(render(&new_set_users("p"), widget).contains("SetUsers(i int64) {\n\tp.Status.Users = i\n"));
        assert!(render(&new_get_users("p"), widget).contains("GetUsers() int64 {\n\treturn p.Status.Users\n"));
    }
}
