//! Declaration documents shared by the unit tests.

use resgen_schema::{Declaration, QualifiedName, TypeGraph, parse_declarations};

/// Import path of the package under generation.
pub(crate) const API: &str = "example.com/apis/widget/v1alpha1";

/// Framework packages every resource shape refers to.
const FRAMEWORK: &str = r#"
    <package name="v1" path="k8s.io/apimachinery/pkg/apis/meta/v1" dir="meta">
        <struct name="TypeMeta" file="meta/types.go"/>
        <struct name="ObjectMeta" file="meta/types.go"/>
        <struct name="ListMeta" file="meta/types.go"/>
    </package>
    <package name="v1" path="github.com/netw-device-driver/ndd-runtime/apis/common/v1" dir="runtime">
        <struct name="ResourceSpec" file="runtime/resource.go"/>
        <struct name="ResourceStatus" file="runtime/resource.go"/>
        <struct name="TargetConfigStatus" file="runtime/resource.go"/>
        <struct name="TargetConfigUsage" file="runtime/resource.go"/>
    </package>"#;

/// A managed resource with its spec and status.
pub(crate) const WIDGET: &str = r#"
        <struct name="Widget" file="apis/widget/v1alpha1/widget_types.go">
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.TypeMeta" embedded="true"/>
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta" embedded="true"/>
            <field name="Spec" type="WidgetSpec"/>
            <field name="Status" type="WidgetStatus"/>
        </struct>
        <struct name="WidgetSpec" file="apis/widget/v1alpha1/widget_types.go">
            <field type="github.com/netw-device-driver/ndd-runtime/apis/common/v1.ResourceSpec" embedded="true"/>
            <field name="Size" type="int64"/>
        </struct>
        <struct name="WidgetStatus" file="apis/widget/v1alpha1/widget_types.go">
            <field type="github.com/netw-device-driver/ndd-runtime/apis/common/v1.ResourceStatus" embedded="true"/>
        </struct>"#;

/// A list of managed resources.
pub(crate) const WIDGET_LIST: &str = r#"
        <struct name="WidgetList" file="apis/widget/v1alpha1/widget_types.go">
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.TypeMeta" embedded="true"/>
            <field name="ListMeta" type="k8s.io/apimachinery/pkg/apis/meta/v1.ListMeta"/>
            <field name="Items" type="[]Widget"/>
        </struct>"#;

/// A target config.
pub(crate) const TARGET_CONFIG: &str = r#"
        <struct name="TargetConfig" file="apis/widget/v1alpha1/tc_types.go">
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.TypeMeta" embedded="true"/>
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta" embedded="true"/>
            <field name="Spec" type="TargetConfigSpec"/>
            <field name="Status" type="TargetConfigStatus"/>
        </struct>
        <struct name="TargetConfigSpec" file="apis/widget/v1alpha1/tc_types.go">
            <field name="Endpoint" type="string"/>
        </struct>
        <struct name="TargetConfigStatus" file="apis/widget/v1alpha1/tc_types.go">
            <field type="github.com/netw-device-driver/ndd-runtime/apis/common/v1.TargetConfigStatus" embedded="true"/>
        </struct>"#;

/// A target config usage and its list.
pub(crate) const TARGET_CONFIG_USAGE: &str = r#"
        <struct name="TargetConfigUsage" file="apis/widget/v1alpha1/tc_types.go">
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.TypeMeta" embedded="true"/>
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta" embedded="true"/>
            <field type="github.com/netw-device-driver/ndd-runtime/apis/common/v1.TargetConfigUsage" embedded="true"/>
        </struct>
        <struct name="TargetConfigUsageList" file="apis/widget/v1alpha1/tc_types.go">
            <field type="k8s.io/apimachinery/pkg/apis/meta/v1.TypeMeta" embedded="true"/>
            <field name="ListMeta" type="k8s.io/apimachinery/pkg/apis/meta/v1.ListMeta"/>
            <field name="Items" type="[]TargetConfigUsage"/>
        </struct>"#;

/// Wraps package body XML into a complete document.
pub(crate) fn document(body: &str) -> String {
    format!(
        r#"<declarations>{FRAMEWORK}
    <package name="v1alpha1" path="{API}" dir="apis/widget/v1alpha1">{body}
    </package>
</declarations>"#
    )
}

/// Parses a package body into a graph.
pub(crate) fn graph(body: &str) -> TypeGraph {
    parse_declarations(&document(body)).expect("fixture should parse")
}

/// Looks up a declaration of the package under generation.
pub(crate) fn decl<'a>(graph: &'a TypeGraph, name: &str) -> &'a Declaration {
    graph
        .lookup(&QualifiedName::new(API, name))
        .expect("fixture declaration")
}
