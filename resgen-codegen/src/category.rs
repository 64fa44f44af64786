//! The five generation categories.

use crate::error::CodegenError;
use crate::fields::{IMPORT_RUNTIME, Vocabulary};
use crate::markers::{DISABLE_MARKER, LEGACY_DISABLE_MARKER};
use crate::matcher::{self, ObjectMatcher, all_of, does_not_have_marker};
use crate::method::{self, MethodSet};
use std::collections::BTreeMap;
use std::fmt;

/// Alias used for the runtime's common API types.
pub const RUNTIME_ALIAS: &str = "nddv1";
/// Import path of the runtime's resource interfaces.
pub const IMPORT_RESOURCE: &str = "github.com/netw-device-driver/ndd-runtime/pkg/resource";
/// Alias used for the runtime's resource interfaces.
pub const RESOURCE_ALIAS: &str = "resource";

/// A kind of declaration methods are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Managed resources.
    Managed,
    /// Lists of managed resources.
    ManagedList,
    /// Target configs.
    TargetConfig,
    /// Target config usages.
    TargetConfigUsage,
    /// Lists of target config usages.
    TargetConfigUsageList,
}

impl Category {
    /// Every category, in generation order.
    pub const ALL: [Category; 5] = [
        Category::Managed,
        Category::ManagedList,
        Category::TargetConfig,
        Category::TargetConfigUsage,
        Category::TargetConfigUsageList,
    ];

    /// Returns the category name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Managed => "managed resource",
            Self::ManagedList => "managed resource list",
            Self::TargetConfig => "target config",
            Self::TargetConfigUsage => "target config usage",
            Self::TargetConfigUsageList => "target config usage list",
        }
    }

    /// Returns the default output filename.
    #[must_use]
    pub const fn default_filename(self) -> &'static str {
        match self {
            Self::Managed => "zz_generated.managed.go",
            Self::ManagedList => "zz_generated.managedlist.go",
            Self::TargetConfig => "zz_generated.tc.go",
            Self::TargetConfigUsage => "zz_generated.tcu.go",
            Self::TargetConfigUsageList => "zz_generated.tculist.go",
        }
    }

    /// Returns the receiver name of generated methods.
    #[must_use]
    pub const fn receiver(self) -> &'static str {
        match self {
            Self::Managed => "mg",
            Self::ManagedList => "l",
            _ => "p",
        }
    }

    /// Returns the structural recognizer for this category.
    #[must_use]
    pub fn shape(self, v: &Vocabulary) -> ObjectMatcher {
        match self {
            Self::Managed => matcher::managed(v),
            Self::ManagedList => matcher::managed_list(v),
            Self::TargetConfig => matcher::target_config(v),
            Self::TargetConfigUsage => matcher::target_config_usage(v),
            Self::TargetConfigUsageList => matcher::target_config_usage_list(v),
        }
    }

    /// Returns the matcher deciding which declarations get methods: the
    /// shape, unless generation is disabled by marker under either key.
    #[must_use]
    pub fn matcher(self, v: &Vocabulary) -> ObjectMatcher {
        all_of(vec![
            self.shape(v),
            does_not_have_marker(DISABLE_MARKER, "false"),
            does_not_have_marker(LEGACY_DISABLE_MARKER, "false"),
        ])
    }

    /// Returns the preferred import aliases for generated files.
    #[must_use]
    pub fn import_aliases(self) -> BTreeMap<String, String> {
        let mut aliases = BTreeMap::new();
        match self {
            Self::ManagedList | Self::TargetConfigUsageList => {
                aliases.insert(IMPORT_RESOURCE.to_string(), RESOURCE_ALIAS.to_string());
            }
            Self::Managed | Self::TargetConfig | Self::TargetConfigUsage => {
                aliases.insert(IMPORT_RUNTIME.to_string(), RUNTIME_ALIAS.to_string());
            }
        }
        aliases
    }

    /// Builds the method set for this category.
    ///
    /// # Errors
    /// Returns `CodegenError::DuplicateMethod` if a method name is
    /// registered twice.
    pub fn method_set(self) -> Result<MethodSet, CodegenError> {
        let r = self.receiver();
        let rt = IMPORT_RUNTIME;
        match self {
            Self::Managed => MethodSet::new()
                .with("SetActive", method::new_set_active(r))?
                .with("GetActive", method::new_get_active(r))?
                .with("SetConditions", method::new_set_conditions(r, rt))?
                .with("GetCondition", method::new_get_condition(r, rt))?
                .with("GetTargetConfigReference", method::new_get_target_config_reference(r, rt))?
                .with("SetTargetConfigReference", method::new_set_target_config_reference(r, rt))?
                .with("SetDeletionPolicy", method::new_set_deletion_policy(r, rt))?
                .with("GetDeletionPolicy", method::new_get_deletion_policy(r, rt))?
                .with("InitializeTargetConditions", method::new_initialize_target_conditions(r, rt))?
                .with("DeleteTargetCondition", method::new_delete_target_condition(r))?
                .with("GetTargetCondition", method::new_get_target_condition(r, rt))?
                .with("SetTargetConditions", method::new_set_target_conditions(r, rt)),
            Self::ManagedList => {
                MethodSet::new().with("GetItems", method::new_managed_get_items(r, IMPORT_RESOURCE))
            }
            Self::TargetConfig => MethodSet::new()
                .with("SetUsers", method::new_set_users(r))?
                .with("GetUsers", method::new_get_users(r))?
                .with("SetConditions", method::new_set_conditions(r, rt))?
                .with("GetCondition", method::new_get_condition(r, rt)),
            Self::TargetConfigUsage => MethodSet::new()
                .with("SetTargetConfigReference", method::new_set_root_target_config_reference(r, rt))?
                .with("GetTargetConfigReference", method::new_get_root_target_config_reference(r, rt))?
                .with("SetResourceReference", method::new_set_root_resource_reference(r, rt))?
                .with("GetResourceReference", method::new_get_root_resource_reference(r, rt)),
            Self::TargetConfigUsageList => MethodSet::new().with(
                "GetItems",
                method::new_target_config_usage_get_items(r, IMPORT_RESOURCE),
            ),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
