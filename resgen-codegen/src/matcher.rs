//! Declaration matchers.
//!
//! Each recognizer decides whether a declaration has the shape of one of
//! the resource kinds generation knows about. Matchers are plain values and
//! compose with [`all_of`] and [`any_of`].

use crate::fields::{
    self, FieldMatcher, ObjectRef, Vocabulary, has_field_that, is_embedded, is_items,
    is_object_meta, is_resource_spec, is_resource_status, is_slice, is_spec, is_status,
    is_target_config_status, is_target_config_usage, is_type_meta,
};
use crate::markers::Markers;
use std::fmt;
use std::sync::Arc;

/// A predicate over a declaration.
#[derive(Clone)]
pub struct ObjectMatcher(Arc<dyn Fn(ObjectRef<'_>) -> bool + Send + Sync>);

impl ObjectMatcher {
    /// Wraps a closure as a matcher.
    pub fn new(f: impl Fn(ObjectRef<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluates the matcher.
    #[must_use]
    pub fn matches(&self, obj: ObjectRef<'_>) -> bool {
        (self.0)(obj)
    }
}

impl fmt::Debug for ObjectMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectMatcher")
    }
}

/// Returns a matcher that is true if the declaration has a field satisfying
/// each of the supplied field matchers.
#[must_use]
pub fn has(matchers: Vec<FieldMatcher>) -> ObjectMatcher {
    ObjectMatcher::new(move |o| fields::has(o, &matchers))
}

fn managed_fields(v: &Vocabulary) -> Vec<FieldMatcher> {
    vec![
        is_type_meta(v).and(is_embedded()),
        is_object_meta(v).and(is_embedded()),
        is_spec().and(has_field_that(vec![is_resource_spec(v).and(is_embedded())])),
        is_status().and(has_field_that(vec![is_resource_status(v).and(is_embedded())])),
    ]
}

fn target_config_usage_fields(v: &Vocabulary) -> Vec<FieldMatcher> {
    vec![
        is_type_meta(v).and(is_embedded()),
        is_object_meta(v).and(is_embedded()),
        is_target_config_usage(v).and(is_embedded()),
    ]
}

/// Matches managed resources.
#[must_use]
pub fn managed(v: &Vocabulary) -> ObjectMatcher {
    has(managed_fields(v))
}

/// Matches lists of managed resources.
#[must_use]
pub fn managed_list(v: &Vocabulary) -> ObjectMatcher {
    has(vec![
        is_type_meta(v).and(is_embedded()),
        is_items()
            .and(is_slice())
            .and(has_field_that(managed_fields(v))),
    ])
}

/// Matches target configs.
#[must_use]
pub fn target_config(v: &Vocabulary) -> ObjectMatcher {
    has(vec![
        is_type_meta(v).and(is_embedded()),
        is_object_meta(v).and(is_embedded()),
        is_spec(),
        is_status().and(has_field_that(vec![
            is_target_config_status(v).and(is_embedded()),
        ])),
    ])
}

/// Matches target config usages.
#[must_use]
pub fn target_config_usage(v: &Vocabulary) -> ObjectMatcher {
    has(target_config_usage_fields(v))
}

/// Matches lists of target config usages.
#[must_use]
pub fn target_config_usage_list(v: &Vocabulary) -> ObjectMatcher {
    has(vec![
        is_type_meta(v).and(is_embedded()),
        is_items()
            .and(is_slice())
            .and(has_field_that(target_config_usage_fields(v))),
    ])
}

/// Matches declarations carrying marker `key` with `value`, either in the
/// comment attached to the declaration or in the comment preceding it.
#[must_use]
pub fn has_marker(key: &str, value: &str) -> ObjectMatcher {
    let key = key.to_string();
    let value = value.to_string();
    ObjectMatcher::new(move |o| {
        Markers::parse(&o.decl.doc).has(&key, &value)
            || Markers::parse(&o.decl.before).has(&key, &value)
    })
}

/// Matches declarations that do not carry marker `key` with `value`.
#[must_use]
pub fn does_not_have_marker(key: &str, value: &str) -> ObjectMatcher {
    let marked = has_marker(key, value);
    ObjectMatcher::new(move |o| !marked.matches(o))
}

/// Matches when every supplied matcher does. Stops at the first failure.
#[must_use]
pub fn all_of(matchers: Vec<ObjectMatcher>) -> ObjectMatcher {
    ObjectMatcher::new(move |o| matchers.iter().all(|m| m.matches(o)))
}

/// Matches when any supplied matcher does. Stops at the first success.
#[must_use]
pub fn any_of(matchers: Vec<ObjectMatcher>) -> ObjectMatcher {
    ObjectMatcher::new(move |o| matchers.iter().any(|m| m.matches(o)))
}
