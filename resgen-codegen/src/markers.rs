//! Comment markers.
//!
//! A marker is a comment line of the form `+key=value` (or a bare `+key`).
//! Markers let a declaration opt out of generation without changing its
//! shape.

use std::collections::BTreeMap;

/// Marker key that disables method generation when set to `false`.
pub const DISABLE_MARKER: &str = "resgen:generate:methods";

/// Earlier spelling of [`DISABLE_MARKER`], still honored.
pub const LEGACY_DISABLE_MARKER: &str = "ndd:generate:methods";

/// Markers parsed from one comment, keyed by marker key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    values: BTreeMap<String, Vec<String>>,
}

impl Markers {
    /// Parses every marker line in a comment. Lines that are not markers
    /// are ignored.
    #[must_use]
    pub fn parse(comment: &str) -> Self {
        let mut markers = Self::default();
        for line in comment.lines() {
            let line = line.trim();
            let line = line.strip_prefix("//").map_or(line, str::trim_start);
            let Some(marker) = line.strip_prefix('+') else {
                continue;
            };

            let (key, value) = marker.split_once('=').unwrap_or((marker, ""));
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                continue;
            }
            markers
                .values
                .entry(key.to_string())
                .or_default()
                .push(value.trim().to_string());
        }
        markers
    }

    /// Returns the values recorded for a key, in encounter order.
    #[must_use]
    pub fn get(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true if `value` was recorded for `key`.
    #[must_use]
    pub fn has(&self, key: &str, value: &str) -> bool {
        self.get(key).iter().any(|v| v == value)
    }

    /// Returns true if no markers were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        let comment = "Widget is a managed resource.\n\
                       +kubebuilder:object:root=true\n\
                       +resgen:generate:methods=false\n\
                       +kubebuilder:printcolumn:name=READY\n\
                       +kubebuilder:printcolumn:name=SYNCED";
        let markers = Markers::parse(comment);

        assert!(markers.has(DISABLE_MARKER, "false"));
        assert_eq!(
            markers.get("kubebuilder:printcolumn:name"),
            &["READY".to_string(), "SYNCED".to_string()]
        );
        assert!(markers.get("missing").is_empty());
    }

    #[test]
    fn test_parse_markers_with_comment_prefix() {
        let markers = Markers::parse("// +resgen:generate:methods=false\n//+genclient");
        assert!(markers.has(DISABLE_MARKER, "false"));
        assert_eq!(markers.get("genclient"), &[String::new()]);
    }

    #[test]
    fn test_free_text_is_ignored() {
        assert!(Markers::parse("").is_empty());
        assert!(Markers::parse("a + b = c\nnothing here\n+ spaced key=1").is_empty());
    }

    #[test]
    fn test_parse_is_repeatable() {
        let comment = "+resgen:generate:methods=false";
        assert_eq!(Markers::parse(comment), Markers::parse(comment));
    }
}
