//! Declarative field tables
//!
//! Each document kind lists its keys once, with whether the key must be
//! present and what JSON type a present value must have. Rules walk these
//! tables instead of hand-writing a conditional per key.

use serde_json::{Map, Value};

/// Whether a key must appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Accepted shape of a present value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Presence only, no type constraint
    Any,
    String,
    Sequence,
    Mapping,
    Boolean,
    NonNegativeInteger,
}

impl FieldKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Any => true,
            FieldKind::String => value.is_string(),
            FieldKind::Sequence => value.is_array(),
            FieldKind::Mapping => value.is_object(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::NonNegativeInteger => value.as_u64().is_some(),
        }
    }

    /// Noun phrase used in "must be ..." messages
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Any => "any value",
            FieldKind::String => "a string",
            FieldKind::Sequence => "a list",
            FieldKind::Mapping => "an object",
            FieldKind::Boolean => "a boolean",
            FieldKind::NonNegativeInteger => "a non-negative integer",
        }
    }
}

/// One key of a document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub key: &'static str,
    pub presence: Presence,
    pub kind: FieldKind,
}

const fn required(key: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        key,
        presence: Presence::Required,
        kind,
    }
}

const fn optional(key: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        key,
        presence: Presence::Optional,
        kind,
    }
}

/// Top level of `index.json`
pub const INDEX_FIELDS: &[FieldRule] = &[
    required("version", FieldKind::Any),
    required("last_updated", FieldKind::Any),
    required("verticals", FieldKind::Sequence),
    required("statistics", FieldKind::Mapping),
];

/// One element of `verticals`
pub const VERTICAL_ENTRY_FIELDS: &[FieldRule] = &[
    required("name", FieldKind::String),
    required("version", FieldKind::String),
    required("description", FieldKind::Any),
    required("author", FieldKind::Any),
    required("license", FieldKind::Any),
    required("requires_victor", FieldKind::Any),
    required("registry_entry", FieldKind::String),
    optional("tags", FieldKind::Sequence),
    optional("download_count", FieldKind::NonNegativeInteger),
    optional("verified", FieldKind::Boolean),
    optional("featured", FieldKind::Boolean),
];

/// `[vertical]` table of the manifest
pub const MANIFEST_FIELDS: &[FieldRule] = &[
    required("name", FieldKind::String),
    required("version", FieldKind::String),
    required("description", FieldKind::Any),
    required("authors", FieldKind::Any),
    required("license", FieldKind::Any),
    required("requires_victor", FieldKind::String),
];

/// `[vertical.class]` table of the manifest
pub const MANIFEST_CLASS_FIELDS: &[FieldRule] = &[
    required("module", FieldKind::Any),
    required("class_name", FieldKind::Any),
];

/// Top level of `metadata.json`
pub const METADATA_FIELDS: &[FieldRule] = &[
    required("name", FieldKind::String),
    required("status", FieldKind::Any),
    required("maintainer", FieldKind::Mapping),
];

/// `maintainer` object of `metadata.json`
pub const MAINTAINER_FIELDS: &[FieldRule] = &[required("name", FieldKind::Any)];

/// Required keys absent from `doc`, in table order
pub fn missing_fields<'a>(
    doc: &'a Map<String, Value>,
    rules: &'a [FieldRule],
) -> impl Iterator<Item = &'a FieldRule> + 'a {
    rules
        .iter()
        .filter(move |rule| rule.presence == Presence::Required && !doc.contains_key(rule.key))
}

/// Present keys whose value has the wrong shape, in table order
pub fn mistyped_fields<'a>(
    doc: &'a Map<String, Value>,
    rules: &'a [FieldRule],
) -> impl Iterator<Item = &'a FieldRule> + 'a {
    rules.iter().filter(move |rule| {
        doc.get(rule.key)
            .map(|value| !rule.kind.matches(value))
            .unwrap_or(false)
    })
}

/// Lookup that only yields a value of the expected shape
pub fn string_field<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod fields_tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_missing_required_in_table_order() {
        let doc = as_map(json!({"name": "search", "license": "MIT"}));
        let missing: Vec<&str> = missing_fields(&doc, VERTICAL_ENTRY_FIELDS)
            .map(|r| r.key)
            .collect();
        assert_eq!(
            missing,
            [
                "version",
                "description",
                "author",
                "requires_victor",
                "registry_entry"
            ]
        );
    }

    #[test]
    fn test_absent_optional_is_not_mistyped() {
        let doc = as_map(json!({"name": "search"}));
        assert_eq!(mistyped_fields(&doc, VERTICAL_ENTRY_FIELDS).count(), 0);
    }

    #[test]
    fn test_each_wrong_type_reported() {
        let doc = as_map(json!({
            "name": 7,
            "version": "1.0.0",
            "tags": "security",
            "download_count": -3,
            "verified": "yes",
            "featured": true
        }));
        let keys: Vec<&str> = mistyped_fields(&doc, VERTICAL_ENTRY_FIELDS)
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, ["name", "tags", "download_count", "verified"]);
    }

    #[test]
    fn test_non_negative_integer_rejects_floats() {
        assert!(FieldKind::NonNegativeInteger.matches(&json!(0)));
        assert!(FieldKind::NonNegativeInteger.matches(&json!(1200)));
        assert!(!FieldKind::NonNegativeInteger.matches(&json!(2.5)));
        assert!(!FieldKind::NonNegativeInteger.matches(&json!(-1)));
        assert!(!FieldKind::NonNegativeInteger.matches(&json!(true)));
    }
}
