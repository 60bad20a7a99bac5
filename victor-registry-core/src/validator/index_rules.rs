//! Validation rules for the registry index

use serde_json::{Map, Value};

use super::IndexRule;
use crate::consistency::{
    check_duplicates, check_identity, check_statistics, DUPLICATE_RULE, IDENTITY_RULE,
    STATISTICS_RULE,
};
use crate::loader::IndexContent;
use crate::schema::fields::{
    missing_fields, mistyped_fields, string_field, INDEX_FIELDS, VERTICAL_ENTRY_FIELDS,
};
use crate::schema::RequiredFile;
use crate::violation::{Scope, Violation};

/// Name used to scope violations of an entry
///
/// Entries without a usable name are reported as `unknown`.
fn entry_label(entry: &Value) -> String {
    match entry.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

/// Rule: index has the required top-level keys with the right shapes
pub struct IndexStructureRule;

impl IndexRule for IndexStructureRule {
    fn rule_id(&self) -> &'static str {
        "index-structure"
    }

    fn description(&self) -> &'static str {
        "Index must have version, last_updated, verticals (list) and statistics (object)"
    }

    fn check(&self, index: &IndexContent) -> Vec<Violation> {
        let mut violations = Vec::new();

        for field in missing_fields(&index.document, INDEX_FIELDS) {
            violations.push(Violation::index(
                self.rule_id(),
                format!("Missing required field: {}", field.key),
            ));
        }

        for field in mistyped_fields(&index.document, INDEX_FIELDS) {
            violations.push(Violation::index(
                self.rule_id(),
                format!("Field '{}' must be {}", field.key, field.kind.describe()),
            ));
        }

        violations
    }
}

/// Rule: every vertical entry is complete, well-typed and points at a
/// package directory holding the required files
pub struct VerticalEntryRule;

impl VerticalEntryRule {
    fn check_entry(
        &self,
        index: &IndexContent,
        entry: &Map<String, Value>,
        name: &str,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for field in missing_fields(entry, VERTICAL_ENTRY_FIELDS) {
            violations.push(Violation::vertical(
                name,
                self.rule_id(),
                format!("Missing required field: {}", field.key),
            ));
        }

        if let Some(relative) = string_field(entry, "registry_entry") {
            let entry_path = index.config.resolve(relative);
            if !entry_path.exists() {
                violations.push(Violation::vertical(
                    name,
                    self.rule_id(),
                    format!(
                        "Registry entry path does not exist: {}",
                        entry_path.display()
                    ),
                ));
            } else {
                for file in RequiredFile::ALL {
                    if !entry_path.join(file.file_name()).exists() {
                        violations.push(Violation::vertical(
                            name,
                            self.rule_id(),
                            format!("Missing required file: {file}"),
                        ));
                    }
                }
            }
        }

        for field in mistyped_fields(entry, VERTICAL_ENTRY_FIELDS) {
            violations.push(Violation::vertical(
                name,
                self.rule_id(),
                format!("Field '{}' must be {}", field.key, field.kind.describe()),
            ));
        }

        violations
    }
}

impl IndexRule for VerticalEntryRule {
    fn rule_id(&self) -> &'static str {
        "vertical-entry"
    }

    fn description(&self) -> &'static str {
        "Vertical entries must have required fields, valid types and an existing registry entry"
    }

    fn check(&self, index: &IndexContent) -> Vec<Violation> {
        let Some(verticals) = index.verticals() else {
            return Vec::new();
        };

        let mut violations = Vec::new();
        for (position, entry) in verticals.iter().enumerate() {
            let name = entry_label(entry);
            match entry.as_object() {
                Some(fields) => violations.extend(self.check_entry(index, fields, &name)),
                None => violations.push(Violation::vertical(
                    name,
                    self.rule_id(),
                    format!("Entry at position {position} must be an object"),
                )),
            }
        }

        violations
    }
}

/// Rule: each registered package agrees with its own documents about its name
pub struct RegisteredPackageIdentityRule;

impl IndexRule for RegisteredPackageIdentityRule {
    fn rule_id(&self) -> &'static str {
        IDENTITY_RULE
    }

    fn description(&self) -> &'static str {
        "Registered packages must use one name across manifest, metadata and directory"
    }

    fn check(&self, index: &IndexContent) -> Vec<Violation> {
        let Some(verticals) = index.verticals() else {
            return Vec::new();
        };

        let mut violations = Vec::new();
        for (position, entry) in verticals.iter().enumerate() {
            let Some(identity) = index.packages.get(&position).and_then(|p| p.identity()) else {
                continue;
            };
            violations.extend(check_identity(
                &identity,
                &Scope::Vertical(entry_label(entry)),
            ));
        }

        violations
    }
}

/// Rule: statistics.total_verticals matches the number of entries
pub struct StatisticsRule;

impl IndexRule for StatisticsRule {
    fn rule_id(&self) -> &'static str {
        STATISTICS_RULE
    }

    fn description(&self) -> &'static str {
        "statistics.total_verticals must equal the number of verticals"
    }

    fn check(&self, index: &IndexContent) -> Vec<Violation> {
        let Some(statistics) = index.document.get("statistics").and_then(Value::as_object) else {
            return Vec::new();
        };
        // An absent list counts as empty; a non-list is a structure violation
        let actual = match index.document.get("verticals") {
            None => 0,
            Some(Value::Array(verticals)) => verticals.len(),
            Some(_) => return Vec::new(),
        };

        check_statistics(statistics.get("total_verticals"), actual)
    }
}

/// Rule: vertical names are unique
pub struct DuplicateNameRule;

impl IndexRule for DuplicateNameRule {
    fn rule_id(&self) -> &'static str {
        DUPLICATE_RULE
    }

    fn description(&self) -> &'static str {
        "No two verticals may share a name"
    }

    fn check(&self, index: &IndexContent) -> Vec<Violation> {
        let Some(verticals) = index.verticals() else {
            return Vec::new();
        };

        check_duplicates(
            verticals
                .iter()
                .filter_map(|entry| entry.get("name").and_then(Value::as_str))
                .filter(|name| !name.is_empty()),
        )
    }
}
