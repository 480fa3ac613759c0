//! Structural diff between two schema snapshots.
//!
//! The baseline is the reference database (production); the candidate is
//! the one being checked (alpha). "Added" means present in the candidate
//! only, "removed" means present in the baseline only. Column changes carry
//! the baseline value as `old` and the candidate value as `new`.
//!
//! Computing a diff is pure: no I/O, deterministic, sorted output.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::schema::{SchemaSnapshot, TableSchema};

/// A value that differs between baseline and candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

/// Column-level differences of a table present on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableDiff {
    pub added_columns: Vec<String>,
    pub removed_columns: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub type_changed_columns: BTreeMap<String, Change<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub nullability_changed_columns: BTreeMap<String, Change<bool>>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.type_changed_columns.is_empty()
            && self.nullability_changed_columns.is_empty()
    }
}

/// Everything that differs between two snapshots.
///
/// A table listed in `added_tables` or `removed_tables` never appears in
/// `modified_tables`. Index names are qualified as `table.index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub added_tables: Vec<String>,
    pub removed_tables: Vec<String>,
    pub modified_tables: BTreeMap<String, TableDiff>,
    pub added_indexes: Vec<String>,
    pub removed_indexes: Vec<String>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.added_tables.is_empty()
            && self.removed_tables.is_empty()
            && self.modified_tables.is_empty()
            && self.added_indexes.is_empty()
            && self.removed_indexes.is_empty()
    }
}

/// Compare `candidate` against `baseline`.
pub fn compute_diff(baseline: &SchemaSnapshot, candidate: &SchemaSnapshot) -> SchemaDiff {
    let base_tables = baseline.table_names();
    let cand_tables = candidate.table_names();

    let mut diff = SchemaDiff {
        added_tables: cand_tables
            .difference(&base_tables)
            .map(|t| t.to_string())
            .collect(),
        removed_tables: base_tables
            .difference(&cand_tables)
            .map(|t| t.to_string())
            .collect(),
        ..SchemaDiff::default()
    };

    for name in base_tables.intersection(&cand_tables) {
        let old = &baseline.tables[*name];
        let new = &candidate.tables[*name];

        let table_diff = diff_table(old, new);
        if !table_diff.is_empty() {
            diff.modified_tables.insert(name.to_string(), table_diff);
        }

        diff.added_indexes.extend(
            new.indexes
                .difference(&old.indexes)
                .map(|idx| format!("{}.{}", name, idx)),
        );
        diff.removed_indexes.extend(
            old.indexes
                .difference(&new.indexes)
                .map(|idx| format!("{}.{}", name, idx)),
        );
    }

    diff.added_indexes.sort();
    diff.removed_indexes.sort();
    diff
}

fn diff_table(old: &TableSchema, new: &TableSchema) -> TableDiff {
    let mut table_diff = TableDiff {
        added_columns: new
            .columns
            .keys()
            .filter(|c| !old.columns.contains_key(*c))
            .cloned()
            .collect(),
        removed_columns: old
            .columns
            .keys()
            .filter(|c| !new.columns.contains_key(*c))
            .cloned()
            .collect(),
        ..TableDiff::default()
    };

    for (col, old_info) in &old.columns {
        let Some(new_info) = new.columns.get(col) else {
            continue;
        };
        if old_info.data_type != new_info.data_type {
            table_diff.type_changed_columns.insert(
                col.clone(),
                Change {
                    old: old_info.data_type.clone(),
                    new: new_info.data_type.clone(),
                },
            );
        }
        if old_info.nullable != new_info.nullable {
            table_diff.nullability_changed_columns.insert(
                col.clone(),
                Change {
                    old: old_info.nullable,
                    new: new_info.nullable,
                },
            );
        }
    }

    table_diff
}

/// Human-readable report of a diff, used as the notification summary.
pub fn format_report(diff: &SchemaDiff, baseline_label: &str, candidate_label: &str) -> String {
    let base = baseline_label.to_uppercase();
    let cand = candidate_label.to_uppercase();
    let mut lines: Vec<String> = Vec::new();

    if diff.is_empty() {
        return "No schema differences detected.".to_string();
    }

    if !diff.added_tables.is_empty() {
        lines.push(format!(
            "TABLES IN {} ONLY (not in {}) [{}]:",
            cand,
            baseline_label,
            diff.added_tables.len()
        ));
        lines.extend(diff.added_tables.iter().map(|t| format!("  + {}", t)));
        lines.push(String::new());
    }

    if !diff.removed_tables.is_empty() {
        lines.push(format!(
            "TABLES IN {} ONLY (not in {}) [{}]:",
            base,
            candidate_label,
            diff.removed_tables.len()
        ));
        lines.extend(diff.removed_tables.iter().map(|t| format!("  - {}", t)));
        lines.push(String::new());
    }

    if !diff.modified_tables.is_empty() {
        lines.push(format!("MODIFIED TABLES [{}]:", diff.modified_tables.len()));
        for (table, changes) in &diff.modified_tables {
            lines.push(format!("  {}:", table));
            if !changes.added_columns.is_empty() {
                lines.push(format!("    Columns in {} only:", candidate_label));
                lines.extend(changes.added_columns.iter().map(|c| format!("      + {}", c)));
            }
            if !changes.removed_columns.is_empty() {
                lines.push(format!("    Columns in {} only:", baseline_label));
                lines.extend(changes.removed_columns.iter().map(|c| format!("      - {}", c)));
            }
            if !changes.type_changed_columns.is_empty()
                || !changes.nullability_changed_columns.is_empty()
            {
                lines.push("    Changed columns:".to_string());
                for (col, change) in &changes.type_changed_columns {
                    lines.push(format!("      ~ {}: type {} -> {}", col, change.old, change.new));
                }
                for (col, change) in &changes.nullability_changed_columns {
                    lines.push(format!(
                        "      ~ {}: nullable {} -> {}",
                        col, change.old, change.new
                    ));
                }
            }
        }
        lines.push(String::new());
    }

    if !diff.added_indexes.is_empty() {
        lines.push(format!(
            "INDEXES IN {} ONLY (not in {}) [{}]:",
            cand,
            baseline_label,
            diff.added_indexes.len()
        ));
        lines.extend(diff.added_indexes.iter().map(|i| format!("  + {}", i)));
        lines.push(String::new());
    }

    if !diff.removed_indexes.is_empty() {
        lines.push(format!(
            "INDEXES IN {} ONLY (not in {}) [{}]:",
            base,
            candidate_label,
            diff.removed_indexes.len()
        ));
        lines.extend(diff.removed_indexes.iter().map(|i| format!("  - {}", i)));
        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}
