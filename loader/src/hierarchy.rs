//! Parents-before-children ordering for self-referential datasets.
//!
//! Salesforce rejects a child row whose parent lookup has not been
//! upserted yet, so hierarchical datasets (asset categories) must be
//! reordered before staging. The sort is iterative, tolerates arbitrary
//! depth, and degrades gracefully on unresolvable references: a cycle or
//! a dangling parent never blocks the load.

use crate::codec::Record;
use crate::progress::log_warning;
use std::collections::HashSet;

/// Reorder `records` so every record's parent (by `parent_field`, matched
/// against `external_id_field`) appears before it.
///
/// Multi-pass worklist: each pass moves every record whose parent field is
/// empty or already placed. A pass that places nothing means the leftovers
/// form a cycle or reference records not present in the input; they are
/// appended in their original relative order and flagged.
///
/// Output length always equals input length.
pub fn sort_by_hierarchy(
    records: Vec<Record>,
    parent_field: &str,
    external_id_field: &str,
) -> Vec<Record> {
    let mut sorted: Vec<Record> = Vec::with_capacity(records.len());
    let mut pending: Vec<Record> = records;
    let mut processed: HashSet<String> = HashSet::new();

    let mut added = true;
    while added && !pending.is_empty() {
        added = false;

        let mut still_pending = Vec::with_capacity(pending.len());
        for record in pending {
            let parent = record.get(parent_field).map(String::as_str).unwrap_or("");
            if parent.is_empty() || processed.contains(parent) {
                if let Some(id) = record.get(external_id_field) {
                    processed.insert(id.clone());
                }
                sorted.push(record);
                added = true;
            } else {
                still_pending.push(record);
            }
        }
        pending = still_pending;
    }

    if !pending.is_empty() {
        log_warning(format!(
            "{} records may have circular or unresolvable parent references, adding them anyway",
            pending.len()
        ));
        sorted.extend(pending);
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, parent: &str) -> Record {
        let mut r = Record::new();
        r.insert("External_Id__c".to_string(), id.to_string());
        r.insert("Parent_Category__c".to_string(), parent.to_string());
        r
    }

    fn sort(records: Vec<Record>) -> Vec<String> {
        sort_by_hierarchy(records, "Parent_Category__c", "External_Id__c")
            .into_iter()
            .map(|r| r["External_Id__c"].clone())
            .collect()
    }

    #[test]
    fn test_reverse_input_three_levels() {
        // Deepest child first in the input; output must be root-first.
        let out = sort(vec![record("3", "2"), record("2", "1"), record("1", "")]);
        assert_eq!(out, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parents_precede_children() {
        let out = sort(vec![
            record("leaf-a", "mid"),
            record("root", ""),
            record("leaf-b", "mid"),
            record("mid", "root"),
        ]);
        let pos = |id: &str| out.iter().position(|x| x == id).unwrap();
        assert!(pos("root") < pos("mid"));
        assert!(pos("mid") < pos("leaf-a"));
        assert!(pos("mid") < pos("leaf-b"));
    }

    #[test]
    fn test_roots_keep_relative_order() {
        let out = sort(vec![record("a", ""), record("b", ""), record("c", "")]);
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_terminates_and_keeps_all() {
        let out = sort(vec![record("a", "b"), record("b", "a")]);
        assert_eq!(out.len(), 2);
        assert!(out.contains(&"a".to_string()));
        assert!(out.contains(&"b".to_string()));
    }

    #[test]
    fn test_dangling_parent_appended_in_input_order() {
        let out = sort(vec![
            record("x", "ghost-1"),
            record("ok", ""),
            record("y", "ghost-2"),
        ]);
        assert_eq!(out, vec!["ok", "x", "y"]);
    }

    #[test]
    fn test_length_preserved_with_duplicates() {
        // Duplicate external ids pass through; nothing is deduplicated.
        let out = sort(vec![record("dup", ""), record("dup", ""), record("c", "dup")]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(sort(vec![]).is_empty());
    }
}
