//! Catalog resolution: duplicate detection and dedup.

use std::collections::{HashMap, HashSet};

use crate::models::CatalogEntry;

/// Warn about duplicated table ids and collapse exact duplicates.
///
/// The same table id under a different organization or url code is a
/// real (if suspicious) configuration and is kept; only rows identical
/// in all three fields collapse to one. Never aborts the run.
pub fn resolve(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in &entries {
        *counts.entry(entry.tbl_id.as_str()).or_default() += 1;
    }

    let mut duplicated: Vec<&str> = Vec::new();
    for entry in &entries {
        if counts[entry.tbl_id.as_str()] > 1 && !duplicated.contains(&entry.tbl_id.as_str()) {
            duplicated.push(entry.tbl_id.as_str());
        }
    }
    if !duplicated.is_empty() {
        tracing::warn!(
            "duplicate table ids in catalog ({}): {:?}",
            duplicated.len(),
            duplicated
        );
    }

    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(org: &str, tbl: &str, url: &str) -> CatalogEntry {
        CatalogEntry {
            org_id: org.to_string(),
            tbl_id: tbl.to_string(),
            url_code: url.to_string(),
        }
    }

    #[test]
    fn exact_tuple_duplicates_collapse() {
        let resolved = resolve(vec![
            entry("101", "DT_1", "A"),
            entry("101", "DT_1", "A"),
            entry("101", "DT_2", "B"),
        ]);
        assert_eq!(
            resolved,
            vec![entry("101", "DT_1", "A"), entry("101", "DT_2", "B")]
        );
    }

    #[test]
    fn same_table_under_different_org_is_kept() {
        let resolved = resolve(vec![entry("101", "DT_1", "A"), entry("202", "DT_1", "A")]);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn resolution_is_idempotent() {
        let input = vec![
            entry("101", "DT_1", "A"),
            entry("101", "DT_1", "A"),
            entry("202", "DT_1", "B"),
            entry("101", "DT_2", "C"),
        ];
        let once = resolve(input);
        let twice = resolve(once.clone());
        assert_eq!(once, twice);
    }
}
