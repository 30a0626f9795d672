//! Duplicate-session detection
//!
//! A subject who logged in more than once appears under several
//! subject-session keys. The scan runs once before per-subject processing and
//! is read-only; it reports, it never filters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::{ResponseStore, SubjectKey};

/// Subjects with more than one session key, keyed by subject id
pub type DuplicateReport = BTreeMap<String, DuplicateEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub count: usize,
    pub keys: Vec<String>,
}

/// Group all store keys by subject id and report every subject holding more
/// than one session key. Keys are listed in store order.
pub fn detect(store: &ResponseStore) -> DuplicateReport {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for key in store.keys() {
        let subject = SubjectKey::parse(key).subject_id().to_string();
        grouped.entry(subject).or_default().push(key.clone());
    }

    grouped
        .into_iter()
        .filter(|(_, keys)| keys.len() > 1)
        .map(|(subject, keys)| {
            let entry = DuplicateEntry {
                count: keys.len(),
                keys,
            };
            (subject, entry)
        })
        .collect()
}
