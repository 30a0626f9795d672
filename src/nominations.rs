//! Peer-nomination decoding
//!
//! Four survey items ask a subject to name up to three peers; the export
//! stores them as one encoded list-text column each. This module un-nests
//! every parent into three ordered child columns so nominees can be matched
//! against a name roster downstream.
//!
//! The quote-comma delimiter convention here mirrors the export and is not a
//! stable wire contract; keep all knowledge of it inside this module.

use crate::answers::PNA;
use crate::cleanup::cleanup_value;
use crate::table::Table;

/// Parent column names paired with their child naming templates
pub const PARENTS: [(&str, &str); 4] = [
    ("SU_Nom", "SU_Nom_{}"),
    ("SU_Nom_None_Nom", "SU_Nom_None_Nom_{}"),
    ("NSU_Rel", "NSU{}_Rel"),
    ("NSU_Nom_None_Nom", "NSU{}_None_Rel"),
];

/// Nominee slots per parent
pub const SLOTS: usize = 3;

/// Classification of one raw nomination cell, evaluated once per value
#[derive(Debug, Clone, PartialEq, Eq)]
enum NominationValue {
    /// Missing cell, literal "None", or the PNA sentinel: all slots stay empty
    Blank,
    /// Encoded list text to split into nominee slots
    Encoded(String),
}

fn classify(cell: Option<&str>) -> NominationValue {
    match cell {
        None => NominationValue::Blank,
        Some(text) if text == "None" || text == PNA => NominationValue::Blank,
        Some(text) => NominationValue::Encoded(text.to_string()),
    }
}

fn child_column(template: &str, slot: usize) -> String {
    template.replacen("{}", &slot.to_string(), 1)
}

/// Decode all four nomination parents into their child columns.
///
/// Child columns are always created (empty) for every row, whether or not
/// the parent column exists; parents are retained unchanged. Items beyond
/// the third nominee are discarded.
pub fn decode(table: &mut Table) {
    for (parent, template) in PARENTS {
        // Standardize the shape first: every subject gets all child columns.
        for slot in 1..=SLOTS {
            let child = child_column(template, slot);
            table.ensure_column(&child);
            for row in 0..table.row_count() {
                table.set(row, &child, Some(String::new()));
            }
        }

        if !table.has_column(parent) {
            continue;
        }

        for row in 0..table.row_count() {
            let cell = table.get(row, parent).map(str::to_string);
            let NominationValue::Encoded(text) = classify(cell.as_deref()) else {
                continue;
            };

            // Double quotes collapse to single so one delimiter pattern
            // (comma after a closing quote) covers both styles.
            let unified = text.replace('"', "'");
            for (ix, item) in unified.split("',").take(SLOTS).enumerate() {
                let nominee: String = item
                    .chars()
                    .filter(|c| *c != '[' && *c != ']')
                    .collect::<String>()
                    .trim()
                    .to_string();
                table.set(row, &child_column(template, ix + 1), Some(nominee));
            }
        }
    }

    // Second cleanup pass over every child column: splitting leaves residual
    // quotes that would break exact roster matching.
    for (_, template) in PARENTS {
        for slot in 1..=SLOTS {
            let child = child_column(template, slot);
            for row in 0..table.row_count() {
                if let Some(text) = table.get(row, &child).map(str::to_string) {
                    table.set(row, &child, Some(cleanup_value(&text)));
                }
            }
        }
    }
}
