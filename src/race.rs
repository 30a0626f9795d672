//! Race-response decoding
//!
//! Race is a check-all-that-apply item: the export encodes it as bracketed
//! `[label, flag]` groups in one text cell. This module keeps only the
//! groups whose flag reads true and rewrites the cell as a plain label list.
//!
//! Like the nomination decoder, the bracket-comma delimiter convention is
//! fragile export behavior, not a contract; it lives only here.

use crate::table::Table;

pub const RACE_COLUMN: &str = "Race";

/// Decode the Race column in place.
///
/// An absent column is created empty for every row. A missing cell stays
/// missing (the null marker for an unparseable row); any present text decodes
/// to `[l1, l2, ...]`, which is `[]` when no category was marked true.
pub fn decode(table: &mut Table) {
    if !table.has_column(RACE_COLUMN) {
        table.ensure_column(RACE_COLUMN);
        return;
    }

    for row in 0..table.row_count() {
        let Some(text) = table.get(row, RACE_COLUMN).map(str::to_string) else {
            continue;
        };
        let labels = true_labels(&text);
        table.set(row, RACE_COLUMN, Some(format!("[{}]", labels.join(", "))));
    }
}

/// Extract the labels of all true category groups from one encoded cell
fn true_labels(text: &str) -> Vec<String> {
    let unquoted: String = text.chars().filter(|c| *c != '\'' && *c != '"').collect();

    unquoted
        .split("],")
        .filter(|group| group.contains("True"))
        .map(|group| {
            group
                .split(',')
                .next()
                .unwrap_or("")
                .chars()
                .filter(|c| *c != '[' && *c != ']')
                .collect::<String>()
                .trim()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn one_row_table(value: Option<&str>) -> Table {
        let mut table = Table::with_columns(["id", RACE_COLUMN]);
        let row = table.push_row();
        table.set(row, "id", Some("p1".to_string()));
        table.set(row, RACE_COLUMN, value.map(str::to_string));
        table
    }

    #[test]
    fn test_multiple_true_categories() {
        // Cleaned export text for [['White', True], ['Asian', True], ['Black', False]]
        let mut table = one_row_table(Some(
            "[['White', True], ['Asian', True], ['Black', False]]",
        ));
        decode(&mut table);
        assert_eq!(table.get(0, RACE_COLUMN), Some("[White, Asian]"));
    }

    #[test]
    fn test_no_true_category_is_empty_list_not_error() {
        let mut table = one_row_table(Some("[['White', False], ['Asian', False]]"));
        decode(&mut table);
        assert_eq!(table.get(0, RACE_COLUMN), Some("[]"));
    }

    #[test]
    fn test_missing_cell_stays_null_marker() {
        let mut table = one_row_table(None);
        decode(&mut table);
        assert_eq!(table.get(0, RACE_COLUMN), None);
    }

    #[test]
    fn test_absent_column_created_empty() {
        let mut table = Table::with_columns(["id"]);
        let row = table.push_row();
        table.set(row, "id", Some("p1".to_string()));

        decode(&mut table);
        assert!(table.has_column(RACE_COLUMN));
        assert_eq!(table.get(0, RACE_COLUMN), None);
    }

    #[test]
    fn test_double_quoted_groups() {
        let mut table = one_row_table(Some("[[\"White\", True]]"));
        decode(&mut table);
        assert_eq!(table.get(0, RACE_COLUMN), Some("[White]"));
    }
}
