//! Ordered wide-table representation
//!
//! A minimal column-ordered table of optional text cells. Missing (`None`)
//! and empty (`Some("")`) cells are distinct: missing means the source never
//! produced a value, empty means a decoder deliberately blanked the slot.
//! All tabular stages of the pipeline read and write this shape before it is
//! serialized to CSV.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::TabulateError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with a fixed starting column order
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Add a column if absent, padding existing rows with missing cells.
    /// Returns the column index either way.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(ix) = self.column_index(name) {
            return ix;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Append an all-missing row, returning its index
    pub fn push_row(&mut self) -> usize {
        self.rows.push(vec![None; self.columns.len()]);
        self.rows.len() - 1
    }

    pub fn set(&mut self, row: usize, column: &str, value: Option<String>) {
        let col = self.ensure_column(column);
        self.rows[row][col] = value;
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Inner join with `other` on the named key column.
    ///
    /// Rows whose key is missing never match. Key columns must exist on both
    /// sides; a row on the left joins against every matching row on the
    /// right. Right-side columns are appended after the left's, except the
    /// key itself and any name the left already carries.
    pub fn inner_join(&self, other: &Table, key: &str) -> Table {
        let left_key = self.column_index(key);
        let right_key = other.column_index(key);

        let appended: Vec<(usize, &String)> = other
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != key && !self.has_column(name))
            .collect();

        let mut joined = Table::with_columns(
            self.columns
                .iter()
                .cloned()
                .chain(appended.iter().map(|(_, name)| (*name).clone())),
        );

        let (left_key, right_key) = match (left_key, right_key) {
            (Some(l), Some(r)) => (l, r),
            _ => return joined,
        };

        let mut lookup: HashMap<&str, Vec<usize>> = HashMap::new();
        for (ix, row) in other.rows.iter().enumerate() {
            if let Some(k) = row[right_key].as_deref() {
                lookup.entry(k).or_default().push(ix);
            }
        }

        for row in &self.rows {
            let Some(k) = row[left_key].as_deref() else {
                continue;
            };
            let Some(matches) = lookup.get(k) else {
                continue;
            };
            for &rix in matches {
                let mut out = row.clone();
                for (cix, _) in &appended {
                    out.push(other.rows[rix][*cix].clone());
                }
                joined.rows.push(out);
            }
        }

        joined
    }

    /// Copy the first row of `single` onto every row of this table.
    ///
    /// Columns the table already has (e.g. `username`) are left untouched;
    /// new columns are appended with the broadcast value in every row.
    pub fn broadcast(&mut self, single: &Table) {
        if single.is_empty() {
            return;
        }
        for (cix, name) in single.columns.iter().enumerate() {
            if self.has_column(name) {
                continue;
            }
            let col = self.ensure_column(name);
            let value = single.rows[0][cix].clone();
            for row in &mut self.rows {
                row[col] = value.clone();
            }
        }
    }

    /// Row-wise union over many tables with an outer column union.
    ///
    /// Column order follows first appearance across the inputs; cells for
    /// columns a table lacks come out missing.
    pub fn union<'a, I>(tables: I) -> Table
    where
        I: IntoIterator<Item = &'a Table>,
    {
        let mut out = Table::new();
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|name| out.ensure_column(name))
                .collect();
            for row in &table.rows {
                let rix = out.push_row();
                for (cix, value) in row.iter().enumerate() {
                    out.rows[rix][mapping[cix]] = value.clone();
                }
            }
        }
        out
    }

    /// Serialize to CSV with a header row; missing cells become empty fields
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TabulateError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_file(&self, path: &Path) -> Result<(), TabulateError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}
