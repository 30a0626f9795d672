//! Subject row merging
//!
//! Joins one subject's ping table with their wide answer table and a reduced
//! device projection, and persists the result as the per-subject CSV.

use std::path::{Path, PathBuf};

use crate::devices;
use crate::error::TabulateError;
use crate::schema::SubjectRecord;
use crate::table::Table;

/// Merge pings, answers, and device attributes into one subject table.
///
/// Device attributes are broadcast across every ping row, then pings and
/// answers inner-join on `id`: a ping with no surviving answer row is
/// silently dropped.
pub fn merge(
    pings: &Table,
    answers: &Table,
    record: &SubjectRecord,
) -> Result<Table, TabulateError> {
    let projection = devices::device_projection(record)?;

    let mut augmented = pings.clone();
    augmented.broadcast(&projection);

    Ok(augmented.inner_join(answers, "id"))
}

/// Persist a subject table as `{subject_id}.csv` in the per-subject directory.
///
/// Duplicate sessions of one subject collide on the file name; the second
/// write falls back to a single `_b` suffix. A third occurrence overwrites
/// the fallback.
pub fn persist(
    table: &Table,
    subject_id: &str,
    directory: &Path,
) -> Result<PathBuf, TabulateError> {
    let mut path = directory.join(format!("{subject_id}.csv"));
    if path.exists() {
        path = directory.join(format!("{subject_id}_b.csv"));
    }
    table.to_csv_file(&path)?;
    Ok(path)
}
