//! Pipeline orchestration
//!
//! The `Tabulator` drives one full run over an export file:
//! load -> duplicate scan -> per-subject answers loop -> pings aggregate ->
//! parent errors -> per-subject device loop -> device aggregate.
//!
//! Every per-subject stage failure is caught here, logged with the subject id
//! and stage name, and the subject's contribution for that stage is dropped.
//! The only fatal pipeline condition is an empty pings aggregate.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::answers;
use crate::devices;
use crate::duplicates::{self, DuplicateReport};
use crate::error::TabulateError;
use crate::merge;
use crate::nominations;
use crate::pings;
use crate::race;
use crate::schema::{self, SubjectKey, SubjectRecord};
use crate::table::Table;

/// Per-subject CSVs land here, under the output root
pub const SUBJECT_DIR: &str = "Subjects";
/// Aggregate tables, reports, and the device error log land here
pub const AGGREGATE_DIR: &str = "EMA_Output";

/// One run of the tabulation pipeline
pub struct Tabulator {
    input_path: PathBuf,
    output_root: PathBuf,
}

/// Accumulation counters reported after a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub subjects_total: usize,
    pub subjects_aggregated: usize,
    pub parent_errors: usize,
    pub duplicate_subjects: usize,
    pub aggregate_dir: PathBuf,
}

impl Tabulator {
    pub fn new(input_path: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_root: output_root.into(),
        }
    }

    fn input_stem(&self) -> String {
        self.input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "responses".to_string())
    }

    /// Run the full pipeline, producing all per-subject and aggregate outputs
    pub fn run(&self) -> Result<RunSummary, TabulateError> {
        let subject_dir = self.output_root.join(SUBJECT_DIR);
        let aggregate_dir = self.output_root.join(AGGREGATE_DIR);
        fs::create_dir_all(&subject_dir)?;
        fs::create_dir_all(&aggregate_dir)?;

        let stem = self.input_stem();

        info!("loading record store from {}", self.input_path.display());
        let store = schema::load_store(&self.input_path)?;

        let report = duplicates::detect(&store);
        info!(
            "duplicate scan: {} of {} subjects hold multiple sessions",
            report.len(),
            store.len()
        );
        write_json(&aggregate_dir.join("response-duplicates.json"), &report)?;

        // Answers-stage error log, opened once for the whole run
        let mut log = File::create(self.output_root.join(format!("{stem}.txt")))?;

        let mut keepers: Vec<Table> = Vec::new();
        let mut parent_errors: BTreeMap<String, SubjectRecord> = BTreeMap::new();

        for (key, record) in &store {
            let key = SubjectKey::parse(key);

            // A subject with no answers never enters extraction at all
            if record.answers.is_empty() {
                parent_errors.insert(key.raw().to_string(), record.clone());
                continue;
            }

            if let Some(table) =
                self.process_subject(&key, record, &subject_dir, &mut log)?
            {
                keepers.push(table);
            }
        }

        if keepers.is_empty() {
            warn!("no subject tables to aggregate; see {stem}.txt");
            return Err(TabulateError::EmptyAggregate);
        }

        info!("aggregating {} subject tables", keepers.len());
        let aggregate = Table::union(&keepers);
        aggregate.to_csv_file(&aggregate_dir.join(format!("pings_{stem}.csv")))?;

        write_json(&aggregate_dir.join("parent-errors.json"), &parent_errors)?;

        // The device pass is independent and covers every raw record,
        // parent-error subjects included.
        let mut device_log = File::create(aggregate_dir.join("device-error-log.txt"))?;
        let mut device_rows: Vec<Table> = Vec::new();

        for (key, record) in &store {
            let key = SubjectKey::parse(key);
            match devices::extract(record, &key) {
                Ok(row) => device_rows.push(row),
                Err(e) => caught(&mut device_log, key.subject_id(), "parse_device_info", &e)?,
            }
        }

        info!("aggregating {} device rows", device_rows.len());
        let device_aggregate = Table::union(&device_rows);
        device_aggregate.to_csv_file(&aggregate_dir.join(format!("devices_{stem}.csv")))?;

        Ok(RunSummary {
            subjects_total: store.len(),
            subjects_aggregated: keepers.len(),
            parent_errors: parent_errors.len(),
            duplicate_subjects: report.len(),
            aggregate_dir,
        })
    }

    /// Run the answers stages for one subject, catching each stage failure.
    ///
    /// Returns the merged subject table, or `None` when a stage failure left
    /// nothing to contribute.
    fn process_subject(
        &self,
        key: &SubjectKey,
        record: &SubjectRecord,
        subject_dir: &Path,
        log: &mut File,
    ) -> Result<Option<Table>, TabulateError> {
        let subject = key.subject_id();

        let answer_table = match answers::normalize(&record.answers) {
            Ok(mut table) => {
                race::decode(&mut table);
                nominations::decode(&mut table);
                Some(table)
            }
            Err(e) => {
                caught(log, subject, "derive_answers", &e)?;
                None
            }
        };

        let ping_table = match pings::extract(record, key) {
            Ok(table) => Some(table),
            Err(e) => {
                caught(log, subject, "derive_pings", &e)?;
                None
            }
        };

        let (Some(ping_table), Some(answer_table)) = (ping_table, answer_table) else {
            return Ok(None);
        };

        match merge::merge(&ping_table, &answer_table, record) {
            Ok(table) => {
                merge::persist(&table, subject, subject_dir)?;
                Ok(Some(table))
            }
            Err(e) => {
                caught(log, subject, "merge_output", &e)?;
                Ok(None)
            }
        }
    }

    /// Run the pipeline and bundle the aggregate directory, returning the
    /// summary and the archive path
    pub fn execute(&self) -> Result<(RunSummary, PathBuf), TabulateError> {
        let summary = self.run()?;
        let archive = crate::bundle::compress(&summary.aggregate_dir, &self.output_root)?;
        Ok((summary, archive))
    }

    /// Scan for duplicate sessions without running the pipeline
    pub fn duplicate_scan(&self) -> Result<DuplicateReport, TabulateError> {
        let store = schema::load_store(&self.input_path)?;
        Ok(duplicates::detect(&store))
    }
}

fn caught(
    log: &mut File,
    subject: &str,
    stage: &str,
    error: &TabulateError,
) -> Result<(), TabulateError> {
    warn!("caught @ {subject} + {stage}: {error}");
    writeln!(log, "Caught @ {subject} + {stage}: {error}")?;
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), TabulateError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
