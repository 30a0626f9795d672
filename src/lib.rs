//! EMA Tabulator - turns mobile EMA survey exports into flat tabular datasets
//!
//! The export is one nested JSON mapping of subject-session keys to prompt,
//! answer, and device logs. The pipeline normalizes answers (long to wide),
//! decodes two families of encoded multi-select columns, flattens device
//! metadata, detects duplicate sessions, and unions everything into run-level
//! aggregates - isolating malformed subject data per stage instead of
//! aborting the run.
//!
//! ## Modules
//!
//! - **cleanup / table**: shared value normalization and the wide-table shape
//! - **pings / answers / nominations / race / devices / merge**: per-subject stages
//! - **duplicates**: run-level duplicate-session scan
//! - **pipeline**: orchestration, fault isolation, and aggregation
//! - **bundle**: date-stamped packaging of the aggregate directory

pub mod answers;
pub mod bundle;
pub mod cleanup;
pub mod devices;
pub mod duplicates;
pub mod error;
pub mod merge;
pub mod nominations;
pub mod pings;
pub mod pipeline;
pub mod race;
pub mod schema;
pub mod table;

pub use duplicates::{DuplicateEntry, DuplicateReport};
pub use error::TabulateError;
pub use pipeline::{RunSummary, Tabulator};
pub use schema::{ResponseStore, SubjectKey, SubjectRecord};
pub use table::Table;

/// Tabulator version embedded in CLI output
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
