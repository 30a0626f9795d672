//! Aggregate-output packaging
//!
//! Wraps the aggregate directory into a date-stamped gzip tarball for
//! download. Pure I/O; errors propagate untouched.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;

use crate::error::TabulateError;

/// Archive file name under the output root
pub const ARCHIVE_NAME: &str = "EMA_Responses.tar.gz";

/// Compress the aggregate directory into `{output_root}/EMA_Responses.tar.gz`.
///
/// The directory lands in the archive under `EMA_Responses_{Mon_DD_YYYY}` so
/// unpacked bundles from different days never collide.
pub fn compress(aggregate_dir: &Path, output_root: &Path) -> Result<PathBuf, TabulateError> {
    let stamp = Local::now().format("%b_%d_%Y");
    let archive_path = output_root.join(ARCHIVE_NAME);

    let file = File::create(&archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(format!("EMA_Responses_{stamp}"), aggregate_dir)?;
    builder.into_inner()?.finish()?;

    info!("bundled {} into {}", aggregate_dir.display(), archive_path.display());
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_contains_aggregate_files() {
        let dir = TempDir::new().unwrap();
        let aggregate = dir.path().join("EMA_Output");
        fs::create_dir_all(&aggregate).unwrap();
        fs::write(aggregate.join("pings_responses.csv"), "id\np1\n").unwrap();

        let archive = compress(&aggregate, dir.path()).unwrap();
        assert!(archive.exists());

        let mut tarball = tar::Archive::new(GzDecoder::new(File::open(&archive).unwrap()));
        let names: Vec<String> = tarball
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(names.iter().any(|n| n.starts_with("EMA_Responses_")));
        assert!(names.iter().any(|n| n.ends_with("pings_responses.csv")));
    }
}
