//! Export artifacts — tabular (CSV) and document (PDF) renderings of a
//! record snapshot, written as numbered files under the exports
//! directory.

pub mod csv;
pub mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum ExportError {
    /// Header and data row disagree on column count. Never written to
    /// disk — serialization fails whole rather than emitting a
    /// malformed artifact.
    #[error("Column mismatch: {headers} header columns, {values} value columns")]
    ColumnMismatch { headers: usize, values: usize },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Cannot write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Filename for a numbered export artifact: `mECMO_EMS_<n>.<ext>`.
pub fn export_filename(record_number: i64, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        config::EXPORT_FILE_PREFIX,
        record_number,
        extension
    )
}

/// Write artifact bytes into the exports directory, creating it if
/// needed. Returns the full path of the written file.
pub fn write_export_file(
    bytes: &[u8],
    filename: &str,
    exports_dir: &Path,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(exports_dir)?;
    let path = exports_dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_carries_prefix_number_extension() {
        assert_eq!(export_filename(712, "csv"), "mECMO_EMS_712.csv");
        assert_eq!(export_filename(930, "pdf"), "mECMO_EMS_930.pdf");
    }

    #[test]
    fn write_creates_exports_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exports = dir.path().join("exports");

        let path = write_export_file(b"hello", "mECMO_EMS_712.csv", &exports).unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert!(path.ends_with("exports/mECMO_EMS_712.csv"));
    }
}
