//! Report persistence and document export

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::TradeRecord;

// =============================================================================
// Trade table
// =============================================================================

/// Path of the trade table for a report: `{save_dir}/{report_name}_table.csv`
pub fn table_path(save_dir: impl AsRef<Path>, report_name: &str) -> PathBuf {
    save_dir.as_ref().join(format!("{}_table.csv", report_name))
}

/// Write trade records as CSV, creating the parent directory if needed.
///
/// Rows go to a sibling `.tmp` file that is renamed into place once flushed,
/// so a failed write never leaves a partial table behind.
pub fn write_trade_table(records: &[TradeRecord], path: impl AsRef<Path>) -> ReportResult<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(e) = write_records(records, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    info!("Saved {} rows to {}", records.len(), path.display());
    Ok(path.to_path_buf())
}

fn write_records(records: &[TradeRecord], path: &Path) -> ReportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // serde skips the header when there are no rows
    if records.is_empty() {
        writer.write_record([
            "timestamp",
            "entry_price",
            "exit_price",
            "profit",
            "reason",
            "duration_min",
        ])?;
    }
    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

// =============================================================================
// Document export
// =============================================================================

/// Secondary document formats a report notebook can be converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Html,
    Pdf,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Html => "html",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Html => write!(f, "HTML"),
            DocumentFormat::Pdf => write!(f, "PDF"),
        }
    }
}

/// Converts a companion report document into another format
pub trait DocumentExporter {
    /// Convert `source` into `{output_dir}/{name}.{ext}` and return that path
    fn export(
        &self,
        source: &Path,
        format: DocumentFormat,
        output_dir: &Path,
        name: &str,
    ) -> ReportResult<PathBuf>;
}

/// Shells out to `jupyter nbconvert`
#[derive(Debug, Clone)]
pub struct NbconvertExporter {
    program: String,
}

impl NbconvertExporter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NbconvertExporter {
    fn default() -> Self {
        Self::new("jupyter")
    }
}

impl DocumentExporter for NbconvertExporter {
    fn export(
        &self,
        source: &Path,
        format: DocumentFormat,
        output_dir: &Path,
        name: &str,
    ) -> ReportResult<PathBuf> {
        let output_name = format!("{}.{}", name, format.extension());
        debug!(
            "Running {} nbconvert {} --to {}",
            self.program,
            source.display(),
            format.extension()
        );

        let output = Command::new(&self.program)
            .arg("nbconvert")
            .arg(source)
            .arg("--to")
            .arg(format.extension())
            .arg("--output")
            .arg(&output_name)
            .arg(format!("--output-dir={}", output_dir.display()))
            .output()
            .map_err(|e| ReportError::Export(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::Export(format!(
                "nbconvert exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output_dir.join(output_name))
    }
}

/// Exporter that converts nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExporter;

impl DocumentExporter for NoopExporter {
    fn export(
        &self,
        _source: &Path,
        format: DocumentFormat,
        output_dir: &Path,
        name: &str,
    ) -> ReportResult<PathBuf> {
        Ok(output_dir.join(format!("{}.{}", name, format.extension())))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(profit: f64) -> TradeRecord {
        TradeRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap(),
            entry_price: 100.0,
            exit_price: 100.0 + profit,
            profit,
            reason: "ema_cross".to_string(),
            duration_min: 12.5,
        }
    }

    #[test]
    fn test_table_path() {
        assert_eq!(
            table_path("reports/", "weekly"),
            PathBuf::from("reports/weekly_table.csv")
        );
    }

    #[test]
    fn test_write_trade_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = table_path(dir.path().join("nested"), "perf");

        write_trade_table(&[record(5.0), record(-2.0)], &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "timestamp,entry_price,exit_price,profit,reason,duration_min"
        );
        assert_eq!(lines[1], "2024-02-03 04:05:06,100.0,105.0,5.0,ema_cross,12.5");
        assert_eq!(lines.len(), 3);
        assert!(!dir.path().join("nested/perf_table.csv.tmp").exists());
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = table_path(dir.path(), "blocked");
        // a non-empty directory where the table should go makes the rename fail
        fs::create_dir_all(path.join("occupied")).unwrap();

        let result = write_trade_table(&[record(1.0)], &path);

        assert!(result.is_err());
        assert!(!dir.path().join("blocked_table.csv.tmp").exists());
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("blocked_table.csv")]);
    }

    #[test]
    fn test_write_empty_table_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = table_path(dir.path(), "empty");

        write_trade_table(&[], &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents.trim_end(),
            "timestamp,entry_price,exit_price,profit,reason,duration_min"
        );
    }

    #[test]
    fn test_nbconvert_missing_program() {
        let exporter = NbconvertExporter::new("definitely-not-a-real-binary-4821");
        let dir = tempfile::tempdir().unwrap();
        let err = exporter
            .export(
                &dir.path().join("report.ipynb"),
                DocumentFormat::Html,
                dir.path(),
                "report",
            )
            .unwrap_err();
        assert!(matches!(err, ReportError::Export(_)));
    }

    #[test]
    fn test_noop_exporter_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = NoopExporter
            .export(
                &dir.path().join("report.ipynb"),
                DocumentFormat::Pdf,
                dir.path(),
                "report",
            )
            .unwrap();
        assert_eq!(path, dir.path().join("report.pdf"));
        assert!(!path.exists());
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(DocumentFormat::Html.extension(), "html");
        assert_eq!(DocumentFormat::Pdf.extension(), "pdf");
        assert_eq!(DocumentFormat::Pdf.to_string(), "PDF");
    }
}
