//! Configuration management
//!
//! Report settings come from defaults, an optional JSON file and `REPORT_*`
//! environment variables, in that order.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, ReportResult};
use crate::export::table_path;
use crate::PairingPolicy;

pub const DEFAULT_REPORT_NAME: &str = "performance_report";
pub const DEFAULT_SAVE_DIR: &str = "reports/";

/// Settings for one report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Trade log to read
    #[serde(default)]
    pub csv_path: PathBuf,
    #[serde(default = "default_report_name")]
    pub report_name: String,
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    #[serde(default)]
    pub export_html: bool,
    #[serde(default)]
    pub export_pdf: bool,
    /// Companion notebook converted by the exporter.
    /// Defaults to `{save_dir}/{report_name}.ipynb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_path: Option<PathBuf>,
    #[serde(default = "default_nbconvert_bin")]
    pub nbconvert_bin: String,
    #[serde(default)]
    pub pairing: PairingPolicy,
}

fn default_report_name() -> String {
    DEFAULT_REPORT_NAME.to_string()
}

fn default_save_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SAVE_DIR)
}

fn default_nbconvert_bin() -> String {
    "jupyter".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            csv_path: PathBuf::new(),
            report_name: default_report_name(),
            save_dir: default_save_dir(),
            export_html: false,
            export_pdf: false,
            notebook_path: None,
            nbconvert_bin: default_nbconvert_bin(),
            pairing: PairingPolicy::default(),
        }
    }
}

impl ReportConfig {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        ReportConfig {
            csv_path: csv_path.into(),
            ..Default::default()
        }
    }

    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> ReportResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: ReportConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `REPORT_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable source, keyed like the environment
    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(csv_path) = var("REPORT_CSV_PATH") {
            self.csv_path = PathBuf::from(csv_path);
        }
        if let Some(name) = var("REPORT_NAME") {
            self.report_name = name;
        }
        if let Some(dir) = var("REPORT_SAVE_DIR") {
            self.save_dir = PathBuf::from(dir);
        }
        if let Some(flag) = var("REPORT_EXPORT_HTML").and_then(|v| parse_flag(&v)) {
            self.export_html = flag;
        }
        if let Some(flag) = var("REPORT_EXPORT_PDF").and_then(|v| parse_flag(&v)) {
            self.export_pdf = flag;
        }
    }

    pub fn validate(&self) -> ReportResult<()> {
        if self.csv_path.as_os_str().is_empty() {
            return Err(ReportError::InvalidConfig("csv_path is required".to_string()));
        }
        if self.report_name.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "report_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn table_path(&self) -> PathBuf {
        table_path(&self.save_dir, &self.report_name)
    }

    pub fn notebook_path(&self) -> PathBuf {
        self.notebook_path
            .clone()
            .unwrap_or_else(|| self.save_dir.join(format!("{}.ipynb", self.report_name)))
    }

    pub fn wants_export(&self) -> bool {
        self.export_html || self.export_pdf
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::new("logs/trades.csv");
        assert_eq!(config.report_name, "performance_report");
        assert_eq!(config.save_dir, PathBuf::from("reports/"));
        assert!(!config.export_html);
        assert!(!config.export_pdf);
        assert_eq!(config.pairing, PairingPolicy::Positional);
        assert_eq!(
            config.table_path(),
            PathBuf::from("reports/performance_report_table.csv")
        );
        assert_eq!(
            config.notebook_path(),
            PathBuf::from("reports/performance_report.ipynb")
        );
    }

    #[test]
    fn test_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(
            &path,
            r#"{ "csv_path": "trades.csv", "report_name": "weekly", "export_pdf": true, "pairing": "positional" }"#,
        )
        .unwrap();

        let config = ReportConfig::from_file(&path).unwrap();
        assert_eq!(config.csv_path, PathBuf::from("trades.csv"));
        assert_eq!(config.report_name, "weekly");
        assert_eq!(config.save_dir, PathBuf::from("reports/"));
        assert!(config.export_pdf);
        assert!(!config.export_html);
        assert_eq!(config.nbconvert_bin, "jupyter");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("REPORT_CSV_PATH", "logs/live_trades.csv"),
            ("REPORT_NAME", "nightly"),
            ("REPORT_SAVE_DIR", "/tmp/out"),
            ("REPORT_EXPORT_HTML", "yes"),
            ("REPORT_EXPORT_PDF", "maybe"),
        ]
        .into_iter()
        .collect();

        let mut config = ReportConfig::new("trades.csv");
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.report_name, "nightly");
        assert_eq!(config.save_dir, PathBuf::from("/tmp/out"));
        assert!(config.export_html);
        // unparseable flags leave the setting alone
        assert!(!config.export_pdf);
        assert_eq!(config.csv_path, PathBuf::from("logs/live_trades.csv"));
    }

    #[test]
    fn test_validate() {
        assert!(ReportConfig::default().validate().is_err());
        assert!(ReportConfig::new("trades.csv").validate().is_ok());

        let mut config = ReportConfig::new("trades.csv");
        config.report_name = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidConfig(_))
        ));
    }
}
