//! Report command implementation

use anyhow::{Context, Result};
use performance_reporter::reporter::render_summary;
use performance_reporter::{PerformanceReporter, ReportConfig};
use std::path::PathBuf;
use tracing::{debug, info};

/// Command-line overrides for a report run
#[derive(Debug, Default)]
pub struct ReportArgs {
    pub csv_path: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub name: Option<String>,
    pub save_dir: Option<PathBuf>,
    pub html: bool,
    pub pdf: bool,
    pub notebook: Option<PathBuf>,
}

/// Apply command-line flags on top of file and environment settings
fn resolve_config(args: ReportArgs, mut config: ReportConfig) -> ReportConfig {
    if let Some(csv_path) = args.csv_path {
        config.csv_path = csv_path;
    }
    if let Some(name) = args.name {
        info!("Overriding report name to: {}", name);
        config.report_name = name;
    }
    if let Some(save_dir) = args.save_dir {
        config.save_dir = save_dir;
    }
    if args.notebook.is_some() {
        config.notebook_path = args.notebook;
    }
    config.export_html |= args.html;
    config.export_pdf |= args.pdf;
    config
}

/// Returns `Ok(false)` when no report was produced; the cause is already logged
pub fn run(args: ReportArgs) -> Result<bool> {
    info!("Starting performance report");

    let mut base = match &args.config {
        Some(path) => {
            let config = ReportConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => ReportConfig::default(),
    };
    base.apply_env();

    let config = resolve_config(args, base);
    debug!("Report config: {:?}", config);

    let reporter = PerformanceReporter::new(config);
    match reporter.generate_or_report() {
        Some(report) => {
            println!("{}", render_summary(&report.summary));
            info!(
                "Report completed: {} trades written to {}",
                report.records.len(),
                reporter.config().table_path().display()
            );
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_flags_override_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(
            &path,
            r#"{ "csv_path": "file.csv", "report_name": "from_file", "save_dir": "file_out" }"#,
        )
        .unwrap();

        let vars: HashMap<&str, &str> = [
            ("REPORT_CSV_PATH", "env.csv"),
            ("REPORT_NAME", "from_env"),
            ("REPORT_EXPORT_PDF", "true"),
        ]
        .into_iter()
        .collect();

        let mut base = ReportConfig::from_file(&path).unwrap();
        base.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        let config = resolve_config(
            ReportArgs {
                name: Some("from_flag".to_string()),
                html: true,
                ..Default::default()
            },
            base,
        );

        // env beats file
        assert_eq!(config.csv_path, PathBuf::from("env.csv"));
        // flag beats env
        assert_eq!(config.report_name, "from_flag");
        // untouched layers fall through
        assert_eq!(config.save_dir, PathBuf::from("file_out"));
        assert!(config.export_pdf);
        assert!(config.export_html);
    }

    #[test]
    fn test_csv_flag_wins() {
        let mut base = ReportConfig::new("file.csv");
        base.apply_vars(|key| (key == "REPORT_CSV_PATH").then(|| "env.csv".to_string()));

        let config = resolve_config(
            ReportArgs {
                csv_path: Some(PathBuf::from("flag.csv")),
                notebook: Some(PathBuf::from("nb/custom.ipynb")),
                ..Default::default()
            },
            base,
        );

        assert_eq!(config.csv_path, PathBuf::from("flag.csv"));
        assert_eq!(config.notebook_path(), PathBuf::from("nb/custom.ipynb"));
        assert!(!config.export_html);
    }

    #[test]
    fn test_no_flags_keep_base() {
        let base = ReportConfig::new("trades.csv");
        let config = resolve_config(ReportArgs::default(), base.clone());
        assert_eq!(config, base);
    }
}
