//! Performance report orchestration
//!
//! Load the trade log, build the report, persist the trade table
//! and optionally hand the companion notebook to a document exporter.

use tracing::{error, info, warn};

use crate::config::ReportConfig;
use crate::data::load_trade_log;
use crate::error::ReportResult;
use crate::export::{write_trade_table, DocumentExporter, DocumentFormat, NbconvertExporter};
use crate::report::build_report;
use crate::{Report, ReportSummary};

/// Human-readable summary block
pub fn render_summary(summary: &ReportSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "=".repeat(40)));
    output.push_str("PERFORMANCE REPORT\n");
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output.push_str(&format!("Trades:             {}\n", summary.total_trades));
    output.push_str(&format!("Winning Trades:     {}\n", summary.win_trades));
    output.push_str(&format!("Losing Trades:      {}\n", summary.loss_trades));
    output.push_str(&format!("Win Rate:           {:.2}%\n", summary.win_rate()));
    output.push_str(&format!("Total Profit:       {:.2}\n", summary.total_profit));
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output
}

pub struct PerformanceReporter {
    config: ReportConfig,
    exporter: Box<dyn DocumentExporter>,
}

impl PerformanceReporter {
    pub fn new(config: ReportConfig) -> Self {
        let exporter = Box::new(NbconvertExporter::new(config.nbconvert_bin.clone()));
        Self { config, exporter }
    }

    pub fn with_exporter(mut self, exporter: Box<dyn DocumentExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Run the full report. Nothing is written unless the report builds.
    pub fn generate(&self) -> ReportResult<Report> {
        self.config.validate()?;

        let events = load_trade_log(&self.config.csv_path)?;
        let report = build_report(&events, self.config.pairing)?;

        info!(
            total_trades = report.summary.total_trades,
            win_trades = report.summary.win_trades,
            loss_trades = report.summary.loss_trades,
            total_profit = report.summary.total_profit,
            "Performance report built"
        );

        write_trade_table(&report.records, self.config.table_path())?;

        if self.config.wants_export() {
            self.export_documents();
        }

        Ok(report)
    }

    /// Like [`generate`](Self::generate), but logs the failure and yields `None`
    pub fn generate_or_report(&self) -> Option<Report> {
        match self.generate() {
            Ok(report) => Some(report),
            Err(e) => {
                error!(kind = ?e.kind(), "Report failed: {}", e);
                None
            }
        }
    }

    /// Each format is attempted independently; failures are only logged
    fn export_documents(&self) {
        let source = self.config.notebook_path();
        let formats = [
            (self.config.export_html, DocumentFormat::Html),
            (self.config.export_pdf, DocumentFormat::Pdf),
        ];

        for (_, format) in formats.into_iter().filter(|(enabled, _)| *enabled) {
            match self.exporter.export(
                &source,
                format,
                &self.config.save_dir,
                &self.config.report_name,
            ) {
                Ok(path) => info!("{} saved: {}", format, path.display()),
                Err(e) => warn!("{} export of {} failed: {}", format, source.display(), e),
            }
        }
    }
}
