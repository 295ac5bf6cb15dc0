//! Performance reporter - main entry point
//!
//! Subcommands:
//! - report: Build a performance report from a trade log CSV

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::report::ReportArgs;

#[derive(Parser, Debug)]
#[command(name = "performance-reporter")]
#[command(about = "Trade performance reports from buy/sell trade logs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a performance report from a trade log
    Report {
        /// Trade log CSV (timestamp, action, price, reason)
        csv_path: Option<PathBuf>,

        /// Path to JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report name, used for output file names
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        /// Convert the report notebook to HTML
        #[arg(long)]
        html: bool,

        /// Convert the report notebook to PDF
        #[arg(long)]
        pdf: bool,

        /// Report notebook to convert (default: <save-dir>/<name>.ipynb)
        #[arg(long)]
        notebook: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // Console goes to stderr so the printed report stays clean on stdout
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Report { .. } => "report",
    };

    setup_logging(cli.verbose, command_name)?;

    let produced = match cli.command {
        Commands::Report {
            csv_path,
            config,
            name,
            save_dir,
            html,
            pdf,
            notebook,
        } => commands::report::run(ReportArgs {
            csv_path,
            config,
            name,
            save_dir,
            html,
            pdf,
            notebook,
        })?,
    };

    Ok(if produced {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
