//! Trade Performance Reporter
//!
//! Turns a buy/sell trade log into a per-trade profit table and a summary
//! of wins, losses and total profit.

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod report;
pub mod reporter;
pub mod types;

pub use config::ReportConfig;
pub use error::{ErrorKind, ReportError, ReportResult};
pub use reporter::PerformanceReporter;
pub use types::*;
