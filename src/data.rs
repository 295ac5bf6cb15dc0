//! Trade log loading
//!
//! Reads the `timestamp,action,price,reason` CSV written by the trading bot.
//! Columns are located by header name, so their order does not matter and
//! extra columns are ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use itertools::Itertools;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};
use crate::{Action, TradeEvent};

/// Naive layouts tried after RFC 3339, all read as UTC
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Header positions of the trade log columns
struct Columns {
    timestamp: usize,
    action: usize,
    price: usize,
    reason: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> ReportResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                ReportError::MissingColumn(format!(
                    "{} (found: {})",
                    name,
                    headers.iter().join(", ")
                ))
            })
        };

        Ok(Columns {
            timestamp: require("timestamp")?,
            action: require("action")?,
            price: require("price")?,
            reason: find("reason"),
        })
    }
}

/// Parse a trade log timestamp, assuming UTC when no offset is given
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
}

/// Load all BUY/SELL events from a trade log CSV.
///
/// Rows with any other action are skipped. A missing file is reported as
/// [`ReportError::InputNotFound`] before anything is opened.
pub fn load_trade_log(path: impl AsRef<Path>) -> ReportResult<Vec<TradeEvent>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ReportError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let columns = Columns::resolve(reader.headers()?)?;

    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result?;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let action = match field(columns.action).parse::<Action>() {
            Ok(action) => action,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let raw_ts = field(columns.timestamp);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| ReportError::Parse {
            row,
            message: format!("invalid timestamp: {:?}", raw_ts),
        })?;

        let raw_price = field(columns.price);
        let price: f64 = raw_price.parse().map_err(|_| ReportError::Parse {
            row,
            message: format!("invalid price: {:?}", raw_price),
        })?;

        let reason = columns
            .reason
            .map(|idx| field(idx).to_string())
            .unwrap_or_default();

        events.push(TradeEvent {
            timestamp,
            action,
            price,
            reason,
        });
    }

    if skipped > 0 {
        debug!("Skipped {} rows with actions other than BUY/SELL", skipped);
    }
    info!("Loaded {} trade events from {}", events.len(), path.display());

    Ok(events)
}

// =============================================================================
// Tests
// =============================================================================
