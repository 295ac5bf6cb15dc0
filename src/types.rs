//! Core data types used across the reporter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Trade log action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    /// Exact, case-sensitive match on `BUY` / `SELL`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

/// One row of the input trade log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    pub price: f64,
    /// Signal label, only meaningful on BUY events
    #[serde(default)]
    pub reason: String,
}

impl TradeEvent {
    pub fn buy(timestamp: DateTime<Utc>, price: f64, reason: impl Into<String>) -> Self {
        Self {
            timestamp,
            action: Action::Buy,
            price,
            reason: reason.into(),
        }
    }

    pub fn sell(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            action: Action::Sell,
            price,
            reason: String::new(),
        }
    }
}

/// A paired buy/sell, one row of the persisted trade table.
///
/// Field order is the column order of the table file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    /// Sell timestamp
    #[serde(serialize_with = "serialize_table_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit: f64,
    pub reason: String,
    /// Minutes between buy and sell, negative when the sell precedes its buy
    pub duration_min: f64,
}

impl TradeRecord {
    pub fn from_pair(buy: &TradeEvent, sell: &TradeEvent) -> Self {
        let elapsed = sell.timestamp - buy.timestamp;
        Self {
            timestamp: sell.timestamp,
            entry_price: buy.price,
            exit_price: sell.price,
            profit: sell.price - buy.price,
            reason: buy.reason.clone(),
            duration_min: elapsed
                .num_nanoseconds()
                .map(|ns| ns as f64 / 60e9)
                .unwrap_or_else(|| elapsed.num_milliseconds() as f64 / 60_000.0),
        }
    }

    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }
}

/// Render timestamps the way the trade log writes them: `2024-01-02 09:15:00`.
/// Always UTC; source offsets are normalized on load.
pub(crate) fn serialize_table_timestamp<S>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = if value.timestamp_subsec_nanos() == 0 {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    };
    serializer.serialize_str(&formatted)
}

/// Aggregated KPIs over all trade records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_trades: usize,
    pub win_trades: usize,
    /// Includes break-even trades
    pub loss_trades: usize,
    pub total_profit: f64,
}

impl ReportSummary {
    /// Tally records in a single pass
    pub fn from_records(records: &[TradeRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total_trades += 1;
            if record.is_win() {
                summary.win_trades += 1;
            } else {
                summary.loss_trades += 1;
            }
            summary.total_profit += record.profit;
            summary
        })
    }

    /// Win rate in percent
    pub fn win_rate(&self) -> f64 {
        if self.total_trades == 0 {
            return 0.0;
        }
        (self.win_trades as f64 / self.total_trades as f64) * 100.0
    }
}

/// How buy events are matched to sell events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// buy[i] is paired with sell[i], ignoring chronology
    #[default]
    Positional,
}

impl fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingPolicy::Positional => write!(f, "positional"),
        }
    }
}

/// Output of a report run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub records: Vec<TradeRecord>,
}
