//! Report builder
//!
//! Splits a trade log into buy and sell streams, pairs them and aggregates
//! the KPIs. Pure function of its input, no I/O.

use tracing::debug;

use crate::error::{ReportError, ReportResult};
use crate::{Action, PairingPolicy, Report, ReportSummary, TradeEvent, TradeRecord};

/// Build the per-trade table and summary from raw trade events.
///
/// Fails with [`ReportError::InsufficientData`] when there is no buy or no
/// sell event. Events beyond the shorter of the two streams are dropped.
pub fn build_report(events: &[TradeEvent], policy: PairingPolicy) -> ReportResult<Report> {
    let (buys, sells): (Vec<&TradeEvent>, Vec<&TradeEvent>) =
        events.iter().partition(|e| e.action == Action::Buy);

    if buys.is_empty() || sells.is_empty() {
        return Err(ReportError::InsufficientData {
            buys: buys.len(),
            sells: sells.len(),
        });
    }

    debug!(
        "Pairing {} buys with {} sells ({})",
        buys.len(),
        sells.len(),
        policy
    );
    let records = match policy {
        PairingPolicy::Positional => pair_positional(&buys, &sells),
    };

    let unmatched = buys.len().max(sells.len()) - records.len();
    if unmatched > 0 {
        debug!(
            "Discarded {} unmatched events ({} buys, {} sells)",
            unmatched,
            buys.len(),
            sells.len()
        );
    }

    let summary = ReportSummary::from_records(&records);

    Ok(Report { summary, records })
}

/// buy[i] with sell[i], up to the shorter stream
fn pair_positional(buys: &[&TradeEvent], sells: &[&TradeEvent]) -> Vec<TradeRecord> {
    buys.iter()
        .zip(sells.iter())
        .map(|(buy, sell)| TradeRecord::from_pair(buy, sell))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
