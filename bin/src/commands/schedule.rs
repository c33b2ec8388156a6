//! Schedule command implementation.

use crate::display::{Format, write_schedule};
use anyhow::{Context, Result};
use isskit_lib::prelude::*;
use std::path::Path;
use tracing::info;

/// Assemble and write the cashflow schedule of a bond.
pub(crate) async fn schedule(
    client: &IssClient,
    ticker: &str,
    options: ScheduleOptions,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let bond = Security::new(client, ticker);
    let events = bond
        .try_bond_schedule(options)
        .await
        .with_context(|| format!("Cannot assemble schedule for {ticker}"))?;

    let total: f64 = events.iter().map(CashflowEvent::total_payment).sum();
    info!(ticker, rows = events.len(), total, "Assembled schedule");

    write_schedule(&events, output, format)
}
