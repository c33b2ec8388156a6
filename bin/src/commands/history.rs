//! History command implementation.

use crate::display::{Format, parse_date, write_table};
use anyhow::{Context, Result};
use isskit_lib::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Download daily history over a date range and write it out.
pub(crate) async fn history(
    client: &IssClient,
    ticker: &str,
    start: Option<&str>,
    end: Option<&str>,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let start = parse_date(start, "start")?;
    let end = parse_date(end, "end")?;
    let today = chrono::Local::now().date_naive();
    let range = DateRange::resolve(start, end, today).context("Invalid date range")?;

    let series = Security::new(client, ticker)
        .history(Some(range))
        .await
        .with_context(|| format!("Cannot fetch history for {ticker}"))?;

    if series.is_complete() {
        info!(ticker, rows = series.table.len(), "Downloaded history");
    } else {
        warn!(ticker, rows = series.table.len(), "History is incomplete");
    }

    write_table(&series.table, output, format)
}
