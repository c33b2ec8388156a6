//! Display utilities and output formatting for the isskit CLI.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use isskit_lib::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format for schedules and tables.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Tsv,
    Json,
    Ndjson,
}

/// Opens `output`, or stdout when no path is given.
fn open(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

/// Write a cashflow schedule in the specified format.
pub(crate) fn write_schedule(
    events: &[CashflowEvent],
    output: Option<&Path>,
    format: Format,
) -> Result<()> {
    let writer = open(output)?;

    match format {
        Format::Csv => CsvFormatter::new().write_schedule(events, writer)?,
        Format::Tsv => CsvFormatter::tsv().write_schedule(events, writer)?,
        Format::Json => JsonFormatter::new()
            .with_pretty(output.is_none())
            .write_schedule(events, writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_schedule(events, writer)?,
    }

    Ok(())
}

/// Write a coerced table in the specified format.
pub(crate) fn write_table(table: &TypedTable, output: Option<&Path>, format: Format) -> Result<()> {
    let writer = open(output)?;

    match format {
        Format::Csv => CsvFormatter::new().write_table(table, writer)?,
        Format::Tsv => CsvFormatter::tsv().write_table(table, writer)?,
        Format::Json => JsonFormatter::new()
            .with_pretty(output.is_none())
            .write_table(table, writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_table(table, writer)?,
    }

    Ok(())
}

/// Parse an optional `YYYY-MM-DD` argument.
pub(crate) fn parse_date(value: Option<&str>, what: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid {what} date: {s}"))
        })
        .transpose()
}
