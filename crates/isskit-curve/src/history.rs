//! Curve parameter history from the zipped CSV export.

use chrono::NaiveDate;
use isskit_fetch::{IssSource, url};
use isskit_types::{IssError, Result};
use std::io::{Cursor, Read};
use tracing::debug;

use crate::{GAUSSIAN_TERMS, ZeroCurveParams};

const TABLE: &str = "dynamic.csv";

fn parse_error(err: impl std::fmt::Display) -> IssError {
    IssError::Parse(format!("{TABLE}: {err}"))
}

/// Parses a number written with a decimal comma.
fn decimal(field: &str) -> Result<f64> {
    field
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| parse_error(format!("invalid number '{field}'")))
}

/// Parses the curve history CSV.
///
/// The first line is a title and is skipped. Fields are `;`-separated with
/// decimal commas and trade dates as `DD.MM.YYYY`. Header names are matched
/// case-insensitively; `B1..B3` map to `b0..b2` as in the daily curve.
///
/// # Errors
///
/// Returns [`IssError::IncompleteData`] if a parameter column is absent and
/// [`IssError::Parse`] for malformed rows.
pub fn parse_zero_curve_history<R: Read>(mut reader: R) -> Result<Vec<ZeroCurveParams>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let body = bytes
        .iter()
        .position(|&b| b == b'\n')
        .map_or(&[][..], |i| &bytes[i + 1..]);

    let mut rows = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(body);
    let headers = rows.headers().map_err(parse_error)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| IssError::incomplete(TABLE, format!("column '{name}' missing")))
    };

    let trade_date = column("tradedate")?;
    let b = [column("B1")?, column("B2")?, column("B3")?];
    let t1 = column("T1")?;
    let mut g = [0; GAUSSIAN_TERMS];
    for (i, slot) in g.iter_mut().enumerate() {
        *slot = column(&format!("G{}", i + 1))?;
    }

    let mut history = Vec::new();
    for record in rows.records() {
        let record = record.map_err(parse_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        let field = |i: usize| {
            record
                .get(i)
                .ok_or_else(|| parse_error(format!("short row at line {line}")))
        };
        let date = field(trade_date)?;
        let date = NaiveDate::parse_from_str(date.trim(), "%d.%m.%Y")
            .map_err(|_| parse_error(format!("invalid trade date '{date}'")))?;

        let mut weights = [0.0; GAUSSIAN_TERMS];
        for (slot, &i) in weights.iter_mut().zip(&g) {
            *slot = decimal(field(i)?)?;
        }
        history.push(ZeroCurveParams {
            trade_date: Some(date),
            b0: decimal(field(b[0])?)?,
            b1: decimal(field(b[1])?)?,
            b2: decimal(field(b[2])?)?,
            t1: decimal(field(t1)?)?,
            g: weights,
        });
    }
    Ok(history)
}

/// Downloads the full history of daily curve parameters.
///
/// The export is a zip archive whose first entry is the CSV read by
/// [`parse_zero_curve_history`].
///
/// # Errors
///
/// Returns a transport error if the download fails and [`IssError::Parse`]
/// if the archive or its CSV is malformed.
pub async fn zero_curve_params_history<S: IssSource + ?Sized>(
    source: &S,
) -> Result<Vec<ZeroCurveParams>> {
    let bytes = source.get_bytes(url::ZCYC_HISTORY).await?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(parse_error)?;
    let entry = archive.by_index(0).map_err(parse_error)?;
    let history = parse_zero_curve_history(entry)?;
    debug!(sessions = history.len(), "Fetched zero curve history");
    Ok(history)
}
