//! Fetching curve parameters and tabulated yields.

use chrono::NaiveDate;
use isskit_fetch::{IssSource, cast_columns, fetch_document, take_table, url};
use isskit_types::{IssError, Result, TypedTable};
use serde_json::Value;
use tracing::debug;

use crate::ZeroCurveParams;

/// Fetches the curve document for `date` and checks the date is covered.
async fn curve_document<S: IssSource + ?Sized>(
    source: &S,
    table: &str,
    date: Option<NaiveDate>,
) -> Result<Value> {
    let query: Vec<(String, String)> = date
        .map(|d| vec![("date".to_string(), d.format("%Y-%m-%d").to_string())])
        .unwrap_or_default();
    let mut doc = fetch_document(source, url::ZCYC, &[], &[table, "params.dates"], &query).await?;

    let dates = cast_columns(take_table(&mut doc, "params.dates")?);
    let earliest = dates
        .rows()
        .first()
        .and_then(|row| row.first())
        .and_then(|cell| cell.as_date())
        .ok_or_else(|| IssError::incomplete("params.dates", "no earliest curve date"))?;

    let requested = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    if requested < earliest {
        return Err(IssError::incomplete(
            table,
            format!("no curve before {earliest}, requested {requested}"),
        ));
    }
    Ok(doc)
}

/// Fetches the curve parameters in effect on `date` (the latest if `None`).
///
/// # Errors
///
/// Returns [`IssError::IncompleteData`] if `date` precedes the earliest
/// published curve or the parameters are incomplete, or a transport error.
pub async fn zero_curve_params<S: IssSource + ?Sized>(
    source: &S,
    date: Option<NaiveDate>,
) -> Result<ZeroCurveParams> {
    let mut doc = curve_document(source, "params", date).await?;
    let table = cast_columns(take_table(&mut doc, "params")?);
    let row = table
        .row(0)
        .ok_or_else(|| IssError::incomplete("params", "no curve parameters"))?;
    let params = ZeroCurveParams::from_row(&row)?;
    debug!(trade_date = ?params.trade_date, "Fetched zero curve parameters");
    Ok(params)
}

/// Fetches the exchange's tabulated curve yields for `date`.
///
/// # Errors
///
/// Same as [`zero_curve_params`].
pub async fn zero_curve_yields<S: IssSource + ?Sized>(
    source: &S,
    date: Option<NaiveDate>,
) -> Result<TypedTable> {
    let mut doc = curve_document(source, "yearyields", date).await?;
    Ok(cast_columns(take_table(&mut doc, "yearyields")?))
}

/// Zero-coupon yield in percent for a maturity of `t` years on `date`.
///
/// # Errors
///
/// Same as [`zero_curve_params`].
pub async fn zero_yield_for_maturity<S: IssSource + ?Sized>(
    source: &S,
    t: f64,
    date: Option<NaiveDate>,
) -> Result<f64> {
    Ok(zero_curve_params(source, date).await?.zero_yield(t))
}
