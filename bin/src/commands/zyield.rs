//! Zero-coupon yield command implementation.

use crate::display::parse_date;
use anyhow::{Context, Result, ensure};
use isskit_lib::prelude::*;

/// Print the zero-coupon yield for a maturity of `years`.
pub(crate) async fn zyield(client: &IssClient, years: f64, date: Option<&str>) -> Result<()> {
    ensure!(years > 0.0, "Maturity must be positive, got {years}");
    let date = parse_date(date, "curve")?;

    let params = isskit_lib::zero_curve_params(client, date)
        .await
        .context("Cannot fetch zero curve parameters")?;

    if let Some(trade_date) = params.trade_date {
        println!("Curve date: {}", trade_date.format("%Y-%m-%d"));
    }
    println!("Maturity:   {years}y");
    println!("Yield:      {:.4}%", params.zero_yield(years));
    println!("Discount:   {:.6}", params.discount_factor(years));
    Ok(())
}
