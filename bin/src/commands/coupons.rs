//! Coupons command implementation.

use anyhow::{Context, Result};
use isskit_lib::prelude::*;

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Print the coupon table of a bond, with floating first coupons repaired.
pub(crate) async fn coupons(client: &IssClient, ticker: &str) -> Result<()> {
    let bond = Security::new(client, ticker);
    let coupons = bond
        .coupons()
        .await
        .with_context(|| format!("Cannot fetch coupons for {ticker}"))?;

    if coupons.is_empty() {
        println!("No coupons found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<12} {:>8} {:>10} {:>12}",
        "DATE", "START", "RATE", "VALUE", "FACE"
    );
    println!("{}", "-".repeat(58));

    for coupon in &coupons {
        println!(
            "{:<12} {:<12} {:>8} {:>10} {:>12}",
            coupon.coupon_date.format("%Y-%m-%d"),
            coupon
                .start_date
                .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string()),
            cell(coupon.value_prc),
            cell(coupon.value),
            cell(coupon.face_value),
        );
    }

    println!("\nTotal: {} coupons", coupons.len());
    Ok(())
}
