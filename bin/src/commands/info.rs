//! Info command implementation.
//!
//! Prints the exchange description of a security followed by its merged
//! market data snapshot.

use anyhow::{Context, Result};
use isskit_lib::prelude::*;
use tracing::warn;

/// Show the description and market data of a security.
pub(crate) async fn show_info(client: &IssClient, ticker: &str) -> Result<()> {
    let security = Security::new(client, ticker);
    let description = security
        .description()
        .await
        .with_context(|| format!("Cannot fetch description for {ticker}"))?;

    if description.is_empty() {
        anyhow::bail!("Unknown security: {ticker}");
    }

    for entry in &description {
        println!(
            "{:<40} {}",
            entry.title.as_deref().unwrap_or(&entry.name),
            entry.typed_value()
        );
    }

    match security.market_snapshot().await {
        Ok(snapshot) => {
            println!("\nMarket Data:");
            println!("{}", "-".repeat(60));
            for (name, value) in snapshot.iter().filter(|(_, v)| !v.is_missing()) {
                println!("{name:<40} {value}");
            }
        }
        Err(err) => warn!(ticker, %err, "No market data"),
    }

    Ok(())
}
