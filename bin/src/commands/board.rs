//! Board command implementation.

use anyhow::{Context, Result};
use isskit_lib::prelude::*;

/// Print the primary listing of a security.
pub(crate) async fn board(client: &IssClient, ticker: &str) -> Result<()> {
    let listing = Security::new(client, ticker)
        .listing()
        .await
        .with_context(|| format!("Cannot locate {ticker}"))?;

    println!("Security: {}", listing.sec_id);
    println!("Engine:   {}", listing.engine);
    println!("Market:   {}", listing.market);
    println!("Board:    {}", listing.board);
    if let Some(currency) = &listing.currency {
        println!("Currency: {currency}");
    }
    Ok(())
}
