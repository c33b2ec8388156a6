//! Search command implementation.

use anyhow::{Result, anyhow};
use isskit_lib::prelude::*;

/// List traded securities matching `query`.
pub(crate) async fn search(client: &IssClient, query: &str, kind: Option<&str>) -> Result<()> {
    let kind = kind
        .map(str::parse::<SecurityKind>)
        .transpose()
        .map_err(|e| anyhow!(e))?;
    let table = isskit_lib::search(client, query, kind).await?;

    if table.is_empty() {
        println!("No securities found.");
        return Ok(());
    }

    println!("{:<15} {:<30} {:<15} {:<20}", "SECID", "NAME", "ISIN", "GROUP");
    println!("{}", "-".repeat(82));

    for row in table.iter() {
        println!(
            "{:<15} {:<30} {:<15} {:<20}",
            row.text("secid").unwrap_or("-"),
            row.text("shortname").unwrap_or("-"),
            row.text("isin").unwrap_or("-"),
            row.text("group").unwrap_or("-"),
        );
    }

    println!("\nTotal: {} securities", table.len());
    Ok(())
}
