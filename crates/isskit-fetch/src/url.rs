//! ISS URL templates.
//!
//! Templates are relative to the API root and use `{name}` placeholders.

use crate::FetchError;

/// Security description and boards.
pub const DESCRIPTION: &str = "/securities/{ticker}.json";
/// Security search.
pub const SECURITIES: &str = "/securities.json";
/// Live market data for one security on its primary board.
pub const MARKET_DATA: &str =
    "/engines/{engine}/markets/{market}/boards/{board}/securities/{ticker}.json";
/// Trading history.
pub const HISTORY: &str =
    "/history/engines/{engine}/markets/{market}/boards/{board}/securities/{ticker}.json";
/// Yield history.
pub const HISTORY_YIELDS: &str =
    "/history/engines/{engine}/markets/{market}/boards/{board}/yields/{ticker}.json";
/// Coupons, amortizations and offers of a bond.
pub const BONDIZATION: &str = "/statistics/engines/stock/markets/bonds/bondization/{ticker}.json";
/// Dividend history.
pub const DIVIDENDS: &str = "/securities/{ticker}/dividends.json";
/// Candles.
pub const CANDLES: &str =
    "/engines/{engine}/markets/{market}/boards/{board}/securities/{ticker}/candles.json";
/// Zero-coupon yield curve.
pub const ZCYC: &str = "/engines/stock/zcyc.json";
/// Zipped history of zero-coupon curve parameters.
pub const ZCYC_HISTORY: &str = "/downloads/engines/stock/zcyc/dynamic.csv.zip";
/// Securities and market data of the whole bond market.
pub const BONDS_SECURITIES: &str = "/engines/stock/markets/bonds/securities.json";
/// Boards of the bond market.
pub const BONDS_BOARDS: &str = "/engines/stock/markets/bonds/boards.json";
/// Stock index collections.
pub const INDEX_COLLECTIONS: &str = "/securitygroups/stock_index/collections.json";
/// Indices of one collection.
pub const INDEX_COLLECTION_SECURITIES: &str =
    "/securitygroups/stock_index/collections/{collection}/securities.json";
/// Constituents and weights of an index.
pub const INDEX_ANALYTICS: &str = "/statistics/engines/stock/markets/index/analytics/{ticker}.json";

/// Substitutes `{name}` placeholders in `template`.
///
/// # Errors
///
/// Returns [`FetchError::Template`] if a placeholder has no value.
///
/// # Example
///
/// ```
/// use isskit_fetch::url::{render, DESCRIPTION};
///
/// let path = render(DESCRIPTION, &[("ticker", "SBER".to_string())]).unwrap();
/// assert_eq!(path, "/securities/SBER.json");
/// ```
pub fn render(template: &str, vars: &[(&str, String)]) -> Result<String, FetchError> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let name = &after[..close];
        let value = vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .ok_or_else(|| FetchError::Template(name.to_string()))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
