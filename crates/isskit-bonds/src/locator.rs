//! Primary board resolution.

use isskit_fetch::{FetchError, IssSource, fetch_typed, url};
use isskit_types::{IssError, Listing, Result, TypedTable};
use tracing::debug;

use crate::Security;

impl<S: IssSource + ?Sized> Security<'_, S> {
    /// Resolves the primary board, market and engine of the security.
    ///
    /// # Errors
    ///
    /// Returns [`IssError::UnknownTicker`] if the ticker is empty, unknown or
    /// does not have exactly one primary board, and a transport error if the
    /// request fails.
    pub async fn listing(&self) -> Result<Listing> {
        if self.ticker.trim().is_empty() {
            return Err(IssError::UnknownTicker(self.ticker.clone()));
        }

        let boards = fetch_typed(self.source, url::DESCRIPTION, &self.ticker_var(), "boards", &[])
            .await
            .map_err(|e| match e {
                FetchError::MissingTable(_) | FetchError::MalformedTable { .. } => {
                    IssError::UnknownTicker(self.ticker.clone())
                }
                other => other.into(),
            })?;

        let listing = select_primary(&boards, &self.ticker)?;
        debug!(%listing, "Resolved listing");
        Ok(listing)
    }

    /// Returns the primary board code.
    ///
    /// # Errors
    ///
    /// See [`Security::listing`].
    pub async fn board(&self) -> Result<String> {
        self.listing().await.map(|l| l.board)
    }

    /// Returns the market code of the primary board.
    ///
    /// # Errors
    ///
    /// See [`Security::listing`].
    pub async fn market(&self) -> Result<String> {
        self.listing().await.map(|l| l.market)
    }

    /// Returns the engine code of the primary board.
    ///
    /// # Errors
    ///
    /// See [`Security::listing`].
    pub async fn engine(&self) -> Result<String> {
        self.listing().await.map(|l| l.engine)
    }

    /// Returns the currency the security trades in on its primary board.
    ///
    /// # Errors
    ///
    /// See [`Security::listing`].
    pub async fn trade_currency(&self) -> Result<Option<String>> {
        self.listing().await.map(|l| l.currency)
    }

    /// Template variables for endpoints addressed by board.
    pub(crate) fn listing_vars(&self, listing: &Listing) -> [(&'static str, String); 4] {
        [
            ("engine", listing.engine.clone()),
            ("market", listing.market.clone()),
            ("board", listing.board.clone()),
            ("ticker", self.ticker.clone()),
        ]
    }
}

/// Selects the single row of a `boards` table flagged `is_primary == 1`.
///
/// # Errors
///
/// Returns [`IssError::UnknownTicker`] unless exactly one primary row with
/// board, market and engine codes exists.
pub fn select_primary(boards: &TypedTable, ticker: &str) -> Result<Listing> {
    let mut primary = boards.iter().filter(|row| row.f64("is_primary") == Some(1.0));
    let (Some(row), None) = (primary.next(), primary.next()) else {
        return Err(IssError::UnknownTicker(ticker.to_string()));
    };

    let field = |name: &str| {
        row.string(name)
            .ok_or_else(|| IssError::UnknownTicker(ticker.to_string()))
    };

    Ok(Listing {
        sec_id: row.string("secid").unwrap_or_else(|| ticker.to_string()),
        board: field("boardid")?,
        market: field("market")?,
        engine: field("engine")?,
        currency: row.string("currencyid"),
    })
}
