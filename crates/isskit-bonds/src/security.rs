//! The per-ticker handle.

use chrono::NaiveDate;
use isskit_fetch::IssSource;

/// A ticker bound to a transport.
///
/// Every accessor issues its own requests through the borrowed source; the
/// handle itself holds no cached state and is cheap to create.
pub struct Security<'a, S: ?Sized> {
    pub(crate) source: &'a S,
    pub(crate) ticker: String,
}

impl<'a, S: IssSource + ?Sized> Security<'a, S> {
    /// Binds `ticker` to `source`.
    pub fn new(source: &'a S, ticker: impl Into<String>) -> Self {
        Self {
            source,
            ticker: ticker.into(),
        }
    }

    /// Returns the ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn source(&self) -> &'a S {
        self.source
    }

    pub(crate) fn ticker_var(&self) -> [(&'static str, String); 1] {
        [("ticker", self.ticker.clone())]
    }
}

impl<S: ?Sized> std::fmt::Debug for Security<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Security")
            .field("ticker", &self.ticker)
            .finish_non_exhaustive()
    }
}

/// Current local date; the reference "today" for schedule and offer logic.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
