//! Description, market snapshot, price and history accessors.

use chrono::NaiveDate;
use isskit_fetch::{
    IssSource, PageStatus, cast_columns, cast_value, fetch_document, fetch_paged, fetch_typed,
    take_table, url,
};
use isskit_types::{
    CandleInterval, Cell, DEFAULT_LOOKBACK_DAYS, DateRange, IssError, Result, Row, SecurityKind,
    TypedTable,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::{Security, security::today};

/// Tables merged into a market snapshot, in precedence order.
const SNAPSHOT_TABLES: [&str; 3] = ["securities", "marketdata_yields", "marketdata"];

/// Columns tried in order for the last price.
const LAST_PRICE_COLUMNS: [&str; 4] = ["LAST", "CLOSE", "LCURRENTPRICE", "LEGALCLOSEPRICE"];

/// One entry of a security description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    /// Parameter name, lowercased.
    pub name: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Value as delivered.
    pub value: Option<String>,
    /// Type label of the value.
    pub value_type: Option<String>,
}

impl Description {
    /// Converts the value according to its type label.
    #[must_use]
    pub fn typed_value(&self) -> Cell {
        let value = self.value.clone().map_or(Value::Null, Value::String);
        match self.value_type.as_deref() {
            Some(label) => cast_value(value, label),
            None => Cell::Raw(value),
        }
    }
}

/// Merged single-row view of a security's live market data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    fields: HashMap<String, Cell>,
}

impl MarketSnapshot {
    /// Merges rows; the first occurrence of a column wins.
    pub fn merge<'a>(rows: impl IntoIterator<Item = Row<'a>>) -> Self {
        let mut fields = HashMap::new();
        for row in rows {
            for (column, cell) in row.columns().iter().zip(row.cells()) {
                fields.entry(column.clone()).or_insert_with(|| cell.clone());
            }
        }
        Self { fields }
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the snapshot has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the named field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields.get(name)
    }

    /// Returns the named numeric field.
    #[must_use]
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Cell::as_f64)
    }

    /// Iterates over fields in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        let mut fields: Vec<_> = self.fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
        fields.sort_by_key(|(k, _)| *k);
        fields.into_iter()
    }

    /// Accrued coupon interest per bond (`ACCRUEDINT`).
    #[must_use]
    pub fn accrued_interest(&self) -> Option<f64> {
        self.f64("ACCRUEDINT")
    }

    /// Settlement date (`SETTLEDATE`).
    #[must_use]
    pub fn settle_date(&self) -> Option<NaiveDate> {
        self.get("SETTLEDATE").and_then(Cell::as_date)
    }

    /// First available of the last trade, close, current and legal close prices.
    #[must_use]
    pub fn last_price(&self) -> Option<f64> {
        LAST_PRICE_COLUMNS.iter().find_map(|c| self.f64(c))
    }

    /// Weighted average price (`WAPRICE`).
    #[must_use]
    pub fn weighted_price(&self) -> Option<f64> {
        self.f64("WAPRICE")
    }

    /// Price of the requested kind; futures have no weighted price and use
    /// the last price for both.
    #[must_use]
    pub fn price(&self, kind: PriceKind, futures: bool) -> Option<f64> {
        match kind {
            PriceKind::Weighted if !futures => self.weighted_price(),
            _ => self.last_price(),
        }
    }
}

/// Which price [`Security::price`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceKind {
    /// Last trade price or the nearest fallback.
    #[default]
    Last,
    /// Weighted average price.
    Weighted,
}

impl FromStr for PriceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last" => Ok(Self::Last),
            "wap" | "waprice" | "weighted" => Ok(Self::Weighted),
            _ => Err(format!("Unknown price kind: {s}. Valid options: last, wap")),
        }
    }
}

/// A table read page by page, with how the paging ended.
#[derive(Debug, Clone)]
pub struct PagedSeries {
    /// Concatenated, cast rows.
    pub table: TypedTable,
    /// Whether every page was retrieved.
    pub status: PageStatus,
}

impl PagedSeries {
    /// Returns true if every page was retrieved.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.status, PageStatus::Complete)
    }
}

fn range_query(range: DateRange) -> Vec<(String, String)> {
    vec![
        ("from".to_string(), range.start.format("%Y-%m-%d").to_string()),
        ("till".to_string(), range.end.format("%Y-%m-%d").to_string()),
    ]
}

impl<S: IssSource + ?Sized> Security<'_, S> {
    /// Returns the security description.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the table is missing.
    pub async fn description(&self) -> Result<Vec<Description>> {
        let table =
            fetch_typed(self.source, url::DESCRIPTION, &self.ticker_var(), "description", &[])
                .await?;
        Ok(table
            .iter()
            .filter_map(|row| {
                Some(Description {
                    name: row.text("name")?.to_lowercase(),
                    title: row.string("title"),
                    value: row.string("value"),
                    value_type: row.string("type"),
                })
            })
            .collect())
    }

    /// Returns one description parameter converted by its type label, or
    /// `None` if the security has no such parameter.
    ///
    /// # Errors
    ///
    /// See [`Security::description`].
    pub async fn description_value(&self, param: &str) -> Result<Option<Cell>> {
        let param = param.to_lowercase();
        let found = self
            .description()
            .await?
            .into_iter()
            .find(|d| d.name == param)
            .map(|d| d.typed_value());
        if found.is_none() {
            debug!(ticker = %self.ticker, %param, "Unknown description parameter");
        }
        Ok(found)
    }

    /// Returns the face value currency, with `SUR` reported as `RUB`.
    ///
    /// # Errors
    ///
    /// See [`Security::description`].
    pub async fn currency(&self) -> Result<Option<String>> {
        Ok(self
            .description_value("faceunit")
            .await?
            .and_then(|cell| cell.as_str().map(|s| s.replace("SUR", "RUB"))))
    }

    /// Returns the merged live market data row of the primary board.
    ///
    /// # Errors
    ///
    /// Returns [`IssError::IncompleteData`] if none of the market data tables
    /// has a row, or a lookup or transport error.
    pub async fn market_snapshot(&self) -> Result<MarketSnapshot> {
        let listing = self.listing().await?;
        let mut doc = fetch_document(
            self.source,
            url::MARKET_DATA,
            &self.listing_vars(&listing),
            &SNAPSHOT_TABLES,
            &[],
        )
        .await?;

        let tables: Vec<TypedTable> = SNAPSHOT_TABLES
            .iter()
            .filter_map(|name| take_table(&mut doc, name).ok())
            .map(cast_columns)
            .collect();

        let snapshot = MarketSnapshot::merge(tables.iter().filter_map(|t| t.row(0)));
        if snapshot.is_empty() {
            return Err(IssError::incomplete("marketdata", "no market data rows"));
        }
        Ok(snapshot)
    }

    /// Returns the price on `date` (today if `None`).
    ///
    /// Today's price comes from the live snapshot; earlier dates use the last
    /// history row within the 30 days ending on `date`.
    ///
    /// # Errors
    ///
    /// Returns a lookup or transport error.
    pub async fn price(&self, date: Option<NaiveDate>, kind: PriceKind) -> Result<Option<f64>> {
        self.price_as_of(date, kind, today()).await
    }

    /// Like [`Security::price`] with an explicit reference date.
    ///
    /// # Errors
    ///
    /// See [`Security::price`].
    pub async fn price_as_of(
        &self,
        date: Option<NaiveDate>,
        kind: PriceKind,
        today: NaiveDate,
    ) -> Result<Option<f64>> {
        let futures = self.listing().await?.is_futures();
        let snapshot = match date.filter(|d| *d != today) {
            None => self.market_snapshot().await?,
            Some(date) => {
                let history = self
                    .history(Some(DateRange::ending_on(date, DEFAULT_LOOKBACK_DAYS)))
                    .await?;
                match history.table.last_row() {
                    Some(row) => MarketSnapshot::merge([row]),
                    None => return Ok(None),
                }
            }
        };
        Ok(snapshot.price(kind, futures))
    }

    /// Returns daily trading history; the last 30 days if `range` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a lookup error, or the transport error if not a single page
    /// could be fetched.
    pub async fn history(&self, range: Option<DateRange>) -> Result<PagedSeries> {
        self.paged_history(url::HISTORY, "history", range).await
    }

    /// Returns daily yield history; the last 30 days if `range` is `None`.
    ///
    /// # Errors
    ///
    /// See [`Security::history`].
    pub async fn history_yields(&self, range: Option<DateRange>) -> Result<PagedSeries> {
        self.paged_history(url::HISTORY_YIELDS, "history_yields", range)
            .await
    }

    async fn paged_history(
        &self,
        template: &str,
        table: &str,
        range: Option<DateRange>,
    ) -> Result<PagedSeries> {
        let range = match range {
            Some(range) => range,
            None => DateRange::resolve(None, None, today())?,
        };
        let listing = self.listing().await?;
        let paged = fetch_paged(
            self.source,
            template,
            &self.listing_vars(&listing),
            table,
            &range_query(range),
        )
        .await?;

        if let PageStatus::Partial { failures, last_error } = &paged.status {
            warn!(
                ticker = %self.ticker,
                table,
                failures,
                %last_error,
                "History is incomplete"
            );
        }
        let (table, status) = paged.into_typed();
        Ok(PagedSeries { table, status })
    }

    /// Returns candles over `range` (the last 30 days if `None`).
    ///
    /// # Errors
    ///
    /// Returns a lookup or transport error.
    pub async fn candles(
        &self,
        range: Option<DateRange>,
        interval: CandleInterval,
    ) -> Result<TypedTable> {
        let range = match range {
            Some(range) => range,
            None => DateRange::resolve(None, None, today())?,
        };
        let listing = self.listing().await?;
        let mut query = range_query(range);
        query.push(("interval".to_string(), interval.code().to_string()));
        Ok(fetch_typed(
            self.source,
            url::CANDLES,
            &self.listing_vars(&listing),
            "candles",
            &query,
        )
        .await?)
    }

    /// Returns the known dividends.
    ///
    /// # Errors
    ///
    /// Returns a lookup or transport error.
    pub async fn dividends(&self) -> Result<TypedTable> {
        self.listing().await?;
        Ok(fetch_typed(self.source, url::DIVIDENDS, &self.ticker_var(), "dividends", &[]).await?)
    }
}

/// Searches traded securities matching `query`, optionally restricted to one
/// kind, sorted by short name.
///
/// # Errors
///
/// Returns a transport error or [`IssError::IncompleteData`] if the response
/// lacks the securities table.
pub async fn search<S: IssSource + ?Sized>(
    source: &S,
    query: &str,
    kind: Option<SecurityKind>,
) -> Result<TypedTable> {
    let params = [("q".to_string(), query.to_string())];
    let mut table = fetch_typed(source, url::SECURITIES, &[], "securities", &params).await?;

    table.retain(|row| {
        row.f64("is_traded") == Some(1.0)
            && kind.is_none_or(|k| row.text("group").is_some_and(|g| g.contains(k.as_str())))
    });
    table.sort_by(|a, b| a.text("shortname").cmp(&b.text("shortname")));
    Ok(table)
}
