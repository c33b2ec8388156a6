//! In-memory ISS documents for accessor tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use isskit_fetch::{FetchError, IssSource};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) const BOND: &str = "RU000A0TEST0";

pub(crate) const DESCRIPTION_PATH: &str = "/securities/RU000A0TEST0.json";
pub(crate) const BONDIZATION_PATH: &str =
    "/statistics/engines/stock/markets/bonds/bondization/RU000A0TEST0.json";
pub(crate) const MARKET_DATA_PATH: &str =
    "/engines/stock/markets/bonds/boards/TQCB/securities/RU000A0TEST0.json";
pub(crate) const HISTORY_PATH: &str =
    "/history/engines/stock/markets/bonds/boards/TQCB/securities/RU000A0TEST0.json";

/// Serves canned documents by path and records every request.
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    docs: HashMap<String, Value>,
    pub(crate) requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeSource {
    pub(crate) fn with(mut self, path: &str, doc: Value) -> Self {
        self.docs.insert(path.to_string(), doc);
        self
    }

    pub(crate) fn requested(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .count()
    }
}

#[async_trait]
impl IssSource for FakeSource {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_vec()));
        let mut doc = self.docs.get(path).cloned().ok_or(FetchError::Status {
            status: 404,
            url: path.to_string(),
        })?;

        // Every canned table fits on the first page.
        let offset = query
            .iter()
            .find(|(k, _)| k == "start")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        if offset > 0
            && let Some(tables) = doc.as_object_mut()
        {
            for table in tables.values_mut() {
                if let Some(data) = table.get_mut("data").and_then(Value::as_array_mut) {
                    data.clear();
                }
            }
        }
        Ok(doc)
    }
}

/// Builds a `{metadata, columns, data}` table from `(name, type)` pairs.
pub(crate) fn table(columns: &[(&str, &str)], rows: Vec<Value>) -> Value {
    let metadata: Map<String, Value> = columns
        .iter()
        .map(|(name, label)| ((*name).to_string(), json!({ "type": label })))
        .collect();
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    json!({ "metadata": metadata, "columns": names, "data": rows })
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn boards() -> Value {
    table(
        &[
            ("secid", "string"),
            ("boardid", "string"),
            ("market", "string"),
            ("engine", "string"),
            ("is_primary", "int32"),
            ("currencyid", "string"),
        ],
        vec![
            json!([BOND, "TQCB", "bonds", "stock", 1, "SUR"]),
            json!([BOND, "RPMO", "bonds", "stock", 0, "SUR"]),
        ],
    )
}

fn description() -> Value {
    table(
        &[
            ("name", "string"),
            ("title", "string"),
            ("value", "string"),
            ("type", "string"),
        ],
        vec![
            json!(["SECID", "Код ценной бумаги", BOND, "string"]),
            json!(["NAME", "Полное наименование", "Test bond 2021", "string"]),
            json!(["ISSUEDATE", "Дата начала торгов", "2020-01-01", "date"]),
            json!(["FACEVALUE", "Номинальная стоимость", "1000", "number"]),
            json!(["FACEUNIT", "Валюта номинала", "SUR", "string"]),
        ],
    )
}

const COUPON_COLUMNS: &[(&str, &str)] = &[
    ("isin", "string"),
    ("name", "string"),
    ("secid", "string"),
    ("coupondate", "date"),
    ("recorddate", "date"),
    ("startdate", "date"),
    ("initialfacevalue", "double"),
    ("facevalue", "double"),
    ("faceunit", "string"),
    ("value", "double"),
    ("valueprc", "double"),
    ("value_rub", "double"),
];

fn bondization(first_coupon: Value, second_coupon: Value) -> Value {
    json!({
        "coupons": table(COUPON_COLUMNS, vec![first_coupon, second_coupon]),
        "amortizations": table(
            &[
                ("isin", "string"),
                ("name", "string"),
                ("secid", "string"),
                ("amortdate", "date"),
                ("facevalue", "double"),
                ("initialfacevalue", "double"),
                ("faceunit", "string"),
                ("valueprc", "double"),
                ("value", "double"),
                ("value_rub", "double"),
                ("data_source", "string"),
            ],
            vec![json!([BOND, "Test bond 2021", BOND, "2021-01-01", 1000, 1000, "SUR",
                        100, 1000, 1000, "maturity"])],
        ),
        "offers": table(
            &[
                ("isin", "string"),
                ("name", "string"),
                ("secid", "string"),
                ("offerdate", "date"),
                ("offerdatestart", "date"),
                ("offerdateend", "date"),
                ("facevalue", "double"),
                ("faceunit", "string"),
                ("price", "double"),
                ("value", "double"),
                ("agent", "string"),
                ("offertype", "string"),
            ],
            vec![
                json!([BOND, "Test bond 2021", BOND, "2020-09-20", "2020-09-25", "2020-10-01",
                       1000, "SUR", 100, null, "Agent", "Оферта (отменена)"]),
                json!([BOND, "Test bond 2021", BOND, "2020-12-10", "2020-12-15", "2020-12-25",
                       1000, "SUR", null, null, "Agent", "Оферта"]),
            ],
        ),
    })
}

pub(crate) fn market_data(accrued: f64) -> Value {
    json!({
        "securities": table(
            &[("SECID", "string"), ("BOARDID", "string"), ("ACCRUEDINT", "double"),
              ("SETTLEDATE", "date"), ("PREVPRICE", "double")],
            vec![json!([BOND, "TQCB", accrued, "2020-09-02", 99.5])],
        ),
        "marketdata_yields": table(
            &[("SECID", "string"), ("BOARDID", "string"), ("PRICE", "double")],
            vec![json!([BOND, "TQCB", 101.0])],
        ),
        "marketdata": table(
            &[("SECID", "string"), ("BOARDID", "string"), ("LAST", "double"),
              ("WAPRICE", "double"), ("CLOSE", "double")],
            vec![json!([BOND, "TQCB", null, 100.25, 100.1])],
        ),
    })
}

fn fixed_first_coupon() -> Value {
    json!([BOND, "Test bond 2021", BOND, "2020-07-01", "2020-06-30", "2020-01-01",
           1000, 1000, "SUR", 50.0, 10.0, 50.0])
}

fn floating_first_coupon() -> Value {
    json!([BOND, "Test bond 2021", BOND, "2020-07-01", "2020-06-30", "2020-01-01",
           1000, 1000, "SUR", null, null, null])
}

fn fixed_second_coupon() -> Value {
    json!([BOND, "Test bond 2021", BOND, "2021-01-01", "2020-12-31", "2020-07-01",
           1000, 1000, "SUR", 50.0, 10.0, 50.0])
}

fn unset_second_coupon() -> Value {
    json!([BOND, "Test bond 2021", BOND, "2021-01-01", "2020-12-31", "2020-07-01",
           1000, 1000, "SUR", null, null, null])
}

/// A two-coupon bond issued 2020-01-01, maturing 2021-01-01, with one
/// canceled and one live offer.
pub(crate) fn bond_source() -> FakeSource {
    FakeSource::default()
        .with(DESCRIPTION_PATH, json!({ "boards": boards(), "description": description() }))
        .with(BONDIZATION_PATH, bondization(fixed_first_coupon(), fixed_second_coupon()))
        .with(MARKET_DATA_PATH, market_data(4.11))
}

/// Same bond with the first coupon's rate and value missing.
pub(crate) fn floating_bond_source(accrued: f64) -> FakeSource {
    FakeSource::default()
        .with(DESCRIPTION_PATH, json!({ "boards": boards(), "description": description() }))
        .with(BONDIZATION_PATH, bondization(floating_first_coupon(), fixed_second_coupon()))
        .with(MARKET_DATA_PATH, market_data(accrued))
}

/// Same bond with the first coupon paid and the second one not yet set.
pub(crate) fn unset_next_coupon_source(accrued: f64) -> FakeSource {
    FakeSource::default()
        .with(DESCRIPTION_PATH, json!({ "boards": boards(), "description": description() }))
        .with(BONDIZATION_PATH, bondization(fixed_first_coupon(), unset_second_coupon()))
        .with(MARKET_DATA_PATH, market_data(accrued))
}
