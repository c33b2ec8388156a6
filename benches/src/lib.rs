//! Benchmark inputs for isskit.
//!
//! Builds synthetic bond event lists and ISS documents so the assembler and
//! the table layer can be measured without the network.

use chrono::{NaiveDate, TimeDelta};
use isskit_bonds::ScheduleInputs;
use isskit_fetch::RawTable;
use isskit_types::{Amortization, Coupon, Offer};
use serde_json::{Value, json};

/// Face value of every synthetic bond.
pub const FACE: f64 = 1000.0;

/// Shape of a synthetic bond.
#[derive(Debug, Clone, Copy)]
pub struct BondShape {
    /// Number of coupon periods.
    pub periods: usize,
    /// Amortize in equal parts over the last `amortized` periods.
    pub amortized: usize,
    /// Put offer every `offer_every` periods (0 for none).
    pub offer_every: usize,
    /// Leave the rate of every n-th coupon unknown (0 for none).
    pub unknown_rate_every: usize,
}

/// Issue date of every synthetic bond.
pub fn issue_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

fn period_end(n: usize) -> NaiveDate {
    issue_date() + TimeDelta::days(182 * (n as i64 + 1))
}

/// Builds assembler inputs for `shape`.
pub fn synthetic_inputs(shape: BondShape) -> ScheduleInputs {
    let coupons = (0..shape.periods)
        .map(|n| {
            let unknown = shape.unknown_rate_every > 0 && n % shape.unknown_rate_every == 0;
            Coupon {
                sec_id: Some("BENCH".into()),
                isin: Some("RU000BENCH00".into()),
                name: Some("Synthetic bond".into()),
                coupon_date: period_end(n),
                record_date: None,
                start_date: Some(if n == 0 { issue_date() } else { period_end(n - 1) }),
                initial_face_value: Some(FACE),
                face_value: Some(FACE),
                face_unit: Some("SUR".into()),
                value: (!unknown).then_some(45.0),
                value_prc: (!unknown).then_some(9.0),
                value_rub: (!unknown).then_some(45.0),
            }
        })
        .collect();

    let parts = shape.amortized.clamp(1, shape.periods.max(1));
    let amortizations = (shape.periods.saturating_sub(parts)..shape.periods)
        .map(|n| Amortization {
            sec_id: Some("BENCH".into()),
            isin: Some("RU000BENCH00".into()),
            name: Some("Synthetic bond".into()),
            amort_date: period_end(n),
            face_value: Some(FACE),
            initial_face_value: Some(FACE),
            face_unit: Some("SUR".into()),
            value_prc: Some(100.0 / parts as f64),
            value: Some(FACE / parts as f64),
            value_rub: Some(FACE / parts as f64),
            data_source: Some("amortization".into()),
        })
        .collect();

    let offers = (0..shape.periods)
        .filter(|n| shape.offer_every > 0 && (n + 1) % shape.offer_every == 0)
        .map(|n| Offer {
            sec_id: Some("BENCH".into()),
            isin: Some("RU000BENCH00".into()),
            name: Some("Synthetic bond".into()),
            offer_date: None,
            offer_date_start: None,
            offer_date_end: period_end(n),
            face_value: Some(FACE),
            face_unit: Some("SUR".into()),
            price: Some(100.0),
            value: None,
            agent: None,
            offer_type: Some("Оферта".into()),
        })
        .collect();

    ScheduleInputs {
        coupons,
        offers,
        amortizations,
        issue_date: issue_date(),
    }
}

/// Builds an ISS history document with `rows` daily rows.
pub fn history_document(rows: usize) -> Value {
    let data: Vec<Value> = (0..rows)
        .map(|i| {
            let day = issue_date() + TimeDelta::days(i as i64);
            json!([day.format("%Y-%m-%d").to_string(), "TQCB", "BENCH", 100.0 + i as f64 * 0.01, 1234, null])
        })
        .collect();
    json!({
        "history": {
            "metadata": {
                "TRADEDATE": {"type": "date"},
                "BOARDID": {"type": "string"},
                "SECID": {"type": "string"},
                "CLOSE": {"type": "double"},
                "VOLUME": {"type": "int64"},
                "YIELDCLOSE": {"type": "double"}
            },
            "columns": ["TRADEDATE", "BOARDID", "SECID", "CLOSE", "VOLUME", "YIELDCLOSE"],
            "data": data
        }
    })
}

/// Takes the history table out of a document built by [`history_document`].
pub fn history_table(rows: usize) -> RawTable {
    let mut doc = history_document(rows);
    isskit_fetch::take_table(&mut doc, "history").unwrap_or_default()
}
