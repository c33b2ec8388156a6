//! Lenient coercion of declared column types to native values.
//!
//! Text, numeric and date columns are cast according to the metadata type
//! label. A value that does not parse becomes [`Cell::Missing`]; a column
//! whose label is unknown (or absent) is passed through as [`Cell::Raw`].

use chrono::{NaiveDate, NaiveDateTime};
use isskit_types::{Cell, ColumnType, NativeType, TypedTable};
use serde_json::Value;

use crate::RawTable;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Casts every column of `raw` according to its declared type.
#[must_use]
pub fn cast_columns(raw: RawTable) -> TypedTable {
    let natives: Vec<Option<NativeType>> = raw
        .columns
        .iter()
        .map(|column| {
            raw.type_label(column)
                .and_then(ColumnType::from_label)
                .map(|t| t.native())
        })
        .collect();

    let rows = raw
        .rows
        .into_iter()
        .map(|row| {
            let mut cells: Vec<Cell> = row
                .into_iter()
                .zip(&natives)
                .map(|(value, native)| match native {
                    Some(native) => cast_native(value, *native),
                    None => Cell::Raw(value),
                })
                .collect();
            cells.resize(natives.len(), Cell::Missing);
            cells
        })
        .collect();

    TypedTable::new(raw.columns, rows)
}

/// Casts a single value according to a type label.
///
/// Unknown labels return the value untouched as [`Cell::Raw`].
#[must_use]
pub fn cast_value(value: Value, type_label: &str) -> Cell {
    match ColumnType::from_label(type_label) {
        Some(column_type) => cast_native(value, column_type.native()),
        None => Cell::Raw(value),
    }
}

fn cast_native(value: Value, native: NativeType) -> Cell {
    if value.is_null() {
        return Cell::Missing;
    }
    match native {
        NativeType::Text => match value {
            Value::String(s) => Cell::Text(s),
            other => Cell::Text(other.to_string()),
        },
        NativeType::Number => to_number(&value).map_or(Cell::Missing, Cell::Number),
        NativeType::Date => value
            .as_str()
            .and_then(parse_date)
            .map_or(Cell::Missing, Cell::Date),
        NativeType::Timestamp => value
            .as_str()
            .and_then(parse_timestamp)
            .map_or(Cell::Missing, Cell::Timestamp),
    }
}

fn to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Parses a date in one of the formats the exchange emits.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| parse_datetime_only(s).map(|ts| ts.date()))
}

/// Parses a timestamp, accepting bare dates as midnight.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    parse_datetime_only(s).or_else(|| {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
    })
}

fn parse_datetime_only(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
