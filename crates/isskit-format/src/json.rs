//! JSON output format.

use isskit_types::{CashflowEvent, TypedTable};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// JSON array (standard JSON).
    #[default]
    Array,
    /// Newline-delimited JSON (NDJSON/JSONL).
    Ndjson,
}

/// JSON formatter.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Output style.
    style: JsonStyle,
    /// Whether to pretty-print (only for array style).
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default settings (array style).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
            pretty: false,
        }
    }

    /// Creates a new NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Sets whether to pretty-print output (array style only).
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the output style.
    #[must_use]
    pub const fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }

    fn write_items<T: Serialize, W: Write>(
        &self,
        items: &[T],
        mut writer: W,
    ) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut writer, items)?;
                } else {
                    serde_json::to_writer(&mut writer, items)?;
                }
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for item in items {
                    serde_json::to_writer(&mut writer, item)?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }
}

/// One table row as an object keyed by column name.
fn row_object(columns: &[String], cells: &[isskit_types::Cell]) -> Result<Value, FormatError> {
    let mut object = Map::with_capacity(columns.len());
    for (column, cell) in columns.iter().zip(cells) {
        object.insert(column.clone(), serde_json::to_value(cell)?);
    }
    Ok(Value::Object(object))
}

impl Formatter for JsonFormatter {
    fn write_schedule<W: Write>(
        &self,
        events: &[CashflowEvent],
        writer: W,
    ) -> Result<(), FormatError> {
        self.write_items(events, writer)
    }

    fn write_table<W: Write>(&self, table: &TypedTable, writer: W) -> Result<(), FormatError> {
        let rows = table
            .rows()
            .iter()
            .map(|cells| row_object(table.columns(), cells))
            .collect::<Result<Vec<_>, _>>()?;
        self.write_items(&rows, writer)
    }

    fn extension(&self) -> &str {
        match self.style {
            JsonStyle::Array => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use isskit_types::{Cell, OperationType};
    use std::io::Cursor;

    fn create_test_event() -> CashflowEvent {
        CashflowEvent {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            operation_type: OperationType::Maturity,
            coupon_rate: None,
            coupon_value: None,
            face_value: 1000.0,
            redemption_value: 1000.0,
            redemption_rate: 100.0,
            offer_price: 0.0,
            sec_id: "SU26238RMFS4".into(),
            isin: "RU000A1038V6".into(),
            name: "OFZ 26238".into(),
            face_unit: "SUR".into(),
            initial_face_value: 1000.0,
        }
    }

    fn render<F: Fn(&JsonFormatter, &mut Cursor<Vec<u8>>)>(formatter: &JsonFormatter, write: F) -> String {
        let mut output = Cursor::new(Vec::new());
        write(formatter, &mut output);
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn test_json_array() {
        let events = vec![create_test_event()];
        let result = render(&JsonFormatter::new(), |f, out| {
            f.write_schedule(&events, out).unwrap();
        });

        assert!(result.starts_with('['));
        assert!(result.contains("\"operation_type\":\"maturity\""));
        assert!(result.contains("\"coupon_value\":null"));
        assert!(result.contains("\"date\":\"2024-01-15\""));
    }

    #[test]
    fn test_ndjson() {
        let events = vec![create_test_event(), create_test_event()];
        let result = render(&JsonFormatter::ndjson(), |f, out| {
            f.write_schedule(&events, out).unwrap();
        });

        let lines: Vec<_> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('{'));
    }

    #[test]
    fn test_pretty_json() {
        let events = vec![create_test_event()];
        let result = render(&JsonFormatter::new().with_pretty(true), |f, out| {
            f.write_schedule(&events, out).unwrap();
        });

        assert!(result.contains('\n'));
        assert!(result.contains("  "));
    }

    #[test]
    fn test_json_table() {
        let table = TypedTable::new(
            vec!["SECID".into(), "ACCRUEDINT".into()],
            vec![vec![Cell::Text("SU26238RMFS4".into()), Cell::Missing]],
        );
        let result = render(&JsonFormatter::new(), |f, out| {
            f.write_table(&table, out).unwrap();
        });

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed[0]["SECID"], "SU26238RMFS4");
        assert!(parsed[0]["ACCRUEDINT"].is_null());
    }
}
