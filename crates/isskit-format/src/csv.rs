//! CSV output format.

use isskit_types::{CashflowEvent, TypedTable};
use std::io::Write;

use crate::{FormatError, Formatter};

/// Column header of a written schedule, in field order.
const SCHEDULE_HEADER: [&str; 13] = [
    "date",
    "operation_type",
    "coupon_rate",
    "coupon_value",
    "face_value",
    "redemption_value",
    "redemption_rate",
    "offer_price",
    "sec_id",
    "isin",
    "name",
    "face_unit",
    "initial_face_value",
];

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: u8,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            include_header: true,
        }
    }

    fn writer<W: Write>(&self, writer: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(writer)
    }
}

impl Formatter for CsvFormatter {
    fn write_schedule<W: Write>(
        &self,
        events: &[CashflowEvent],
        writer: W,
    ) -> Result<(), FormatError> {
        let mut out = self.writer(writer);
        if self.include_header {
            out.write_record(SCHEDULE_HEADER)?;
        }
        for event in events {
            out.serialize(event)?;
        }
        out.flush()?;
        Ok(())
    }

    fn write_table<W: Write>(&self, table: &TypedTable, writer: W) -> Result<(), FormatError> {
        let mut out = self.writer(writer);
        if self.include_header {
            out.write_record(table.columns())?;
        }
        for row in table.rows() {
            out.write_record(row.iter().map(ToString::to_string))?;
        }
        out.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == b'\t' { "tsv" } else { "csv" }
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
            operation_type: OperationType::Coupon,
            coupon_rate: Some(10.5),
            coupon_value: None,
            face_value: 1000.0,
            redemption_value: 0.0,
            redemption_rate: 0.0,
            offer_price: 0.0,
            sec_id: "SU26238RMFS4".into(),
            isin: "RU000A1038V6".into(),
            name: "OFZ, 26238".into(),
            face_unit: "SUR".into(),
            initial_face_value: 1000.0,
        }
    }

    fn render(formatter: &CsvFormatter, events: &[CashflowEvent]) -> String {
        let mut output = Cursor::new(Vec::new());
        formatter.write_schedule(events, &mut output).unwrap();
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn test_csv_schedule() {
        let result = render(&CsvFormatter::new(), &[create_test_event()]);
        let lines: Vec<_> = result.lines().collect();

        assert_eq!(lines[0], SCHEDULE_HEADER.join(","));
        assert_eq!(
            lines[1],
            "2024-01-15,coupon,10.5,,1000.0,0.0,0.0,0.0,SU26238RMFS4,RU000A1038V6,\"OFZ, 26238\",SUR,1000.0"
        );
    }

    #[test]
    fn test_csv_empty_schedule_keeps_header() {
        let result = render(&CsvFormatter::new(), &[]);
        assert_eq!(result.lines().count(), 1);
    }

    #[test]
    fn test_csv_no_header() {
        let result = render(&CsvFormatter::new().with_header(false), &[create_test_event()]);
        assert!(!result.contains("operation_type"));
        assert_eq!(result.lines().count(), 1);
    }

    #[test]
    fn test_tsv() {
        let result = render(&CsvFormatter::tsv(), &[create_test_event()]);
        assert!(result.starts_with("date\toperation_type\tcoupon_rate"));
        assert_eq!(CsvFormatter::tsv().extension(), "tsv");
    }

    #[test]
    fn test_csv_table() {
        let table = TypedTable::new(
            vec!["TRADEDATE".into(), "CLOSE".into()],
            vec![
                vec![Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()), Cell::Number(99.5)],
                vec![Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()), Cell::Missing],
            ],
        );
        let mut output = Cursor::new(Vec::new());
        CsvFormatter::new().write_table(&table, &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert_eq!(result, "TRADEDATE,CLOSE\n2024-01-15,99.5\n2024-01-16,\n");
    }
}
