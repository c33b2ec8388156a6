//! Typed tabular data as returned by the exchange.
//!
//! Every ISS response is a set of named sub-tables, each with a column list,
//! rows of JSON values and per-column type metadata. After coercion each
//! value becomes a [`Cell`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Column type label declared in the exchange's metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// `string`
    String,
    /// `double`
    Double,
    /// `date`
    Date,
    /// `datetime`
    Datetime,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `undefined`
    Undefined,
    /// `time`
    Time,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
}

impl ColumnType {
    /// Parses a metadata type label. Unknown labels return `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "string" => Some(Self::String),
            "double" => Some(Self::Double),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::Datetime),
            "int32" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            "undefined" => Some(Self::Undefined),
            "time" => Some(Self::Time),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Returns the native representation values of this type are cast to.
    ///
    /// Integers and booleans become floating point so that missing values
    /// can be represented alongside them.
    #[must_use]
    pub const fn native(&self) -> NativeType {
        match self {
            Self::String | Self::Undefined | Self::Time => NativeType::Text,
            Self::Double | Self::Int32 | Self::Int64 | Self::Number | Self::Boolean => {
                NativeType::Number
            }
            Self::Date => NativeType::Date,
            Self::Datetime => NativeType::Timestamp,
        }
    }
}

/// Native representation of a coerced column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// UTF-8 text.
    Text,
    /// 64-bit float.
    Number,
    /// Calendar date.
    Date,
    /// Naive timestamp.
    Timestamp,
}

/// A single coerced value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Absent or unparseable value.
    #[default]
    Missing,
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Date value.
    Date(NaiveDate),
    /// Timestamp value.
    Timestamp(NaiveDateTime),
    /// Uncoerced value from a column with an unmapped type label.
    Raw(serde_json::Value),
}

impl Cell {
    /// Returns true if the value is missing.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns the numeric value, if any.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text value, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the date value, truncating timestamps.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Timestamp(ts) => Some(ts.date()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Self::Raw(serde_json::Value::String(s)) => write!(f, "{s}"),
            Self::Raw(serde_json::Value::Null) => Ok(()),
            Self::Raw(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Number(_) => serializer.serialize_none(),
            Self::Date(_) | Self::Timestamp(_) => serializer.collect_str(self),
            Self::Raw(v) => v.serialize(serializer),
        }
    }
}

/// A sub-table after type coercion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TypedTable {
    /// Creates a table from column names and rows.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the raw rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of a column, compared case-insensitively.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        column_position(&self.columns, name)
    }

    /// Returns true if the table has the given column.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns a view of row `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Returns the last row.
    #[must_use]
    pub fn last_row(&self) -> Option<Row<'_>> {
        self.rows.len().checked_sub(1).and_then(|i| self.row(i))
    }

    /// Iterates over row views.
    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Keeps only the rows for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Row<'_>) -> bool) {
        let columns = &self.columns;
        self.rows.retain(|cells| keep(&Row { columns, cells }));
    }

    /// Stably sorts rows with the given comparator.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&Row<'_>, &Row<'_>) -> std::cmp::Ordering) {
        let columns = &self.columns;
        self.rows
            .sort_by(|a, b| compare(&Row { columns, cells: a }, &Row { columns, cells: b }));
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    /// Returns the cell in the named column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Cell> {
        column_position(self.columns, name).and_then(|i| self.cells.get(i))
    }

    /// Returns the numeric value in the named column.
    #[must_use]
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Cell::as_f64)
    }

    /// Returns the date value in the named column.
    #[must_use]
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(Cell::as_date)
    }

    /// Returns the text value in the named column.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Cell::as_str)
    }

    /// Returns the text value in the named column as an owned string.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_owned)
    }

    /// Returns the cells of this row.
    #[must_use]
    pub const fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    /// Returns the column names, aligned with [`Row::cells`].
    #[must_use]
    pub const fn columns(&self) -> &'a [String] {
        self.columns
    }
}

fn column_position(columns: &[String], name: &str) -> Option<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .or_else(|| columns.iter().position(|c| c.eq_ignore_ascii_case(name)))
}
