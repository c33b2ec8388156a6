//! Extraction of named sub-tables from ISS JSON documents.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::FetchError;

/// Per-column metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnMeta {
    /// Declared type label, e.g. `double` or `date`.
    #[serde(rename = "type")]
    pub type_label: String,
    /// Storage width in bytes, for string columns.
    #[serde(default)]
    pub bytes: Option<u64>,
    /// Maximum length, for string columns.
    #[serde(default)]
    pub max_size: Option<u64>,
}

/// A sub-table as delivered, before type coercion.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTable {
    /// Column metadata keyed by column name; empty when not requested.
    #[serde(default)]
    pub metadata: HashMap<String, ColumnMeta>,
    /// Column names in row order.
    pub columns: Vec<String>,
    /// Row values.
    #[serde(rename = "data")]
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
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

    /// Returns the declared type label of a column.
    #[must_use]
    pub fn type_label(&self, column: &str) -> Option<&str> {
        self.metadata.get(column).map(|m| m.type_label.as_str())
    }
}

/// Removes and decodes the sub-table `name` from a response document.
///
/// # Errors
///
/// Returns [`FetchError::MissingTable`] if the document has no such table and
/// [`FetchError::MalformedTable`] if it is not in `{metadata, columns, data}`
/// form or a row is wider than the column list.
pub fn take_table(doc: &mut Value, name: &str) -> Result<RawTable, FetchError> {
    let value = doc
        .as_object_mut()
        .and_then(|obj| obj.remove(name))
        .ok_or_else(|| FetchError::MissingTable(name.to_string()))?;

    let table: RawTable =
        serde_json::from_value(value).map_err(|e| FetchError::MalformedTable {
            table: name.to_string(),
            reason: e.to_string(),
        })?;

    if let Some(width) = table.rows.iter().map(Vec::len).find(|&w| w > table.columns.len()) {
        return Err(FetchError::MalformedTable {
            table: name.to_string(),
            reason: format!(
                "row has {width} values but only {} columns",
                table.columns.len()
            ),
        });
    }

    Ok(table)
}
