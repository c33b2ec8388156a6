//! Error types for isskit.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for isskit operations.
pub type Result<T> = std::result::Result<T, IssError>;

/// Errors that can occur while fetching and normalizing exchange data.
#[derive(Error, Debug)]
pub enum IssError {
    /// Network failure, non-success status or a non-JSON response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The ticker cannot be resolved to a single primary board.
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// A required sub-table came back empty or malformed.
    #[error("Incomplete data in '{table}': {reason}")]
    IncompleteData {
        /// The sub-table that was incomplete.
        table: String,
        /// What was missing.
        reason: String,
    },

    /// A response could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IssError {
    /// Builds an [`IssError::IncompleteData`] for the given table.
    #[must_use]
    pub fn incomplete(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IncompleteData {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error came from the transport layer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
