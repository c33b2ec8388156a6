//! Rust client for the MOEX ISS API.
//!
//! This is a facade crate that re-exports functionality from the isskit
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use isskit_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IssClient::with_defaults()?;
//!     let bond = Security::new(&client, "SU26238RMFS4");
//!
//!     for event in bond.bond_schedule(ScheduleOptions::default()).await {
//!         println!("{} {} {:?}", event.date, event.operation_type, event.coupon_value);
//!     }
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/isskit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use isskit_types::*;

// Re-export fetch functionality
pub use isskit_fetch::{
    ClientConfig, DEFAULT_BASE_URL, FetchError, IssClient, IssSource, PageStatus, PagedTable,
    Paging, RawTable, cast_columns, fetch_paged, fetch_typed, url,
};

// Re-export security accessors and schedule assembly
#[cfg(feature = "bonds")]
pub use isskit_bonds::{
    Description, MarketSnapshot, PagedSeries, PriceKind, ScheduleInputs, ScheduleOptions,
    Security, assemble, bonds_list, index_tickers, indices_groups, search,
};

// Re-export the yield curve
#[cfg(feature = "curve")]
pub use isskit_curve::{
    ZeroCurveParams, zero_curve_params, zero_curve_params_history, zero_curve_yields,
    zero_yield_for_maturity,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use isskit_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat};

/// Prelude module for convenient imports.
///
/// ```
/// use isskit_lib::prelude::*;
/// ```
pub mod prelude {
    pub use isskit_types::{
        CandleInterval, CashflowEvent, DateRange, IssError, OperationType, Result, SecurityKind,
        TypedTable,
    };

    pub use isskit_fetch::{ClientConfig, IssClient, IssSource};

    #[cfg(feature = "bonds")]
    pub use isskit_bonds::{PriceKind, ScheduleOptions, Security, search};

    #[cfg(feature = "curve")]
    pub use isskit_curve::{ZeroCurveParams, zero_yield_for_maturity};

    #[cfg(feature = "format")]
    pub use isskit_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};
}
