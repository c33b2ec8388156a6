//! Core types for isskit.
//!
//! This crate provides the data structures shared across the isskit workspace:
//!
//! - [`TypedTable`] and [`Cell`] - Coerced exchange sub-tables
//! - [`Coupon`], [`Amortization`], [`Offer`] - Raw bond event records
//! - [`CashflowEvent`] - One row of an assembled bond schedule
//! - [`Listing`] - Primary board, market and engine of a security
//! - [`DateRange`] and [`CandleInterval`] - Query parameters
//! - [`IssError`] - The error taxonomy

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/isskit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod error;
mod event;
mod interval;
mod security;
mod table;

pub use date_range::{DEFAULT_LOOKBACK_DAYS, DateRange};
pub use error::{DateRangeError, IssError, Result};
pub use event::{
    Amortization, CANCELED_OFFER_MARKER, CashflowEvent, Coupon, Offer, OperationType,
};
pub use interval::{CandleInterval, IntervalParseError};
pub use security::{Listing, SecurityKind};
pub use table::{Cell, ColumnType, NativeType, Row, TypedTable};
