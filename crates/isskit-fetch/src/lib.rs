//! Table fetching for the MOEX ISS API.
//!
//! This crate provides the transport and table layer:
//!
//! - [`url`] - ISS URL templates and placeholder rendering
//! - [`IssClient`] - HTTP client implementing [`IssSource`]
//! - [`take_table`] - Sub-table extraction from a response document
//! - [`cast_columns`] - Lenient type coercion driven by column metadata
//! - [`fetch_table`] / [`fetch_paged`] - Single and multi-page fetches

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cast;
mod client;
mod paged;
mod parse;
mod source;
pub mod url;

pub use cast::{cast_columns, cast_value, parse_date, parse_timestamp};
pub use client::{ClientConfig, DEFAULT_BASE_URL, FetchError, IssClient, Paging};
pub use paged::{
    PageStatus, PagedTable, fetch_document, fetch_paged, fetch_table, fetch_typed,
};
pub use parse::{ColumnMeta, RawTable, take_table};
pub use source::IssSource;
