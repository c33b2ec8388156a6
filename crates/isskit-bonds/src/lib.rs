//! Bond data and cashflow schedules for the MOEX ISS API.
//!
//! This crate provides the per-security layer:
//!
//! - [`Security`] - A ticker bound to a transport
//! - [`Security::listing`] - Primary board, market and engine
//! - [`Security::coupons`], [`Security::offers`], [`Security::amortizations`] - Event series
//! - [`Security::market_snapshot`], [`Security::history`] - Market data
//! - [`assemble`] - Pure schedule assembly
//! - [`Security::bond_schedule`] - Fail-soft schedule over live data
//! - [`bonds_list`], [`indices_groups`], [`index_tickers`] - Exchange-wide listings

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod events;
mod locator;
mod market;
mod schedule;
mod security;

#[cfg(test)]
mod fixtures;

pub use catalog::{BOND_BOARD_GROUPS, bonds_list, index_tickers, indices_groups};
pub use events::{
    DEFAULT_OFFER_PRICE, FLOATING_COUPON_HORIZON_DAYS, fill_first_floating_coupon,
    fill_rates_from_values,
};
pub use locator::select_primary;
pub use market::{Description, MarketSnapshot, PagedSeries, PriceKind, search};
pub use schedule::{ScheduleInputs, ScheduleOptions, assemble, fill_next_coupon_from_accrued};
pub use security::{Security, today};
