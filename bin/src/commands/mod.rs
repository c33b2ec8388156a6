//! CLI command implementations.

pub(crate) mod board;
pub(crate) mod coupons;
pub(crate) mod history;
pub(crate) mod info;
pub(crate) mod schedule;
pub(crate) mod search;
pub(crate) mod zyield;
