//! Zero-coupon yield curve for the MOEX ISS API.
//!
//! - [`ZeroCurveParams`] - Curve parameters and the yield formula
//! - [`zero_curve_params`] / [`zero_curve_yields`] - Fetch by trade date
//! - [`zero_yield_for_maturity`] - One-call yield lookup
//! - [`zero_curve_params_history`] - Every published session from the zipped export

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod curve;
mod history;
mod params;

pub use curve::{zero_curve_params, zero_curve_yields, zero_yield_for_maturity};
pub use history::{parse_zero_curve_history, zero_curve_params_history};
pub use params::{GAUSSIAN_TERMS, SPACING_GROWTH, ZeroCurveParams};
