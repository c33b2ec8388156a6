//! Curve parameters and the yield formula.

use chrono::NaiveDate;
use isskit_types::{IssError, Result, Row};
use serde::Serialize;

/// Number of Gaussian adjustment terms.
pub const GAUSSIAN_TERMS: usize = 9;

/// Growth factor of the spacing between Gaussian term centers.
pub const SPACING_GROWTH: f64 = 1.6;

const BASE_SPACING: f64 = 0.6;

/// Parameters of the zero-coupon yield curve for one session.
///
/// Yields are in basis points internally and returned in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZeroCurveParams {
    /// Trade date the parameters apply to.
    pub trade_date: Option<NaiveDate>,
    /// Long-term level.
    pub b0: f64,
    /// Short-term component.
    pub b1: f64,
    /// Medium-term component.
    pub b2: f64,
    /// Decay time, in years.
    pub t1: f64,
    /// Gaussian adjustment weights `g1..g9`.
    pub g: [f64; GAUSSIAN_TERMS],
}

impl ZeroCurveParams {
    /// Reads parameters from a row of the `params` table.
    ///
    /// The exchange names the level terms `B1..B3`; they map to `b0..b2`.
    ///
    /// # Errors
    ///
    /// Returns [`IssError::IncompleteData`] if a parameter is missing.
    pub fn from_row(row: &Row<'_>) -> Result<Self> {
        let field = |name: &str| {
            row.f64(name)
                .ok_or_else(|| IssError::incomplete("params", format!("column '{name}' missing")))
        };

        let mut g = [0.0; GAUSSIAN_TERMS];
        for (i, slot) in g.iter_mut().enumerate() {
            *slot = field(&format!("G{}", i + 1))?;
        }

        Ok(Self {
            trade_date: row.date("tradedate"),
            b0: field("B1")?,
            b1: field("B2")?,
            b2: field("B3")?,
            t1: field("T1")?,
            g,
        })
    }

    /// Centers `a_i` of the Gaussian terms: `a_0 = 0`, `a_1 = 0.6`,
    /// `a_i = a_{i-1} + 0.6 k^(i-1)`.
    #[must_use]
    pub fn centers() -> [f64; GAUSSIAN_TERMS] {
        let mut a = [0.0; GAUSSIAN_TERMS];
        a[1] = BASE_SPACING;
        for i in 2..GAUSSIAN_TERMS {
            a[i] = a[i - 1] + BASE_SPACING * SPACING_GROWTH.powi(i as i32 - 1);
        }
        a
    }

    /// Widths `b_i = 0.6 k^i` of the Gaussian terms.
    #[must_use]
    pub fn widths() -> [f64; GAUSSIAN_TERMS] {
        std::array::from_fn(|i| BASE_SPACING * SPACING_GROWTH.powi(i as i32))
    }

    /// Continuously compounded zero rate `G(t)` in basis points.
    #[must_use]
    pub fn zero_rate_bp(&self, t: f64) -> f64 {
        let decay = (-t / self.t1).exp();
        let base = self.b0 + (self.b1 + self.b2) * (self.t1 / t) * (1.0 - decay) - self.b2 * decay;
        let adjustment: f64 = Self::centers()
            .iter()
            .zip(Self::widths())
            .zip(self.g)
            .map(|((a, b), g)| g * (-(t - a).powi(2) / b.powi(2)).exp())
            .sum();
        base + adjustment
    }

    /// Annually compounded zero-coupon yield for maturity `t` years, in percent.
    #[must_use]
    pub fn zero_yield(&self, t: f64) -> f64 {
        let bp = 10_000.0 * ((self.zero_rate_bp(t) / 10_000.0).exp() - 1.0);
        bp / 100.0
    }

    /// Discount factor for maturity `t` years.
    #[must_use]
    pub fn discount_factor(&self, t: f64) -> f64 {
        1.0 / (1.0 + self.zero_yield(t) / 100.0).powf(t)
    }
}
