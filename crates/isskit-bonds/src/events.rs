//! Coupon, amortization and offer series of a bond.

use chrono::{NaiveDate, TimeDelta};
use isskit_fetch::{IssSource, fetch_typed, url};
use isskit_types::{Amortization, Cell, Coupon, IssError, Offer, Result, TypedTable};
use tracing::{debug, warn};

use crate::{Security, security::today};

/// Exercise price assumed for offers that do not report one, percent of face.
pub const DEFAULT_OFFER_PRICE: f64 = 100.0;

/// Days past today used as the accrual end when estimating a floating first
/// coupon.
pub const FLOATING_COUPON_HORIZON_DAYS: i64 = 30;

const DAYS_PER_YEAR: f64 = 365.0;

/// Rounds half away from zero to `places` decimals.
pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Derives missing coupon rates from known cash amounts.
///
/// For every coupon with a `value` but no `value_prc`, the rate becomes
/// `round(value / face * (365 / period_days), 4) * 100`. Rows without a face
/// value or with an empty accrual period are left as they are.
#[must_use]
pub fn fill_rates_from_values(coupons: Vec<Coupon>) -> Vec<Coupon> {
    coupons
        .into_iter()
        .map(|mut coupon| {
            if coupon.value_prc.is_none()
                && let (Some(value), Some(face), Some(days)) =
                    (coupon.value, coupon.face_value, coupon.period_days())
                && face != 0.0
                && days != 0
            {
                let annualized = value / face * (DAYS_PER_YEAR / days as f64);
                coupon.value_prc = Some(round_dp(annualized, 4) * 100.0);
            }
            coupon
        })
        .collect()
}

/// Estimates the first coupon of a floater from accrued interest.
///
/// Applies only when the first row still has no rate. The accrual window is
/// taken as `start_date .. today + 30 days`:
///
/// ```text
/// rate  = (accrued / window_days * 365) / face * 100
/// value = rate / 100 * face / (365 / period_days)
/// ```
///
/// Both are rounded to 2 decimals. Rows lacking a start date or face value
/// are returned unchanged.
#[must_use]
pub fn fill_first_floating_coupon(
    mut coupons: Vec<Coupon>,
    accrued: f64,
    today: NaiveDate,
) -> Vec<Coupon> {
    let Some(first) = coupons.first_mut() else {
        return coupons;
    };
    if first.value_prc.is_some() {
        return coupons;
    }
    let (Some(start), Some(face)) = (first.start_date, first.face_value) else {
        return coupons;
    };

    let horizon = today + TimeDelta::days(FLOATING_COUPON_HORIZON_DAYS);
    let window_days = (horizon - start).num_days();
    if window_days == 0 || face == 0.0 {
        return coupons;
    }

    let rate = (accrued / window_days as f64 * DAYS_PER_YEAR) / face * 100.0;
    first.value_prc = Some(round_dp(rate, 2));

    let period_days = (first.coupon_date - start).num_days();
    if period_days != 0 {
        let value = rate / 100.0 * face / (DAYS_PER_YEAR / period_days as f64);
        first.value = Some(round_dp(value, 2));
    }
    coupons
}

impl<S: IssSource + ?Sized> Security<'_, S> {
    /// Fetches one bondization table without resolving the listing.
    async fn bondization_table(&self, table: &str) -> Result<TypedTable> {
        let typed = fetch_typed(self.source, url::BONDIZATION, &self.ticker_var(), table, &[]).await?;
        debug!(ticker = %self.ticker, table, rows = typed.len(), "Fetched bondization table");
        Ok(typed)
    }

    /// Returns the coupon schedule, with missing rates repaired.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be resolved, a request fails or
    /// the coupons table lacks payment dates.
    pub async fn coupons(&self) -> Result<Vec<Coupon>> {
        self.coupons_as_of(today()).await
    }

    /// Like [`Security::coupons`] with an explicit reference date.
    ///
    /// # Errors
    ///
    /// See [`Security::coupons`].
    pub async fn coupons_as_of(&self, today: NaiveDate) -> Result<Vec<Coupon>> {
        self.listing().await?;
        self.read_coupons(today).await
    }

    /// Coupons of an already resolved listing.
    pub(crate) async fn read_coupons(&self, today: NaiveDate) -> Result<Vec<Coupon>> {
        let table = self.bondization_table("coupons").await?;
        let coupons = fill_rates_from_values(Coupon::from_table(&table)?);

        if coupons.first().is_some_and(|c| c.value_prc.is_none()) {
            let snapshot = self.market_snapshot().await?;
            match snapshot.accrued_interest() {
                Some(accrued) => return Ok(fill_first_floating_coupon(coupons, accrued, today)),
                None => warn!(ticker = %self.ticker, "No accrued interest to estimate first coupon"),
            }
        }
        Ok(coupons)
    }

    /// Returns the amortization schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be resolved, a request fails or
    /// the table lacks repayment dates.
    pub async fn amortizations(&self) -> Result<Vec<Amortization>> {
        self.listing().await?;
        self.read_amortizations().await
    }

    pub(crate) async fn read_amortizations(&self) -> Result<Vec<Amortization>> {
        let table = self.bondization_table("amortizations").await?;
        Amortization::from_table(&table)
    }

    /// Returns the non-canceled offers, with a missing price set to 100.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be resolved, a request fails or
    /// the table lacks offer end dates.
    pub async fn offers(&self) -> Result<Vec<Offer>> {
        self.listing().await?;
        self.read_offers().await
    }

    pub(crate) async fn read_offers(&self) -> Result<Vec<Offer>> {
        let table = self.bondization_table("offers").await?;
        Ok(Offer::from_table(&table)?
            .into_iter()
            .filter(|offer| !offer.is_canceled())
            .map(|mut offer| {
                offer.price = Some(offer.price.unwrap_or(DEFAULT_OFFER_PRICE));
                offer
            })
            .collect())
    }

    /// Returns the earliest offer end date on or after today.
    ///
    /// # Errors
    ///
    /// See [`Security::offers`].
    pub async fn next_offer_date(&self) -> Result<Option<NaiveDate>> {
        self.next_offer_date_as_of(today()).await
    }

    /// Like [`Security::next_offer_date`] with an explicit reference date.
    ///
    /// # Errors
    ///
    /// See [`Security::offers`].
    pub async fn next_offer_date_as_of(&self, today: NaiveDate) -> Result<Option<NaiveDate>> {
        Ok(self
            .offers()
            .await?
            .iter()
            .map(|offer| offer.offer_date_end)
            .filter(|date| *date >= today)
            .min())
    }

    /// Returns the issue date from the security description.
    ///
    /// # Errors
    ///
    /// Returns [`IssError::IncompleteData`] if the description has no issue
    /// date, or a transport error.
    pub async fn issue_date(&self) -> Result<NaiveDate> {
        self.description_value("issuedate")
            .await?
            .as_ref()
            .and_then(Cell::as_date)
            .ok_or_else(|| IssError::incomplete("description", "issue date not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{BOND, BONDIZATION_PATH, MARKET_DATA_PATH, bond_source, date, floating_bond_source};
    use approx::assert_relative_eq;

    fn coupon(start: NaiveDate, end: NaiveDate, value: Option<f64>, rate: Option<f64>) -> Coupon {
        Coupon {
            sec_id: Some(BOND.into()),
            isin: Some(BOND.into()),
            name: None,
            coupon_date: end,
            record_date: None,
            start_date: Some(start),
            initial_face_value: Some(1000.0),
            face_value: Some(1000.0),
            face_unit: Some("SUR".into()),
            value,
            value_prc: rate,
            value_rub: value,
        }
    }

    #[test]
    fn test_fill_rates_from_values() {
        let coupons = vec![
            coupon(date(2020, 1, 1), date(2020, 7, 1), Some(50.0), None),
            coupon(date(2020, 7, 1), date(2021, 1, 1), Some(50.0), Some(9.0)),
            coupon(date(2021, 1, 1), date(2021, 7, 1), None, None),
        ];
        let repaired = fill_rates_from_values(coupons);

        // 50 / 1000 * 365 / 182 = 0.10027..., rounded to 0.1003
        assert_relative_eq!(repaired[0].value_prc.unwrap(), 10.03, epsilon = 1e-9);
        assert_eq!(repaired[1].value_prc, Some(9.0));
        assert_eq!(repaired[2].value_prc, None);
    }

    #[test]
    fn test_fill_rates_skips_empty_period() {
        let same_day = coupon(date(2020, 1, 1), date(2020, 1, 1), Some(50.0), None);
        assert_eq!(fill_rates_from_values(vec![same_day])[0].value_prc, None);
    }

    #[test]
    fn test_fill_first_floating_coupon() {
        let coupons = vec![coupon(date(2020, 1, 1), date(2020, 7, 1), None, None)];
        // window: 2020-01-01 .. 2020-06-30 (today 2020-05-31 + 30) = 181 days
        let repaired = fill_first_floating_coupon(coupons, 40.0, date(2020, 5, 31));

        let rate = 40.0 / 181.0 * 365.0 / 1000.0 * 100.0;
        let value = rate / 100.0 * 1000.0 / (365.0 / 182.0);
        assert_relative_eq!(repaired[0].value_prc.unwrap(), round_dp(rate, 2));
        assert_relative_eq!(repaired[0].value.unwrap(), round_dp(value, 2));
    }

    #[test]
    fn test_fill_first_floating_coupon_leaves_known_rate() {
        let coupons = vec![coupon(date(2020, 1, 1), date(2020, 7, 1), Some(50.0), Some(10.0))];
        let repaired = fill_first_floating_coupon(coupons.clone(), 40.0, date(2020, 5, 31));
        assert_eq!(repaired, coupons);
        assert!(fill_first_floating_coupon(Vec::new(), 40.0, date(2020, 5, 31)).is_empty());
    }

    #[test]
    fn test_round_dp() {
        assert_relative_eq!(round_dp(10.026, 2), 10.03);
        assert_relative_eq!(round_dp(-1.005_1, 3), -1.005);
        assert_relative_eq!(round_dp(0.100_27, 4), 0.1003);
    }

    #[tokio::test]
    async fn test_coupons() {
        let source = bond_source();
        let security = Security::new(&source, BOND);
        let coupons = security.coupons_as_of(date(2020, 9, 1)).await.unwrap();

        assert_eq!(coupons.len(), 2);
        assert_eq!(coupons[0].coupon_date, date(2020, 7, 1));
        assert_eq!(coupons[1].value, Some(50.0));
        assert_eq!(source.requested(MARKET_DATA_PATH), 0);
    }

    #[tokio::test]
    async fn test_floating_coupons_use_accrued_interest() {
        let source = floating_bond_source(20.0);
        let security = Security::new(&source, BOND);
        let coupons = security.coupons_as_of(date(2020, 5, 1)).await.unwrap();

        assert!(coupons[0].value_prc.is_some());
        assert!(coupons[0].value.is_some());
        assert_eq!(source.requested(MARKET_DATA_PATH), 1);
    }

    #[tokio::test]
    async fn test_offers_drop_canceled_and_default_price() {
        let source = bond_source();
        let security = Security::new(&source, BOND);
        let offers = security.offers().await.unwrap();

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].offer_date_end, date(2020, 12, 25));
        assert_eq!(offers[0].price, Some(DEFAULT_OFFER_PRICE));
    }

    #[tokio::test]
    async fn test_next_offer_date() {
        let source = bond_source();
        let security = Security::new(&source, BOND);

        assert_eq!(
            security.next_offer_date_as_of(date(2020, 9, 1)).await.unwrap(),
            Some(date(2020, 12, 25))
        );
        assert_eq!(
            security.next_offer_date_as_of(date(2020, 12, 25)).await.unwrap(),
            Some(date(2020, 12, 25))
        );
        assert_eq!(security.next_offer_date_as_of(date(2021, 1, 1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_amortizations_and_issue_date() {
        let source = bond_source();
        let security = Security::new(&source, BOND);

        let amortizations = security.amortizations().await.unwrap();
        assert_eq!(amortizations.len(), 1);
        assert!(amortizations[0].is_maturity());
        assert_eq!(amortizations[0].value, Some(1000.0));

        assert_eq!(security.issue_date().await.unwrap(), date(2020, 1, 1));
        assert!(source.requested(BONDIZATION_PATH) >= 1);
    }
}
