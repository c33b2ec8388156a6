//! Bond cashflow schedule assembly.
//!
//! Coupons, offers, amortizations and the issue date are merged into one
//! chronologically ordered schedule. Rates missing from a row are borrowed
//! from the next coupon on or after it, the outstanding face value is walked
//! forward through amortizations, and coupon amounts are derived from the
//! rate where the exchange did not report them.

use chrono::NaiveDate;
use isskit_fetch::IssSource;
use isskit_types::{
    Amortization, CashflowEvent, Coupon, IssError, Offer, OperationType, Result,
};
use tracing::{debug, warn};

use crate::{
    DEFAULT_OFFER_PRICE, Security,
    events::round_dp,
    market::MarketSnapshot,
    security::today,
};

/// Options for schedule assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Treat the next offer as the redemption date: it redeems the
    /// outstanding face at the offer price and every later row pays nothing.
    pub truncate_at_next_offer: bool,
    /// Carry the last known coupon rate forward onto rows with no known rate.
    pub carry_last_known_coupon: bool,
}

/// Raw series a schedule is assembled from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInputs {
    /// Coupon periods.
    pub coupons: Vec<Coupon>,
    /// Offers; canceled ones are ignored.
    pub offers: Vec<Offer>,
    /// Principal repayments.
    pub amortizations: Vec<Amortization>,
    /// Issue date of the bond.
    pub issue_date: NaiveDate,
}

/// Fills the rate and amount of the next unpaid coupon from accrued interest.
///
/// Applies to the first coupon dated after `today`, if its rate is missing:
///
/// ```text
/// rate  = round(accrued / face * 365 / (settle - start), 3) * 100
/// value = round(rate / 100 * face * (end - start) / 365, 2)
/// ```
///
/// Coupons are returned unchanged when no such row needs repair.
///
/// # Errors
///
/// Returns [`IssError::IncompleteData`] if the row lacks a start date or face
/// value, or the settlement date coincides with the start date.
pub fn fill_next_coupon_from_accrued(
    mut coupons: Vec<Coupon>,
    accrued: f64,
    settle: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<Coupon>> {
    let Some(next) = coupons.iter_mut().find(|c| c.coupon_date > today) else {
        return Ok(coupons);
    };
    if next.value_prc.is_some() {
        return Ok(coupons);
    }

    let (Some(start), Some(face)) = (next.start_date, next.face_value) else {
        return Err(IssError::incomplete(
            "coupons",
            "next coupon has no start date or face value",
        ));
    };
    let accrued_days = (settle - start).num_days();
    if accrued_days == 0 || face == 0.0 {
        return Err(IssError::incomplete(
            "coupons",
            "no accrual period to derive the next coupon rate from",
        ));
    }

    let rate = round_dp(accrued / face * 365.0 / accrued_days as f64, 3) * 100.0;
    let period_days = (next.coupon_date - start).num_days() as f64;
    next.value_prc = Some(rate);
    next.value = Some(round_dp(rate / 100.0 * face * period_days / 365.0, 2));
    Ok(coupons)
}

/// Returns true if the first coupon after `today` has no rate.
fn next_coupon_needs_rate(coupons: &[Coupon], today: NaiveDate) -> bool {
    coupons
        .iter()
        .find(|c| c.coupon_date > today)
        .is_some_and(|c| c.value_prc.is_none())
}

/// A schedule row while it is being assembled.
#[derive(Debug, Clone)]
struct Draft {
    date: NaiveDate,
    operation: OperationType,
    rate: Option<f64>,
    coupon_value: Option<f64>,
    face_value: Option<f64>,
    redemption_value: Option<f64>,
    redemption_rate: Option<f64>,
    offer_price: Option<f64>,
    sec_id: Option<String>,
    isin: Option<String>,
    name: Option<String>,
    face_unit: Option<String>,
    initial_face_value: Option<f64>,
}

impl Draft {
    /// A row with every value still unknown.
    const fn new(date: NaiveDate, operation: OperationType) -> Self {
        Self {
            date,
            operation,
            rate: None,
            coupon_value: None,
            face_value: None,
            redemption_value: None,
            redemption_rate: None,
            offer_price: None,
            sec_id: None,
            isin: None,
            name: None,
            face_unit: None,
            initial_face_value: None,
        }
    }

    fn is(&self, operation: OperationType) -> bool {
        self.operation == operation
    }
}

fn coupon_row(c: Coupon) -> Draft {
    Draft {
        rate: c.value_prc,
        coupon_value: c.value,
        face_value: c.face_value,
        sec_id: c.sec_id,
        isin: c.isin,
        name: c.name,
        face_unit: c.face_unit,
        initial_face_value: c.initial_face_value,
        ..Draft::new(c.coupon_date, OperationType::Coupon)
    }
}

fn offer_row(o: Offer) -> Draft {
    Draft {
        face_value: o.face_value,
        offer_price: Some(o.price.unwrap_or(DEFAULT_OFFER_PRICE)),
        sec_id: o.sec_id,
        isin: o.isin,
        name: o.name,
        face_unit: o.face_unit,
        ..Draft::new(o.offer_date_end, OperationType::Offer)
    }
}

fn amortization_row(a: Amortization, last: bool) -> Draft {
    let operation = if last || a.is_maturity() {
        OperationType::Maturity
    } else {
        OperationType::Amortization
    };
    Draft {
        face_value: a.face_value,
        redemption_value: a.value,
        redemption_rate: a.value_prc,
        sec_id: a.sec_id,
        isin: a.isin,
        name: a.name,
        face_unit: a.face_unit,
        initial_face_value: a.initial_face_value,
        ..Draft::new(a.amort_date, operation)
    }
}

/// Most frequent value; ties go to the smallest.
fn mode<T: Clone + PartialOrd>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
        .into_iter()
        .reduce(|best, next| {
            let better = next.1 > best.1
                || (next.1 == best.1 && next.0.partial_cmp(&best.0) == Some(std::cmp::Ordering::Less));
            if better { next } else { best }
        })
        .map(|(value, _)| value)
}

/// Fills every missing value of one column with the column's mode.
fn fill_with_mode<T: Clone + PartialOrd>(
    rows: &mut [Draft],
    column: &str,
    field: impl Fn(&mut Draft) -> &mut Option<T>,
) -> Result<()> {
    let value = mode(rows.iter_mut().filter_map(|row| field(row).clone()))
        .ok_or_else(|| IssError::incomplete("schedule", format!("no {column} in any row")))?;
    for row in rows.iter_mut() {
        field(row).get_or_insert_with(|| value.clone());
    }
    Ok(())
}

fn backfill(rows: &mut [Draft], field: impl Fn(&mut Draft) -> &mut Option<f64>) {
    let mut next = None;
    for row in rows.iter_mut().rev() {
        let slot = field(row);
        match *slot {
            Some(value) => next = Some(value),
            None => *slot = next,
        }
    }
}

fn forward_fill(rows: &mut [Draft], field: impl Fn(&mut Draft) -> &mut Option<f64>) {
    let mut last = None;
    for row in rows.iter_mut() {
        let slot = field(row);
        match *slot {
            Some(value) => last = Some(value),
            None => *slot = last,
        }
    }
}

/// Assembles the cashflow schedule of a bond.
///
/// Rows are ordered by date, then issue, coupon, offer, amortization and
/// maturity. `today` decides which offers lie in the future; an offer dated
/// today counts as past.
///
/// # Errors
///
/// Returns [`IssError::IncompleteData`] if an identification column (ISIN,
/// name, initial face value, face unit, security code) has no value in any
/// row.
pub fn assemble(
    inputs: ScheduleInputs,
    options: ScheduleOptions,
    today: NaiveDate,
) -> Result<Vec<CashflowEvent>> {
    let ScheduleInputs {
        coupons,
        offers,
        amortizations,
        issue_date,
    } = inputs;

    let last_amortization = amortizations
        .iter()
        .enumerate()
        .max_by_key(|(_, a)| a.amort_date)
        .map(|(i, _)| i);

    let mut rows: Vec<Draft> = coupons.into_iter().map(coupon_row).collect();
    rows.extend(
        offers
            .into_iter()
            .filter(|o| !o.is_canceled())
            .map(offer_row),
    );
    rows.extend(
        amortizations
            .into_iter()
            .enumerate()
            .map(|(i, a)| amortization_row(a, Some(i) == last_amortization)),
    );
    rows.push(Draft::new(issue_date, OperationType::Issue));

    // Coupons sort last within a date so their rate reaches the offer and
    // redemption rows sharing it.
    rows.sort_by_key(|r| (r.date, r.operation.backfill_rank()));
    backfill(&mut rows, |r| &mut r.rate);
    rows.sort_by_key(|r| (r.date, r.operation.display_rank()));

    fill_with_mode(&mut rows, "isin", |r| &mut r.isin)?;
    fill_with_mode(&mut rows, "name", |r| &mut r.name)?;
    fill_with_mode(&mut rows, "initial face value", |r| &mut r.initial_face_value)?;
    fill_with_mode(&mut rows, "face unit", |r| &mut r.face_unit)?;
    fill_with_mode(&mut rows, "security code", |r| &mut r.sec_id)?;

    let mut face = rows[0].initial_face_value.unwrap_or_default();
    rows[0].face_value = Some(face);
    rows[0].coupon_value = Some(0.0);
    for ix in 1..rows.len() {
        let previous = &rows[ix - 1];
        if previous.is(OperationType::Amortization) {
            face -= previous.redemption_value.unwrap_or(0.0);
        }
        rows[ix].face_value = Some(face);
    }

    if options.carry_last_known_coupon {
        forward_fill(&mut rows, |r| &mut r.rate);
    }

    for ix in 1..rows.len() {
        if rows[ix].coupon_value.is_some() {
            continue;
        }
        let days = (rows[ix].date - rows[ix - 1].date).num_days() as f64;
        let accrued = rows[ix]
            .rate
            .zip(rows[ix].face_value)
            .map(|(rate, face)| days / 365.0 * rate / 100.0 * face);
        rows[ix].coupon_value = accrued;
    }
    for row in &mut rows {
        row.coupon_value = row.coupon_value.map(|v| round_dp(v, 2));
    }

    if options.truncate_at_next_offer {
        let next_offer = rows
            .iter()
            .position(|r| r.is(OperationType::Offer) && r.date > today);
        if let Some(k) = next_offer {
            let price = rows[k].offer_price.unwrap_or(DEFAULT_OFFER_PRICE);
            rows[k].redemption_value = Some(price / 100.0 * rows[k].face_value.unwrap_or(0.0));
            for row in &mut rows[k + 1..] {
                row.coupon_value = Some(0.0);
                row.redemption_value = Some(0.0);
            }
            debug!(offer = %rows[k].date, "Schedule truncated at next offer");
        }
        for row in &mut rows {
            if row.is(OperationType::Offer) && row.date <= today {
                row.coupon_value = Some(0.0);
                row.redemption_value = Some(0.0);
            }
        }
    } else {
        for row in &mut rows {
            if row.is(OperationType::Offer) {
                row.coupon_value = Some(0.0);
                row.redemption_value = Some(0.0);
            }
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| CashflowEvent {
            date: row.date,
            operation_type: row.operation,
            coupon_rate: row.rate,
            coupon_value: row.rate.and(row.coupon_value),
            face_value: row.face_value.unwrap_or_default(),
            redemption_value: row.redemption_value.unwrap_or(0.0),
            redemption_rate: row.redemption_rate.unwrap_or(0.0),
            offer_price: row.offer_price.unwrap_or(0.0),
            sec_id: row.sec_id.unwrap_or_default(),
            isin: row.isin.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            face_unit: row.face_unit.unwrap_or_default(),
            initial_face_value: row.initial_face_value.unwrap_or_default(),
        })
        .collect())
}

impl<S: IssSource + ?Sized> Security<'_, S> {
    /// Returns the cashflow schedule, or an empty schedule if anything fails.
    ///
    /// The cause of a failure is logged; use [`Security::try_bond_schedule`]
    /// to inspect it.
    pub async fn bond_schedule(&self, options: ScheduleOptions) -> Vec<CashflowEvent> {
        match self.try_bond_schedule(options).await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(ticker = %self.ticker, error = %e, "Bond schedule unavailable");
                Vec::new()
            }
        }
    }

    /// Returns the cashflow schedule.
    ///
    /// # Errors
    ///
    /// Returns the first lookup, transport or data error encountered.
    pub async fn try_bond_schedule(&self, options: ScheduleOptions) -> Result<Vec<CashflowEvent>> {
        self.try_bond_schedule_as_of(options, today()).await
    }

    /// Like [`Security::try_bond_schedule`] with an explicit reference date.
    ///
    /// # Errors
    ///
    /// See [`Security::try_bond_schedule`].
    pub async fn try_bond_schedule_as_of(
        &self,
        options: ScheduleOptions,
        today: NaiveDate,
    ) -> Result<Vec<CashflowEvent>> {
        self.listing().await?;
        let mut coupons = self.read_coupons(today).await?;
        if next_coupon_needs_rate(&coupons, today) {
            match self.market_snapshot().await {
                Ok(snapshot) => match repair_next_coupon(coupons.clone(), &snapshot, today) {
                    Ok(repaired) => coupons = repaired,
                    Err(e) => warn!(ticker = %self.ticker, error = %e, "Next coupon left without rate"),
                },
                Err(e) => warn!(ticker = %self.ticker, error = %e, "Next coupon left without rate"),
            }
        }

        let inputs = ScheduleInputs {
            coupons,
            offers: self.read_offers().await?,
            amortizations: self.read_amortizations().await?,
            issue_date: self.issue_date().await?,
        };
        let schedule = assemble(inputs, options, today)?;
        debug!(ticker = %self.ticker, rows = schedule.len(), "Assembled schedule");
        Ok(schedule)
    }
}

fn repair_next_coupon(
    coupons: Vec<Coupon>,
    snapshot: &MarketSnapshot,
    today: NaiveDate,
) -> Result<Vec<Coupon>> {
    let accrued = snapshot
        .accrued_interest()
        .ok_or_else(|| IssError::incomplete("securities", "no accrued interest"))?;
    let settle = snapshot
        .settle_date()
        .ok_or_else(|| IssError::incomplete("securities", "no settlement date"))?;
    fill_next_coupon_from_accrued(coupons, accrued, settle, today)
}
