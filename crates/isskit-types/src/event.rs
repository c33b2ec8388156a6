//! Bond event records and the assembled cashflow schedule row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{IssError, Result, TypedTable};

/// Marker the exchange puts in the offer type of a canceled offer.
pub const CANCELED_OFFER_MARKER: &str = "отмен";

/// Kind of a schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Placement of the issue.
    Issue,
    /// Coupon payment.
    Coupon,
    /// Put/call offer.
    Offer,
    /// Partial principal repayment.
    Amortization,
    /// Final principal repayment.
    Maturity,
}

impl OperationType {
    /// Rank used to order rows sharing a date in the final schedule.
    #[must_use]
    pub const fn display_rank(&self) -> u8 {
        match self {
            Self::Issue => 0,
            Self::Coupon => 1,
            Self::Offer => 2,
            Self::Amortization => 3,
            Self::Maturity => 4,
        }
    }

    /// Rank used while backfilling coupon rates.
    ///
    /// Coupons sort last within a date so that a coupon's rate propagates
    /// backward onto the offer and redemption rows of the same date.
    #[must_use]
    pub const fn backfill_rank(&self) -> u8 {
        match self {
            Self::Issue => 0,
            Self::Offer => 1,
            Self::Amortization => 2,
            Self::Maturity => 3,
            Self::Coupon => 4,
        }
    }

    /// Returns the operation type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Coupon => "coupon",
            Self::Offer => "offer",
            Self::Amortization => "amortization",
            Self::Maturity => "maturity",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One coupon period from the bondization `coupons` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Security code.
    pub sec_id: Option<String>,
    /// ISIN.
    pub isin: Option<String>,
    /// Full name of the issue.
    pub name: Option<String>,
    /// Payment date.
    pub coupon_date: NaiveDate,
    /// Record date.
    pub record_date: Option<NaiveDate>,
    /// Start of the accrual period.
    pub start_date: Option<NaiveDate>,
    /// Face value at placement.
    pub initial_face_value: Option<f64>,
    /// Face value the coupon accrues on.
    pub face_value: Option<f64>,
    /// Currency of the face value.
    pub face_unit: Option<String>,
    /// Cash amount per bond.
    pub value: Option<f64>,
    /// Rate, percent per annum.
    pub value_prc: Option<f64>,
    /// Cash amount in roubles.
    pub value_rub: Option<f64>,
}

impl Coupon {
    /// Length of the accrual period in days.
    #[must_use]
    pub fn period_days(&self) -> Option<i64> {
        self.start_date
            .map(|start| (self.coupon_date - start).num_days())
    }

    /// Maps the rows of a coerced `coupons` table.
    ///
    /// Rows without a payment date are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IssError::IncompleteData`] if the payment date column is absent.
    pub fn from_table(table: &TypedTable) -> Result<Vec<Self>> {
        require_column(table, "coupons", "coupondate")?;
        Ok(table
            .iter()
            .filter_map(|row| {
                Some(Self {
                    coupon_date: row.date("coupondate")?,
                    sec_id: row.string("secid"),
                    isin: row.string("isin"),
                    name: row.string("name"),
                    record_date: row.date("recorddate"),
                    start_date: row.date("startdate"),
                    initial_face_value: row.f64("initialfacevalue"),
                    face_value: row.f64("facevalue"),
                    face_unit: row.string("faceunit"),
                    value: row.f64("value"),
                    value_prc: row.f64("valueprc"),
                    value_rub: row.f64("value_rub"),
                })
            })
            .collect())
    }
}

/// One principal repayment from the bondization `amortizations` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amortization {
    /// Security code.
    pub sec_id: Option<String>,
    /// ISIN.
    pub isin: Option<String>,
    /// Full name of the issue.
    pub name: Option<String>,
    /// Repayment date.
    pub amort_date: NaiveDate,
    /// Face value before the repayment.
    pub face_value: Option<f64>,
    /// Face value at placement.
    pub initial_face_value: Option<f64>,
    /// Currency of the face value.
    pub face_unit: Option<String>,
    /// Repaid share of face, percent.
    pub value_prc: Option<f64>,
    /// Repaid amount per bond.
    pub value: Option<f64>,
    /// Repaid amount in roubles.
    pub value_rub: Option<f64>,
    /// Event kind reported upstream (`amortization` or `maturity`).
    pub data_source: Option<String>,
}

impl Amortization {
    /// Returns true if upstream already labels this row as the final repayment.
    #[must_use]
    pub fn is_maturity(&self) -> bool {
        self.data_source.as_deref() == Some("maturity")
    }

    /// Maps the rows of a coerced `amortizations` table.
    ///
    /// # Errors
    ///
    /// Returns [`IssError::IncompleteData`] if the repayment date column is absent.
    pub fn from_table(table: &TypedTable) -> Result<Vec<Self>> {
        require_column(table, "amortizations", "amortdate")?;
        Ok(table
            .iter()
            .filter_map(|row| {
                Some(Self {
                    amort_date: row.date("amortdate")?,
                    sec_id: row.string("secid"),
                    isin: row.string("isin"),
                    name: row.string("name"),
                    face_value: row.f64("facevalue"),
                    initial_face_value: row.f64("initialfacevalue"),
                    face_unit: row.string("faceunit"),
                    value_prc: row.f64("valueprc"),
                    value: row.f64("value"),
                    value_rub: row.f64("value_rub"),
                    data_source: row.string("data_source"),
                })
            })
            .collect())
    }
}

/// One put/call offer from the bondization `offers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Security code.
    pub sec_id: Option<String>,
    /// ISIN.
    pub isin: Option<String>,
    /// Full name of the issue.
    pub name: Option<String>,
    /// Announcement date.
    pub offer_date: Option<NaiveDate>,
    /// First day of the exercise window.
    pub offer_date_start: Option<NaiveDate>,
    /// Last day of the exercise window; the offer's schedule date.
    pub offer_date_end: NaiveDate,
    /// Face value at the offer.
    pub face_value: Option<f64>,
    /// Currency of the face value.
    pub face_unit: Option<String>,
    /// Exercise price, percent of face.
    pub price: Option<f64>,
    /// Volume offered.
    pub value: Option<f64>,
    /// Offer agent.
    pub agent: Option<String>,
    /// Offer type, e.g. "Оферта" or "Оферта (отменена)".
    pub offer_type: Option<String>,
}

impl Offer {
    /// Returns true if the offer has been canceled.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.offer_type
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(CANCELED_OFFER_MARKER))
    }

    /// Maps the rows of a coerced `offers` table.
    ///
    /// # Errors
    ///
    /// Returns [`IssError::IncompleteData`] if the offer end date column is absent.
    pub fn from_table(table: &TypedTable) -> Result<Vec<Self>> {
        require_column(table, "offers", "offerdateend")?;
        Ok(table
            .iter()
            .filter_map(|row| {
                Some(Self {
                    offer_date_end: row.date("offerdateend")?,
                    sec_id: row.string("secid"),
                    isin: row.string("isin"),
                    name: row.string("name"),
                    offer_date: row.date("offerdate"),
                    offer_date_start: row.date("offerdatestart"),
                    face_value: row.f64("facevalue"),
                    face_unit: row.string("faceunit"),
                    price: row.f64("price"),
                    value: row.f64("value"),
                    agent: row.string("agent"),
                    offer_type: row.string("offertype"),
                })
            })
            .collect())
    }
}

/// One row of an assembled bond cashflow schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowEvent {
    /// Payment or issue date.
    pub date: NaiveDate,
    /// Kind of event.
    pub operation_type: OperationType,
    /// Coupon rate in effect, percent per annum.
    pub coupon_rate: Option<f64>,
    /// Coupon amount due on this date.
    pub coupon_value: Option<f64>,
    /// Outstanding principal before this row's redemption.
    pub face_value: f64,
    /// Principal repaid on this date.
    pub redemption_value: f64,
    /// Principal repaid, percent of face.
    pub redemption_rate: f64,
    /// Offer exercise price, percent of face.
    pub offer_price: f64,
    /// Security code.
    pub sec_id: String,
    /// ISIN.
    pub isin: String,
    /// Full name of the issue.
    pub name: String,
    /// Currency of the face value.
    pub face_unit: String,
    /// Face value at placement.
    pub initial_face_value: f64,
}

impl CashflowEvent {
    /// Total cash due on this date (coupon plus redemption).
    #[must_use]
    pub fn total_payment(&self) -> f64 {
        self.coupon_value.unwrap_or(0.0) + self.redemption_value
    }
}

fn require_column(table: &TypedTable, name: &str, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(IssError::incomplete(
            name,
            format!("column '{column}' not found"),
        ))
    }
}
