//! Financial calculator - Pure arithmetic over already-loaded data.
//!
//! Amounts are whole currency units (`i64`). Percentages are whole numbers in `0..=100`
//! and every percentage is applied with half-up rounding to the nearest unit, so the
//! same inputs always give the same integer result.

use crate::{
    core::policy::CancellationPolicy,
    entities::LineItemType,
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a reservation is being closed out early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationAction {
    /// Guest or staff cancelled
    Cancel,
    /// Guest never arrived
    NoShow,
}

/// Which policy branch produced the fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTier {
    /// Cancelled at or before the free-cancellation threshold
    Early,
    /// Cancelled inside the threshold (including after arrival time)
    Late,
    /// No-show
    NoShow,
}

/// Result of a cancellation fee calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CancellationQuote {
    /// Fee retained by the property
    pub fee: i64,
    /// Amount to hand back to the guest
    pub refund: i64,
    /// Branch of the policy that applied
    pub tier: FeeTier,
    /// Hours between now and the check-in instant (negative once past)
    pub hours_remaining: f64,
}

/// Charges, payments and the resulting balance of a folio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FolioBalance {
    /// Sum of charge, service and tax items
    pub total_charges: i64,
    /// Payments received net of refunds, as a positive number
    pub total_payments: i64,
    /// `total_charges - total_payments`
    pub balance: i64,
}

/// Price breakdown for a property service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceTotal {
    /// `price * quantity`
    pub subtotal: i64,
    /// Tax on the subtotal
    pub tax: i64,
    /// `subtotal + tax`
    pub total: i64,
}

/// Largest amount a single reservation, service or payment may carry.
///
/// Any sum of a handful of such amounts, and any percentage of one, stays far inside `i64`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Rejects negative amounts and amounts above [`MAX_AMOUNT`].
pub fn check_amount(label: &str, amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(Error::validation(format!(
            "{label} cannot be negative: {amount}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::validation(format!(
            "{label} exceeds the maximum of {MAX_AMOUNT}: {amount}"
        )));
    }
    Ok(())
}

fn overflow(what: &str) -> Error {
    Error::validation(format!("{what} overflows"))
}

/// `amount * percent / 100`, rounded half-up.
///
/// # Errors
/// Returns [`Error::Validation`] when the product does not fit in an `i64`.
pub fn percent_of(amount: i64, percent: i32) -> Result<i64> {
    amount
        .checked_mul(i64::from(percent))
        .and_then(|scaled| scaled.checked_add(50))
        .map(|scaled| scaled / 100)
        .ok_or_else(|| overflow("Percentage"))
}

/// Hours from `now` until `check_in_at`; negative once the check-in time has passed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hours_until(check_in_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (check_in_at - now).num_seconds() as f64 / 3600.0
}

/// Computes the cancellation or no-show fee and the refund owed.
///
/// 1. No-show: `total * no_show_fee_percent`.
/// 2. At least `free_until_hours` before arrival: `total * early_fee_percent`.
/// 3. Otherwise (including after arrival): `total * late_fee_percent`.
///
/// The refund is whatever was paid beyond the fee, never negative.
///
/// # Errors
/// Returns [`Error::Validation`] for negative or oversized amounts, a non-finite hour
/// count, or an invalid policy.
pub fn calculate_cancellation_fee(
    total_amount: i64,
    amount_paid: i64,
    policy: &CancellationPolicy,
    action: CancellationAction,
    hours_remaining: f64,
) -> Result<CancellationQuote> {
    check_amount("Total amount", total_amount)?;
    check_amount("Amount paid", amount_paid)?;
    if !hours_remaining.is_finite() {
        return Err(Error::validation("Hours remaining must be a finite number"));
    }
    policy.validate()?;

    let (tier, percent) = match action {
        CancellationAction::NoShow => (FeeTier::NoShow, policy.no_show_fee_percent),
        CancellationAction::Cancel if hours_remaining >= f64::from(policy.free_until_hours) => {
            (FeeTier::Early, policy.early_fee_percent)
        }
        CancellationAction::Cancel => (FeeTier::Late, policy.late_fee_percent),
    };

    let fee = percent_of(total_amount, percent)?;
    let refund = (amount_paid - fee).max(0);

    Ok(CancellationQuote {
        fee,
        refund,
        tier,
        hours_remaining,
    })
}

/// Totals a folio from `(type, signed amount)` pairs.
///
/// Payment items are stored negative (a refund is a positive payment item), so
/// `total_payments` is the negated sum of payment items.
///
/// # Errors
/// Returns [`Error::Validation`] if any running total leaves the `i64` range.
pub fn compute_folio_balance<I>(items: I) -> Result<FolioBalance>
where
    I: IntoIterator<Item = (LineItemType, i64)>,
{
    let (total_charges, payment_sum) = items.into_iter().try_fold(
        (0_i64, 0_i64),
        |(charges, payments), (kind, amount)| match kind {
            LineItemType::Payment => payments.checked_add(amount).map(|p| (charges, p)),
            LineItemType::Charge | LineItemType::Service | LineItemType::Tax => {
                charges.checked_add(amount).map(|c| (c, payments))
            }
        },
    )
    .ok_or_else(|| overflow("Folio balance"))?;
    let total_payments = payment_sum
        .checked_neg()
        .ok_or_else(|| overflow("Folio balance"))?;

    Ok(FolioBalance {
        total_charges,
        total_payments,
        balance: total_charges
            .checked_sub(total_payments)
            .ok_or_else(|| overflow("Folio balance"))?,
    })
}

/// `price * quantity * (1 + tax_rate / 100)`, with tax rounded half-up.
///
/// # Errors
/// Returns [`Error::Validation`] when the price is negative, the quantity is below 1,
/// the tax rate is outside `0..=100` or the subtotal exceeds [`MAX_AMOUNT`].
pub fn compute_service_total(
    price: i64,
    quantity: i64,
    tax_rate_percent: i32,
) -> Result<ServiceTotal> {
    if price < 0 {
        return Err(Error::validation(format!(
            "Service price cannot be negative: {price}"
        )));
    }
    if quantity < 1 {
        return Err(Error::validation(format!(
            "Quantity must be at least 1, got {quantity}"
        )));
    }
    if !(0..=100).contains(&tax_rate_percent) {
        return Err(Error::validation(format!(
            "Tax rate must be between 0 and 100, got {tax_rate_percent}"
        )));
    }

    let subtotal = price
        .checked_mul(quantity)
        .filter(|subtotal| *subtotal <= MAX_AMOUNT)
        .ok_or_else(|| overflow("Service total"))?;
    let tax = percent_of(subtotal, tax_rate_percent)?;

    Ok(ServiceTotal {
        subtotal,
        tax,
        total: subtotal + tax,
    })
}

/// Number of nights between two dates.
///
/// # Errors
/// Returns [`Error::Validation`] unless `check_out` is after `check_in`.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64> {
    if check_out <= check_in {
        return Err(Error::validation(format!(
            "Check-out ({check_out}) must be after check-in ({check_in})"
        )));
    }
    Ok((check_out - check_in).num_days())
}

/// Hours between clock-in and clock-out, rounded to two decimals.
///
/// # Errors
/// Returns [`Error::Validation`] unless `check_out` is after `check_in`.
#[allow(clippy::cast_precision_loss)]
pub fn hours_worked(check_in: NaiveDateTime, check_out: NaiveDateTime) -> Result<f64> {
    if check_out <= check_in {
        return Err(Error::validation(format!(
            "Clock-out ({check_out}) must be after clock-in ({check_in})"
        )));
    }
    let minutes = (check_out - check_in).num_minutes() as f64;
    Ok((minutes / 60.0 * 100.0).round() / 100.0)
}

/// Overtime pay: `hours * rate`, rounded to the nearest unit.
///
/// # Errors
/// Returns [`Error::Validation`] for non-positive or non-finite hours and negative rates.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn overtime_amount(hours: f64, rate: i64) -> Result<i64> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(Error::validation(format!(
            "Overtime hours must be a positive number, got {hours}"
        )));
    }
    if rate < 0 {
        return Err(Error::validation(format!(
            "Overtime rate cannot be negative: {rate}"
        )));
    }
    Ok((hours * rate as f64).round() as i64)
}
