//! French (level payment) amortization schedules in fixed-point currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annuity;
use crate::error::{AffordabilityError, Result};
use crate::money::Money;

/// Represents the payment details for a single month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based month number.
    pub period_index: u32,
    pub payment_amount: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    /// Balance left after this payment.
    pub remaining_balance: Money,
}

/// Month-by-month repayment of a loan.
///
/// The principal components always add up to `principal` exactly and the
/// last entry leaves a zero balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub monthly_rate: Decimal,
    /// Payment for every month but the last, which settles the residual.
    pub level_payment: Money,
    /// The total amount paid over the lifetime of the loan.
    pub total_paid: Money,
    pub total_interest: Money,
    pub entries: Vec<AmortizationEntry>,
}

impl AmortizationSchedule {
    fn empty(monthly_rate: Decimal) -> Self {
        Self {
            principal: Money::ZERO,
            monthly_rate,
            level_payment: Money::ZERO,
            total_paid: Money::ZERO,
            total_interest: Money::ZERO,
            entries: Vec::new(),
        }
    }

    fn from_entries(principal: Money, monthly_rate: Decimal, entries: Vec<AmortizationEntry>) -> Self {
        let level_payment = entries
            .first()
            .map(|entry| entry.payment_amount)
            .unwrap_or_default();
        let total_paid = entries.iter().map(|e| e.payment_amount).sum();
        let total_interest = entries.iter().map(|e| e.interest_component).sum();

        Self {
            principal,
            monthly_rate,
            level_payment,
            total_paid,
            total_interest,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn final_entry(&self) -> Option<&AmortizationEntry> {
        self.entries.last()
    }

    pub fn total_principal(&self) -> Money {
        self.entries.iter().map(|e| e.principal_component).sum()
    }
}

/// Builds the schedule for `principal` at an annual percentage rate over
/// `term_years` years of monthly payments.
///
/// # Errors
///
/// Returns `InvalidInput` if the principal or rate is negative, or the term
/// is zero.
pub fn generate(
    principal: Money,
    annual_rate_percent: Decimal,
    term_years: u32,
) -> Result<AmortizationSchedule> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(AffordabilityError::invalid_input(
            "annual_rate_percent",
            "cannot be negative",
        ));
    }
    if term_years == 0 {
        return Err(AffordabilityError::invalid_input(
            "term_years",
            "must be at least one year",
        ));
    }

    generate_for_monthly_rate(
        principal,
        annuity::monthly_rate(annual_rate_percent),
        annuity::periods_for_term(term_years)?,
    )
}

/// Same as [`generate`] with the monthly rate and period count already
/// resolved.
pub fn generate_for_monthly_rate(
    principal: Money,
    monthly_rate: Decimal,
    periods: u32,
) -> Result<AmortizationSchedule> {
    if principal.is_negative() {
        return Err(AffordabilityError::invalid_input(
            "principal",
            "cannot be negative",
        ));
    }
    if monthly_rate < Decimal::ZERO {
        return Err(AffordabilityError::invalid_input(
            "monthly_rate",
            "cannot be negative",
        ));
    }
    if periods == 0 {
        return Err(AffordabilityError::invalid_input(
            "periods",
            "must be at least one",
        ));
    }

    if principal.is_zero() {
        return Ok(AmortizationSchedule::empty(monthly_rate));
    }

    let entries = if monthly_rate.is_zero() {
        straight_line_entries(principal, periods)?
    } else {
        level_payment_entries(principal, monthly_rate, periods)?
    };

    let schedule = AmortizationSchedule::from_entries(principal, monthly_rate, entries);
    debug!(
        %principal,
        periods,
        level_payment = %schedule.level_payment,
        total_interest = %schedule.total_interest,
        "generated amortization schedule"
    );
    Ok(schedule)
}

/// Regular monthly payment for `principal`: the rounded annuity payment, or
/// at a zero rate the first (largest) share of the even split.
pub fn regular_payment(principal: Money, monthly_rate: Decimal, periods: u32) -> Result<Money> {
    if monthly_rate.is_zero() {
        return principal
            .split_evenly(periods)?
            .first()
            .copied()
            .ok_or_else(|| AffordabilityError::degenerate("empty straight-line split"));
    }
    Money::from_decimal_rounded(annuity::level_payment(
        principal.to_decimal(),
        monthly_rate,
        periods,
    )?)
}

fn straight_line_entries(principal: Money, periods: u32) -> Result<Vec<AmortizationEntry>> {
    let mut balance = principal;
    let entries = principal
        .split_evenly(periods)?
        .into_iter()
        .zip(1..=periods)
        .map(|(share, period_index)| {
            balance -= share;
            AmortizationEntry {
                period_index,
                payment_amount: share,
                principal_component: share,
                interest_component: Money::ZERO,
                remaining_balance: balance,
            }
        })
        .collect();
    Ok(entries)
}

fn level_payment_entries(
    principal: Money,
    monthly_rate: Decimal,
    periods: u32,
) -> Result<Vec<AmortizationEntry>> {
    let payment = regular_payment(principal, monthly_rate, periods)?;

    let mut balance = principal;
    let mut entries = Vec::with_capacity(periods as usize);

    for period_index in 1..=periods {
        let interest = balance.mul_rate(monthly_rate)?;
        // The last month absorbs every rounding residual left in the balance.
        let principal_component = if period_index == periods {
            balance
        } else {
            (payment - interest).clamp(Money::ZERO, balance)
        };
        balance -= principal_component;

        entries.push(AmortizationEntry {
            period_index,
            payment_amount: principal_component + interest,
            principal_component,
            interest_component: interest,
            remaining_balance: balance,
        });
    }

    Ok(entries)
}
