//! Annuity identities shared by the affordability calculator and the
//! amortization scheduler.
//!
//! Both directions run on [`Decimal`] with the nominal monthly rate
//! `annual_percent / 100 / 12`; callers convert to [`crate::Money`] and own
//! the rounding.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::{AffordabilityError, Result};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Converts an annual percentage (e.g. `2.5` for 2.5%) into the nominal
/// monthly rate as a fraction.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// Number of monthly periods in a term of whole years.
pub fn periods_for_term(term_years: u32) -> Result<u32> {
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| AffordabilityError::invalid_input("term_years", "term is too long"))
}

fn growth_factor(monthly_rate: Decimal, periods: u32) -> Result<Decimal> {
    (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| {
            AffordabilityError::degenerate(format!(
                "(1 + {monthly_rate})^{periods} overflows"
            ))
        })
}

/// Present value of one unit paid at the end of each of `periods` months:
/// `(1 - (1 + i)^-n) / i`, or `n` when the rate is zero.
pub fn present_value_factor(monthly_rate: Decimal, periods: u32) -> Result<Decimal> {
    if monthly_rate.is_zero() {
        return Ok(Decimal::from(periods));
    }

    let growth = growth_factor(monthly_rate, periods)?;
    let discount = Decimal::ONE
        .checked_div(growth)
        .ok_or_else(|| AffordabilityError::degenerate("annuity discount factor"))?;

    (Decimal::ONE - discount)
        .checked_div(monthly_rate)
        .ok_or_else(|| AffordabilityError::degenerate("annuity present value factor"))
}

/// Constant payment that retires `principal` over `periods` months:
/// `PMT = P * [i(1 + i)^n] / [(1 + i)^n - 1]`, or `P / n` at a zero rate.
pub fn level_payment(principal: Decimal, monthly_rate: Decimal, periods: u32) -> Result<Decimal> {
    if periods == 0 {
        return Err(AffordabilityError::degenerate("level payment over zero periods"));
    }
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let growth = growth_factor(monthly_rate, periods)?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(AffordabilityError::degenerate(format!(
            "monthly rate {monthly_rate} vanishes at decimal precision"
        )));
    }

    principal
        .checked_mul(monthly_rate * growth)
        .and_then(|numerator| numerator.checked_div(denominator))
        .ok_or_else(|| AffordabilityError::degenerate("level payment"))
}
