//! Lending policy: debt-to-income cap, default rate and allowed terms.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AffordabilityError, Result};

/// Lending policy applied to every computation.
///
/// The defaults are a 35% debt-to-income cap, a 2.5% rate when the buyer
/// doesn't know theirs, and terms between 5 and 50 years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityPolicy {
    /// Share of monthly net income that may go to all debt service (0.35 = 35%).
    pub debt_to_income_ratio: Decimal,
    /// Annual percentage used when the input leaves the rate unspecified.
    pub default_annual_rate_percent: Decimal,
    pub min_term_years: u32,
    pub max_term_years: u32,
}

impl Default for AffordabilityPolicy {
    fn default() -> Self {
        Self {
            debt_to_income_ratio: dec!(0.35),
            default_annual_rate_percent: dec!(2.5),
            min_term_years: 5,
            max_term_years: 50,
        }
    }
}

impl AffordabilityPolicy {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(raw)
            .map_err(|e| AffordabilityError::invalid_input("policy", e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn term_range(&self) -> RangeInclusive<u32> {
        self.min_term_years..=self.max_term_years
    }

    pub fn validate(&self) -> Result<()> {
        if self.debt_to_income_ratio <= Decimal::ZERO || self.debt_to_income_ratio > Decimal::ONE {
            return Err(AffordabilityError::invalid_input(
                "debt_to_income_ratio",
                "must be in (0, 1]",
            ));
        }
        if self.default_annual_rate_percent <= Decimal::ZERO
            || self.default_annual_rate_percent > dec!(100)
        {
            return Err(AffordabilityError::invalid_input(
                "default_annual_rate_percent",
                "must be in (0, 100]",
            ));
        }
        if self.min_term_years == 0 || self.min_term_years > self.max_term_years {
            return Err(AffordabilityError::invalid_input(
                "min_term_years",
                "must be positive and not above max_term_years",
            ));
        }
        Ok(())
    }
}
