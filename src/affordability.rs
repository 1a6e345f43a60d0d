//! Maximum loan a household can service under a debt-to-income cap.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amortization;
use crate::annuity;
use crate::cost_table::{CostFactor, CostTable, PropertyState};
use crate::error::{AffordabilityError, Result};
use crate::money::Money;
use crate::policy::AffordabilityPolicy;

/// Region used when the caller doesn't pick one.
pub const DEFAULT_REGION: &str = "andalucia";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Validated numeric input for one computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    pub monthly_net_income: Money,
    #[serde(default)]
    pub other_monthly_debt: Money,
    /// `None` means the buyer doesn't know their rate; the policy default applies.
    /// `Some(0)` is an interest-free loan.
    #[serde(default)]
    pub annual_interest_rate_percent: Option<Decimal>,
    pub term_years: u32,
    #[serde(default)]
    pub property_state: PropertyState,
    #[serde(default = "default_region")]
    pub region: String,
}

impl LoanInput {
    pub fn new(monthly_net_income: Money, term_years: u32) -> Self {
        Self {
            monthly_net_income,
            other_monthly_debt: Money::ZERO,
            annual_interest_rate_percent: None,
            term_years,
            property_state: PropertyState::default(),
            region: default_region(),
        }
    }

    pub fn with_other_monthly_debt(mut self, debt: Money) -> Self {
        self.other_monthly_debt = debt;
        self
    }

    pub fn with_annual_interest_rate_percent(mut self, rate: Decimal) -> Self {
        self.annual_interest_rate_percent = Some(rate);
        self
    }

    pub fn with_property_state(mut self, state: PropertyState) -> Self {
        self.property_state = state;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

/// Outcome of [`AffordabilityCalculator::compute_max_loan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    /// Loan net of acquisition costs, rounded down to a whole currency unit.
    pub max_loan_amount: Money,
    /// Regular payment that retires `max_loan_amount` over the term.
    pub monthly_payment: Money,
    /// Income share still available for the mortgage after other debt.
    pub max_monthly_payment: Money,
    /// Principal that budget services before acquisition costs are taken off.
    pub gross_principal: Money,
    pub debt_to_income_ratio_used: Decimal,
    pub estimated_acquisition_costs: Money,
    pub annual_interest_rate_percent: Decimal,
    pub effective_monthly_rate: Decimal,
    pub cost_factor: CostFactor,
}

impl AffordabilityResult {
    /// The household has no capacity left for a mortgage. This is a valid
    /// outcome, not an error.
    pub fn is_zero_affordability(&self) -> bool {
        self.max_loan_amount.is_zero()
    }
}

/// Inverts the annuity formula under the policy's debt-to-income cap.
///
/// Holds no mutable state; one instance can serve any number of concurrent
/// computations.
#[derive(Debug, Clone)]
pub struct AffordabilityCalculator {
    policy: AffordabilityPolicy,
    cost_table: Arc<CostTable>,
}

impl AffordabilityCalculator {
    pub fn new(policy: AffordabilityPolicy, cost_table: Arc<CostTable>) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy, cost_table })
    }

    /// Default policy with the embedded Spanish cost table.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            AffordabilityPolicy::default(),
            Arc::new(CostTable::embedded()?),
        )
    }

    pub fn policy(&self) -> &AffordabilityPolicy {
        &self.policy
    }

    pub fn cost_table(&self) -> &CostTable {
        &self.cost_table
    }

    pub fn validate(&self, input: &LoanInput) -> Result<()> {
        if !input.monthly_net_income.is_positive() {
            return Err(AffordabilityError::invalid_input(
                "monthly_net_income",
                "must be greater than zero",
            ));
        }
        if input.other_monthly_debt.is_negative() {
            return Err(AffordabilityError::invalid_input(
                "other_monthly_debt",
                "cannot be negative",
            ));
        }
        if let Some(rate) = input.annual_interest_rate_percent {
            if rate < Decimal::ZERO || rate > dec!(100) {
                return Err(AffordabilityError::invalid_input(
                    "annual_interest_rate_percent",
                    format!("{rate} is outside [0, 100]"),
                ));
            }
        }
        if !self.policy.term_range().contains(&input.term_years) {
            return Err(AffordabilityError::invalid_input(
                "term_years",
                format!(
                    "{} is outside [{}, {}]",
                    input.term_years, self.policy.min_term_years, self.policy.max_term_years
                ),
            ));
        }
        Ok(())
    }

    /// The explicit rate, or the policy default when none was given.
    pub fn resolve_annual_rate(&self, input: &LoanInput) -> Decimal {
        input
            .annual_interest_rate_percent
            .unwrap_or(self.policy.default_annual_rate_percent)
    }

    pub fn compute_max_loan(&self, input: &LoanInput) -> Result<AffordabilityResult> {
        self.validate(input)?;

        let ratio = self.policy.debt_to_income_ratio;
        let annual_rate = self.resolve_annual_rate(input);
        let monthly_rate = annuity::monthly_rate(annual_rate);
        let periods = annuity::periods_for_term(input.term_years)?;
        let cost_factor = self
            .cost_table
            .resolve(&input.region, input.property_state)?;

        // Truncated so the payment plus other debt never exceeds income x ratio.
        let cap = input
            .monthly_net_income
            .to_decimal()
            .checked_mul(ratio)
            .ok_or_else(|| AffordabilityError::degenerate("debt-to-income cap"))?;
        let budget = Money::from_decimal_truncated(cap)?.checked_sub(input.other_monthly_debt)?;
        debug!(%budget, %annual_rate, %monthly_rate, periods, "resolved affordability inputs");

        let zero = AffordabilityResult {
            max_loan_amount: Money::ZERO,
            monthly_payment: Money::ZERO,
            max_monthly_payment: Money::ZERO,
            gross_principal: Money::ZERO,
            debt_to_income_ratio_used: ratio,
            estimated_acquisition_costs: Money::ZERO,
            annual_interest_rate_percent: annual_rate,
            effective_monthly_rate: monthly_rate,
            cost_factor,
        };

        if !budget.is_positive() {
            warn!(
                income = %input.monthly_net_income,
                other_debt = %input.other_monthly_debt,
                "no capacity left for a mortgage"
            );
            return Ok(zero);
        }

        let factor = annuity::present_value_factor(monthly_rate, periods)?;
        let gross_exact = budget
            .to_decimal()
            .checked_mul(factor)
            .ok_or_else(|| AffordabilityError::degenerate("gross principal"))?;
        let gross = Money::from_decimal_truncated(gross_exact)?;

        let costs = cost_factor.estimate_costs(gross)?;
        let net = gross.checked_sub(costs)?;
        debug!(%gross, %costs, %net, "applied acquisition costs");

        if !net.is_positive() {
            warn!(%gross, %costs, "acquisition costs exceed the affordable principal");
            return Ok(AffordabilityResult {
                max_monthly_payment: budget,
                gross_principal: gross,
                estimated_acquisition_costs: costs,
                ..zero
            });
        }

        let max_loan_amount = net.floor_to_major();
        let monthly_payment =
            amortization::regular_payment(max_loan_amount, monthly_rate, periods)?;

        Ok(AffordabilityResult {
            max_loan_amount,
            monthly_payment,
            max_monthly_payment: budget,
            gross_principal: gross,
            debt_to_income_ratio_used: ratio,
            estimated_acquisition_costs: costs,
            annual_interest_rate_percent: annual_rate,
            effective_monthly_rate: monthly_rate,
            cost_factor,
        })
    }
}
