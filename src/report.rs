use serde::{Deserialize, Serialize};

use crate::affordability::{AffordabilityCalculator, AffordabilityResult, LoanInput};
use crate::amortization::{self, AmortizationSchedule};
use crate::annuity;
use crate::error::Result;

/// Everything the presentation layer needs for one computation: the summary
/// figures and the full repayment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordabilityReport {
    pub input: LoanInput,
    pub cost_table_version: String,
    pub affordability: AffordabilityResult,
    pub schedule: AmortizationSchedule,
}

impl AffordabilityReport {
    /// Pairs an affordability result with the schedule generated from it.
    /// No arithmetic happens here.
    pub fn assemble(
        input: LoanInput,
        cost_table_version: impl Into<String>,
        affordability: AffordabilityResult,
        schedule: AmortizationSchedule,
    ) -> Self {
        Self {
            input,
            cost_table_version: cost_table_version.into(),
            affordability,
            schedule,
        }
    }
}

/// Computes the maximum loan for `input` and its repayment schedule.
///
/// This is the main entry point of the library. It is a pure function of the
/// input and the calculator's immutable policy and cost table, so calling it
/// twice with the same input yields identical reports.
///
/// # Errors
///
/// Returns `InvalidInput` for out-of-range numbers, and `UnknownRegion` when
/// the region is missing from the cost table.
pub fn calculate_affordability(
    calculator: &AffordabilityCalculator,
    input: &LoanInput,
) -> Result<AffordabilityReport> {
    let affordability = calculator.compute_max_loan(input)?;

    let schedule = amortization::generate_for_monthly_rate(
        affordability.max_loan_amount,
        affordability.effective_monthly_rate,
        annuity::periods_for_term(input.term_years)?,
    )?;

    Ok(AffordabilityReport::assemble(
        input.clone(),
        calculator.cost_table().version(),
        affordability,
        schedule,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_calculate_affordability_happy_path() {
        let calculator = AffordabilityCalculator::with_defaults().unwrap();
        let input = LoanInput::new(Money::from_major(2500), 25).with_region("madrid");

        let report = calculate_affordability(&calculator, &input).unwrap();

        assert_eq!(report.cost_table_version, "es-2025.1");
        assert_eq!(report.input, input);
        assert_eq!(report.schedule.len(), 300);
        assert_eq!(report.schedule.principal, report.affordability.max_loan_amount);
        assert_eq!(
            report.schedule.level_payment,
            report.affordability.monthly_payment
        );
        assert_eq!(
            report.schedule.monthly_rate,
            report.affordability.effective_monthly_rate
        );
    }

    #[test]
    fn test_zero_affordability_has_empty_schedule() {
        let calculator = AffordabilityCalculator::with_defaults().unwrap();
        let input = LoanInput::new(Money::from_major(500), 30)
            .with_other_monthly_debt(Money::from_major(400));

        let report = calculate_affordability(&calculator, &input).unwrap();

        assert!(report.affordability.is_zero_affordability());
        assert!(report.schedule.is_empty());
    }
}
