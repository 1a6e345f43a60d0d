//! `es_affordability` is a Rust library for working out how much a household in Spain
//! can borrow for a home and how that loan is repaid.
//!
//! It provides:
//! - **Affordability**: the largest loan whose monthly payment, together with other debt,
//!   stays under a debt-to-income cap, net of regional purchase taxes and fees.
//! - **Price (French) amortization**: a fixed monthly payment schedule whose principal
//!   components add up to the loan exactly and whose last payment leaves a zero balance.
//!
//! All amounts are fixed-point [`Money`] (whole cents); rates are [`rust_decimal::Decimal`].
//!
//! ## Usage
//!
//! Add `es_affordability` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! es_affordability = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then, use the `calculate_affordability` function to get the summary and the
//! full repayment table:
//!
//! ```rust
//! use es_affordability::{
//!     calculate_affordability, AffordabilityCalculator, LoanInput, Money, PropertyState,
//! };
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let calculator = AffordabilityCalculator::with_defaults().expect("embedded cost table");
//!     let input = LoanInput::new(Money::from_major(2_800), 30)
//!         .with_other_monthly_debt(Money::from_major(150))
//!         .with_annual_interest_rate_percent(dec!(3.2))
//!         .with_property_state(PropertyState::SecondHand)
//!         .with_region("valencia");
//!
//!     match calculate_affordability(&calculator, &input) {
//!         Ok(report) => {
//!             println!("Max loan:        {}", report.affordability.max_loan_amount);
//!             println!("Monthly payment: {}", report.affordability.monthly_payment);
//!             println!("Total interest:  {}", report.schedule.total_interest);
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating affordability: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod affordability;
pub mod amortization;
pub mod annuity;
pub mod cost_table;
pub mod error;
pub mod money;
pub mod policy;
pub mod report;

pub use affordability::{AffordabilityCalculator, AffordabilityResult, LoanInput, DEFAULT_REGION};
pub use amortization::{generate, AmortizationEntry, AmortizationSchedule};
pub use cost_table::{CostFactor, CostTable, PropertyState};
pub use error::{AffordabilityError, Result};
pub use money::Money;
pub use policy::AffordabilityPolicy;
pub use report::{calculate_affordability, AffordabilityReport};
