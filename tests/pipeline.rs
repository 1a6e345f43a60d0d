use std::sync::Arc;
use std::thread;

use es_affordability::{
    calculate_affordability, generate, AffordabilityCalculator, AffordabilityError,
    AffordabilityPolicy, CostFactor, CostTable, LoanInput, Money, PropertyState,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[fixture]
fn calculator() -> AffordabilityCalculator {
    let table = CostTable::new("pipeline-test", "EUR")
        .with_region("no_costs", CostFactor::NONE, CostFactor::NONE)
        .unwrap()
        .with_region(
            "coastal",
            CostFactor::new(dec!(11.5), Money::from_major(2500)),
            CostFactor::new(dec!(8), Money::from_major(2000)),
        )
        .unwrap();
    AffordabilityCalculator::new(AffordabilityPolicy::default(), Arc::new(table)).unwrap()
}

#[rstest]
fn scenario_a_default_rate_thirty_years(calculator: AffordabilityCalculator) {
    let input = LoanInput::new(Money::from_major(2000), 30).with_region("no_costs");

    let report = calculate_affordability(&calculator, &input).unwrap();
    let result = &report.affordability;

    assert_eq!(result.max_monthly_payment, Money::from_major(700));
    assert_eq!(result.annual_interest_rate_percent, dec!(2.5));
    assert_eq!(result.max_loan_amount, Money::from_major(177_160));
    assert_eq!(result.monthly_payment, Money::from_major(700));
    assert_eq!(report.schedule.len(), 360);
    assert_eq!(
        report.schedule.final_entry().unwrap().remaining_balance,
        Money::ZERO
    );
    assert_eq!(report.schedule.total_principal(), result.max_loan_amount);
}

#[test]
fn scenario_b_interest_free_ten_years() {
    let schedule = generate(Money::from_major(120_000), Decimal::ZERO, 10).unwrap();

    assert_eq!(schedule.len(), 120);
    for entry in &schedule.entries {
        assert_eq!(entry.principal_component, Money::from_major(1000));
        assert_eq!(entry.interest_component, Money::ZERO);
    }
    assert_eq!(schedule.entries[119].remaining_balance, Money::ZERO);
}

#[rstest]
fn scenario_c_no_capacity(calculator: AffordabilityCalculator) {
    let input = LoanInput::new(Money::from_major(500), 30)
        .with_other_monthly_debt(Money::from_major(400))
        .with_region("no_costs");

    let report = calculate_affordability(&calculator, &input).unwrap();

    assert_eq!(report.affordability.max_loan_amount, Money::ZERO);
    assert!(report.schedule.is_empty());
}

#[rstest]
fn new_build_and_resale_differ_by_their_costs(calculator: AffordabilityCalculator) {
    let base = LoanInput::new(Money::from_major(3200), 25)
        .with_annual_interest_rate_percent(dec!(3.4))
        .with_region("coastal");

    let new_build = calculator.compute_max_loan(&base).unwrap();
    let resale = calculator
        .compute_max_loan(&base.clone().with_property_state(PropertyState::SecondHand))
        .unwrap();

    assert_eq!(new_build.gross_principal, resale.gross_principal);
    for result in [&new_build, &resale] {
        assert_eq!(
            result.max_loan_amount,
            (result.gross_principal - result.estimated_acquisition_costs).floor_to_major()
        );
    }
    assert!(new_build.max_loan_amount < resale.max_loan_amount);

    let again = calculator.compute_max_loan(&base).unwrap();
    assert_eq!(again, new_build);
}

#[rstest]
fn every_schedule_sums_to_its_principal(
    calculator: AffordabilityCalculator,
    #[values(5, 12, 30, 50)] years: u32,
    #[values(None, Some(dec!(0)), Some(dec!(1.35)), Some(dec!(4.99)), Some(dec!(100)))]
    rate: Option<Decimal>,
    #[values("no_costs", "coastal")] region: &str,
) {
    let mut input = LoanInput::new(Money::from_minor(287_533), years).with_region(region);
    input.annual_interest_rate_percent = rate;

    let report = calculate_affordability(&calculator, &input).unwrap();
    let schedule = &report.schedule;

    assert_eq!(schedule.total_principal(), report.affordability.max_loan_amount);
    if !report.affordability.is_zero_affordability() {
        assert_eq!(schedule.len(), years as usize * 12);
        assert_eq!(schedule.final_entry().unwrap().remaining_balance, Money::ZERO);
        let exact_cap = input.monthly_net_income.to_decimal() * dec!(0.35)
            - input.other_monthly_debt.to_decimal();
        assert!(report.affordability.monthly_payment.to_decimal() <= exact_cap);
        assert_eq!(schedule.level_payment, report.affordability.monthly_payment);
    }
}

#[rstest]
fn payment_and_debt_stay_within_the_income_share(
    calculator: AffordabilityCalculator,
    #[values(None, Some(dec!(0)), Some(dec!(3.1)))] rate: Option<Decimal>,
) {
    for cents in 0..100 {
        let mut input = LoanInput::new(Money::from_minor(200_000 + cents), 30)
            .with_other_monthly_debt(Money::from_minor(cents))
            .with_region("no_costs");
        input.annual_interest_rate_percent = rate;

        let report = calculate_affordability(&calculator, &input).unwrap();

        let used = report.affordability.monthly_payment.to_decimal()
            + input.other_monthly_debt.to_decimal();
        let exact_cap = input.monthly_net_income.to_decimal() * dec!(0.35);
        assert!(used <= exact_cap, "income {}: {used} > {exact_cap}", input.monthly_net_income);
        assert_eq!(report.schedule.level_payment, report.affordability.monthly_payment);
    }
}

#[rstest]
fn identical_input_gives_identical_output(calculator: AffordabilityCalculator) {
    let input = LoanInput::new(Money::from_minor(412_345), 35)
        .with_other_monthly_debt(Money::from_minor(23_050))
        .with_annual_interest_rate_percent(dec!(3.875))
        .with_region("coastal");

    let first = serde_json::to_vec(&calculate_affordability(&calculator, &input).unwrap()).unwrap();
    let second = serde_json::to_vec(&calculate_affordability(&calculator, &input).unwrap()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn concurrent_computations_share_one_calculator() {
    let calculator = Arc::new(AffordabilityCalculator::with_defaults().unwrap());
    let regions: Vec<String> = calculator.cost_table().regions().map(str::to_string).collect();

    let handles: Vec<_> = regions
        .into_iter()
        .map(|region| {
            let calculator = Arc::clone(&calculator);
            thread::spawn(move || {
                let input = LoanInput::new(Money::from_major(2600), 30).with_region(region);
                calculate_affordability(&calculator, &input)
            })
        })
        .collect();

    for handle in handles {
        let report = handle.join().unwrap().unwrap();
        assert_eq!(report.schedule.total_principal(), report.affordability.max_loan_amount);
    }
}

#[test]
fn errors_surface_unchanged() {
    let calculator = AffordabilityCalculator::with_defaults().unwrap();

    let unknown = LoanInput::new(Money::from_major(2000), 30).with_region("narnia");
    assert_eq!(
        calculate_affordability(&calculator, &unknown),
        Err(AffordabilityError::UnknownRegion("narnia".into()))
    );

    let too_short = LoanInput::new(Money::from_major(2000), 3);
    assert!(matches!(
        calculate_affordability(&calculator, &too_short),
        Err(AffordabilityError::InvalidInput { .. })
    ));
}

#[test]
fn json_input_uses_form_defaults() {
    let calculator = AffordabilityCalculator::with_defaults().unwrap();
    let input: LoanInput = serde_json::from_str(
        r#"{ "monthly_net_income": "2000.00", "term_years": 30, "property_state": "SECOND_HAND" }"#,
    )
    .unwrap();

    let report = calculate_affordability(&calculator, &input).unwrap();

    assert_eq!(report.input.region, "andalucia");
    assert_eq!(report.affordability.cost_factor.acquisition_tax_percent, dec!(7));
    assert_eq!(report.affordability.annual_interest_rate_percent, dec!(2.5));
}
