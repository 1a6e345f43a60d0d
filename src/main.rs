use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use es_affordability::{
    calculate_affordability, AffordabilityCalculator, AffordabilityPolicy, AffordabilityReport,
    CostTable, LoanInput, Money, PropertyState, DEFAULT_REGION,
};

const LOG_LEVEL_VAR: &str = "AFFORDABILITY_LOG_LEVEL";

#[derive(Parser, Debug)]
#[command(
    name = "affordability",
    about = "Work out the largest mortgage a household can afford and its repayment schedule",
    version
)]
struct Cli {
    /// Monthly net income after tax, e.g. 2000.00
    #[arg(long)]
    income: Decimal,
    /// Other monthly loan or card repayments
    #[arg(long, default_value = "0")]
    other_debt: Decimal,
    /// Annual interest rate in percent; leave out to use the policy default
    #[arg(long)]
    rate: Option<Decimal>,
    /// Loan term in years
    #[arg(long)]
    years: u32,
    /// Property state: new or second_hand
    #[arg(long, default_value = "new")]
    state: String,
    /// Region key in the cost table
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,
    /// JSON file overriding the lending policy
    #[arg(long)]
    policy: Option<PathBuf>,
    /// JSON file replacing the embedded cost table
    #[arg(long)]
    cost_table: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
    /// Print the month-by-month table with the summary
    #[arg(long)]
    schedule: bool,
    /// Log filter when RUST_LOG is unset (falls back to AFFORDABILITY_LOG_LEVEL, then "warn")
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    let calculator = build_calculator(cli.policy.as_deref(), cli.cost_table.as_deref())?;
    let input = loan_input(&cli)?;
    info!(region = %input.region, state = %input.property_state, "calculating affordability");

    let report = calculate_affordability(&calculator, &input)?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Summary => print_summary(&report, cli.schedule),
    }
    Ok(())
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = log_level
                .map(str::to_string)
                .or_else(|| env::var(LOG_LEVEL_VAR).ok())
                .unwrap_or_else(|| "warn".to_string());
            EnvFilter::try_new(&level)
                .with_context(|| format!("invalid log level/filter '{level}'"))?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("telemetry error: {err}"))
}

fn build_calculator(
    policy_path: Option<&Path>,
    cost_table_path: Option<&Path>,
) -> Result<AffordabilityCalculator> {
    let policy = match policy_path {
        Some(path) => AffordabilityPolicy::from_json_str(&read(path)?)
            .with_context(|| format!("loading policy from {}", path.display()))?,
        None => AffordabilityPolicy::default(),
    };

    let cost_table = match cost_table_path {
        Some(path) => CostTable::from_json_str(&read(path)?)
            .with_context(|| format!("loading cost table from {}", path.display()))?,
        None => CostTable::embedded()?,
    };

    Ok(AffordabilityCalculator::new(policy, Arc::new(cost_table))?)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn loan_input(cli: &Cli) -> Result<LoanInput> {
    let income = Money::try_from_decimal_exact(cli.income).context("--income")?;
    let other_debt = Money::try_from_decimal_exact(cli.other_debt).context("--other-debt")?;
    let state: PropertyState = cli.state.parse()?;

    let mut input = LoanInput::new(income, cli.years)
        .with_other_monthly_debt(other_debt)
        .with_property_state(state)
        .with_region(cli.region.clone());
    if let Some(rate) = cli.rate {
        input = input.with_annual_interest_rate_percent(rate);
    }
    Ok(input)
}

fn print_summary(report: &AffordabilityReport, with_schedule: bool) {
    let result = &report.affordability;

    if result.is_zero_affordability() {
        println!("No mortgage is affordable with this income and debt.");
    }
    println!("Max loan:            {}", result.max_loan_amount);
    println!("Monthly payment:     {}", result.monthly_payment);
    println!("Payment budget:      {}", result.max_monthly_payment);
    println!("Debt-to-income cap:  {}", result.debt_to_income_ratio_used);
    println!("Annual rate (%):     {}", result.annual_interest_rate_percent);
    println!("Acquisition costs:   {}", result.estimated_acquisition_costs);
    println!("Total paid:          {}", report.schedule.total_paid);
    println!("Total interest:      {}", report.schedule.total_interest);
    println!("Cost table:          {}", report.cost_table_version);

    if with_schedule && !report.schedule.is_empty() {
        println!();
        println!(
            "{:>6} {:>14} {:>14} {:>14} {:>16}",
            "month", "payment", "principal", "interest", "balance"
        );
        for entry in &report.schedule.entries {
            println!(
                "{:>6} {:>14} {:>14} {:>14} {:>16}",
                entry.period_index,
                entry.payment_amount.to_string(),
                entry.principal_component.to_string(),
                entry.interest_component.to_string(),
                entry.remaining_balance.to_string()
            );
        }
    }
}
