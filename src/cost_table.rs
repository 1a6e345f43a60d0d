//! Region and property-state acquisition costs.
//!
//! The table is static configuration: it is loaded once from a versioned data
//! set and never mutated, so a single instance can be shared across threads
//! behind an `Arc` without locking.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AffordabilityError, Result};
use crate::money::Money;

const EMBEDDED_TABLE: &str = include_str!("../data/cost_table_es.json");

/// Whether the home is a new build or a resale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyState {
    #[default]
    New,
    SecondHand,
}

impl PropertyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyState::New => "NEW",
            PropertyState::SecondHand => "SECOND_HAND",
        }
    }
}

impl fmt::Display for PropertyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyState {
    type Err = AffordabilityError;

    fn from_str(token: &str) -> Result<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(PropertyState::New),
            "second_hand" | "second-hand" | "secondhand" | "used" => Ok(PropertyState::SecondHand),
            _ => Err(AffordabilityError::UnknownPropertyState(token.to_string())),
        }
    }
}

/// Acquisition costs for one (region, property state) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostFactor {
    /// Tax on the purchase as a percentage (10.0 = 10%).
    pub acquisition_tax_percent: Decimal,
    /// Notary, registry, agency and appraisal fees.
    pub fixed_fees_estimate: Money,
}

impl CostFactor {
    pub const NONE: CostFactor = CostFactor {
        acquisition_tax_percent: Decimal::ZERO,
        fixed_fees_estimate: Money::ZERO,
    };

    pub fn new(acquisition_tax_percent: Decimal, fixed_fees_estimate: Money) -> Self {
        Self {
            acquisition_tax_percent,
            fixed_fees_estimate,
        }
    }

    /// Tax on `amount` (nearest minor unit) plus the fixed fees.
    pub fn estimate_costs(&self, amount: Money) -> Result<Money> {
        let tax = amount.mul_rate(self.acquisition_tax_percent / dec!(100))?;
        Ok(tax + self.fixed_fees_estimate)
    }

    fn validate(&self, region: &str, state: PropertyState) -> Result<()> {
        if self.acquisition_tax_percent < Decimal::ZERO || self.acquisition_tax_percent >= dec!(100)
        {
            return Err(AffordabilityError::InvalidCostTable(format!(
                "{region}/{state}: acquisition tax {}% outside [0, 100)",
                self.acquisition_tax_percent
            )));
        }
        if self.fixed_fees_estimate.is_negative() {
            return Err(AffordabilityError::InvalidCostTable(format!(
                "{region}/{state}: negative fixed fees {}",
                self.fixed_fees_estimate
            )));
        }
        Ok(())
    }
}

/// Both property states are required per region, so a lookup with a known
/// region always resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionCosts {
    new: CostFactor,
    second_hand: CostFactor,
}

impl RegionCosts {
    fn get(&self, state: PropertyState) -> CostFactor {
        match state {
            PropertyState::New => self.new,
            PropertyState::SecondHand => self.second_hand,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CostTableData {
    version: String,
    currency: String,
    regions: BTreeMap<String, RegionCosts>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    version: String,
    currency: String,
    regions: BTreeMap<String, RegionCosts>,
}

fn region_key(region: &str) -> String {
    region.trim().to_lowercase()
}

impl CostTable {
    /// An empty table; add regions with [`CostTable::with_region`].
    pub fn new(version: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            currency: currency.into(),
            regions: BTreeMap::new(),
        }
    }

    /// The Spanish data set shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_TABLE)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let data: CostTableData = serde_json::from_str(raw)
            .map_err(|e| AffordabilityError::InvalidCostTable(e.to_string()))?;

        if data.regions.is_empty() {
            return Err(AffordabilityError::InvalidCostTable(
                "table defines no regions".into(),
            ));
        }

        let mut table = Self::new(data.version, data.currency);
        for (region, costs) in data.regions {
            table = table.with_region(&region, costs.new, costs.second_hand)?;
        }

        debug!(
            version = %table.version,
            regions = table.regions.len(),
            "loaded cost table"
        );
        Ok(table)
    }

    pub fn with_region(
        mut self,
        region: &str,
        new: CostFactor,
        second_hand: CostFactor,
    ) -> Result<Self> {
        let key = region_key(region);
        if key.is_empty() {
            return Err(AffordabilityError::InvalidCostTable(
                "empty region key".into(),
            ));
        }
        new.validate(&key, PropertyState::New)?;
        second_hand.validate(&key, PropertyState::SecondHand)?;

        if self
            .regions
            .insert(key.clone(), RegionCosts { new, second_hand })
            .is_some()
        {
            return Err(AffordabilityError::InvalidCostTable(format!(
                "region '{key}' defined twice"
            )));
        }
        Ok(self)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Region keys are matched case-insensitively after trimming.
    pub fn resolve(&self, region: &str, state: PropertyState) -> Result<CostFactor> {
        self.regions
            .get(&region_key(region))
            .map(|costs| costs.get(state))
            .ok_or_else(|| AffordabilityError::UnknownRegion(region.to_string()))
    }

    /// Like [`CostTable::resolve`] but takes the property state as a raw token.
    pub fn resolve_token(&self, region: &str, state: &str) -> Result<CostFactor> {
        self.resolve(region, state.parse()?)
    }
}
