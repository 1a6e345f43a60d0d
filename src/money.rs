//! Fixed-point currency.
//!
//! Every amount is an integer count of minor units (cents). Conversions from
//! [`Decimal`] happen only at the edges of a calculation and always name their
//! rounding rule.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AffordabilityError, Result};

/// Decimal places carried by [`Money`].
pub const MINOR_UNIT_SCALE: u32 = 2;

const MINOR_PER_MAJOR: i64 = 100;

/// A monetary amount stored as minor units.
///
/// The range is that of `i64` minor units. The operator impls follow plain
/// `i64` overflow rules; use [`Money::checked_add`] and [`Money::checked_sub`]
/// where an operand comes straight from caller input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Exact decimal view of this amount, always with two decimal places.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// Converts a decimal amount, rounding to the nearest minor unit with
    /// ties away from zero.
    pub fn from_decimal_rounded(amount: Decimal) -> Result<Self> {
        Self::from_decimal_with(amount, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Converts a decimal amount, dropping any fraction of a minor unit.
    pub fn from_decimal_truncated(amount: Decimal) -> Result<Self> {
        Self::from_decimal_with(amount, RoundingStrategy::ToZero)
    }

    /// Converts a decimal amount that must already be representable in minor
    /// units. `12.345` is rejected rather than rounded.
    pub fn try_from_decimal_exact(amount: Decimal) -> Result<Self> {
        if amount.normalize().scale() > MINOR_UNIT_SCALE {
            return Err(AffordabilityError::invalid_input(
                "amount",
                format!("{amount} has more than {MINOR_UNIT_SCALE} decimal places"),
            ));
        }
        Self::from_decimal_with(amount, RoundingStrategy::ToZero)
    }

    fn from_decimal_with(amount: Decimal, strategy: RoundingStrategy) -> Result<Self> {
        amount
            .round_dp_with_strategy(MINOR_UNIT_SCALE, strategy)
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|minor| minor.to_i64())
            .map(Money)
            .ok_or_else(|| {
                AffordabilityError::degenerate(format!("{amount} does not fit in minor units"))
            })
    }

    /// Multiplies by a decimal rate and rounds to the nearest minor unit,
    /// ties away from zero.
    pub fn mul_rate(&self, rate: Decimal) -> Result<Self> {
        let product = self.to_decimal().checked_mul(rate).ok_or_else(|| {
            AffordabilityError::degenerate(format!("{self} x {rate} overflows"))
        })?;
        Self::from_decimal_rounded(product)
    }

    /// Splits the amount into `parts` buckets that sum back to it exactly.
    /// The remainder goes one minor unit at a time to the earliest buckets.
    pub fn split_evenly(&self, parts: u32) -> Result<Vec<Money>> {
        if parts == 0 {
            return Err(AffordabilityError::degenerate(
                "splitting an amount into zero parts",
            ));
        }
        let divisor = i64::from(parts);
        let base = self.0 / divisor;
        let remainder = self.0 % divisor;
        let extra = remainder.signum();
        let boosted = remainder.unsigned_abs();

        Ok((0..u64::from(parts))
            .map(|i| {
                if i < boosted {
                    Money(base + extra)
                } else {
                    Money(base)
                }
            })
            .collect())
    }

    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0.checked_add(other.0).map(Money).ok_or_else(|| {
            AffordabilityError::degenerate(format!("{self} + {other} overflows"))
        })
    }

    pub fn checked_sub(self, other: Self) -> Result<Self> {
        self.0.checked_sub(other.0).map(Money).ok_or_else(|| {
            AffordabilityError::degenerate(format!("{self} - {other} overflows"))
        })
    }

    /// Rounds down to a whole major unit (toward negative infinity).
    pub const fn floor_to_major(&self) -> Self {
        Money(self.0.div_euclid(MINOR_PER_MAJOR) * MINOR_PER_MAJOR)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per_major, abs % per_major)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Serialize::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::try_from_decimal_exact(amount).map_err(serde::de::Error::custom)
    }
}
