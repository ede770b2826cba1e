use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A non-negative monetary value.
///
/// Wrapper around `rust_decimal::Decimal` so totals and fees cannot go
/// negative and monetary arithmetic stays exact (no float rounding between
/// what the buyer confirmed and what the processor is asked to capture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, CheckoutError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CheckoutError::Validation(
                "amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CheckoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
