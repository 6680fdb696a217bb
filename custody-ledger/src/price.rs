//! Fixed-point price representation
//!
//! Prices are integers scaled by a fixed number of decimal places. All
//! arithmetic on prices is exact integer addition; floating point never
//! enters the custody chain, so a long chain accumulates no rounding drift.
//! Human-facing conversion goes through [`PriceUnit`], which is pure and
//! stateless.

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default decimal scale (matches common fixed-point conventions)
pub const DEFAULT_PRICE_DECIMALS: u32 = 18;

/// Maximum supported decimal scale
pub const MAX_PRICE_DECIMALS: u32 = 28;

/// A price as a scaled integer
///
/// The scale is carried by the ledger's [`PriceUnit`], not by each value;
/// every price in one ledger shares the same scale. Negative amounts are
/// unrepresentable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Price(u128);

impl Price {
    /// Zero price
    pub const ZERO: Price = Price(0);

    /// Create from a raw scaled integer
    pub fn from_scaled(raw: u128) -> Self {
        Self(raw)
    }

    /// Get the raw scaled integer
    pub fn as_scaled(self) -> u128 {
        self.0
    }

    /// Exact addition, `None` on overflow
    pub fn checked_add(self, other: Price) -> Option<Price> {
        self.0.checked_add(other.0).map(Price)
    }

    /// Saturating addition (aggregate accounting)
    pub fn saturating_add(self, other: Price) -> Price {
        Price(self.0.saturating_add(other.0))
    }

    /// True if the price is zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Converter between human decimal amounts and scaled prices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUnit {
    decimals: u32,
}

impl PriceUnit {
    /// Create a converter with the given decimal scale
    pub fn new(decimals: u32) -> Result<Self> {
        if decimals > MAX_PRICE_DECIMALS {
            return Err(Error::InvalidArgument(format!(
                "price scale {} exceeds maximum {}",
                decimals, MAX_PRICE_DECIMALS
            )));
        }
        Ok(Self { decimals })
    }

    /// Decimal scale of this unit
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Convert a human decimal amount to a scaled price
    ///
    /// Rejects negative amounts, amounts with more fractional digits than
    /// the scale, and amounts whose scaled value overflows.
    pub fn to_scaled(&self, human: Decimal) -> Result<Price> {
        if human.is_sign_negative() {
            return Err(Error::InvalidArgument(format!(
                "amount must not be negative: {}",
                human
            )));
        }

        let human = human.normalize();
        let scale = human.scale();
        if scale > self.decimals {
            return Err(Error::InvalidArgument(format!(
                "amount {} has more than {} fractional digits",
                human, self.decimals
            )));
        }

        let factor = 10u128.pow(self.decimals - scale);
        let mantissa = human.mantissa() as u128;
        let raw = mantissa
            .checked_mul(factor)
            .ok_or_else(|| Error::InvalidArgument(format!("amount too large: {}", human)))?;

        Ok(Price::from_scaled(raw))
    }

    /// Format a scaled price as a decimal string
    ///
    /// Trailing fractional zeros are trimmed; whole amounts print without a
    /// decimal point.
    pub fn to_human(&self, price: Price) -> String {
        let raw = price.as_scaled();
        if self.decimals == 0 {
            return raw.to_string();
        }

        let base = 10u128.pow(self.decimals);
        let whole = raw / base;
        let frac = raw % base;
        if frac == 0 {
            return whole.to_string();
        }

        let mut frac_str = format!("{:0width$}", frac, width = self.decimals as usize);
        while frac_str.ends_with('0') {
            frac_str.pop();
        }
        format!("{}.{}", whole, frac_str)
    }
}

impl Default for PriceUnit {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_PRICE_DECIMALS,
        }
    }
}
