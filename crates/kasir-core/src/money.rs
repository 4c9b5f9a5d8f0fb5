//! # Money Module
//!
//! Provides the `Price` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + explicit scale                    │
//! │    amount=1099, scale=2, currency="USD"  → 10.99 USD                   │
//! │    amount=15000, scale=0, currency="IDR" → 15000 IDR                   │
//! │                                                                         │
//! │  `display` is derived for clients and is never read back.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Currency;
//!
//! let idr = Currency::default();
//! let unit = idr.price(15_000);
//! let line = unit.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line.amount, 45_000);
//! assert_eq!(line.display, 45_000.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Currency every price is expressed in unless configured otherwise.
pub const DEFAULT_CURRENCY: &str = "IDR";

/// Minor-unit scale of [`DEFAULT_CURRENCY`] (rupiah has no minor unit).
pub const DEFAULT_SCALE: u32 = 0;

// =============================================================================
// Currency
// =============================================================================

/// A currency code together with its minor-unit scale.
///
/// The system runs with a single configured currency; every product price,
/// line total and report total is produced through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency {
    code: String,
    scale: u32,
}

impl Currency {
    /// Creates a currency from an ISO-4217 style code and its scale.
    pub fn new(code: impl Into<String>, scale: u32) -> Self {
        Currency {
            code: code.into(),
            scale,
        }
    }

    /// Currency code, e.g. `IDR`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Number of decimal places in the minor unit.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Builds a price in this currency from a minor-unit amount.
    pub fn price(&self, amount: i64) -> Price {
        Price::new(amount, self.scale, self.code.clone())
    }

    /// Zero in this currency.
    pub fn zero(&self) -> Price {
        self.price(0)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::new(DEFAULT_CURRENCY, DEFAULT_SCALE)
    }
}

// =============================================================================
// Price
// =============================================================================

/// A monetary value as it appears on the wire.
///
/// ## Fields
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  amount    i64   minor units, the only value arithmetic touches        │
/// │  scale     u32   decimal places: display = amount / 10^scale           │
/// │  display   f64   derived, for rendering only                           │
/// │  currency  str   currency code                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Price {
    pub amount: i64,
    pub scale: u32,
    pub display: f64,
    pub currency: String,
}

impl Price {
    /// Creates a price, deriving `display` from `amount` and `scale`.
    pub fn new(amount: i64, scale: u32, currency: impl Into<String>) -> Self {
        Price {
            amount,
            scale,
            display: display_value(amount, scale),
            currency: currency.into(),
        }
    }

    /// Multiplies the price by a quantity.
    ///
    /// ## Returns
    /// `None` if the result does not fit in an i64.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Price;
    ///
    /// let unit = Price::new(1000, 0, "IDR");
    /// assert_eq!(unit.checked_multiply_quantity(2).unwrap().amount, 2000);
    /// assert!(unit.checked_multiply_quantity(i64::MAX).is_none());
    /// ```
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Price> {
        let amount = self.amount.checked_mul(qty)?;
        Some(Price::new(amount, self.scale, self.currency.clone()))
    }

    /// Adds two prices of the same currency and scale.
    ///
    /// ## Returns
    /// `None` on overflow or if currency/scale differ.
    pub fn checked_add(&self, other: &Price) -> Option<Price> {
        if self.scale != other.scale || self.currency != other.currency {
            return None;
        }
        let amount = self.amount.checked_add(other.amount)?;
        Some(Price::new(amount, self.scale, self.currency.clone()))
    }

    /// Checks if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

fn display_value(amount: i64, scale: u32) -> f64 {
    amount as f64 / 10f64.powi(scale as i32)
}

/// Display shows the amount with its scale applied, followed by the code.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.*} {}",
            self.scale as usize, self.display, self.currency
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
