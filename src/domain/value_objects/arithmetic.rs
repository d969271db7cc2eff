//! # Money Arithmetic
//!
//! Checked decimal arithmetic and rounding rules for premium amounts.
//!
//! This module provides:
//! - [`ArithmeticError`] - Error type for arithmetic failures
//! - [`CheckedArithmetic`] - Trait for safe arithmetic operations
//! - [`round_money`] - Half-away-from-zero rounding to two decimal places
//! - [`apply_rate`] - Multiply an amount by a factor and round the result
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::domain::value_objects::arithmetic::{apply_rate, round_money};
//! use rust_decimal::Decimal;
//!
//! let annual = Decimal::new(100_000, 2); // 1000.00
//! let ratio = Decimal::new(52, 2); // 0.52
//! assert_eq!(apply_rate(annual, ratio).unwrap(), Decimal::new(52_000, 2));
//! assert_eq!(round_money(Decimal::new(12_345, 3)), Decimal::new(1_235, 2));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of decimal places kept on every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Maximum accepted drift between a total and the sum of its components.
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Error type for arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Arithmetic operation resulted in overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic operation resulted in underflow.
    #[error("arithmetic underflow")]
    Underflow,
}

/// Result type for arithmetic operations.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Trait for checked arithmetic operations.
///
/// Provides safe arithmetic methods that return `Result` instead of
/// panicking on overflow.
pub trait CheckedArithmetic: Sized {
    /// Safely add two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely subtract two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Underflow` if the result would underflow.
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self>;

    /// Safely multiply two values.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the result would overflow.
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self>;
}

impl CheckedArithmetic for Decimal {
    #[inline]
    fn safe_add(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_add(rhs).ok_or(ArithmeticError::Overflow)
    }

    #[inline]
    fn safe_sub(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_sub(rhs).ok_or(ArithmeticError::Underflow)
    }

    #[inline]
    fn safe_mul(self, rhs: Self) -> ArithmeticResult<Self> {
        self.checked_mul(rhs).ok_or(ArithmeticError::Overflow)
    }
}

/// Rounds a monetary amount to two decimal places, half away from zero.
#[inline]
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Multiplies `amount` by `rate` and rounds the product with [`round_money`].
///
/// # Errors
///
/// Returns `ArithmeticError::Overflow` if the product does not fit a `Decimal`.
#[inline]
pub fn apply_rate(amount: Decimal, rate: Decimal) -> ArithmeticResult<Decimal> {
    amount.safe_mul(rate).map(round_money)
}

/// Returns true if `lhs` and `rhs` differ by at most [`MONEY_TOLERANCE`].
#[inline]
#[must_use]
pub fn within_tolerance(lhs: Decimal, rhs: Decimal) -> bool {
    (lhs - rhs).abs() <= MONEY_TOLERANCE
}

/// Converts a JSON number or numeric text into a `Decimal`.
///
/// Floats are converted through their shortest decimal representation so
/// `1234.56` stays exact. Text may use a decimal comma and space-separated
/// thousands (`"1 200,50"`), including non-breaking spaces.
#[must_use]
pub fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.to_string().parse::<Decimal>().ok().or_else(|| {
                    n.as_f64()
                        .and_then(|f| Decimal::from_f64_retain(f).map(round_money))
                })
            }
        }
        serde_json::Value::String(s) => {
            let digits: String = s
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            digits.parse::<Decimal>().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    mod arithmetic_error {
        use super::*;

        #[test]
        fn display_formats_correctly() {
            assert_eq!(ArithmeticError::Overflow.to_string(), "arithmetic overflow");
            assert_eq!(ArithmeticError::Underflow.to_string(), "arithmetic underflow");
        }
    }

    mod rounding {
        use super::*;

        #[test]
        fn rounds_half_away_from_zero() {
            assert_eq!(round_money(Decimal::new(1_005, 3)), Decimal::new(101, 2));
            assert_eq!(round_money(Decimal::new(-1_005, 3)), Decimal::new(-101, 2));
            assert_eq!(round_money(Decimal::new(1_004, 3)), Decimal::new(100, 2));
        }

        #[test]
        fn apply_rate_rounds_product() {
            // 1234.57 * 0.52 = 641.9764
            let result = apply_rate(Decimal::new(123_457, 2), Decimal::new(52, 2)).unwrap();
            assert_eq!(result, Decimal::new(64_198, 2));
        }

        #[test]
        fn tolerance_is_one_cent() {
            assert!(within_tolerance(Decimal::new(1000, 2), Decimal::new(1001, 2)));
            assert!(!within_tolerance(Decimal::new(1000, 2), Decimal::new(1002, 2)));
        }
    }

    mod checked_arithmetic_decimal {
        use super::*;

        #[test]
        fn safe_ops_work() {
            let a = Decimal::new(100, 0);
            let b = Decimal::new(50, 0);
            assert_eq!(a.safe_add(b).unwrap(), Decimal::new(150, 0));
            assert_eq!(a.safe_sub(b).unwrap(), Decimal::new(50, 0));
            assert_eq!(a.safe_mul(b).unwrap(), Decimal::new(5000, 0));
        }

        #[test]
        fn safe_mul_overflow_fails() {
            assert_eq!(
                Decimal::MAX.safe_mul(Decimal::TWO),
                Err(ArithmeticError::Overflow)
            );
        }
    }

    mod json_amounts {
        use super::*;

        #[test]
        fn parses_numbers_and_strings() {
            assert_eq!(decimal_from_json(&json!(1200)), Some(Decimal::new(1200, 0)));
            assert_eq!(
                decimal_from_json(&json!(1234.56)),
                Some(Decimal::new(123_456, 2))
            );
            assert_eq!(
                decimal_from_json(&json!("99,90")),
                Some(Decimal::new(9990, 2))
            );
            assert_eq!(
                decimal_from_json(&json!("1 200,50")),
                Some(Decimal::new(120_050, 2))
            );
            assert_eq!(
                decimal_from_json(&json!("2\u{a0}450")),
                Some(Decimal::new(2450, 0))
            );
            assert_eq!(decimal_from_json(&json!(null)), None);
            assert_eq!(decimal_from_json(&json!("n/a")), None);
        }
    }

    proptest! {
        #[test]
        fn rounded_amounts_have_two_decimals(cents in 0i64..100_000_000, extra in 0i64..1000) {
            let amount = Decimal::new(cents * 1000 + extra, 5);
            let rounded = round_money(amount);
            prop_assert!(rounded.scale() <= MONEY_SCALE);
            prop_assert!((rounded - amount).abs() <= Decimal::new(5, 3));
        }
    }
}
