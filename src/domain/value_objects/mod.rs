//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`ComparisonId`], [`JobId`]: UUID-based identifiers
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`CheckedArithmetic`]: Trait for safe arithmetic operations
//! - [`round_money`]: Two-decimal rounding applied to every amount
//!
//! ## Domain Enums
//!
//! - [`ProviderCode`]: Upstream insurers
//! - [`BillingCadence`]: Annual or semi-annual billing
//! - [`FuelType`], [`PlateType`]: Canonical vehicle enumerations

pub mod arithmetic;
pub mod enums;
pub mod ids;

pub use arithmetic::{
    ArithmeticError, ArithmeticResult, CheckedArithmetic, apply_rate, round_money,
    within_tolerance,
};
pub use enums::{BillingCadence, FuelType, ParseEnumError, PlateType, ProviderCode};
pub use ids::{ComparisonId, JobId};
