//! Reading MCMA pack prices.
//!
//! Packs only report a base (net) price per cadence; taxes are computed at the
//! configured rate.

use crate::domain::entities::plan::PricingBlock;
use crate::domain::value_objects::arithmetic::{ArithmeticResult, apply_rate, decimal_from_json};
use rust_decimal::Decimal;
use serde_json::Value;

/// Field carrying the twelve month base price.
pub const ANNUAL_PRICE: &str = "annualBasePrice";
/// Field carrying the six month base price.
pub const SEMI_ANNUAL_PRICE: &str = "semiAnnualBasePrice";

/// Builds a block from a net price, adding taxes at `tax_rate`.
///
/// # Errors
///
/// Returns an arithmetic error if the amounts overflow.
pub fn taxed_block(net: Decimal, tax_rate: Decimal) -> ArithmeticResult<PricingBlock> {
    let taxes = apply_rate(net, tax_rate)?;
    PricingBlock::itemized(net, taxes, Decimal::ZERO)
}

/// Reads `field` of a pack as a taxed block; `Ok(None)` when absent.
///
/// # Errors
///
/// Returns an arithmetic error if the amounts overflow.
pub fn pack_block(
    pack: &Value,
    field: &str,
    tax_rate: Decimal,
) -> ArithmeticResult<Option<PricingBlock>> {
    pack.get(field)
        .and_then(decimal_from_json)
        .map(|net| taxed_block(net, tax_rate))
        .transpose()
}
