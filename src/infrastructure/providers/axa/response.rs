//! Reading AXA quotation entries.
//!
//! A quotation entry carries both cadences side by side: `*Annuel` fields for
//! twelve months and `*Comptant` fields for the six month cash payment.

use crate::domain::entities::plan::PricingBlock;
use crate::domain::value_objects::arithmetic::{
    ArithmeticResult, CheckedArithmetic, decimal_from_json,
};
use crate::domain::value_objects::enums::BillingCadence;
use rust_decimal::Decimal;
use serde_json::Value;

fn suffix(cadence: BillingCadence) -> &'static str {
    match cadence {
        BillingCadence::Annual => "Annuel",
        BillingCadence::SemiAnnual => "Comptant",
    }
}

fn amount(entry: &Value, field: &str, cadence: BillingCadence) -> Option<Decimal> {
    entry
        .get(format!("{}{}", field, suffix(cadence)))
        .and_then(decimal_from_json)
}

/// Reads the pricing block of `cadence` from a quotation entry.
///
/// Returns `Ok(None)` when the entry has no total for that cadence. The CNPAC
/// levy and the accessory fee both count as ancillary fees.
///
/// # Errors
///
/// Returns an arithmetic error if the amounts overflow.
pub fn pricing_block(
    entry: &Value,
    cadence: BillingCadence,
) -> ArithmeticResult<Option<PricingBlock>> {
    let Some(total) = amount(entry, "primeTotale", cadence) else {
        return Ok(None);
    };
    let Some(net) = amount(entry, "primeNet", cadence) else {
        return Ok(Some(PricingBlock::total_only(total)));
    };
    let taxes = amount(entry, "taxes", cadence).unwrap_or_default();
    let fees = amount(entry, "cnpac", cadence)
        .unwrap_or_default()
        .safe_add(amount(entry, "accessoire", cadence).unwrap_or_default())?;
    PricingBlock::reconciled(net, taxes, fees, total).map(Some)
}

/// Returns an id field as text, whether the upstream sent a number or a string.
#[must_use]
pub fn id_text(entry: &Value, field: &str) -> Option<String> {
    match entry.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Picks the entry for `pack_id` out of a quotation response.
///
/// Accepts a list of entries (matched on `idPack`, else the first) or a single
/// entry object.
#[must_use]
pub fn entry_for_pack(body: &Value, pack_id: u8) -> Option<&Value> {
    match body {
        Value::Array(entries) => entries
            .iter()
            .find(|e| id_text(e, "idPack").as_deref() == Some(pack_id.to_string().as_str()))
            .or_else(|| entries.first()),
        Value::Object(_) => Some(body),
        _ => None,
    }
}
