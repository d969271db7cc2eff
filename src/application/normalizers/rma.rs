//! RMA offer normalizer.
//!
//! Full shape: `{annual, semi_annual}` offer lists. Offers come in two forms:
//!
//! - summary offers (`libelle`, `primeTotalTTC`, `points`), total only
//! - detailed offers (`primeAnnuelleHT`, `taxes`, `taxeParafiscal`,
//!   `primeAnnuelleTTC`, `garanties`, `eligible`)
//!
//! Legacy shape: a bare list of detailed offers; semi-annual pricing is derived.

use super::{NormalizedResponse, PricingFactors, amount, is_blank, rank, shape_of, text};
use crate::domain::catalog::plan_color;
use crate::domain::entities::plan::{CanonicalPlan, Guarantee, PlanPricing, PricingBlock};
use crate::domain::value_objects::arithmetic::{ArithmeticResult, CheckedArithmetic};
use crate::domain::value_objects::enums::ProviderCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RmaRaw {
    Full {
        annual: Vec<Value>,
        #[serde(default)]
        semi_annual: Option<Vec<Value>>,
    },
    Legacy(Vec<Value>),
    Unrecognized(Value),
}

/// Normalizes an RMA response body.
#[must_use]
pub fn normalize(body: &Value, factors: &PricingFactors) -> NormalizedResponse {
    let raw = RmaRaw::deserialize(body).unwrap_or_else(|_| RmaRaw::Unrecognized(body.clone()));
    match raw {
        RmaRaw::Full {
            annual,
            semi_annual,
        } => plans(&annual, semi_annual.as_deref().unwrap_or_default(), factors),
        RmaRaw::Legacy(offers) => plans(&offers, &[], factors),
        RmaRaw::Unrecognized(value) => {
            NormalizedResponse::unrecognized(format!(
                "RMA response is an unexpected {}",
                shape_of(&value)
            ))
        }
    }
}

fn is_summary(offer: &Value) -> bool {
    offer.get("points").is_some()
}

fn offer_block(offer: &Value) -> ArithmeticResult<Option<PricingBlock>> {
    if is_summary(offer) {
        return Ok(amount(offer, "primeTotalTTC").map(PricingBlock::total_only));
    }
    let net = amount(offer, "primeAnnuelleHT");
    let total = amount(offer, "primeAnnuelleTTC");
    let taxes = amount(offer, "taxes")
        .unwrap_or_default()
        .safe_add(amount(offer, "taxeParafiscal").unwrap_or_default())?;
    match (net, total) {
        (Some(net), Some(total)) => {
            PricingBlock::reconciled(net, taxes, Decimal::ZERO, total).map(Some)
        }
        (Some(net), None) => PricingBlock::itemized(net, taxes, Decimal::ZERO).map(Some),
        (None, Some(total)) => Ok(Some(PricingBlock::total_only(total))),
        (None, None) => Ok(None),
    }
}

fn guarantees(offer: &Value) -> Vec<Guarantee> {
    if let Some(points) = offer.get("points").and_then(Value::as_array) {
        return points
            .iter()
            .filter_map(Value::as_str)
            .filter(|p| !p.trim().is_empty())
            .map(|p| Guarantee::new(p.trim(), true))
            .collect();
    }
    offer
        .get("garanties")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter(|g| g.get("included").and_then(Value::as_bool).unwrap_or(false))
                .filter_map(|g| text(g, "libelle"))
                .map(|name| Guarantee::new(name, true))
                .collect()
        })
        .unwrap_or_default()
}

fn plan_code(offer: &Value, index: usize) -> String {
    if is_summary(offer) {
        return format!("rma_{}", index);
    }
    match offer.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => index.to_string(),
    }
}

fn plans(annual: &[Value], semi_annual: &[Value], factors: &PricingFactors) -> NormalizedResponse {
    let mut response = NormalizedResponse::default();
    for (index, offer) in annual.iter().enumerate() {
        if is_blank(offer) {
            continue;
        }
        let name = text(offer, "libelle").unwrap_or_else(|| format!("Plan {}", index + 1));
        let annual_block = match offer_block(offer) {
            Ok(Some(block)) => block,
            Ok(None) => {
                response.note(format!("{} has no premium", name));
                continue;
            }
            Err(e) => {
                response.note(format!("{}: {}", name, e));
                continue;
            }
        };
        let semi_block = semi_annual
            .get(index)
            .filter(|o| !is_blank(o))
            .and_then(|o| offer_block(o).ok().flatten());
        let pricing = match PlanPricing::with_fallback(
            annual_block,
            semi_block,
            factors.semi_annual_ratio,
        ) {
            Ok(pricing) => pricing,
            Err(e) => {
                response.note(format!("{}: {}", name, e));
                continue;
            }
        };

        let eligible = offer.get("eligible").and_then(Value::as_bool).unwrap_or(true);
        response.plans.push(
            CanonicalPlan::new(ProviderCode::Rma, plan_code(offer, index), name, pricing)
                .with_color(plan_color(ProviderCode::Rma, index))
                .with_guarantees(guarantees(offer))
                .with_eligible(eligible)
                .with_rank(rank(index)),
        );
    }
    response
}
