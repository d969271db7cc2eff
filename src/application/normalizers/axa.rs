//! AXA quotation normalizer.
//!
//! Full shape: `{annual, semi_annual, base_payload?, id_quotation?, id_lead?}`.
//! Legacy shape: a bare quotation list whose entries carry both cadences.

use super::{NormalizedResponse, PricingFactors, is_blank, rank, shape_of};
use crate::domain::catalog::{AXA_PACKS, axa_pack, plan_color};
use crate::domain::entities::plan::{CanonicalPlan, PlanPricing};
use crate::domain::entities::session::SessionHandle;
use crate::domain::value_objects::enums::{BillingCadence, ProviderCode};
use crate::infrastructure::providers::axa::response::{id_text, pricing_block};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AxaRaw {
    Full {
        annual: Vec<Value>,
        #[serde(default)]
        semi_annual: Option<Vec<Value>>,
        #[serde(default)]
        base_payload: Option<Value>,
        #[serde(default)]
        id_quotation: Option<Value>,
        #[serde(default)]
        id_lead: Option<Value>,
    },
    Legacy(Vec<Value>),
    Unrecognized(Value),
}

/// Normalizes an AXA response body.
#[must_use]
pub fn normalize(body: &Value, factors: &PricingFactors) -> NormalizedResponse {
    let raw = AxaRaw::deserialize(body).unwrap_or_else(|_| AxaRaw::Unrecognized(body.clone()));
    match raw {
        AxaRaw::Full {
            annual,
            semi_annual,
            base_payload,
            id_quotation,
            id_lead,
        } => {
            let mut response = plans(&annual, semi_annual.as_deref().unwrap_or_default(), factors);
            response.session = session(base_payload, id_quotation.as_ref(), id_lead.as_ref());
            response
        }
        AxaRaw::Legacy(entries) => plans(&entries, &[], factors),
        AxaRaw::Unrecognized(value) => {
            NormalizedResponse::unrecognized(format!(
                "AXA response is an unexpected {}",
                shape_of(&value)
            ))
        }
    }
}

fn session(
    base_payload: Option<Value>,
    id_quotation: Option<&Value>,
    id_lead: Option<&Value>,
) -> Option<SessionHandle> {
    let base_payload = base_payload.filter(Value::is_object)?;
    let quotation_id = id_quotation.and_then(value_text)?;
    Some(SessionHandle::signed_quotation(
        ProviderCode::Axa,
        base_payload,
        quotation_id,
        id_lead.and_then(value_text),
    ))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pack id of the entry at `index`: the entry's own `idPack`, else the pack
/// at the same position in the catalog.
fn pack_id(entry: &Value, index: usize) -> u8 {
    id_text(entry, "idPack")
        .and_then(|id| id.parse().ok())
        .or_else(|| AXA_PACKS.get(index).map(|p| p.id))
        .unwrap_or_else(|| u8::try_from(index.saturating_add(2)).unwrap_or(u8::MAX))
}

fn plans(annual: &[Value], semi_annual: &[Value], factors: &PricingFactors) -> NormalizedResponse {
    let mut response = NormalizedResponse::default();
    for (index, entry) in annual.iter().enumerate() {
        if is_blank(entry) {
            continue;
        }
        let id = pack_id(entry, index);
        let annual_block = match pricing_block(entry, BillingCadence::Annual) {
            Ok(Some(block)) => block,
            Ok(None) => {
                response.note(format!("pack {} has no annual total", id));
                continue;
            }
            Err(e) => {
                response.note(format!("pack {}: {}", id, e));
                continue;
            }
        };

        let semi_entry = semi_annual.get(index).filter(|e| !is_blank(e)).unwrap_or(entry);
        let semi_block = pricing_block(semi_entry, BillingCadence::SemiAnnual)
            .ok()
            .flatten();
        let pricing = match PlanPricing::with_fallback(
            annual_block,
            semi_block,
            factors.semi_annual_ratio,
        ) {
            Ok(pricing) => pricing,
            Err(e) => {
                response.note(format!("pack {}: {}", id, e));
                continue;
            }
        };

        let pack = axa_pack(id);
        let name = pack.map_or_else(|| format!("Plan {}", index + 1), |p| p.name.to_string());
        let mut plan = CanonicalPlan::new(ProviderCode::Axa, id.to_string(), name, pricing)
            .with_color(plan_color(ProviderCode::Axa, index))
            .with_rank(rank(index));
        if let Some(pack) = pack {
            plan = plan
                .with_guarantees(pack.fixed_guarantees())
                .with_selectable_fields(pack.selectable_fields());
        }
        response.plans.push(plan);
    }
    response
}
