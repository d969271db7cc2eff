//! MCMA pack normalizer.
//!
//! Full shape: `{packs: {key: pack}, subscription_id, token}`; legacy shape is
//! the bare `packs` object. Packs are listed in [`MCMA_PACK_ORDER`]; unknown
//! keys and disabled packs are left out.

use super::{NormalizedResponse, PricingFactors, is_blank, rank, shape_of, text};
use crate::domain::catalog::{MCMA_PACK_ORDER, mcma_pack, plan_color};
use crate::domain::entities::plan::{CanonicalPlan, Guarantee, PlanPricing};
use crate::domain::entities::session::SessionHandle;
use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::providers::mcma::response::{ANNUAL_PRICE, SEMI_ANNUAL_PRICE, pack_block};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum McmaRaw {
    Full {
        packs: Map<String, Value>,
        #[serde(default)]
        subscription_id: Option<Value>,
        #[serde(default)]
        token: Option<String>,
    },
    Legacy(Map<String, Value>),
    Unrecognized(Value),
}

/// Normalizes an MCMA response body.
#[must_use]
pub fn normalize(body: &Value, factors: &PricingFactors) -> NormalizedResponse {
    let raw = McmaRaw::deserialize(body).unwrap_or_else(|_| McmaRaw::Unrecognized(body.clone()));
    match raw {
        McmaRaw::Full {
            packs,
            subscription_id,
            token,
        } => {
            let mut response = plans(&packs, factors);
            response.session = session(subscription_id.as_ref(), token);
            response
        }
        McmaRaw::Legacy(packs) => plans(&packs, factors),
        McmaRaw::Unrecognized(value) => {
            NormalizedResponse::unrecognized(format!(
                "MCMA response is an unexpected {}",
                shape_of(&value)
            ))
        }
    }
}

fn session(subscription_id: Option<&Value>, token: Option<String>) -> Option<SessionHandle> {
    let subscription_id = match subscription_id? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let token = token.filter(|t| !t.is_empty())?;
    Some(SessionHandle::token_pair(ProviderCode::Mcma, subscription_id, token))
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn privileges(pack: &Value) -> Vec<Guarantee> {
    pack.get("privileges")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|p| text(p, "title"))
                .map(|title| Guarantee::new(title, true))
                .collect()
        })
        .unwrap_or_default()
}

fn plans(packs: &Map<String, Value>, factors: &PricingFactors) -> NormalizedResponse {
    let mut response = NormalizedResponse::default();
    let mut known = 0usize;
    for (index, key) in MCMA_PACK_ORDER.iter().enumerate() {
        let Some(pack) = packs.get(*key) else {
            continue;
        };
        known += 1;
        if is_blank(pack) || pack.get("disabled").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }

        let annual = match pack_block(pack, ANNUAL_PRICE, factors.mcma_tax_rate) {
            Ok(Some(block)) => block,
            Ok(None) => {
                response.note(format!("{} has no annual price", key));
                continue;
            }
            Err(e) => {
                response.note(format!("{}: {}", key, e));
                continue;
            }
        };
        let semi_annual = pack_block(pack, SEMI_ANNUAL_PRICE, factors.mcma_tax_rate)
            .ok()
            .flatten();
        let pricing = match PlanPricing::with_fallback(
            annual,
            semi_annual,
            factors.semi_annual_ratio,
        ) {
            Ok(pricing) => pricing,
            Err(e) => {
                response.note(format!("{}: {}", key, e));
                continue;
            }
        };

        let name = text(pack, "title").unwrap_or_else(|| title_case(key));
        let code = text(pack, "key").unwrap_or_else(|| (*key).to_string());
        let fields = mcma_pack(key).map(|p| p.selectable_fields()).unwrap_or_default();
        response.plans.push(
            CanonicalPlan::new(ProviderCode::Mcma, code, name, pricing)
                .with_color(plan_color(ProviderCode::Mcma, index))
                .with_guarantees(privileges(pack))
                .with_selectable_fields(fields)
                .with_rank(rank(index)),
        );
    }
    if known == 0 {
        response.note("no known MCMA pack in response");
    }
    response
}
