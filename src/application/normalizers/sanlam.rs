//! Sanlam formula normalizer.
//!
//! Full shape: `{annual, semi_annual}` lists of formula pricings.
//! Legacy shape: a bare formula list; semi-annual pricing is derived.
//!
//! A formula reports `primeHT` (net) and `priceTTC` (total); the difference
//! is taxes.

use super::{NormalizedResponse, PricingFactors, amount, is_blank, rank, shape_of, text};
use crate::domain::catalog::plan_color;
use crate::domain::entities::plan::{CanonicalPlan, Guarantee, PlanPricing, PricingBlock};
use crate::domain::value_objects::arithmetic::{ArithmeticResult, CheckedArithmetic};
use crate::domain::value_objects::enums::ProviderCode;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SanlamRaw {
    Full {
        annual: Vec<Value>,
        #[serde(default)]
        semi_annual: Option<Vec<Value>>,
    },
    Legacy(Vec<Value>),
    Unrecognized(Value),
}

/// Normalizes a Sanlam response body.
#[must_use]
pub fn normalize(body: &Value, factors: &PricingFactors) -> NormalizedResponse {
    let raw =
        SanlamRaw::deserialize(body).unwrap_or_else(|_| SanlamRaw::Unrecognized(body.clone()));
    match raw {
        SanlamRaw::Full {
            annual,
            semi_annual,
        } => plans(&annual, semi_annual.as_deref().unwrap_or_default(), factors),
        SanlamRaw::Legacy(formulas) => plans(&formulas, &[], factors),
        SanlamRaw::Unrecognized(value) => NormalizedResponse::unrecognized(format!(
            "Sanlam response is an unexpected {}",
            shape_of(&value)
        )),
    }
}

fn formula_block(formula: &Value) -> ArithmeticResult<Option<PricingBlock>> {
    let Some(total) = amount(formula, "priceTTC") else {
        return Ok(None);
    };
    match amount(formula, "primeHT") {
        Some(net) => {
            let taxes = total.safe_sub(net)?;
            PricingBlock::itemized(net, taxes, rust_decimal::Decimal::ZERO).map(Some)
        }
        None => Ok(Some(PricingBlock::total_only(total))),
    }
}

fn coverages(formula: &Value) -> Vec<Guarantee> {
    formula
        .get("coverages")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|c| {
                    let name = text(c, "coverageName")?;
                    let included = c.get("checked").and_then(Value::as_bool).unwrap_or(false);
                    let guarantee = Guarantee::new(name, included);
                    Some(match text(c, "coverageCode") {
                        Some(code) => guarantee.with_code(code),
                        None => guarantee,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Entries at the same index describe one formula unless both are named differently.
fn same_formula(annual: &Value, semi_annual: &Value) -> bool {
    match (text(annual, "name"), text(semi_annual, "name")) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

fn plans(annual: &[Value], semi_annual: &[Value], factors: &PricingFactors) -> NormalizedResponse {
    let mut response = NormalizedResponse::default();
    for (index, formula) in annual.iter().enumerate() {
        if is_blank(formula) {
            continue;
        }
        let name = text(formula, "name").unwrap_or_else(|| format!("Formule {}", index + 1));
        let annual_block = match formula_block(formula) {
            Ok(Some(block)) => block,
            Ok(None) => {
                response.note(format!("{} has no total", name));
                continue;
            }
            Err(e) => {
                response.note(format!("{}: {}", name, e));
                continue;
            }
        };
        let semi_block = semi_annual
            .get(index)
            .filter(|f| !is_blank(f) && same_formula(formula, f))
            .and_then(|f| formula_block(f).ok().flatten());
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

        let code = text(formula, "code").unwrap_or_else(|| format!("sanlam_{}", index));
        response.plans.push(
            CanonicalPlan::new(ProviderCode::Sanlam, code, name, pricing)
                .with_color(plan_color(ProviderCode::Sanlam, index))
                .with_guarantees(coverages(formula))
                .with_rank(rank(index)),
        );
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn formula(name: &str, net: f64, total: f64) -> Value {
        json!({
            "name": name,
            "primeHT": net,
            "priceTTC": total,
            "coverages": [
                {"coverageName": "Responsabilité civile", "checked": true},
                {"coverageName": "Vol", "checked": false},
                {"checked": true}
            ]
        })
    }

    #[test]
    fn full_shape_pairs_cadences_by_position() {
        let body = json!({
            "annual": [
                formula("Tiers", 1000.0, 1145.5),
                formula("Tous risques", 5000.0, 5700.0)
            ],
            "semi_annual": [formula("Tiers", 520.0, 600.0)]
        });
        let response = normalize(&body, &PricingFactors::default());
        assert_eq!(response.plans.len(), 2);

        let tiers = response.plans.first().unwrap();
        assert_eq!(tiers.plan_code, "sanlam_0");
        assert_eq!(tiers.pricing.annual.taxes(), Decimal::new(14550, 2));
        assert_eq!(tiers.pricing.semi_annual.total(), Decimal::from(600));
        assert_eq!(tiers.guarantees.len(), 2);
        assert!(tiers.guarantees.first().unwrap().included);

        let all_risk = response.plans.get(1).unwrap();
        assert_eq!(all_risk.pricing.semi_annual.total(), Decimal::from(2964));
        assert!(response.plans.iter().all(CanonicalPlan::is_consistent));
    }

    #[test]
    fn null_semi_annual_slot_falls_back_to_ratio() {
        let body = json!({
            "annual": [
                formula("Tiers", 1000.0, 1200.0),
                formula("Intermediaire", 2000.0, 2400.0),
                formula("Tous risques", 5000.0, 6000.0)
            ],
            "semi_annual": [
                formula("Tiers", 520.0, 624.0),
                null,
                formula("Tous risques", 2600.0, 3120.0)
            ]
        });
        let response = normalize(&body, &PricingFactors::default());
        let totals: Vec<Decimal> =
            response.plans.iter().map(|p| p.pricing.semi_annual.total()).collect();
        assert_eq!(totals, vec![Decimal::from(624), Decimal::from(1248), Decimal::from(3120)]);
    }

    #[test]
    fn shifted_semi_annual_entry_is_not_borrowed() {
        let body = json!({
            "annual": [
                formula("Tiers", 1000.0, 1200.0),
                formula("Intermediaire", 2000.0, 2400.0)
            ],
            "semi_annual": [formula("Intermediaire", 1000.0, 1300.0)]
        });
        let response = normalize(&body, &PricingFactors::default());
        let tiers = response.plans.first().unwrap();
        assert_eq!(tiers.pricing.semi_annual.total(), Decimal::from(624));
    }

    #[test]
    fn legacy_list_derives_semi_annual() {
        let response =
            normalize(&json!([formula("Tiers", 1000.0, 1200.0)]), &PricingFactors::default());
        let plan = response.plans.first().unwrap();
        assert_eq!(plan.pricing.semi_annual.total(), Decimal::from(624));
        assert_eq!(plan.pricing.semi_annual.net_premium(), Decimal::from(520));
        assert_eq!(plan.pricing.semi_annual.taxes(), Decimal::from(104));
    }

    #[test]
    fn custom_ratio() {
        let factors = PricingFactors::default().with_semi_annual_ratio(Decimal::new(5, 1));
        let response = normalize(&json!([formula("Tiers", 1000.0, 1200.0)]), &factors);
        let plan = response.plans.first().unwrap();
        assert_eq!(plan.pricing.semi_annual.total(), Decimal::from(600));
    }

    #[test]
    fn skips_blank_and_unpriced_formulas() {
        let body = json!({"annual": [null, {"name": "Broken"}, formula("Tiers", 1.0, 2.0)]});
        let response = normalize(&body, &PricingFactors::default());
        assert_eq!(response.plans.len(), 1);
        assert_eq!(response.plans.first().unwrap().rank, 3);
        assert!(response.issue.unwrap().contains("Broken"));
    }

    #[test]
    fn unrecognized_number() {
        let response = normalize(&json!(42), &PricingFactors::default());
        assert!(response.plans.is_empty());
        assert!(response.issue.unwrap().contains("number"));
    }
}
