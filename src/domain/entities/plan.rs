//! # Canonical Plan
//!
//! The provider-neutral representation of one insurance offer.
//!
//! Every normalizer produces [`CanonicalPlan`] values. Prices are carried per
//! billing cadence in a [`PricingBlock`] whose total always equals the sum of
//! its components within one cent.
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::domain::entities::plan::{CanonicalPlan, PlanPricing, PricingBlock};
//! use motor_quote_aggregator::domain::value_objects::enums::ProviderCode;
//! use rust_decimal::Decimal;
//!
//! let annual = PricingBlock::itemized(
//!     Decimal::new(100_000, 2),
//!     Decimal::new(14_000, 2),
//!     Decimal::new(2_500, 2),
//! ).unwrap();
//! assert_eq!(annual.total(), Decimal::new(116_500, 2));
//!
//! let plan = CanonicalPlan::new(
//!     ProviderCode::Sanlam,
//!     "TIERS",
//!     "Tiers",
//!     PlanPricing::new(annual.clone(), annual),
//! );
//! assert!(plan.is_consistent());
//! ```

use crate::domain::entities::provider_info::ProviderInfo;
use crate::domain::value_objects::arithmetic::{
    ArithmeticResult, CheckedArithmetic, apply_rate, round_money, within_tolerance,
};
use crate::domain::value_objects::enums::{BillingCadence, ProviderCode};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Premium breakdown for one billing cadence.
///
/// # Invariants
///
/// - `total == net_premium + taxes + ancillary_fees` within 0.01
/// - All amounts are rounded to two decimal places
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PricingBlock {
    net_premium: Decimal,
    taxes: Decimal,
    ancillary_fees: Decimal,
    total: Decimal,
    itemized: bool,
}

impl PricingBlock {
    /// Builds an itemized block whose total is the sum of its components.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::Overflow` if the sum does not fit a `Decimal`.
    pub fn itemized(
        net_premium: Decimal,
        taxes: Decimal,
        ancillary_fees: Decimal,
    ) -> ArithmeticResult<Self> {
        let net_premium = round_money(net_premium);
        let taxes = round_money(taxes);
        let ancillary_fees = round_money(ancillary_fees);
        let total = net_premium.safe_add(taxes)?.safe_add(ancillary_fees)?;
        Ok(Self {
            net_premium,
            taxes,
            ancillary_fees,
            total,
            itemized: true,
        })
    }

    /// Builds an itemized block from upstream components and an upstream total.
    ///
    /// The upstream total is authoritative. When the components do not add up to
    /// it, the residual is folded into `ancillary_fees`.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if the components overflow.
    pub fn reconciled(
        net_premium: Decimal,
        taxes: Decimal,
        ancillary_fees: Decimal,
        total: Decimal,
    ) -> ArithmeticResult<Self> {
        let block = Self::itemized(net_premium, taxes, ancillary_fees)?;
        let total = round_money(total);
        if within_tolerance(block.total, total) {
            return Ok(Self { total, ..block });
        }
        let ancillary_fees = total.safe_sub(block.net_premium)?.safe_sub(block.taxes)?;
        Ok(Self {
            ancillary_fees,
            total,
            ..block
        })
    }

    /// Builds a block for an upstream that only reports a total.
    ///
    /// Represented as `net = total`, zero taxes and fees, `itemized = false`.
    #[must_use]
    pub fn total_only(total: Decimal) -> Self {
        let total = round_money(total);
        Self {
            net_premium: total,
            taxes: Decimal::ZERO,
            ancillary_fees: Decimal::ZERO,
            total,
            itemized: false,
        }
    }

    /// Derives another cadence's block by scaling this one by `ratio`.
    ///
    /// Net premium, fees and total are scaled and rounded; taxes take the
    /// residual so the derived block stays consistent.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if scaling overflows.
    pub fn scaled(&self, ratio: Decimal) -> ArithmeticResult<Self> {
        let total = apply_rate(self.total, ratio)?;
        if !self.itemized {
            return Ok(Self::total_only(total));
        }
        let net_premium = apply_rate(self.net_premium, ratio)?;
        let ancillary_fees = apply_rate(self.ancillary_fees, ratio)?;
        let taxes = total.safe_sub(net_premium)?.safe_sub(ancillary_fees)?;
        Ok(Self {
            net_premium,
            taxes,
            ancillary_fees,
            total,
            itemized: true,
        })
    }

    /// Returns the net premium.
    #[inline]
    #[must_use]
    pub fn net_premium(&self) -> Decimal {
        self.net_premium
    }

    /// Returns the taxes.
    #[inline]
    #[must_use]
    pub fn taxes(&self) -> Decimal {
        self.taxes
    }

    /// Returns the ancillary fees.
    #[inline]
    #[must_use]
    pub fn ancillary_fees(&self) -> Decimal {
        self.ancillary_fees
    }

    /// Returns the total premium.
    #[inline]
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Returns true if the upstream supplied a breakdown.
    #[inline]
    #[must_use]
    pub fn is_itemized(&self) -> bool {
        self.itemized
    }

    /// Returns true if the total matches the sum of the components within 0.01.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        within_tolerance(
            self.total,
            self.net_premium + self.taxes + self.ancillary_fees,
        )
    }
}

/// Pricing for both billing cadences of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlanPricing {
    /// Twelve month pricing.
    pub annual: PricingBlock,
    /// Six month pricing.
    pub semi_annual: PricingBlock,
}

impl PlanPricing {
    /// Creates pricing from both blocks.
    #[must_use]
    pub fn new(annual: PricingBlock, semi_annual: PricingBlock) -> Self {
        Self {
            annual,
            semi_annual,
        }
    }

    /// Creates pricing from an annual block, taking the semi-annual one when
    /// present and deriving it with `ratio` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if derivation overflows.
    pub fn with_fallback(
        annual: PricingBlock,
        semi_annual: Option<PricingBlock>,
        ratio: Decimal,
    ) -> ArithmeticResult<Self> {
        let semi_annual = match semi_annual {
            Some(block) => block,
            None => annual.scaled(ratio)?,
        };
        Ok(Self::new(annual, semi_annual))
    }

    /// Returns the block for a cadence.
    #[must_use]
    pub fn for_cadence(&self, cadence: BillingCadence) -> &PricingBlock {
        match cadence {
            BillingCadence::Annual => &self.annual,
            BillingCadence::SemiAnnual => &self.semi_annual,
        }
    }
}

/// One coverage line of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Guarantee {
    /// Display name.
    pub name: String,
    /// Whether the coverage is part of the plan.
    pub included: bool,
    /// Provider guarantee code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Insured capital.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<Decimal>,
    /// Deductible description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible: Option<String>,
    /// Label of the currently selected option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
}

impl Guarantee {
    /// Creates a guarantee with only a name and inclusion flag.
    #[must_use]
    pub fn new(name: impl Into<String>, included: bool) -> Self {
        Self {
            name: name.into(),
            included,
            code: None,
            capital: None,
            deductible: None,
            selected_option: None,
        }
    }

    /// Sets the provider guarantee code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the insured capital.
    #[must_use]
    pub fn with_capital(mut self, capital: Decimal) -> Self {
        self.capital = Some(capital);
        self
    }

    /// Sets the selected option label.
    #[must_use]
    pub fn with_selected_option(mut self, label: impl Into<String>) -> Self {
        self.selected_option = Some(label.into());
        self
    }
}

/// One choice of a selectable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    /// Display label.
    pub label: String,
    /// Value sent upstream when selected.
    pub value: i64,
}

/// A guarantee whose level the customer can choose on a later update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectableField {
    /// Option code used in
    /// [`OptionSelections`](crate::domain::entities::session::OptionSelections).
    pub code: String,
    /// Display title.
    pub title: String,
    /// Accepted choices.
    pub options: Vec<SelectOption>,
    /// Value applied when the customer selects nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
}

impl SelectableField {
    /// Returns true if `value` is one of the accepted choices.
    #[must_use]
    pub fn accepts(&self, value: i64) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Returns the label for a value.
    #[must_use]
    pub fn label_for(&self, value: i64) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

/// A normalized insurance offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalPlan {
    /// Provider that issued the plan.
    pub provider: ProviderCode,
    /// Provider display name.
    pub provider_name: String,
    /// Provider plan or pack code.
    pub plan_code: String,
    /// Plan display name.
    pub plan_name: String,
    /// Brand color, `#RRGGBB`.
    pub color: String,
    /// Pricing per cadence.
    pub pricing: PlanPricing,
    /// Coverage lines.
    pub guarantees: Vec<Guarantee>,
    /// Options adjustable through an update.
    pub selectable_fields: Vec<SelectableField>,
    /// Whether the applicant is eligible for this plan.
    pub eligible: bool,
    /// Display rank within the provider, starting at 1.
    pub rank: u32,
}

impl CanonicalPlan {
    /// Creates an eligible plan branded for `provider`, ranked first.
    #[must_use]
    pub fn new(
        provider: ProviderCode,
        plan_code: impl Into<String>,
        plan_name: impl Into<String>,
        pricing: PlanPricing,
    ) -> Self {
        let info = ProviderInfo::for_provider(provider);
        Self {
            provider,
            provider_name: info.name,
            plan_code: plan_code.into(),
            plan_name: plan_name.into(),
            color: info.color,
            pricing,
            guarantees: Vec::new(),
            selectable_fields: Vec::new(),
            eligible: true,
            rank: 1,
        }
    }

    /// Sets the guarantee list.
    #[must_use]
    pub fn with_guarantees(mut self, guarantees: Vec<Guarantee>) -> Self {
        self.guarantees = guarantees;
        self
    }

    /// Sets the selectable field list.
    #[must_use]
    pub fn with_selectable_fields(mut self, fields: Vec<SelectableField>) -> Self {
        self.selectable_fields = fields;
        self
    }

    /// Overrides the plan color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the eligibility flag.
    #[must_use]
    pub fn with_eligible(mut self, eligible: bool) -> Self {
        self.eligible = eligible;
        self
    }

    /// Sets the display rank.
    #[must_use]
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    /// Returns true if both cadences satisfy the pricing invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.pricing.annual.is_consistent() && self.pricing.semi_annual.is_consistent()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    mod pricing_block {
        use super::*;

        #[test]
        fn itemized_sums_components() {
            let block = PricingBlock::itemized(d(1000, 0), d(140, 0), d(25, 0)).unwrap();
            assert_eq!(block.total(), d(1165, 0));
            assert!(block.is_itemized());
            assert!(block.is_consistent());
        }

        #[test]
        fn total_only_has_zero_breakdown() {
            let block = PricingBlock::total_only(d(298_745, 2));
            assert_eq!(block.net_premium(), block.total());
            assert_eq!(block.taxes(), Decimal::ZERO);
            assert!(!block.is_itemized());
            assert!(block.is_consistent());
        }

        #[test]
        fn reconciled_trusts_upstream_total() {
            let block =
                PricingBlock::reconciled(d(1000, 0), d(140, 0), d(25, 0), d(1170, 0)).unwrap();
            assert_eq!(block.total(), d(1170, 0));
            assert_eq!(block.ancillary_fees(), d(30, 0));
            assert!(block.is_consistent());
        }

        #[test]
        fn reconciled_keeps_components_within_tolerance() {
            let block =
                PricingBlock::reconciled(d(100_000, 2), d(14_000, 2), d(2_500, 2), d(116_501, 2))
                    .unwrap();
            assert_eq!(block.ancillary_fees(), d(2_500, 2));
            assert_eq!(block.total(), d(116_501, 2));
        }

        #[test]
        fn scaled_total_only_stays_total_only() {
            let block = PricingBlock::total_only(d(1000, 0)).scaled(d(52, 2)).unwrap();
            assert_eq!(block.total(), d(520, 0));
            assert!(!block.is_itemized());
        }
    }

    mod plan_pricing {
        use super::*;

        #[test]
        fn derives_missing_semi_annual() {
            let annual = PricingBlock::total_only(d(123_457, 2));
            let pricing = PlanPricing::with_fallback(annual, None, d(52, 2)).unwrap();
            assert_eq!(pricing.semi_annual.total(), d(64_198, 2));
        }

        #[test]
        fn keeps_upstream_semi_annual() {
            let annual = PricingBlock::total_only(d(1000, 0));
            let semi = PricingBlock::total_only(d(540, 0));
            let pricing = PlanPricing::with_fallback(annual, Some(semi), d(52, 2)).unwrap();
            assert_eq!(
                pricing.for_cadence(BillingCadence::SemiAnnual).total(),
                d(540, 0)
            );
        }
    }

    mod canonical_plan {
        use super::*;

        #[test]
        fn carries_branding() {
            let block = PricingBlock::total_only(d(1000, 0));
            let plan = CanonicalPlan::new(
                ProviderCode::Axa,
                "4",
                "Optimale",
                PlanPricing::new(block.clone(), block),
            );
            assert_eq!(plan.provider_name, "AXA Assurance");
            assert_eq!(plan.color, "#00008F");
        }

        #[test]
        fn selectable_field_accepts_listed_values() {
            let field = SelectableField {
                code: "franchise".to_string(),
                title: "Franchise".to_string(),
                options: vec![SelectOption {
                    label: "5%".to_string(),
                    value: 5,
                }],
                default: Some(5),
            };
            assert!(field.accepts(5));
            assert!(!field.accepts(10));
            assert_eq!(field.label_for(5), Some("5%"));
        }
    }

    proptest! {
        #[test]
        fn scaled_blocks_stay_consistent(
            net in 0i64..10_000_000,
            taxes in 0i64..2_000_000,
            fees in 0i64..100_000,
            ratio in 1i64..=100,
        ) {
            let block = PricingBlock::itemized(d(net, 2), d(taxes, 2), d(fees, 2)).unwrap();
            let scaled = block.scaled(d(ratio, 2)).unwrap();
            prop_assert!(scaled.is_consistent());
            prop_assert_eq!(scaled.total(), apply_rate(block.total(), d(ratio, 2)).unwrap());
        }
    }
}
