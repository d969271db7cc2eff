//! # Response Normalizers
//!
//! One pure function per provider turning a [`RawProviderResponse`] into
//! [`CanonicalPlan`]s and, where the provider supports it, a
//! [`SessionHandle`].
//!
//! Each provider accepts a full shape and a legacy shape, parsed as an untagged
//! enum ending in an `Unrecognized` arm. An unrecognized shape yields no plans
//! and an `issue`; entries that cannot be priced are skipped and reported the
//! same way. Normalizers never fail and never panic.
//!
//! Semi-annual pricing is taken from the response when present and otherwise
//! derived from the annual block with [`PricingFactors::semi_annual_ratio`].

pub mod axa;
pub mod mcma;
pub mod rma;
pub mod sanlam;

use crate::domain::entities::plan::CanonicalPlan;
use crate::domain::entities::session::SessionHandle;
use crate::domain::value_objects::arithmetic::decimal_from_json;
use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::providers::mcma::DEFAULT_TAX_RATE;
use crate::infrastructure::providers::traits::RawProviderResponse;
use rust_decimal::Decimal;
use serde_json::Value;

/// Share of the annual premium charged for six months when the upstream
/// does not quote that cadence.
///
/// Observed on AXA and RMA quotes; not confirmed for every provider.
pub const SEMI_ANNUAL_RATIO: Decimal = Decimal::from_parts(52, 0, 0, false, 2);

/// Tax rate applied to MCMA base prices.
pub const MCMA_TAX_RATE: Decimal = DEFAULT_TAX_RATE;

/// Factors used where an upstream omits an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingFactors {
    /// Six month premium as a share of the annual one.
    pub semi_annual_ratio: Decimal,
    /// Tax rate on MCMA net premiums.
    pub mcma_tax_rate: Decimal,
}

impl Default for PricingFactors {
    fn default() -> Self {
        Self {
            semi_annual_ratio: SEMI_ANNUAL_RATIO,
            mcma_tax_rate: MCMA_TAX_RATE,
        }
    }
}

impl PricingFactors {
    /// Sets the semi-annual ratio.
    #[must_use]
    pub fn with_semi_annual_ratio(mut self, ratio: Decimal) -> Self {
        self.semi_annual_ratio = ratio;
        self
    }

    /// Sets the MCMA tax rate.
    #[must_use]
    pub fn with_mcma_tax_rate(mut self, rate: Decimal) -> Self {
        self.mcma_tax_rate = rate;
        self
    }
}

/// Output of a normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedResponse {
    /// Plans in display order.
    pub plans: Vec<CanonicalPlan>,
    /// Continuation handle, if the provider issued one.
    pub session: Option<SessionHandle>,
    /// What could not be interpreted, if anything.
    pub issue: Option<String>,
}

impl NormalizedResponse {
    /// A response with no plans and an issue.
    #[must_use]
    pub fn unrecognized(issue: impl Into<String>) -> Self {
        Self {
            issue: Some(issue.into()),
            ..Self::default()
        }
    }

    /// Appends an issue, keeping earlier ones.
    pub fn note(&mut self, issue: impl Into<String>) {
        let issue = issue.into();
        self.issue = Some(match self.issue.take() {
            Some(previous) => format!("{}; {}", previous, issue),
            None => issue,
        });
    }
}

/// Normalizes a raw response with the normalizer of its provider.
#[must_use]
pub fn normalize(raw: &RawProviderResponse, factors: &PricingFactors) -> NormalizedResponse {
    let body = raw.body();
    match raw.provider() {
        ProviderCode::Axa => axa::normalize(body, factors),
        ProviderCode::Sanlam => sanlam::normalize(body, factors),
        ProviderCode::Mcma => mcma::normalize(body, factors),
        ProviderCode::Rma => rma::normalize(body, factors),
    }
}

/// Describes a JSON value's kind for issue messages.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Reads a money field.
pub(crate) fn amount(entry: &Value, field: &str) -> Option<Decimal> {
    entry.get(field).and_then(decimal_from_json)
}

/// Reads a non-empty text field.
pub(crate) fn text(entry: &Value, field: &str) -> Option<String> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// True for entries the upstream left empty.
pub(crate) fn is_blank(entry: &Value) -> bool {
    match entry {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// One-based display rank of the entry at `index`.
pub(crate) fn rank(index: usize) -> u32 {
    u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX)
}
