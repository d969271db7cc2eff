//! # Session Continuity
//!
//! Opaque continuation data that lets a later update resume an upstream
//! transaction, plus the selections and pricing exchanged by that update.
//!
//! The aggregator never looks inside a [`SessionHandle`]; only the adapter of
//! the issuing provider interprets it.

use crate::domain::entities::plan::PricingBlock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::enums::{BillingCadence, ProviderCode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Provider-specific continuation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionData {
    /// A quotation the upstream signed; updates replay the original payload.
    SignedQuotation {
        /// Payload originally sent to create the quotation.
        base_payload: Value,
        /// Upstream quotation id.
        quotation_id: String,
        /// Upstream lead id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lead_id: Option<String>,
    },
    /// A subscription id with its bearer token.
    TokenPair {
        /// Upstream subscription id.
        subscription_id: String,
        /// Bearer token scoped to the subscription.
        token: String,
    },
}

/// Continuation handle issued by one provider during a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionHandle {
    /// Issuing provider.
    pub provider: ProviderCode,
    /// Continuation data.
    #[serde(flatten)]
    pub data: SessionData,
}

impl SessionHandle {
    /// Creates a signed-quotation handle.
    #[must_use]
    pub fn signed_quotation(
        provider: ProviderCode,
        base_payload: Value,
        quotation_id: impl Into<String>,
        lead_id: Option<String>,
    ) -> Self {
        Self {
            provider,
            data: SessionData::SignedQuotation {
                base_payload,
                quotation_id: quotation_id.into(),
                lead_id,
            },
        }
    }

    /// Creates a token-pair handle.
    #[must_use]
    pub fn token_pair(
        provider: ProviderCode,
        subscription_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            data: SessionData::TokenPair {
                subscription_id: subscription_id.into(),
                token: token.into(),
            },
        }
    }

    /// Checks that this handle was issued by `expected`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionProviderMismatch` otherwise.
    pub fn ensure_provider(&self, expected: ProviderCode) -> DomainResult<()> {
        if self.provider == expected {
            Ok(())
        } else {
            Err(DomainError::SessionProviderMismatch {
                expected,
                actual: self.provider,
            })
        }
    }
}

/// Option choices submitted with an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OptionSelections {
    /// Plan or pack code to reprice.
    pub plan_code: String,
    /// Cadence to reprice for.
    #[serde(default)]
    pub cadence: BillingCadence,
    /// Guarantee or option code mapped to the selected value.
    #[serde(default)]
    pub values: BTreeMap<String, i64>,
}

impl OptionSelections {
    /// Creates empty selections for a plan.
    #[must_use]
    pub fn new(plan_code: impl Into<String>) -> Self {
        Self {
            plan_code: plan_code.into(),
            cadence: BillingCadence::Annual,
            values: BTreeMap::new(),
        }
    }

    /// Sets the cadence.
    #[must_use]
    pub fn with_cadence(mut self, cadence: BillingCadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Adds one selection.
    #[must_use]
    pub fn with_value(mut self, code: impl Into<String>, value: i64) -> Self {
        self.values.insert(code.into(), value);
        self
    }

    /// Returns the selected value for `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<i64> {
        self.values.get(code).copied()
    }
}

/// Pricing returned by an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpdatedPricing {
    /// Provider repriced.
    pub provider: ProviderCode,
    /// Plan repriced.
    pub plan_code: String,
    /// Selections echoed back.
    pub selections: BTreeMap<String, i64>,
    /// Twelve month pricing, when the upstream reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual: Option<PricingBlock>,
    /// Six month pricing, when the upstream reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semi_annual: Option<PricingBlock>,
    /// Raw upstream body.
    pub raw: Value,
}
