//! # Provider Adapter Traits
//!
//! Port definitions for upstream quoting services.
//!
//! Every provider implements [`ProviderAdapter`]: it takes the payload the
//! field mapper produced for it and returns the provider-shaped body its
//! normalizer understands. Providers that can reprice an existing quotation
//! additionally implement [`SessionAdapter`].
//!
//! # Examples
//!
//! ```ignore
//! use motor_quote_aggregator::infrastructure::providers::traits::ProviderAdapter;
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait::async_trait]
//! impl ProviderAdapter for MyProvider {
//!     // ... implement required methods
//! }
//! ```

use crate::domain::entities::session::{OptionSelections, SessionHandle, UpdatedPricing};
use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::providers::axa::payload::AxaQuotationPayload;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::mcma::payload::McmaSubscriptionPayload;
use crate::infrastructure::providers::rma::payload::RmaPayload;
use crate::infrastructure::providers::sanlam::payload::SanlamPricingPayload;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Provider-specific request payload.
///
/// Produced by the field mapper, consumed once by the matching adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MappedPayload {
    /// AXA quotation body.
    Axa(AxaQuotationPayload),
    /// Sanlam pricing body with the policy start date.
    Sanlam {
        /// Body shared by both cadences.
        payload: SanlamPricingPayload,
        /// First day of cover.
        start_date: NaiveDate,
    },
    /// MCMA subscription body.
    Mcma(McmaSubscriptionPayload),
    /// RMA workflow parameters.
    Rma(RmaPayload),
}

impl MappedPayload {
    /// Returns the provider this payload is addressed to.
    #[must_use]
    pub fn provider(&self) -> ProviderCode {
        match self {
            Self::Axa(_) => ProviderCode::Axa,
            Self::Sanlam { .. } => ProviderCode::Sanlam,
            Self::Mcma(_) => ProviderCode::Mcma,
            Self::Rma(_) => ProviderCode::Rma,
        }
    }

    /// Serializes the payload for logging or storage.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Provider-shaped response body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProviderResponse {
    provider: ProviderCode,
    body: Value,
}

impl RawProviderResponse {
    /// Wraps a body returned by `provider`.
    #[must_use]
    pub fn new(provider: ProviderCode, body: Value) -> Self {
        Self { provider, body }
    }

    /// Returns the provider.
    #[inline]
    #[must_use]
    pub fn provider(&self) -> ProviderCode {
        self.provider
    }

    /// Returns the body.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consumes the response, returning the body.
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Trait implemented by every upstream quoting service.
///
/// # Error Handling
///
/// Adapters map every failure to a [`ProviderError`]. A failing secondary
/// cadence is not an error: the adapter logs it and returns an empty list for
/// that cadence.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + fmt::Debug {
    /// Returns the provider code.
    fn provider(&self) -> ProviderCode;

    /// Returns the timeout in milliseconds for one upstream call.
    fn timeout_ms(&self) -> u64;

    /// Fetches quotes for a mapped payload.
    ///
    /// # Errors
    ///
    /// - `ProviderError::InvalidRequest` if the payload is for another provider
    /// - Transport and status errors from the primary cadence call
    /// - Automation errors for queue-backed providers
    async fn fetch(&self, payload: MappedPayload) -> ProviderResult<RawProviderResponse>;
}

/// Trait for providers that reprice an existing quotation.
#[async_trait]
pub trait SessionAdapter: Send + Sync + fmt::Debug {
    /// Returns the provider code.
    fn provider(&self) -> ProviderCode;

    /// Reprices `selections.plan_code` inside the upstream session.
    ///
    /// # Errors
    ///
    /// - `ProviderError::InvalidRequest` for a foreign or malformed handle, an
    ///   unknown plan, or an option the plan does not offer
    /// - `ProviderError::SessionExpired` if the upstream no longer knows the session
    /// - Transport and status errors otherwise
    async fn update(
        &self,
        session: &SessionHandle,
        selections: &OptionSelections,
    ) -> ProviderResult<UpdatedPricing>;
}

/// Error for a payload routed to the wrong adapter.
pub(crate) fn payload_mismatch(expected: ProviderCode, payload: &MappedPayload) -> ProviderError {
    ProviderError::invalid_request(format!(
        "{} adapter received a {} payload",
        expected,
        payload.provider()
    ))
}
