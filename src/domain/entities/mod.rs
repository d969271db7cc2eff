//! # Domain Entities
//!
//! Requests, plans, sessions and comparison results.
//!
//! ## Inputs
//!
//! - [`CanonicalQuoteRequest`]: Provider-neutral rate request
//! - [`OptionSelections`]: Option choices for a quote update
//!
//! ## Outputs
//!
//! - [`CanonicalPlan`]: Normalized offer with per-cadence pricing
//! - [`AggregateResult`]: Merged outcome of one comparison
//! - [`UpdatedPricing`]: Repriced plan after an update
//!
//! ## Continuity
//!
//! - [`SessionHandle`]: Opaque continuation data issued by a provider

pub mod aggregate;
pub mod plan;
pub mod provider_info;
pub mod quote_request;
pub mod session;

pub use aggregate::{AggregateResult, AggregateSummary, NO_PLANS_RETURNED, ProviderOutcome};
pub use plan::{CanonicalPlan, Guarantee, PlanPricing, PricingBlock, SelectOption, SelectableField};
pub use provider_info::{ProviderInfo, ProviderListing};
pub use quote_request::{ApplicantInfo, CanonicalQuoteRequest, VehicleInfo};
pub use session::{OptionSelections, SessionData, SessionHandle, UpdatedPricing};
