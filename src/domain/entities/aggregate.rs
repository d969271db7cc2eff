//! # Aggregate Result
//!
//! The merged outcome of one comparison across providers.

use crate::domain::entities::plan::CanonicalPlan;
use crate::domain::entities::provider_info::ProviderInfo;
use crate::domain::entities::session::SessionHandle;
use crate::domain::value_objects::enums::ProviderCode;
use crate::domain::value_objects::ids::ComparisonId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Error text recorded when a provider answers without any usable plan.
pub const NO_PLANS_RETURNED: &str = "No plans returned";

/// Outcome of one provider within a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderOutcome {
    /// Branding.
    #[serde(flatten)]
    pub info: ProviderInfo,
    /// Normalized plans, possibly empty.
    pub plans: Vec<CanonicalPlan>,
    /// Number of plans.
    pub plan_count: usize,
    /// Failure description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Time spent in the provider pipeline, in milliseconds.
    pub elapsed_ms: u64,
}

impl ProviderOutcome {
    /// Creates an outcome from normalized plans.
    ///
    /// An empty plan list is recorded with the [`NO_PLANS_RETURNED`] error.
    #[must_use]
    pub fn with_plans(
        provider: ProviderCode,
        plans: Vec<CanonicalPlan>,
        elapsed: Duration,
    ) -> Self {
        let error = plans.is_empty().then(|| NO_PLANS_RETURNED.to_string());
        Self {
            info: ProviderInfo::for_provider(provider),
            plan_count: plans.len(),
            plans,
            error,
            elapsed_ms: duration_ms(elapsed),
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(provider: ProviderCode, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            info: ProviderInfo::for_provider(provider),
            plans: Vec::new(),
            plan_count: 0,
            error: Some(error.into()),
            elapsed_ms: duration_ms(elapsed),
        }
    }

    /// Returns true if the provider produced at least one plan.
    #[inline]
    #[must_use]
    pub fn has_results(&self) -> bool {
        !self.plans.is_empty()
    }
}

/// Counters over all provider outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AggregateSummary {
    /// Providers queried.
    pub total_providers: usize,
    /// Providers that returned at least one plan.
    pub providers_with_results: usize,
    /// Plans across all providers.
    pub total_plans: usize,
    /// Wall-clock time of the comparison, in milliseconds.
    pub total_elapsed_ms: u64,
}

/// Result of a comparison.
///
/// # Invariants
///
/// - `success` is true iff at least one outcome has plans
/// - `providers` is keyed and ordered by [`ProviderCode`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AggregateResult {
    /// Comparison id; keys stored sessions.
    pub comparison_id: ComparisonId,
    /// Whether any provider produced plans.
    pub success: bool,
    /// Per-provider outcomes.
    pub providers: BTreeMap<ProviderCode, ProviderOutcome>,
    /// Counters.
    pub summary: AggregateSummary,
    /// Continuation handles for later updates.
    pub sessions: Vec<SessionHandle>,
    /// `"<provider name>: <error>"` for every failed provider.
    pub errors: Vec<String>,
}

impl AggregateResult {
    /// Merges provider outcomes into a result.
    #[must_use]
    pub fn from_outcomes(
        comparison_id: ComparisonId,
        providers: BTreeMap<ProviderCode, ProviderOutcome>,
        sessions: Vec<SessionHandle>,
        elapsed: Duration,
    ) -> Self {
        let errors: Vec<String> = providers
            .values()
            .filter_map(|o| o.error.as_ref().map(|e| format!("{}: {}", o.info.name, e)))
            .collect();
        let summary = AggregateSummary {
            total_providers: providers.len(),
            providers_with_results: providers.values().filter(|o| o.has_results()).count(),
            total_plans: providers.values().map(|o| o.plan_count).sum(),
            total_elapsed_ms: duration_ms(elapsed),
        };
        Self {
            comparison_id,
            success: summary.providers_with_results > 0,
            providers,
            summary,
            sessions,
            errors,
        }
    }

    /// Returns the session handle issued by `provider`.
    #[must_use]
    pub fn session_for(&self, provider: ProviderCode) -> Option<&SessionHandle> {
        self.sessions.iter().find(|s| s.provider == provider)
    }

    /// Returns every plan across providers, in provider order.
    pub fn plans(&self) -> impl Iterator<Item = &CanonicalPlan> {
        self.providers.values().flat_map(|o| o.plans.iter())
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
