//! # Quote Aggregation Engine
//!
//! Runs one comparison across providers.
//!
//! This module provides the [`QuoteAggregationEngine`], which dispatches one
//! tokio task per selected provider. Each task maps the canonical request,
//! fetches the provider's raw response and normalizes it. Every failure,
//! including a panic, is caught at the task boundary and recorded against
//! that provider; the comparison itself only fails on invalid input.
//!
//! Each task is bounded by the provider wait budget. Exceeding it stops the
//! wait and records a timeout; the task is detached, not cancelled.

use crate::application::error::{ApplicationResult, PipelineError};
use crate::application::mapping::{FieldMapper, MappingContext};
use crate::application::normalizers::{NormalizedResponse, PricingFactors, normalize};
use crate::application::registry::ProviderRegistry;
use crate::domain::entities::aggregate::{AggregateResult, ProviderOutcome};
use crate::domain::entities::provider_info::{ProviderInfo, ProviderListing};
use crate::domain::entities::quote_request::CanonicalQuoteRequest;
use crate::domain::value_objects::enums::ProviderCode;
use crate::domain::value_objects::ids::ComparisonId;
use crate::infrastructure::persistence::traits::SessionStore;
use crate::infrastructure::providers::traits::ProviderAdapter;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Default provider wait budget: the slowest automated workflow plus margin.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 150_000;

/// Configuration for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationConfig {
    /// Per-provider wait budget in milliseconds.
    pub provider_timeout_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
        }
    }
}

impl AggregationConfig {
    /// Creates a configuration with the given per-provider wait budget.
    #[must_use]
    pub fn with_provider_timeout(provider_timeout_ms: u64) -> Self {
        Self {
            provider_timeout_ms,
        }
    }

    /// Returns the wait budget as a duration.
    #[inline]
    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

/// Engine running comparisons across the registered providers.
#[derive(Debug, Clone)]
pub struct QuoteAggregationEngine {
    registry: Arc<ProviderRegistry>,
    mapper: Arc<FieldMapper>,
    factors: PricingFactors,
    store: Option<Arc<dyn SessionStore>>,
    config: AggregationConfig,
}

impl QuoteAggregationEngine {
    /// Creates an engine.
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        mapper: FieldMapper,
        factors: PricingFactors,
        config: AggregationConfig,
    ) -> Self {
        Self {
            registry,
            mapper: Arc::new(mapper),
            factors,
            store: None,
            config,
        }
    }

    /// Creates an engine with default mapper, factors and configuration.
    #[must_use]
    pub fn with_defaults(registry: Arc<ProviderRegistry>) -> Self {
        Self::new(
            registry,
            FieldMapper::default(),
            PricingFactors::default(),
            AggregationConfig::default(),
        )
    }

    /// Attaches a session store; comparisons record their handles in it.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Compares quotes across providers.
    ///
    /// The provider set is `subset`, else the request's own subset, filtered to
    /// enabled providers; when neither is given (or the subset is empty) every
    /// enabled provider is queried. All tasks are awaited before returning.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` if the request is structurally
    /// invalid. Provider failures never fail the comparison.
    pub async fn compare(
        &self,
        request: &CanonicalQuoteRequest,
        subset: Option<&[ProviderCode]>,
    ) -> ApplicationResult<AggregateResult> {
        request.validate()?;

        let selected = self
            .registry
            .resolve(subset.or(request.providers.as_deref()));
        let comparison_id = ComparisonId::new_v4();
        let started = Instant::now();
        info!(
            comparison = %comparison_id,
            providers = ?selected,
            "comparison started"
        );

        let context = MappingContext::today();
        let request = Arc::new(request.clone());
        let waits = selected.iter().filter_map(|&provider| {
            let adapter = self.registry.adapter(provider)?;
            Some(self.dispatch(adapter, Arc::clone(&request), context))
        });
        let finished = join_all(waits).await;

        let mut outcomes = BTreeMap::new();
        let mut sessions = Vec::new();
        for (provider, elapsed, result) in finished {
            let outcome = match result {
                Ok(normalized) => {
                    if !normalized.plans.is_empty() {
                        sessions.extend(normalized.session);
                    }
                    ProviderOutcome::with_plans(provider, normalized.plans, elapsed)
                }
                Err(e) => {
                    warn!(
                        comparison = %comparison_id,
                        provider = %provider,
                        kind = e.kind(),
                        error = %e,
                        "provider failed"
                    );
                    ProviderOutcome::failed(provider, e.to_string(), elapsed)
                }
            };
            outcomes.insert(provider, outcome);
        }
        sessions.sort_by_key(|s| s.provider);

        let result =
            AggregateResult::from_outcomes(comparison_id, outcomes, sessions, started.elapsed());
        self.record_sessions(&result).await;

        info!(
            comparison = %comparison_id,
            success = result.success,
            providers_with_results = result.summary.providers_with_results,
            plans = result.summary.total_plans,
            elapsed_ms = result.summary.total_elapsed_ms,
            "comparison finished"
        );
        Ok(result)
    }

    /// Lists every known provider with its branding and enabled flag.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderListing> {
        ProviderCode::ALL
            .iter()
            .map(|&provider| ProviderListing {
                info: ProviderInfo::for_provider(provider),
                enabled: self.registry.is_enabled(provider),
            })
            .collect()
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Returns the pricing factors used by the normalizers.
    #[must_use]
    pub fn factors(&self) -> &PricingFactors {
        &self.factors
    }

    /// Spawns one provider pipeline and waits for it within the budget.
    async fn dispatch(
        &self,
        adapter: Arc<dyn ProviderAdapter>,
        request: Arc<CanonicalQuoteRequest>,
        context: MappingContext,
    ) -> (
        ProviderCode,
        Duration,
        Result<NormalizedResponse, PipelineError>,
    ) {
        let provider = adapter.provider();
        let mapper = Arc::clone(&self.mapper);
        let factors = self.factors;
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            run_pipeline(adapter.as_ref(), &mapper, &request, &context, &factors).await
        });

        let result = match timeout(self.config.provider_timeout(), handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::panicked(e.to_string())),
            Err(_) => Err(PipelineError::timeout(self.config.provider_timeout_ms)),
        };
        (provider, started.elapsed(), result)
    }

    async fn record_sessions(&self, result: &AggregateResult) {
        let Some(store) = &self.store else {
            return;
        };
        if result.sessions.is_empty() {
            return;
        }
        if let Err(e) = store
            .record(result.comparison_id, result.sessions.clone())
            .await
        {
            warn!(
                comparison = %result.comparison_id,
                error = %e,
                "failed to record session handles"
            );
        }
    }
}

/// Map, fetch, normalize for one provider.
///
/// A response that normalizes to nothing but an issue is a parse failure; a
/// partially understood response keeps its plans.
async fn run_pipeline(
    adapter: &dyn ProviderAdapter,
    mapper: &FieldMapper,
    request: &CanonicalQuoteRequest,
    context: &MappingContext,
    factors: &PricingFactors,
) -> Result<NormalizedResponse, PipelineError> {
    let provider = adapter.provider();

    let payload = mapper.map(request, provider, context)?;
    debug!(provider = %provider, "payload mapped");

    let raw = adapter.fetch(payload).await?;
    debug!(provider = %provider, "response received");

    let normalized = normalize(&raw, factors);
    if let Some(issue) = &normalized.issue {
        if normalized.plans.is_empty() {
            return Err(PipelineError::parse(issue.clone()));
        }
        warn!(provider = %provider, issue = %issue, "response partially normalized");
    }
    debug!(
        provider = %provider,
        plans = normalized.plans.len(),
        "response normalized"
    );
    Ok(normalized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::entities::aggregate::NO_PLANS_RETURNED;
    use crate::domain::entities::quote_request::{ApplicantInfo, VehicleInfo};
    use crate::domain::entities::session::SessionHandle;
    use crate::infrastructure::persistence::in_memory::InMemorySessionStore;
    use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
    use crate::infrastructure::providers::traits::{MappedPayload, RawProviderResponse};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    /// A request every mapper accepts.
    pub(crate) fn sample_request() -> CanonicalQuoteRequest {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        CanonicalQuoteRequest::new(Decimal::from(200_000), Decimal::from(150_000))
            .with_vehicle(VehicleInfo {
                marque: Some("Renault".into()),
                modele: Some("Clio".into()),
                carburant: Some("diesel".into()),
                puissance_fiscale: Some(6),
                date_mec: Some(date(2019, 6, 1)),
                type_plaque: Some("standard".into()),
                immatriculation: None,
                valeur_neuf: Decimal::from(200_000),
                valeur_actuelle: Decimal::from(150_000),
                nombre_places: Some(5),
            })
            .with_applicant(ApplicantInfo {
                nom: Some("Alami".into()),
                prenom: Some("Yassine".into()),
                date_naissance: Some(date(1988, 5, 10)),
                date_permis: Some(date(2010, 1, 1)),
                ..ApplicantInfo::default()
            })
    }

    /// A raw body each normalizer turns into one plan.
    fn one_plan_body(provider: ProviderCode) -> Value {
        match provider {
            ProviderCode::Axa => json!([{"idPack": 2, "primeTotaleAnnuel": 2000}]),
            ProviderCode::Sanlam => json!([{"name": "Tiers", "primeHT": 900, "priceTTC": 1000}]),
            ProviderCode::Rma => json!({
                "annual": [{"libelle": "Essentielle", "primeTotalTTC": 2500, "points": []}]
            }),
            ProviderCode::Mcma => json!({
                "packs": {"essentielle": {"annualBasePrice": 2000}},
                "subscription_id": "91",
                "token": "tok"
            }),
        }
    }

    #[derive(Debug)]
    enum Behavior {
        Plans,
        Body(Value),
        Fail,
        Slow(u64),
        Panic,
    }

    #[derive(Debug)]
    struct MockAdapter {
        provider: ProviderCode,
        behavior: Behavior,
    }

    impl MockAdapter {
        fn new(provider: ProviderCode, behavior: Behavior) -> Arc<dyn ProviderAdapter> {
            Arc::new(Self { provider, behavior })
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockAdapter {
        fn provider(&self) -> ProviderCode {
            self.provider
        }

        fn timeout_ms(&self) -> u64 {
            1000
        }

        #[allow(clippy::panic)]
        async fn fetch(&self, payload: MappedPayload) -> ProviderResult<RawProviderResponse> {
            assert_eq!(payload.provider(), self.provider);
            match &self.behavior {
                Behavior::Plans => Ok(RawProviderResponse::new(
                    self.provider,
                    one_plan_body(self.provider),
                )),
                Behavior::Body(body) => Ok(RawProviderResponse::new(self.provider, body.clone())),
                Behavior::Fail => Err(ProviderError::upstream(503, "maintenance")),
                Behavior::Slow(ms) => {
                    tokio::time::sleep(Duration::from_millis(*ms)).await;
                    Ok(RawProviderResponse::new(
                        self.provider,
                        one_plan_body(self.provider),
                    ))
                }
                Behavior::Panic => panic!("adapter bug"),
            }
        }
    }

    fn engine(adapters: Vec<Arc<dyn ProviderAdapter>>) -> QuoteAggregationEngine {
        let registry = adapters
            .into_iter()
            .fold(ProviderRegistry::builder(), |b, a| b.adapter(a))
            .build();
        QuoteAggregationEngine::new(
            Arc::new(registry),
            FieldMapper::default(),
            PricingFactors::default(),
            AggregationConfig::with_provider_timeout(2000),
        )
    }

    fn all_succeeding() -> Vec<Arc<dyn ProviderAdapter>> {
        ProviderCode::ALL
            .iter()
            .map(|&p| MockAdapter::new(p, Behavior::Plans))
            .collect()
    }

    mod compare {
        use super::*;

        #[tokio::test]
        async fn all_providers_succeed() {
            let result = engine(all_succeeding())
                .compare(&sample_request(), None)
                .await
                .unwrap();
            assert!(result.success);
            assert_eq!(result.summary.total_providers, 4);
            assert_eq!(result.summary.providers_with_results, 4);
            assert_eq!(result.summary.total_plans, 4);
            assert!(result.errors.is_empty());
            assert!(result.plans().all(|p| p.is_consistent()));
            assert!(result.session_for(ProviderCode::Mcma).is_some());
        }

        #[tokio::test]
        async fn one_failing_provider_does_not_fail_the_rest() {
            let adapters = vec![
                MockAdapter::new(ProviderCode::Axa, Behavior::Plans),
                MockAdapter::new(ProviderCode::Sanlam, Behavior::Fail),
                MockAdapter::new(ProviderCode::Rma, Behavior::Plans),
                MockAdapter::new(ProviderCode::Mcma, Behavior::Plans),
            ];
            let result = engine(adapters).compare(&sample_request(), None).await.unwrap();

            assert!(result.success);
            assert_eq!(result.summary.providers_with_results, 3);
            let sanlam = result.providers.get(&ProviderCode::Sanlam).unwrap();
            assert!(sanlam.plans.is_empty());
            assert!(sanlam.error.as_deref().unwrap().contains("503"));
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors.first().unwrap().starts_with("Sanlam"));
        }

        #[tokio::test]
        async fn providers_run_concurrently() {
            let adapters = ProviderCode::ALL
                .iter()
                .map(|&p| MockAdapter::new(p, Behavior::Slow(200)))
                .collect();
            let started = Instant::now();
            let result = engine(adapters).compare(&sample_request(), None).await.unwrap();
            assert_eq!(result.summary.providers_with_results, 4);
            assert!(started.elapsed() < Duration::from_millis(700));
        }

        #[tokio::test]
        async fn slow_provider_times_out() {
            let adapters = vec![
                MockAdapter::new(ProviderCode::Axa, Behavior::Plans),
                MockAdapter::new(ProviderCode::Rma, Behavior::Slow(2000)),
            ];
            let engine = engine(adapters);
            let engine = QuoteAggregationEngine {
                config: AggregationConfig::with_provider_timeout(50),
                ..engine
            };
            let result = engine.compare(&sample_request(), None).await.unwrap();
            assert!(result.success);
            let rma = result.providers.get(&ProviderCode::Rma).unwrap();
            assert!(rma.error.as_deref().unwrap().contains("50ms"));
        }

        #[tokio::test]
        async fn panicking_adapter_is_contained() {
            let adapters = vec![
                MockAdapter::new(ProviderCode::Axa, Behavior::Panic),
                MockAdapter::new(ProviderCode::Mcma, Behavior::Plans),
            ];
            let result = engine(adapters).compare(&sample_request(), None).await.unwrap();
            assert!(result.success);
            let axa = result.providers.get(&ProviderCode::Axa).unwrap();
            assert!(axa.error.as_deref().unwrap().contains("panicked"));
        }

        #[tokio::test]
        async fn subset_limits_providers() {
            let subset = [ProviderCode::Mcma, ProviderCode::Axa];
            let result = engine(all_succeeding())
                .compare(&sample_request(), Some(&subset))
                .await
                .unwrap();
            assert_eq!(result.summary.total_providers, 2);
            let codes: Vec<ProviderCode> = result.providers.keys().copied().collect();
            assert_eq!(codes, vec![ProviderCode::Axa, ProviderCode::Mcma]);
        }

        #[tokio::test]
        async fn request_subset_applies_when_no_argument() {
            let request = sample_request().with_providers([ProviderCode::Rma]);
            let result = engine(all_succeeding()).compare(&request, None).await.unwrap();
            assert_eq!(result.summary.total_providers, 1);

            let subset = [ProviderCode::Sanlam];
            let result = engine(all_succeeding())
                .compare(&request, Some(&subset))
                .await
                .unwrap();
            assert!(result.providers.contains_key(&ProviderCode::Sanlam));
            assert_eq!(result.summary.total_providers, 1);
        }

        #[tokio::test]
        async fn no_enabled_provider_is_unsuccessful() {
            let result = engine(vec![]).compare(&sample_request(), None).await.unwrap();
            assert!(!result.success);
            assert_eq!(result.summary.total_providers, 0);
        }

        #[tokio::test]
        async fn invalid_request_is_rejected() {
            let mut request = sample_request();
            request.vehicle.valeur_actuelle = Decimal::from(300_000);
            let err = engine(all_succeeding()).compare(&request, None).await.unwrap_err();
            assert!(err.is_validation());
        }

        #[tokio::test]
        async fn missing_field_is_a_provider_error() {
            let mut request = sample_request();
            request.applicant.nom = None;
            let result = engine(all_succeeding()).compare(&request, None).await.unwrap();
            let rma = result.providers.get(&ProviderCode::Rma).unwrap();
            assert!(rma.error.as_deref().unwrap().contains("nom"));
            assert_eq!(result.summary.providers_with_results, 3);
        }

        #[tokio::test]
        async fn empty_and_unrecognized_responses() {
            let adapters = vec![
                MockAdapter::new(ProviderCode::Axa, Behavior::Body(json!([]))),
                MockAdapter::new(ProviderCode::Sanlam, Behavior::Body(json!("oops"))),
            ];
            let result = engine(adapters).compare(&sample_request(), None).await.unwrap();
            assert!(!result.success);
            let axa = result.providers.get(&ProviderCode::Axa).unwrap();
            assert_eq!(axa.error.as_deref(), Some(NO_PLANS_RETURNED));
            let sanlam = result.providers.get(&ProviderCode::Sanlam).unwrap();
            assert!(sanlam.error.as_deref().unwrap().starts_with("unrecognized response"));
        }

        #[tokio::test]
        async fn sessions_are_recorded() {
            let store = Arc::new(InMemorySessionStore::default());
            let engine = engine(all_succeeding()).with_store(store.clone());
            let result = engine.compare(&sample_request(), None).await.unwrap();

            let handle: Option<SessionHandle> = store
                .get(&result.comparison_id, ProviderCode::Mcma)
                .await
                .unwrap();
            assert_eq!(handle.as_ref(), result.session_for(ProviderCode::Mcma));
            assert!(store
                .get(&result.comparison_id, ProviderCode::Rma)
                .await
                .unwrap()
                .is_none());
        }
    }

    mod sessions {
        use super::*;

        #[tokio::test]
        async fn planless_response_records_no_session() {
            let body = json!({
                "packs": {"essentielle": {"annualBasePrice": 2000, "disabled": true}},
                "subscription_id": "91",
                "token": "tok"
            });
            let store = Arc::new(InMemorySessionStore::default());
            let adapters = vec![MockAdapter::new(ProviderCode::Mcma, Behavior::Body(body))];
            let engine = engine(adapters).with_store(store.clone());
            let result = engine.compare(&sample_request(), None).await.unwrap();

            let mcma = result.providers.get(&ProviderCode::Mcma).unwrap();
            assert_eq!(mcma.error.as_deref(), Some(NO_PLANS_RETURNED));
            assert!(result.sessions.is_empty());
            assert!(store
                .get(&result.comparison_id, ProviderCode::Mcma)
                .await
                .unwrap()
                .is_none());
        }
    }

    mod ordering {
        use super::*;

        async fn keys_for(axa_ms: u64, mcma_ms: u64) -> Vec<ProviderCode> {
            let adapters = vec![
                MockAdapter::new(ProviderCode::Axa, Behavior::Slow(axa_ms)),
                MockAdapter::new(ProviderCode::Mcma, Behavior::Slow(mcma_ms)),
                MockAdapter::new(ProviderCode::Sanlam, Behavior::Plans),
            ];
            let subset = [ProviderCode::Mcma, ProviderCode::Axa];
            let result = engine(adapters)
                .compare(&sample_request(), Some(&subset))
                .await
                .unwrap();
            assert_eq!(result.summary.providers_with_results, 2);
            result.providers.keys().copied().collect()
        }

        #[tokio::test]
        async fn provider_set_ignores_arrival_order() {
            let axa_last = keys_for(150, 10).await;
            let mcma_last = keys_for(10, 150).await;
            assert_eq!(axa_last, mcma_last);
            assert_eq!(axa_last, vec![ProviderCode::Axa, ProviderCode::Mcma]);
        }
    }

    #[test]
    fn providers_listing_reflects_enabled_flags() {
        let registry = ProviderRegistry::builder()
            .adapter(MockAdapter::new(ProviderCode::Axa, Behavior::Plans))
            .adapter_with_flag(MockAdapter::new(ProviderCode::Rma, Behavior::Plans), false)
            .build();
        let listing = QuoteAggregationEngine::with_defaults(Arc::new(registry)).providers();
        assert_eq!(listing.len(), 4);
        let enabled: Vec<&str> = listing
            .iter()
            .filter(|l| l.enabled)
            .map(|l| l.info.code.as_str())
            .collect();
        assert_eq!(enabled, vec!["axa"]);
    }

    #[test]
    fn default_config() {
        let config = AggregationConfig::default();
        assert_eq!(config.provider_timeout_ms, DEFAULT_PROVIDER_TIMEOUT_MS);
        assert_eq!(config.provider_timeout(), Duration::from_secs(150));
    }
}
