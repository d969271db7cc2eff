//! # Runtime Assembly
//!
//! Builds the engine, the update service, the automation queue and the
//! session store from an [`AppConfig`], and tears them down again.
//!
//! ```no_run
//! use motor_quote_aggregator::bootstrap::EngineRuntime;
//! use motor_quote_aggregator::config::AppConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = EngineRuntime::from_config(AppConfig::load()?)?;
//! for listing in runtime.providers() {
//!     println!("{} enabled={}", listing.info.name, listing.enabled);
//! }
//! runtime.shutdown().await;
//! # Ok(())
//! # }
//! ```

use crate::application::error::ApplicationResult;
use crate::application::mapping::FieldMapper;
use crate::application::registry::ProviderRegistry;
use crate::application::services::{QuoteAggregationEngine, QuoteUpdateService};
use crate::config::{AppConfig, ConfigError};
use crate::domain::entities::aggregate::AggregateResult;
use crate::domain::entities::provider_info::ProviderListing;
use crate::domain::entities::quote_request::CanonicalQuoteRequest;
use crate::domain::entities::session::{OptionSelections, SessionHandle, UpdatedPricing};
use crate::domain::value_objects::enums::ProviderCode;
use crate::domain::value_objects::ids::ComparisonId;
use crate::infrastructure::automation::{AutomationQueue, RemoteDriverFactory, ResourceFactory};
use crate::infrastructure::persistence::InMemorySessionStore;
use crate::infrastructure::providers::error::ProviderError;
use crate::infrastructure::providers::{
    AxaAdapter, HttpClient, McmaAdapter, RmaAdapter, SanlamAdapter, axa, mcma, sanlam,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

/// Failure to assemble the runtime.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] ProviderError),
}

/// The assembled engine.
#[derive(Debug)]
pub struct EngineRuntime {
    config: AppConfig,
    engine: QuoteAggregationEngine,
    updates: QuoteUpdateService,
    queue: AutomationQueue,
    store: Arc<InMemorySessionStore>,
    purge_task: Mutex<Option<JoinHandle<()>>>,
}

impl EngineRuntime {
    /// Loads the configuration and assembles the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a client fails to build.
    pub fn load() -> Result<Self, BootstrapError> {
        Self::from_config(AppConfig::load()?)
    }

    /// Assembles the runtime, driving RMA through the configured sidecar.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn from_config(config: AppConfig) -> Result<Self, BootstrapError> {
        let automation = &config.automation;
        let factory = RemoteDriverFactory::new(
            HttpClient::new(automation.request_timeout_ms)?,
            automation.base_url.clone(),
        )
        .with_options(config.session_options());
        Self::with_resource_factory(config, Arc::new(factory))
    }

    /// Assembles the runtime around an explicit automation resource factory.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn with_resource_factory(
        config: AppConfig,
        factory: Arc<dyn ResourceFactory>,
    ) -> Result<Self, BootstrapError> {
        let providers = &config.providers;

        let axa = Arc::new(AxaAdapter::new(
            HttpClient::new(providers.axa.timeout_ms)?,
            url_or(providers.axa.base_url.as_deref(), axa::DEFAULT_BASE_URL),
        ));
        let sanlam = Arc::new(SanlamAdapter::new(
            HttpClient::new(providers.sanlam.timeout_ms)?,
            url_or(providers.sanlam.base_url.as_deref(), sanlam::DEFAULT_BASE_URL),
            Duration::from_millis(providers.sanlam.formula_pace_ms),
        ));
        let mcma = Arc::new(
            McmaAdapter::new(
                HttpClient::new(providers.mcma.timeout_ms)?,
                url_or(providers.mcma.base_url.as_deref(), mcma::DEFAULT_BASE_URL),
            )
            .with_tax_rate(config.pricing.mcma_tax_rate),
        );
        let queue = AutomationQueue::new(factory, config.queue_config());
        let rma = Arc::new(RmaAdapter::new(queue.clone()));

        let registry = Arc::new(
            ProviderRegistry::builder()
                .adapter_with_flag(axa.clone(), providers.axa.enabled)
                .adapter_with_flag(sanlam, providers.sanlam.enabled)
                .adapter_with_flag(mcma.clone(), providers.mcma.enabled)
                .adapter_with_flag(rma, providers.rma.enabled)
                .session_adapter(axa)
                .session_adapter(mcma)
                .build(),
        );

        let store = Arc::new(InMemorySessionStore::new(config.session_ttl()));
        let mapper =
            FieldMapper::default().with_sanlam_agent_key(providers.sanlam.agent_key.clone());
        let engine = QuoteAggregationEngine::new(
            Arc::clone(&registry),
            mapper,
            config.pricing_factors(),
            config.aggregation_config(),
        )
        .with_store(store.clone());
        let updates = QuoteUpdateService::new(registry).with_store(store.clone());

        let purge_task = tokio::runtime::Handle::try_current().ok().map(|_| {
            store.start_purge_task(Duration::from_secs(config.sessions.purge_interval_secs))
        });

        info!(
            enabled = ?ProviderCode::ALL
                .iter()
                .filter(|p| config.providers.is_enabled(**p))
                .collect::<Vec<_>>(),
            "engine runtime assembled"
        );

        Ok(Self {
            config,
            engine,
            updates,
            queue,
            store,
            purge_task: Mutex::new(purge_task),
        })
    }

    /// Runs a comparison. See [`QuoteAggregationEngine::compare`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a structurally invalid request.
    pub async fn compare(
        &self,
        request: &CanonicalQuoteRequest,
        subset: Option<&[ProviderCode]>,
    ) -> ApplicationResult<AggregateResult> {
        self.engine.compare(request, subset).await
    }

    /// Lists providers with branding and enabled flag.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderListing> {
        self.engine.providers()
    }

    /// Reprices a plan. See [`QuoteUpdateService::update`].
    ///
    /// # Errors
    ///
    /// See [`QuoteUpdateService::update`].
    pub async fn update(
        &self,
        provider: ProviderCode,
        session: &SessionHandle,
        selections: &OptionSelections,
    ) -> ApplicationResult<UpdatedPricing> {
        self.updates.update(provider, session, selections).await
    }

    /// Reprices a plan of a recorded comparison.
    ///
    /// # Errors
    ///
    /// See [`QuoteUpdateService::update_from_comparison`].
    pub async fn update_from_comparison(
        &self,
        id: ComparisonId,
        provider: ProviderCode,
        selections: &OptionSelections,
    ) -> ApplicationResult<UpdatedPricing> {
        self.updates
            .update_from_comparison(id, provider, selections)
            .await
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &QuoteAggregationEngine {
        &self.engine
    }

    /// Returns the automation queue.
    #[must_use]
    pub fn queue(&self) -> &AutomationQueue {
        &self.queue
    }

    /// Returns the session store.
    #[must_use]
    pub fn store(&self) -> &Arc<InMemorySessionStore> {
        &self.store
    }

    /// Stops the purge task and the automation queue.
    pub async fn shutdown(&self) {
        if let Some(task) = self.purge_task.lock().take() {
            task.abort();
        }
        self.queue.shutdown().await;
        info!("engine runtime shut down");
    }
}

fn url_or(configured: Option<&str>, default: &str) -> String {
    configured
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::quote_aggregation::tests::sample_request;
    use crate::infrastructure::automation::QueueState;

    #[test]
    fn assembles_outside_a_runtime() {
        let runtime = EngineRuntime::from_config(AppConfig::default()).unwrap();
        assert!(runtime.purge_task.lock().is_none());
        assert_eq!(runtime.providers().iter().filter(|l| l.enabled).count(), 4);
    }

    #[test]
    fn disabled_providers_are_listed() {
        let config = AppConfig::default()
            .with_provider_enabled(ProviderCode::Sanlam, false)
            .with_provider_enabled(ProviderCode::Rma, false);
        let runtime = EngineRuntime::from_config(config).unwrap();
        let listing = runtime.providers();
        assert_eq!(listing.len(), 4);
        let disabled: Vec<ProviderCode> = listing
            .iter()
            .filter(|l| !l.enabled)
            .map(|l| l.info.code)
            .collect();
        assert_eq!(disabled, vec![ProviderCode::Sanlam, ProviderCode::Rma]);
    }

    #[tokio::test]
    async fn nothing_enabled_compares_to_unsuccessful_result() {
        let config = ProviderCode::ALL
            .iter()
            .fold(AppConfig::default(), |c, p| c.with_provider_enabled(*p, false));
        let runtime = EngineRuntime::from_config(config).unwrap();
        let result = runtime.compare(&sample_request(), None).await.unwrap();
        assert!(!result.success);
        assert!(result.providers.is_empty());

        runtime.shutdown().await;
        assert_eq!(runtime.queue().state(), QueueState::Idle);
        assert!(runtime.purge_task.lock().is_none());
    }

    #[test]
    fn blank_url_falls_back() {
        assert_eq!(url_or(Some(" "), "http://default"), "http://default");
        assert_eq!(url_or(Some("http://x"), "http://default"), "http://x");
        assert_eq!(url_or(None, "http://default"), "http://default");
    }
}
