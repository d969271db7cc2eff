//! # Provider Registry
//!
//! Holds the adapters the services dispatch to, keyed by [`ProviderCode`],
//! together with each provider's enabled flag.
//!
//! A provider can be registered but disabled: it is still listed by
//! `providers()` and its session adapter still serves updates for comparisons
//! run before it was disabled, but it is left out of new comparisons.
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::application::registry::ProviderRegistry;
//! use motor_quote_aggregator::domain::value_objects::ProviderCode;
//!
//! let registry = ProviderRegistry::builder().build();
//! assert!(registry.enabled().is_empty());
//! assert!(!registry.is_enabled(ProviderCode::Axa));
//! ```

use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::providers::traits::{ProviderAdapter, SessionAdapter};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Entry {
    adapter: Arc<dyn ProviderAdapter>,
    enabled: bool,
}

/// Adapters by provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    adapters: BTreeMap<ProviderCode, Entry>,
    sessions: BTreeMap<ProviderCode, Arc<dyn SessionAdapter>>,
}

impl ProviderRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// Returns the quote adapter of `provider`, enabled or not.
    #[must_use]
    pub fn adapter(&self, provider: ProviderCode) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&provider).map(|e| Arc::clone(&e.adapter))
    }

    /// Returns the session adapter of `provider`.
    #[must_use]
    pub fn session_adapter(&self, provider: ProviderCode) -> Option<Arc<dyn SessionAdapter>> {
        self.sessions.get(&provider).map(Arc::clone)
    }

    /// Returns true if `provider` is registered and enabled.
    #[must_use]
    pub fn is_enabled(&self, provider: ProviderCode) -> bool {
        self.adapters.get(&provider).is_some_and(|e| e.enabled)
    }

    /// Enabled providers in code order.
    #[must_use]
    pub fn enabled(&self) -> Vec<ProviderCode> {
        self.adapters
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(code, _)| *code)
            .collect()
    }

    /// Resolves the providers a comparison should query.
    ///
    /// `None` and an empty subset both mean every enabled provider. Otherwise
    /// the subset is deduplicated and filtered to enabled providers.
    #[must_use]
    pub fn resolve(&self, subset: Option<&[ProviderCode]>) -> Vec<ProviderCode> {
        match subset {
            Some(subset) if !subset.is_empty() => {
                let mut selected: Vec<ProviderCode> = subset
                    .iter()
                    .copied()
                    .filter(|p| self.is_enabled(*p))
                    .collect();
                selected.sort_unstable();
                selected.dedup();
                selected
            }
            _ => self.enabled(),
        }
    }
}

/// Builder for [`ProviderRegistry`].
#[derive(Debug, Default)]
pub struct ProviderRegistryBuilder {
    registry: ProviderRegistry,
}

impl ProviderRegistryBuilder {
    /// Registers an enabled quote adapter.
    #[must_use]
    pub fn adapter(self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapter_with_flag(adapter, true)
    }

    /// Registers a quote adapter with an explicit enabled flag.
    #[must_use]
    pub fn adapter_with_flag(mut self, adapter: Arc<dyn ProviderAdapter>, enabled: bool) -> Self {
        self.registry
            .adapters
            .insert(adapter.provider(), Entry { adapter, enabled });
        self
    }

    /// Registers a session adapter.
    #[must_use]
    pub fn session_adapter(mut self, adapter: Arc<dyn SessionAdapter>) -> Self {
        self.registry.sessions.insert(adapter.provider(), adapter);
        self
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> ProviderRegistry {
        self.registry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::error::ProviderResult;
    use crate::infrastructure::providers::traits::{MappedPayload, RawProviderResponse};
    use async_trait::async_trait;
    use serde_json::Value;

    #[derive(Debug)]
    struct Stub(ProviderCode);

    #[async_trait]
    impl ProviderAdapter for Stub {
        fn provider(&self) -> ProviderCode {
            self.0
        }

        fn timeout_ms(&self) -> u64 {
            1000
        }

        async fn fetch(&self, _payload: MappedPayload) -> ProviderResult<RawProviderResponse> {
            Ok(RawProviderResponse::new(self.0, Value::Null))
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::builder()
            .adapter(Arc::new(Stub(ProviderCode::Rma)))
            .adapter(Arc::new(Stub(ProviderCode::Axa)))
            .adapter_with_flag(Arc::new(Stub(ProviderCode::Sanlam)), false)
            .build()
    }

    #[test]
    fn enabled_in_code_order() {
        assert_eq!(registry().enabled(), vec![ProviderCode::Axa, ProviderCode::Rma]);
    }

    #[test]
    fn disabled_adapter_is_still_reachable() {
        let registry = registry();
        assert!(!registry.is_enabled(ProviderCode::Sanlam));
        assert!(registry.adapter(ProviderCode::Sanlam).is_some());
        assert!(registry.adapter(ProviderCode::Mcma).is_none());
    }

    mod resolve {
        use super::*;

        #[test]
        fn empty_subset_means_all_enabled() {
            let registry = registry();
            assert_eq!(registry.resolve(None), registry.enabled());
            assert_eq!(registry.resolve(Some(&[])), registry.enabled());
        }

        #[test]
        fn subset_is_filtered_and_deduplicated() {
            let subset = [
                ProviderCode::Rma,
                ProviderCode::Sanlam,
                ProviderCode::Rma,
                ProviderCode::Mcma,
            ];
            assert_eq!(registry().resolve(Some(&subset)), vec![ProviderCode::Rma]);
        }
    }
}
