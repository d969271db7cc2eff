//! # Quote Update Service
//!
//! Reprices one plan of an earlier comparison with new option selections,
//! through the session handle the provider issued.
//!
//! Selections are checked against the plan catalog before any upstream call,
//! so an unknown plan or option level is a validation error and never reaches
//! the provider.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::registry::ProviderRegistry;
use crate::domain::catalog::{axa_pack_by_code, mcma_pack_by_code};
use crate::domain::entities::session::{OptionSelections, SessionHandle, UpdatedPricing};
use crate::domain::value_objects::enums::ProviderCode;
use crate::domain::value_objects::ids::ComparisonId;
use crate::infrastructure::persistence::traits::SessionStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Service repricing plans through provider sessions.
#[derive(Debug, Clone)]
pub struct QuoteUpdateService {
    registry: Arc<ProviderRegistry>,
    store: Option<Arc<dyn SessionStore>>,
}

impl QuoteUpdateService {
    /// Creates a service without a session store.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            store: None,
        }
    }

    /// Attaches the store comparisons record their handles in.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Reprices a plan through `session`.
    ///
    /// # Errors
    ///
    /// - `Unsupported` if the provider has no update flow
    /// - `Validation` if the handle belongs to another provider, or the plan or
    ///   an option is unknown
    /// - `Provider` if the upstream call fails
    pub async fn update(
        &self,
        provider: ProviderCode,
        session: &SessionHandle,
        selections: &OptionSelections,
    ) -> ApplicationResult<UpdatedPricing> {
        if !provider.supports_updates() {
            return Err(ApplicationError::Unsupported(provider));
        }
        session.ensure_provider(provider)?;
        check_selections(provider, selections)?;

        let adapter = self
            .registry
            .session_adapter(provider)
            .ok_or(ApplicationError::Unsupported(provider))?;

        debug!(
            provider = %provider,
            plan = %selections.plan_code,
            cadence = %selections.cadence,
            "repricing plan"
        );
        let updated = adapter.update(session, selections).await.map_err(|e| {
            warn!(provider = %provider, error = %e, "update failed");
            ApplicationError::from(e)
        })?;
        info!(
            provider = %provider,
            plan = %updated.plan_code,
            "plan repriced"
        );
        Ok(updated)
    }

    /// Reprices a plan using the handle recorded for comparison `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no live handle was recorded for that comparison and
    /// provider, and otherwise the errors of [`update`](Self::update).
    pub async fn update_from_comparison(
        &self,
        id: ComparisonId,
        provider: ProviderCode,
        selections: &OptionSelections,
    ) -> ApplicationResult<UpdatedPricing> {
        if !provider.supports_updates() {
            return Err(ApplicationError::Unsupported(provider));
        }
        let not_found = || ApplicationError::not_found("session", format!("{}/{}", id, provider));
        let store = self.store.as_ref().ok_or_else(not_found)?;
        let session = store.get(&id, provider).await?.ok_or_else(not_found)?;
        self.update(provider, &session, selections).await
    }
}

fn check_selections(
    provider: ProviderCode,
    selections: &OptionSelections,
) -> ApplicationResult<()> {
    match provider {
        ProviderCode::Axa => {
            axa_pack_by_code(&selections.plan_code)?.resolve_guarantees(&selections.values)?;
        }
        ProviderCode::Mcma => {
            mcma_pack_by_code(&selections.plan_code)?.query(&selections.values)?;
        }
        ProviderCode::Sanlam | ProviderCode::Rma => {}
    }
    Ok(())
}
