//! # Sanlam Adapter
//!
//! Stateless pricing API with a detail fan-out. For each billing cadence:
//!
//! 1. `POST /api/auto/recalculate-pricing` returns the candidate formulas and a
//!    saved draft policy id
//! 2. `POST /api/auto/formula-pricing` prices each formula in turn, paced by a
//!    rate limiter shared by every call of this adapter
//!
//! A formula whose detail call fails keeps its slot as `null`, so both
//! cadence lists stay indexed by formula. The normalizer receives
//! `{"annual": [...], "semi_annual": [...]}`.

pub mod payload;

use crate::domain::value_objects::enums::{BillingCadence, ProviderCode};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::traits::{
    MappedPayload, ProviderAdapter, RawProviderResponse, payload_mismatch,
};
use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use payload::{
    FormulaPricing, RecalculatedPricing, SanlamAgent, SanlamCadenceRequest, SanlamEnvelope,
    SanlamFormulaRequest, SanlamPolicy, SanlamPricingPayload,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Production endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://souscription-en-ligne.sanlam.ma";

/// Default spacing between formula detail calls.
pub const DEFAULT_FORMULA_PACE: Duration = Duration::from_secs(1);

const STATUS_OK: i64 = 200;

/// Sanlam pricing adapter.
#[derive(Debug, Clone)]
pub struct SanlamAdapter {
    client: HttpClient,
    base_url: String,
    pacer: Option<Arc<DefaultDirectRateLimiter>>,
}

impl SanlamAdapter {
    /// Creates an adapter pacing detail calls one per `pace`. A zero pace
    /// disables pacing.
    #[must_use]
    pub fn new(client: HttpClient, base_url: impl Into<String>, pace: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pacer: Quota::with_period(pace).map(|quota| Arc::new(RateLimiter::direct(quota))),
        }
    }

    async fn formulas(
        &self,
        payload: &SanlamPricingPayload,
        start_date: NaiveDate,
        cadence: BillingCadence,
    ) -> ProviderResult<Vec<Value>> {
        let url = format!("{}/api/auto/recalculate-pricing", self.base_url);
        let request = SanlamCadenceRequest {
            base: payload,
            policy: policy_window(start_date, cadence),
        };
        let envelope: SanlamEnvelope<RecalculatedPricing> = self.client.post(&url, &request).await?;
        if envelope.status != Some(STATUS_OK) {
            return Err(ProviderError::rejected(envelope.message.unwrap_or_else(|| {
                format!("pricing status {}", envelope.status.unwrap_or_default())
            })));
        }

        let data = envelope.data.unwrap_or_default();
        let Some(policy_id) = data.saved_policy.and_then(|p| p.id) else {
            debug!(cadence = %cadence, "Sanlam returned no saved policy");
            return Ok(Vec::new());
        };

        let mut details = Vec::with_capacity(data.formulas.len());
        for formula in &data.formulas {
            if let Some(pacer) = &self.pacer {
                pacer.until_ready().await;
            }
            let pricing = match self.formula_pricing(formula, &payload.agent, &policy_id).await {
                Ok(Some(pricing)) => pricing,
                Ok(None) => {
                    debug!(cadence = %cadence, "formula returned no pricing");
                    Value::Null
                }
                Err(error) => {
                    warn!(cadence = %cadence, error = %error, "skipping Sanlam formula");
                    Value::Null
                }
            };
            details.push(pricing);
        }
        Ok(details)
    }

    async fn formula_pricing(
        &self,
        formula: &Value,
        agent: &SanlamAgent,
        policy_id: &Value,
    ) -> ProviderResult<Option<Value>> {
        let url = format!("{}/api/auto/formula-pricing", self.base_url);
        let request = SanlamFormulaRequest {
            formula,
            agent,
            id: policy_id,
        };
        let envelope: SanlamEnvelope<FormulaPricing> = self.client.post(&url, &request).await?;
        if envelope.status != Some(STATUS_OK) {
            return Err(ProviderError::rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "formula pricing rejected".to_string()),
            ));
        }
        Ok(envelope.data.and_then(|d| d.pricing))
    }
}

/// Cover runs from `start` to the day before the term ends.
fn policy_window(start: NaiveDate, cadence: BillingCadence) -> SanlamPolicy {
    let end = start
        .checked_add_months(Months::new(cadence.months()))
        .and_then(|d| d.pred_opt())
        .unwrap_or(start);
    SanlamPolicy {
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.format("%Y-%m-%d").to_string(),
        maturity_contract_type: "2".to_string(),
        duration: cadence.months(),
    }
}

#[async_trait]
impl ProviderAdapter for SanlamAdapter {
    fn provider(&self) -> ProviderCode {
        ProviderCode::Sanlam
    }

    fn timeout_ms(&self) -> u64 {
        self.client.timeout_ms()
    }

    async fn fetch(&self, payload: MappedPayload) -> ProviderResult<RawProviderResponse> {
        let (payload, start_date) = match payload {
            MappedPayload::Sanlam {
                payload,
                start_date,
            } => (payload, start_date),
            other => return Err(payload_mismatch(ProviderCode::Sanlam, &other)),
        };

        let annual = self
            .formulas(&payload, start_date, BillingCadence::Annual)
            .await?;
        let semi_annual = match self
            .formulas(&payload, start_date, BillingCadence::SemiAnnual)
            .await
        {
            Ok(formulas) => formulas,
            Err(error) => {
                warn!(
                    provider = %ProviderCode::Sanlam,
                    error = %error,
                    "semi-annual pricing failed"
                );
                Vec::new()
            }
        };
        debug!(
            annual = annual.len(),
            semi_annual = semi_annual.len(),
            "Sanlam formulas priced"
        );

        Ok(RawProviderResponse::new(
            ProviderCode::Sanlam,
            json!({ "annual": annual, "semi_annual": semi_annual }),
        ))
    }
}
