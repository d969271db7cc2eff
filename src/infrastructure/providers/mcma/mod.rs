//! # MAMDA-MCMA Adapter
//!
//! Subscription-scoped API. `POST /subscriptions` creates a subscription and
//! returns a bearer token; `GET /subscriptions/{id}/packs` lists the packs for
//! that subscription. The `optimale` and `tout_risque` packs can be repriced
//! later with `GET /subscriptions/{id}/packs/{key}?...` under the same token.
//!
//! Response body handed to the normalizer:
//!
//! ```json
//! {"packs": {"essentielle": {...}, ...}, "subscription_id": "91", "token": "..."}
//! ```

pub mod payload;
pub mod response;

use crate::domain::catalog::mcma_pack_by_code;
use crate::domain::entities::session::{
    OptionSelections, SessionData, SessionHandle, UpdatedPricing,
};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::traits::{
    MappedPayload, ProviderAdapter, RawProviderResponse, SessionAdapter, payload_mismatch,
};
use async_trait::async_trait;
use payload::SubscriptionCreated;
use response::{ANNUAL_PRICE, SEMI_ANNUAL_PRICE, pack_block};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::debug;

/// Production endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://bo-sel.mamda-mcma.ma/api";

/// Tax rate applied on MCMA base prices.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(165, 0, 0, false, 3);

const NO_QUERY: [(&str, i64); 0] = [];

/// MAMDA-MCMA subscription adapter.
#[derive(Debug, Clone)]
pub struct McmaAdapter {
    client: HttpClient,
    base_url: String,
    tax_rate: Decimal,
}

impl McmaAdapter {
    /// Creates an adapter against `base_url` using the default tax rate.
    #[must_use]
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tax_rate: DEFAULT_TAX_RATE,
        }
    }

    /// Sets the tax rate applied on base prices.
    #[must_use]
    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Returns the tax rate applied on base prices.
    #[inline]
    #[must_use]
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

#[async_trait]
impl ProviderAdapter for McmaAdapter {
    fn provider(&self) -> ProviderCode {
        ProviderCode::Mcma
    }

    fn timeout_ms(&self) -> u64 {
        self.client.timeout_ms()
    }

    async fn fetch(&self, payload: MappedPayload) -> ProviderResult<RawProviderResponse> {
        let MappedPayload::Mcma(payload) = payload else {
            return Err(payload_mismatch(ProviderCode::Mcma, &payload));
        };

        let url = format!("{}/subscriptions", self.base_url);
        let created: SubscriptionCreated = self.client.post(&url, &payload).await?;
        let subscription_id = created.subscription.id_string();
        if subscription_id.is_empty() || created.token.is_empty() {
            return Err(ProviderError::protocol("subscription without id or token"));
        }

        let url = format!("{}/subscriptions/{}/packs", self.base_url, subscription_id);
        let packs: Value = self
            .client
            .get_with_bearer(&url, &created.token, &NO_QUERY)
            .await?;
        let empty = match &packs {
            Value::Object(map) => map.is_empty(),
            Value::Array(list) => list.is_empty(),
            _ => return Err(ProviderError::protocol("packs listing is not an object")),
        };
        if empty {
            return Err(ProviderError::rejected("no packs for this subscription"));
        }
        debug!(subscription = %subscription_id, "MCMA packs fetched");

        Ok(RawProviderResponse::new(
            ProviderCode::Mcma,
            json!({
                "packs": packs,
                "subscription_id": subscription_id,
                "token": created.token,
            }),
        ))
    }
}

#[async_trait]
impl SessionAdapter for McmaAdapter {
    fn provider(&self) -> ProviderCode {
        ProviderCode::Mcma
    }

    async fn update(
        &self,
        session: &SessionHandle,
        selections: &OptionSelections,
    ) -> ProviderResult<UpdatedPricing> {
        session.ensure_provider(ProviderCode::Mcma)?;
        let SessionData::TokenPair {
            subscription_id,
            token,
        } = &session.data
        else {
            return Err(DomainError::SessionShapeMismatch(ProviderCode::Mcma).into());
        };

        let pack = mcma_pack_by_code(&selections.plan_code)?;
        let query = pack.query(&selections.values)?;
        let url = format!(
            "{}/subscriptions/{}/packs/{}",
            self.base_url, subscription_id, pack.key
        );
        let raw: Value = self
            .client
            .get_with_bearer(&url, token, &query)
            .await
            .map_err(ProviderError::into_session_error)?;

        let annual = pack_block(&raw, ANNUAL_PRICE, self.tax_rate)?;
        let semi_annual = pack_block(&raw, SEMI_ANNUAL_PRICE, self.tax_rate)?;
        debug!(pack = pack.key, "MCMA pack repriced");

        Ok(UpdatedPricing {
            provider: ProviderCode::Mcma,
            plan_code: pack.key.to_string(),
            selections: query
                .into_iter()
                .map(|(code, value)| (code.to_string(), value))
                .collect(),
            annual,
            semi_annual,
            raw,
        })
    }
}
