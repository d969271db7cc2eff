//! # RMA Adapter
//!
//! RMA has no public pricing API; quotes come from the `rma_offers` workflow
//! run on the shared automation resource. Jobs go through the
//! [`AutomationQueue`] so only one workflow drives the resource at a time.
//!
//! Response body handed to the normalizer:
//!
//! ```json
//! {"annual": [...], "semi_annual": [...]}
//! ```

pub mod payload;

use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::automation::AutomationQueue;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::traits::{
    MappedPayload, ProviderAdapter, RawProviderResponse, payload_mismatch,
};
use async_trait::async_trait;
use payload::RmaWorkflowOutput;
use serde_json::{Value, json};
use tracing::{info, warn};

/// Workflow producing RMA offers for both cadences.
pub const OFFERS_WORKFLOW: &str = "rma_offers";

/// RMA adapter backed by the automation queue.
#[derive(Debug, Clone)]
pub struct RmaAdapter {
    queue: AutomationQueue,
}

impl RmaAdapter {
    /// Creates an adapter submitting jobs to `queue`.
    #[must_use]
    pub fn new(queue: AutomationQueue) -> Self {
        Self { queue }
    }

    /// Returns the queue this adapter submits to.
    #[must_use]
    pub fn queue(&self) -> &AutomationQueue {
        &self.queue
    }
}

/// Accepts either a list of offers or an `{"offers": [...]}` wrapper.
fn offer_list(value: Value) -> ProviderResult<Vec<Value>> {
    match value {
        Value::Array(offers) => Ok(offers),
        Value::Object(mut map) => match map.remove("offers") {
            Some(Value::Array(offers)) => Ok(offers),
            _ => Err(ProviderError::protocol("offers object without an offers list")),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(ProviderError::protocol("offers are not a list")),
    }
}

#[async_trait]
impl ProviderAdapter for RmaAdapter {
    fn provider(&self) -> ProviderCode {
        ProviderCode::Rma
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.queue.config().job_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    async fn fetch(&self, payload: MappedPayload) -> ProviderResult<RawProviderResponse> {
        let MappedPayload::Rma(payload) = payload else {
            return Err(payload_mismatch(ProviderCode::Rma, &payload));
        };
        let params = serde_json::to_value(&payload)
            .map_err(|e| ProviderError::internal(format!("unserializable RMA payload: {}", e)))?;

        let output = self.queue.run(OFFERS_WORKFLOW, params).await?;
        let output: RmaWorkflowOutput = serde_json::from_value(output)
            .map_err(|e| ProviderError::protocol(format!("unexpected workflow output: {}", e)))?;

        let Some(annual) = output.annual else {
            return Err(ProviderError::rejected("workflow returned no annual offers"));
        };
        let annual = offer_list(annual)?;
        let semi_annual = match output.semi_annual {
            Some(value) => offer_list(value).unwrap_or_else(|error| {
                warn!(
                    provider = %ProviderCode::Rma,
                    error = %error,
                    "unreadable semi-annual offers"
                );
                Vec::new()
            }),
            None => {
                warn!(
                    provider = %ProviderCode::Rma,
                    reason = output.semi_annual_error.as_deref().unwrap_or("missing"),
                    "semi-annual offers unavailable"
                );
                Vec::new()
            }
        };
        info!(
            annual = annual.len(),
            semi_annual = semi_annual.len(),
            "RMA offers collected"
        );

        Ok(RawProviderResponse::new(
            ProviderCode::Rma,
            json!({ "annual": annual, "semi_annual": semi_annual }),
        ))
    }
}
