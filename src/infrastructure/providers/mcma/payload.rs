//! MAMDA-MCMA subscription wire types.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/subscriptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McmaSubscriptionPayload {
    /// First registration, `YYYY-MM-DD`.
    pub date_of_circulation: String,
    /// Fiscal horsepower.
    pub horse_power: u32,
    /// `Essence` or `Diesel`.
    pub fuel: String,
    /// Current value.
    pub value_of_vehicle: i64,
    /// Value when new.
    pub value_of_new_vehicle: i64,
    /// Terms acceptance.
    pub agree_to_terms: bool,
}

/// Response of `POST /api/subscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCreated {
    /// Created subscription.
    pub subscription: Subscription,
    /// Bearer token scoped to the subscription.
    pub token: String,
}

/// Subscription reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    /// Id, numeric or textual upstream.
    pub id: serde_json::Value,
}

impl Subscription {
    /// Returns the id as text.
    #[must_use]
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
