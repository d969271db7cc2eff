//! Sanlam pricing wire types.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auto/recalculate-pricing`, minus the policy window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanlamPricingPayload {
    /// Main driver.
    pub driver: SanlamPerson,
    /// Policy holder.
    pub subscriber: SanlamPerson,
    /// Insured vehicle.
    pub vehicle: SanlamVehicle,
    /// Broker agent.
    pub agent: SanlamAgent,
    /// Left empty; the API does not check it for agents.
    pub recaptcha: String,
}

/// A person block; driver and subscriber share the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SanlamPerson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub civility: Option<String>,
    pub last_name: String,
    pub first_name: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    #[serde(rename = "CIN")]
    pub cin: String,
    pub sex: String,
    pub nature: String,
    /// The upstream spells it this way.
    pub adress: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub phone_number: String,
    pub title: String,
    pub profession: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_driver: Option<bool>,
}

/// Vehicle block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SanlamVehicle {
    pub registration_number: String,
    /// Numeric brand code as text.
    pub brand: String,
    pub horse_power: String,
    pub model: String,
    pub usage_code: String,
    /// `"3"` standard, `"2"` WW.
    pub registration_format: String,
    pub new_value: i64,
    /// `E`, `D`, `S`, `M` or `L`.
    pub combustion: String,
    pub circulation_date: String,
    pub market_value: i64,
    pub seats_number: u32,
}

/// Broker agent block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanlamAgent {
    /// Agent key.
    pub agentkey: String,
}

/// Policy window appended per cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanlamPolicy {
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `YYYY-MM-DD`, the day before the term ends.
    pub end_date: String,
    /// Always `"2"`.
    pub maturity_contract_type: String,
    /// Term in months.
    pub duration: u32,
}

/// Pricing payload with its policy window.
#[derive(Debug, Clone, Serialize)]
pub struct SanlamCadenceRequest<'a> {
    /// Shared payload.
    #[serde(flatten)]
    pub base: &'a SanlamPricingPayload,
    /// Cadence window.
    pub policy: SanlamPolicy,
}

/// Body of `POST /api/auto/formula-pricing`.
#[derive(Debug, Clone, Serialize)]
pub struct SanlamFormulaRequest<'a> {
    /// Formula object as returned by recalculate-pricing.
    pub formula: &'a serde_json::Value,
    /// Broker agent.
    pub agent: &'a SanlamAgent,
    /// Saved policy id.
    pub id: &'a serde_json::Value,
}

/// Envelope of both Sanlam endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SanlamEnvelope<T> {
    /// Business status; 200 on success.
    #[serde(default)]
    pub status: Option<i64>,
    /// Payload.
    pub data: Option<T>,
    /// Failure message.
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` of recalculate-pricing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculatedPricing {
    /// Formula objects to price one by one.
    #[serde(default)]
    pub formulas: Vec<serde_json::Value>,
    /// Saved draft policy.
    #[serde(default)]
    pub saved_policy: Option<SavedPolicy>,
}

/// Saved draft policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedPolicy {
    /// Policy id, numeric or textual.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// `data` of formula-pricing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormulaPricing {
    /// Priced formula.
    #[serde(default)]
    pub pricing: Option<serde_json::Value>,
}
