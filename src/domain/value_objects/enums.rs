//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! This module provides the closed enumerations used throughout the quote engine:
//!
//! - [`ProviderCode`] - The upstream insurers the engine can query
//! - [`BillingCadence`] - Annual or semi-annual premium billing
//! - [`FuelType`] - Canonical vehicle fuel types
//! - [`PlateType`] - Canonical registration plate formats
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits. Wire values are the lowercase codes
//! used by the comparison form.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream insurance provider.
///
/// Ordered so that maps keyed by provider iterate deterministically.
///
/// # Examples
///
/// ```
/// use motor_quote_aggregator::domain::value_objects::enums::ProviderCode;
///
/// let code: ProviderCode = "SANLAM".parse().unwrap();
/// assert_eq!(code, ProviderCode::Sanlam);
/// assert_eq!(code.to_string(), "sanlam");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ProviderCode {
    /// AXA Assurance: stateless quotation API with signed-quotation updates.
    Axa = 0,
    /// Sanlam Assurance: stateless pricing API with per-formula details.
    Sanlam = 1,
    /// RMA Assurance: no stable API, driven through browser automation.
    Rma = 2,
    /// MAMDA-MCMA: subscription/token session API.
    Mcma = 3,
}

impl ProviderCode {
    /// Every provider, in registry order.
    pub const ALL: [Self; 4] = [Self::Axa, Self::Sanlam, Self::Rma, Self::Mcma];

    /// Returns the lowercase wire code.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Axa => "axa",
            Self::Sanlam => "sanlam",
            Self::Rma => "rma",
            Self::Mcma => "mcma",
        }
    }

    /// Returns true if the provider is reached through the automation queue.
    #[inline]
    #[must_use]
    pub const fn is_automated(self) -> bool {
        matches!(self, Self::Rma)
    }

    /// Returns true if the provider supports later quote updates.
    #[inline]
    #[must_use]
    pub const fn supports_updates(self) -> bool {
        matches!(self, Self::Axa | Self::Mcma)
    }
}

impl fmt::Display for ProviderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderCode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "axa" => Ok(Self::Axa),
            "sanlam" => Ok(Self::Sanlam),
            "rma" => Ok(Self::Rma),
            "mcma" | "mamda" | "mamda-mcma" => Ok(Self::Mcma),
            _ => Err(ParseEnumError::InvalidValue("ProviderCode", s.to_string())),
        }
    }
}

/// Billing cadence of a premium.
///
/// # Examples
///
/// ```
/// use motor_quote_aggregator::domain::value_objects::enums::BillingCadence;
///
/// assert_eq!(BillingCadence::SemiAnnual.months(), 6);
/// assert_eq!("semi".parse::<BillingCadence>().unwrap(), BillingCadence::SemiAnnual);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BillingCadence {
    /// Twelve month policy.
    #[default]
    Annual,
    /// Six month policy.
    SemiAnnual,
}

impl BillingCadence {
    /// Returns the policy duration in months.
    #[inline]
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Annual => 12,
            Self::SemiAnnual => 6,
        }
    }

    /// Returns the two-digit payment mode code used by quotation APIs.
    #[inline]
    #[must_use]
    pub const fn payment_mode(self) -> &'static str {
        match self {
            Self::Annual => "12",
            Self::SemiAnnual => "06",
        }
    }
}

impl fmt::Display for BillingCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual => write!(f, "annual"),
            Self::SemiAnnual => write!(f, "semi_annual"),
        }
    }
}

impl FromStr for BillingCadence {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "annual" | "12" => Ok(Self::Annual),
            "semi_annual" | "semi" | "06" | "6" => Ok(Self::SemiAnnual),
            _ => Err(ParseEnumError::InvalidValue(
                "BillingCadence",
                s.to_string(),
            )),
        }
    }
}

/// Canonical vehicle fuel type.
///
/// Requests carry fuel as free text; values that do not parse are treated as
/// unmapped and each provider falls back to its documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FuelType {
    /// Petrol.
    #[serde(rename = "essence")]
    Essence,
    /// Diesel.
    #[serde(rename = "diesel")]
    Diesel,
    /// Petrol hybrid.
    #[serde(rename = "hybrid-e")]
    HybridEssence,
    /// Diesel hybrid.
    #[serde(rename = "hybrid-d")]
    HybridDiesel,
    /// Battery electric.
    #[serde(rename = "electrique")]
    Electric,
}

impl FuelType {
    /// Returns the canonical wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Essence => "essence",
            Self::Diesel => "diesel",
            Self::HybridEssence => "hybrid-e",
            Self::HybridDiesel => "hybrid-d",
            Self::Electric => "electrique",
        }
    }

    /// Returns true for the two hybrid variants.
    #[must_use]
    pub const fn is_hybrid(self) -> bool {
        matches!(self, Self::HybridEssence | Self::HybridDiesel)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "essence" | "petrol" | "gasoline" => Ok(Self::Essence),
            "diesel" | "gasoil" => Ok(Self::Diesel),
            "hybrid-e" | "hybride essence" => Ok(Self::HybridEssence),
            "hybrid-d" | "hybride diesel" => Ok(Self::HybridDiesel),
            "electrique" | "électrique" | "electric" => Ok(Self::Electric),
            _ => Err(ParseEnumError::InvalidValue("FuelType", s.to_string())),
        }
    }
}

/// Canonical registration plate format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PlateType {
    /// Standard national plate.
    #[default]
    Standard,
    /// Temporary "WW" plate for vehicles awaiting registration.
    Ww,
}

impl fmt::Display for PlateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Ww => write!(f, "ww"),
        }
    }
}

impl FromStr for PlateType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "fx" => Ok(Self::Standard),
            "ww" => Ok(Self::Ww),
            _ => Err(ParseEnumError::InvalidValue("PlateType", s.to_string())),
        }
    }
}

/// Error type for parsing enum values from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    InvalidValue(&'static str, String),
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(enum_name, value) => {
                write!(f, "invalid {} value: '{}'", enum_name, value)
            }
        }
    }
}

impl std::error::Error for ParseEnumError {}
