//! # Provider Branding
//!
//! Display metadata attached to every provider outcome and plan.

use crate::domain::value_objects::enums::ProviderCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Branding metadata of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderInfo {
    /// Provider code.
    pub code: ProviderCode,
    /// Display name.
    pub name: String,
    /// Brand color, `#RRGGBB`.
    pub color: String,
    /// Logo URL.
    pub logo: String,
}

impl ProviderInfo {
    /// Returns the branding of `provider`.
    #[must_use]
    pub fn for_provider(provider: ProviderCode) -> Self {
        let (name, color, logo) = match provider {
            ProviderCode::Axa => (
                "AXA Assurance",
                "#00008F",
                concat!(
                    "https://upload.wikimedia.org/wikipedia/commons/thumb/9/90/",
                    "Logo_of_AXA.svg/1280px-Logo_of_AXA.svg.png"
                ),
            ),
            ProviderCode::Sanlam => (
                "Sanlam Assurance",
                "#0066B3",
                "https://www.sanlam.ma/themes/custom/flavor/logo.svg",
            ),
            ProviderCode::Rma => (
                "RMA Assurance",
                "#1E3A8A",
                "https://direct.rmaassurance.com/assets/images/logo-rma.svg",
            ),
            ProviderCode::Mcma => (
                "MAMDA-MCMA",
                "#2fd0a7",
                "https://www.mamda-mcma.ma/themes/custom/mamda/logo.svg",
            ),
        };
        Self {
            code: provider,
            name: name.to_string(),
            color: color.to_string(),
            logo: logo.to_string(),
        }
    }
}

/// Provider listing entry: branding plus the enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderListing {
    /// Branding.
    #[serde(flatten)]
    pub info: ProviderInfo,
    /// Whether the provider takes part in comparisons.
    pub enabled: bool,
}
