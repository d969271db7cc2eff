//! Provider code tables.
//!
//! Canonical enumeration values translated to each provider's codes. Values
//! the request does not carry, or that do not parse, take the documented
//! default of the table instead of failing.

use crate::domain::value_objects::enums::{FuelType, PlateType};

/// Fuel assumed when the request carries none or an unknown value.
pub const DEFAULT_FUEL: FuelType = FuelType::Diesel;

/// Sanlam brand code used for unlisted makes (Mercedes).
pub const DEFAULT_SANLAM_BRAND: &str = "10819";

/// Parses a free-text fuel, falling back to [`DEFAULT_FUEL`].
#[must_use]
pub fn fuel_or_default(raw: Option<&str>) -> FuelType {
    raw.and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_FUEL)
}

/// Parses a free-text plate type, falling back to a standard plate.
#[must_use]
pub fn plate_or_default(raw: Option<&str>) -> PlateType {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// AXA `energie` code. Hybrids are priced as their combustion fuel.
#[must_use]
pub const fn axa_fuel(fuel: FuelType) -> &'static str {
    match fuel {
        FuelType::Essence | FuelType::HybridEssence => "E",
        FuelType::Diesel | FuelType::HybridDiesel => "G",
        FuelType::Electric => "W",
    }
}

/// Sanlam `combustion` code.
#[must_use]
pub const fn sanlam_fuel(fuel: FuelType) -> &'static str {
    match fuel {
        FuelType::Essence => "E",
        FuelType::Diesel => "D",
        FuelType::HybridEssence => "S",
        FuelType::HybridDiesel => "M",
        FuelType::Electric => "L",
    }
}

/// MCMA `fuel` value. MCMA does not price electric vehicles; they are sent as
/// diesel.
#[must_use]
pub const fn mcma_fuel(fuel: FuelType) -> &'static str {
    match fuel {
        FuelType::Essence | FuelType::HybridEssence => "Essence",
        FuelType::Diesel | FuelType::HybridDiesel | FuelType::Electric => "Diesel",
    }
}

/// Position of the fuel in the RMA form list.
#[must_use]
pub const fn rma_fuel(fuel: FuelType) -> &'static str {
    match fuel {
        FuelType::Essence => "1",
        FuelType::Diesel => "2",
        FuelType::Electric => "3",
        FuelType::HybridEssence => "4",
        FuelType::HybridDiesel => "5",
    }
}

/// Sanlam `registrationFormat` code.
#[must_use]
pub const fn sanlam_plate(plate: PlateType) -> &'static str {
    match plate {
        PlateType::Standard => "3",
        PlateType::Ww => "2",
    }
}

/// RMA plate type label.
#[must_use]
pub const fn rma_plate(plate: PlateType) -> &'static str {
    match plate {
        PlateType::Standard => "Plaque standard",
        PlateType::Ww => "WW",
    }
}

const SANLAM_BRANDS: &[(&str, &str)] = &[
    ("audi", "2003"),
    ("bmw", "1976"),
    ("citroen", "2054"),
    ("dacia", "2100"),
    ("fiat", "2200"),
    ("ford", "2300"),
    ("hyundai", "2500"),
    ("kia", "2700"),
    ("mazda", "2700"),
    ("mercedes", "10819"),
    ("nissan", "2800"),
    ("peugeot", "3016"),
    ("renault", "2078"),
    ("toyota", "2860"),
    ("volkswagen", "2900"),
];

/// Sanlam brand code for a make, falling back to [`DEFAULT_SANLAM_BRAND`].
#[must_use]
pub fn sanlam_brand(make: Option<&str>) -> &'static str {
    let Some(make) = make.map(|m| m.trim().to_lowercase()) else {
        return DEFAULT_SANLAM_BRAND;
    };
    SANLAM_BRANDS
        .iter()
        .find(|(name, _)| *name == make)
        .map_or(DEFAULT_SANLAM_BRAND, |&(_, code)| code)
}
