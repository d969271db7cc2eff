//! # Canonical Quote Request
//!
//! The provider-neutral rate request submitted by a customer.
//!
//! Wire names follow the comparison form (`marque`, `valeur_neuf`, ...). Only
//! the two vehicle values are structurally required; every other attribute is
//! optional here and checked per provider by the field mapper.
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::domain::entities::quote_request::CanonicalQuoteRequest;
//!
//! let request: CanonicalQuoteRequest = serde_json::from_str(
//!     r#"{"valeur_neuf": 65000, "valeur_venale": 45000}"#,
//! ).unwrap();
//! assert!(request.validate().is_ok());
//! assert!(request.vehicle.date_mec.is_none());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::enums::ProviderCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Vehicle attributes of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VehicleInfo {
    /// Make, e.g. "Renault".
    #[serde(default, deserialize_with = "lenient::string")]
    pub marque: Option<String>,
    /// Model, e.g. "Clio".
    #[serde(default, deserialize_with = "lenient::string")]
    pub modele: Option<String>,
    /// Free-text fuel type; see [`FuelType`](crate::domain::value_objects::enums::FuelType).
    #[serde(default, deserialize_with = "lenient::string")]
    pub carburant: Option<String>,
    /// Fiscal horsepower.
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub puissance_fiscale: Option<u32>,
    /// First registration date.
    #[serde(default, deserialize_with = "lenient::date")]
    pub date_mec: Option<NaiveDate>,
    /// Free-text plate type; see [`PlateType`](crate::domain::value_objects::enums::PlateType).
    #[serde(default, deserialize_with = "lenient::string")]
    pub type_plaque: Option<String>,
    /// Registration number.
    #[serde(default, deserialize_with = "lenient::string")]
    pub immatriculation: Option<String>,
    /// Value when new.
    pub valeur_neuf: Decimal,
    /// Current market value.
    #[serde(alias = "valeur_venale")]
    pub valeur_actuelle: Decimal,
    /// Number of seats.
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub nombre_places: Option<u32>,
}

/// Applicant attributes of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicantInfo {
    /// Last name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub nom: Option<String>,
    /// First name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub prenom: Option<String>,
    /// Birth date.
    #[serde(default, deserialize_with = "lenient::date")]
    pub date_naissance: Option<NaiveDate>,
    /// Driving license issue date.
    #[serde(default, deserialize_with = "lenient::date")]
    pub date_permis: Option<NaiveDate>,
    /// City of residence.
    #[serde(default, deserialize_with = "lenient::string")]
    pub ville: Option<String>,
    /// Phone number.
    #[serde(default, deserialize_with = "lenient::string")]
    pub telephone: Option<String>,
    /// Email address.
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: Option<String>,
    /// Current insurer, informational only.
    #[serde(default, deserialize_with = "lenient::string")]
    pub assureur_actuel: Option<String>,
}

/// A customer rate request.
///
/// Created once per comparison and shared read-only by every provider pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalQuoteRequest {
    /// Vehicle attributes.
    #[serde(flatten)]
    pub vehicle: VehicleInfo,
    /// Applicant attributes.
    #[serde(flatten)]
    pub applicant: ApplicantInfo,
    /// Optional explicit provider subset.
    #[serde(
        default,
        rename = "selected_scrapers",
        alias = "providers",
        skip_serializing_if = "Option::is_none"
    )]
    pub providers: Option<Vec<ProviderCode>>,
}

impl CanonicalQuoteRequest {
    /// Creates a request carrying only the two vehicle values.
    #[must_use]
    pub fn new(valeur_neuf: Decimal, valeur_actuelle: Decimal) -> Self {
        Self {
            vehicle: VehicleInfo {
                marque: None,
                modele: None,
                carburant: None,
                puissance_fiscale: None,
                date_mec: None,
                type_plaque: None,
                immatriculation: None,
                valeur_neuf,
                valeur_actuelle,
                nombre_places: None,
            },
            applicant: ApplicantInfo::default(),
            providers: None,
        }
    }

    /// Sets the vehicle attributes, keeping the two values already set.
    #[must_use]
    pub fn with_vehicle(mut self, vehicle: VehicleInfo) -> Self {
        self.vehicle = vehicle;
        self
    }

    /// Sets the applicant attributes.
    #[must_use]
    pub fn with_applicant(mut self, applicant: ApplicantInfo) -> Self {
        self.applicant = applicant;
        self
    }

    /// Restricts the comparison to the given providers.
    #[must_use]
    pub fn with_providers(mut self, providers: impl IntoIterator<Item = ProviderCode>) -> Self {
        self.providers = Some(providers.into_iter().collect());
        self
    }

    /// Checks the structural invariants shared by every provider.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` if a vehicle value is not positive,
    /// the current value exceeds the new value, or seats/fiscal power are zero.
    pub fn validate(&self) -> DomainResult<()> {
        let v = &self.vehicle;
        if v.valeur_neuf <= Decimal::ZERO {
            return Err(DomainError::invalid_field(
                "valeur_neuf",
                "vehicle values must be positive",
            ));
        }
        if v.valeur_actuelle <= Decimal::ZERO {
            return Err(DomainError::invalid_field(
                "valeur_actuelle",
                "vehicle values must be positive",
            ));
        }
        if v.valeur_actuelle > v.valeur_neuf {
            return Err(DomainError::invalid_field(
                "valeur_actuelle",
                "current value cannot exceed new vehicle value",
            ));
        }
        if v.nombre_places == Some(0) {
            return Err(DomainError::invalid_field(
                "nombre_places",
                "must be at least 1",
            ));
        }
        if v.puissance_fiscale == Some(0) {
            return Err(DomainError::invalid_field(
                "puissance_fiscale",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Form-tolerant deserializers: empty strings are absent, numbers may be quoted.
mod lenient {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, de::Error};
    use serde_json::Value;

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn unsigned<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected a positive integer, got {n}"))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u32>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a positive integer, got '{s}'"))),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(D::Error::custom(format!(
                "expected a positive integer, got {other}"
            ))),
        }
    }

    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{s}'"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_form() -> serde_json::Value {
        json!({
            "marque": "Renault",
            "modele": "Clio",
            "carburant": "diesel",
            "nombre_places": 5,
            "puissance_fiscale": "6",
            "date_mec": "2020-05-15",
            "type_plaque": "standard",
            "immatriculation": "",
            "valeur_neuf": 200000,
            "valeur_actuelle": 150000,
            "nom": "Alami",
            "prenom": "Ahmed",
            "date_naissance": "15/01/1990",
            "date_permis": "2010-03-20",
            "ville": "Casablanca",
            "selected_scrapers": ["axa", "rma"]
        })
    }

    mod deserialization {
        use super::*;

        #[test]
        fn full_form_parses() {
            let req: CanonicalQuoteRequest = serde_json::from_value(full_form()).unwrap();
            assert_eq!(req.vehicle.marque.as_deref(), Some("Renault"));
            assert_eq!(req.vehicle.puissance_fiscale, Some(6));
            assert_eq!(req.vehicle.immatriculation, None);
            assert_eq!(
                req.applicant.date_naissance,
                NaiveDate::from_ymd_opt(1990, 1, 15)
            );
            assert_eq!(
                req.providers,
                Some(vec![ProviderCode::Axa, ProviderCode::Rma])
            );
        }

        #[test]
        fn legacy_alias_is_accepted() {
            let req: CanonicalQuoteRequest =
                serde_json::from_value(json!({"valeur_neuf": 65000, "valeur_venale": 45000}))
                    .unwrap();
            assert_eq!(req.vehicle.valeur_actuelle, Decimal::from(45000));
            assert!(req.providers.is_none());
        }

        #[test]
        fn providers_alias_is_accepted() {
            let req: CanonicalQuoteRequest = serde_json::from_value(json!({
                "valeur_neuf": 1000, "valeur_actuelle": 900, "providers": ["mcma"]
            }))
            .unwrap();
            assert_eq!(req.providers, Some(vec![ProviderCode::Mcma]));
        }

        #[test]
        fn missing_values_are_rejected() {
            let result: Result<CanonicalQuoteRequest, _> =
                serde_json::from_value(json!({"marque": "Dacia"}));
            assert!(result.is_err());
        }

        #[test]
        fn bad_date_is_rejected() {
            let mut form = full_form();
            form["date_mec"] = json!("not a date");
            let result: Result<CanonicalQuoteRequest, _> = serde_json::from_value(form);
            assert!(result.is_err());
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn valid_request_passes() {
            let req = CanonicalQuoteRequest::new(Decimal::from(200_000), Decimal::from(150_000));
            assert!(req.validate().is_ok());
        }

        #[test]
        fn non_positive_value_fails() {
            let req = CanonicalQuoteRequest::new(Decimal::ZERO, Decimal::ZERO);
            assert!(matches!(
                req.validate(),
                Err(DomainError::InvalidField {
                    field: "valeur_neuf",
                    ..
                })
            ));
        }

        #[test]
        fn current_above_new_fails() {
            let req = CanonicalQuoteRequest::new(Decimal::from(100), Decimal::from(101));
            assert!(matches!(
                req.validate(),
                Err(DomainError::InvalidField {
                    field: "valeur_actuelle",
                    ..
                })
            ));
        }

        #[test]
        fn zero_seats_fails() {
            let mut req: CanonicalQuoteRequest = serde_json::from_value(full_form()).unwrap();
            req.vehicle.nombre_places = Some(0);
            assert!(req.validate().is_err());
        }
    }
}
