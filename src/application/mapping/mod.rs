//! # Field Mapper
//!
//! Translates a [`CanonicalQuoteRequest`] into the payload each provider
//! expects.
//!
//! Mapping is a pure function of the request and the [`MappingContext`],
//! except for the placeholder phone and plate drawn by [`filler`]. It fails
//! only when a field the provider requires is absent; unknown enumeration
//! values take the defaults documented in [`tables`].
//!
//! Required fields per provider:
//!
//! - AXA: `date_mec`, `date_naissance`, `date_permis`
//! - SANLAM: `date_mec`, `date_naissance`
//! - MCMA: `date_mec`
//! - RMA: `nom`, `prenom`, `carburant`, `puissance_fiscale`, `date_mec`,
//!   `nombre_places`, `date_naissance`
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::application::mapping::{FieldMapper, MappingContext};
//! use motor_quote_aggregator::domain::entities::CanonicalQuoteRequest;
//! use motor_quote_aggregator::domain::value_objects::ProviderCode;
//! use rust_decimal::Decimal;
//!
//! let request = CanonicalQuoteRequest::new(Decimal::from(200_000), Decimal::from(150_000));
//! let err = FieldMapper::default()
//!     .map(&request, ProviderCode::Mcma, &MappingContext::today())
//!     .unwrap_err();
//! assert_eq!(err.field(), "date_mec");
//! ```

pub mod filler;
pub mod tables;

use crate::domain::entities::quote_request::CanonicalQuoteRequest;
use crate::domain::value_objects::enums::ProviderCode;
use crate::infrastructure::providers::axa::payload::{
    AxaContrat, AxaLeadInfos, AxaQuotationPayload, AxaVehicule,
};
use crate::infrastructure::providers::mcma::payload::McmaSubscriptionPayload;
use crate::infrastructure::providers::rma::payload::RmaPayload;
use crate::infrastructure::providers::sanlam::payload::{
    SanlamAgent, SanlamPerson, SanlamPricingPayload, SanlamVehicle,
};
use crate::infrastructure::providers::traits::MappedPayload;
use chrono::{FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Sanlam broker agent key used when none is configured.
pub const DEFAULT_SANLAM_AGENT_KEY: &str = "40213";

const DEFAULT_FISCAL_POWER: u32 = 6;
const DEFAULT_SEATS: u32 = 5;
const DEFAULT_LAST_NAME: &str = "Client";
const DEFAULT_FIRST_NAME: &str = "Test";
const DEFAULT_CITY: &str = "Casablanca";
const DEFAULT_LICENSE_DATE: &str = "2010-01-01";
const MOROCCO_UTC_OFFSET_SECS: i32 = 3600;

/// A field required by a provider is absent from the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required field: {field}")]
pub struct MissingFieldError {
    field: &'static str,
}

impl MissingFieldError {
    /// Creates an error naming `field`.
    #[must_use]
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }

    /// Returns the canonical name of the missing field.
    #[inline]
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }
}

/// Values fixed once per comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingContext {
    /// Effective date of the quotes, in the providers' time zone.
    pub today: NaiveDate,
}

impl MappingContext {
    /// Creates a context for an explicit date.
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Creates a context for the current date in Morocco (UTC+1).
    #[must_use]
    pub fn today() -> Self {
        let now = FixedOffset::east_opt(MOROCCO_UTC_OFFSET_SECS)
            .map_or_else(
                || Utc::now().date_naive(),
                |tz| Utc::now().with_timezone(&tz).date_naive(),
            );
        Self::new(now)
    }
}

/// Maps canonical requests to provider payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapper {
    sanlam_agent_key: String,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self {
            sanlam_agent_key: DEFAULT_SANLAM_AGENT_KEY.to_string(),
        }
    }
}

impl FieldMapper {
    /// Sets the Sanlam broker agent key.
    #[must_use]
    pub fn with_sanlam_agent_key(mut self, key: impl Into<String>) -> Self {
        self.sanlam_agent_key = key.into();
        self
    }

    /// Builds the payload for `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`MissingFieldError`] naming the first required field absent
    /// from the request.
    pub fn map(
        &self,
        request: &CanonicalQuoteRequest,
        provider: ProviderCode,
        context: &MappingContext,
    ) -> Result<MappedPayload, MissingFieldError> {
        match provider {
            ProviderCode::Axa => map_axa(request, context).map(MappedPayload::Axa),
            ProviderCode::Sanlam => self.map_sanlam(request, context),
            ProviderCode::Mcma => map_mcma(request).map(MappedPayload::Mcma),
            ProviderCode::Rma => map_rma(request).map(MappedPayload::Rma),
        }
    }

    fn map_sanlam(
        &self,
        request: &CanonicalQuoteRequest,
        context: &MappingContext,
    ) -> Result<MappedPayload, MissingFieldError> {
        let v = &request.vehicle;
        let a = &request.applicant;
        let date_mec = required(v.date_mec, "date_mec")?;
        let birth = required(a.date_naissance, "date_naissance")?;

        let phone = filler::international(&filler::phone_number());
        let license_date = a
            .date_permis
            .map_or_else(|| DEFAULT_LICENSE_DATE.to_string(), iso);
        let person = SanlamPerson {
            license_number: Some("1111111111".into()),
            license_date: Some(license_date),
            license_category: Some("B".into()),
            civility: Some("0".into()),
            last_name: text_or(a.nom.as_deref(), DEFAULT_LAST_NAME),
            first_name: text_or(a.prenom.as_deref(), DEFAULT_FIRST_NAME),
            birth_date: iso(birth),
            cin: "BJ1111111".into(),
            sex: "M".into(),
            nature: "1".into(),
            adress: "sample addresse".into(),
            city: text_or(a.ville.as_deref(), DEFAULT_CITY),
            postal_code: Some("20300".into()),
            phone_number: phone,
            title: "0".into(),
            profession: "12".into(),
            is_driver: Some(true),
        };
        let fuel = tables::fuel_or_default(v.carburant.as_deref());
        let plate = tables::plate_or_default(v.type_plaque.as_deref());

        let payload = SanlamPricingPayload {
            driver: person.clone(),
            subscriber: person,
            vehicle: SanlamVehicle {
                registration_number: filler::plate_number(),
                brand: tables::sanlam_brand(v.marque.as_deref()).to_string(),
                horse_power: v.puissance_fiscale.unwrap_or(DEFAULT_FISCAL_POWER).to_string(),
                model: "Autres".into(),
                usage_code: "1".into(),
                registration_format: tables::sanlam_plate(plate).into(),
                new_value: whole(v.valeur_neuf),
                combustion: tables::sanlam_fuel(fuel).into(),
                circulation_date: iso(date_mec),
                market_value: whole(v.valeur_actuelle),
                seats_number: v.nombre_places.unwrap_or(DEFAULT_SEATS),
            },
            agent: SanlamAgent {
                agentkey: self.sanlam_agent_key.clone(),
            },
            recaptcha: String::new(),
        };
        Ok(MappedPayload::Sanlam {
            payload,
            start_date: context.today,
        })
    }
}

fn map_axa(
    request: &CanonicalQuoteRequest,
    context: &MappingContext,
) -> Result<AxaQuotationPayload, MissingFieldError> {
    let v = &request.vehicle;
    let a = &request.applicant;
    let date_mec = required(v.date_mec, "date_mec")?;
    let birth = required(a.date_naissance, "date_naissance")?;
    let license = required(a.date_permis, "date_permis")?;
    let fuel = tables::fuel_or_default(v.carburant.as_deref());

    Ok(AxaQuotationPayload {
        contrat: AxaContrat {
            code_intermediaire: 592,
            code_produit: 115,
            nombre_fraction: 0,
            type_fractionnement: "f".into(),
            type_avenant: 1,
            sous_avenant: 1,
            date_effet: dmy(context.today),
            type_contrat: "DF".into(),
            mode_paiement: "12".into(),
            date_echeance: "0".into(),
            date_expiration: "0".into(),
            type_personne: "P".into(),
            assure_est_conducteur: "O".into(),
            identifiant: "a0".into(),
            date_naissance_conducteur: dmy(birth),
            is_fonctionnaire: "N".into(),
            code_convention: 0,
            new_client: "O".into(),
            nom: text_or(a.nom.as_deref(), DEFAULT_LAST_NAME),
            prenom: text_or(a.prenom.as_deref(), DEFAULT_FIRST_NAME),
            date_naissance_assure: dmy(birth),
            taux_reduction: 0,
        },
        vehicule: AxaVehicule {
            code_usage: "1B".into(),
            date_mis_circulation: dmy(date_mec),
            matricule: filler::plate_number(),
            valeur_neuf: whole(v.valeur_neuf),
            valeur_venale: whole(v.valeur_actuelle),
            valeur_amenagement: 0,
            energie: tables::axa_fuel(fuel).into(),
            puissance_fiscale: v.puissance_fiscale.unwrap_or(DEFAULT_FISCAL_POWER),
            code_carrosserie: "B1".into(),
            code_marque: 7,
            nombre_place: v.nombre_places.unwrap_or(DEFAULT_SEATS),
            date_mutation: "0".into(),
        },
        lead_infos: AxaLeadInfos {
            city: "CASABLANCA".into(),
            phone_number: filler::phone_number(),
            licence_date: dmy(license),
            brand_name: text_or(v.marque.as_deref(), "RENAULT").to_uppercase(),
            intermediate_name: "AKER ASSURANCE".into(),
            marketing_consent: true,
            cgu_consent: true,
        },
    })
}

fn map_mcma(request: &CanonicalQuoteRequest) -> Result<McmaSubscriptionPayload, MissingFieldError> {
    let v = &request.vehicle;
    let date_mec = required(v.date_mec, "date_mec")?;
    let fuel = tables::fuel_or_default(v.carburant.as_deref());

    Ok(McmaSubscriptionPayload {
        date_of_circulation: iso(date_mec),
        horse_power: v.puissance_fiscale.unwrap_or(DEFAULT_FISCAL_POWER),
        fuel: tables::mcma_fuel(fuel).into(),
        value_of_vehicle: whole(v.valeur_actuelle),
        value_of_new_vehicle: whole(v.valeur_neuf),
        agree_to_terms: true,
    })
}

fn map_rma(request: &CanonicalQuoteRequest) -> Result<RmaPayload, MissingFieldError> {
    let v = &request.vehicle;
    let a = &request.applicant;
    let nom = required(a.nom.clone(), "nom")?;
    let prenom = required(a.prenom.clone(), "prenom")?;
    let carburant = required(v.carburant.as_deref(), "carburant")?;
    let puissance_fiscale = required(v.puissance_fiscale, "puissance_fiscale")?;
    let date_mec = required(v.date_mec, "date_mec")?;
    let nombre_places = required(v.nombre_places, "nombre_places")?;
    let birth = required(a.date_naissance, "date_naissance")?;

    let fuel = tables::fuel_or_default(Some(carburant));
    let plate = tables::plate_or_default(v.type_plaque.as_deref());

    Ok(RmaPayload {
        nom,
        prenom,
        carburant: fuel.as_str().into(),
        code_carburant: tables::rma_fuel(fuel).into(),
        puissance_fiscale,
        date_mec: iso(date_mec),
        type_plaque: tables::rma_plate(plate).into(),
        immatriculation: filler::plate_number(),
        valeur_neuf: whole(v.valeur_neuf),
        valeur_actuelle: whole(v.valeur_actuelle),
        nombre_places,
        date_naissance: iso(birth),
        telephone: filler::phone_number(),
        date_permis: a
            .date_permis
            .map_or_else(|| DEFAULT_LICENSE_DATE.to_string(), iso),
        ville: text_or(a.ville.as_deref(), "CASABLANCA"),
    })
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, MissingFieldError> {
    value.ok_or(MissingFieldError::new(field))
}

fn text_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Whole currency units; providers take integer amounts.
fn whole(amount: Decimal) -> i64 {
    amount.trunc().to_i64().unwrap_or(i64::MAX)
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn dmy(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::quote_request::{ApplicantInfo, VehicleInfo};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_request() -> CanonicalQuoteRequest {
        CanonicalQuoteRequest::new(Decimal::from(200_000), Decimal::from(150_000))
            .with_vehicle(VehicleInfo {
                marque: Some("Renault".into()),
                modele: Some("Clio".into()),
                carburant: Some("diesel".into()),
                puissance_fiscale: Some(6),
                date_mec: Some(date(2019, 6, 1)),
                type_plaque: Some("standard".into()),
                immatriculation: None,
                valeur_neuf: Decimal::from(200_000),
                valeur_actuelle: Decimal::from(150_000),
                nombre_places: Some(5),
            })
            .with_applicant(ApplicantInfo {
                nom: Some("Alami".into()),
                prenom: Some("Yassine".into()),
                date_naissance: Some(date(1988, 5, 10)),
                date_permis: Some(date(2010, 1, 1)),
                ville: Some("Rabat".into()),
                ..ApplicantInfo::default()
            })
    }

    fn context() -> MappingContext {
        MappingContext::new(date(2025, 3, 15))
    }

    fn mapper() -> FieldMapper {
        FieldMapper::default()
    }

    /// Clears the fields drawn at random so two payloads can be compared.
    fn without_filler(payload: MappedPayload) -> MappedPayload {
        match payload {
            MappedPayload::Axa(mut p) => {
                p.vehicule.matricule.clear();
                p.lead_infos.phone_number.clear();
                MappedPayload::Axa(p)
            }
            MappedPayload::Sanlam {
                mut payload,
                start_date,
            } => {
                payload.vehicle.registration_number.clear();
                payload.driver.phone_number.clear();
                payload.subscriber.phone_number.clear();
                MappedPayload::Sanlam {
                    payload,
                    start_date,
                }
            }
            MappedPayload::Rma(mut p) => {
                p.immatriculation.clear();
                p.telephone.clear();
                MappedPayload::Rma(p)
            }
            other => other,
        }
    }

    mod axa {
        use super::*;

        #[test]
        fn formats_dates_day_first() {
            let mapped = mapper().map(&full_request(), ProviderCode::Axa, &context()).unwrap();
            let MappedPayload::Axa(p) = mapped else {
                unreachable!("AXA payload expected")
            };
            assert_eq!(p.contrat.date_effet, "15-03-2025");
            assert_eq!(p.contrat.date_naissance_conducteur, "10-05-1988");
            assert_eq!(p.vehicule.date_mis_circulation, "01-06-2019");
            assert_eq!(p.vehicule.energie, "G");
            assert_eq!(p.vehicule.valeur_venale, 150_000);
            assert_eq!(p.lead_infos.brand_name, "RENAULT");
            assert_eq!(p.lead_infos.licence_date, "01-01-2010");
        }

        #[test]
        fn requires_license_date() {
            let mut request = full_request();
            request.applicant.date_permis = None;
            let err = mapper().map(&request, ProviderCode::Axa, &context()).unwrap_err();
            assert_eq!(err.field(), "date_permis");
        }
    }

    mod sanlam {
        use super::*;

        #[test]
        fn maps_codes_and_phone() {
            let MappedPayload::Sanlam { payload, start_date } =
                mapper().map(&full_request(), ProviderCode::Sanlam, &context()).unwrap()
            else {
                unreachable!("Sanlam payload expected")
            };
            assert_eq!(start_date, date(2025, 3, 15));
            assert_eq!(payload.vehicle.brand, "2078");
            assert_eq!(payload.vehicle.combustion, "D");
            assert_eq!(payload.vehicle.registration_format, "3");
            assert_eq!(payload.vehicle.horse_power, "6");
            assert!(payload.driver.phone_number.starts_with("+2126"));
            assert_eq!(payload.driver.city, "Rabat");
            assert_eq!(payload.agent.agentkey, DEFAULT_SANLAM_AGENT_KEY);
        }

        #[test]
        fn unknown_brand_uses_default() {
            let mut request = full_request();
            request.vehicle.marque = Some("Lada".into());
            let mapper = mapper().with_sanlam_agent_key("99999");
            let MappedPayload::Sanlam { payload, .. } =
                mapper.map(&request, ProviderCode::Sanlam, &context()).unwrap()
            else {
                unreachable!("Sanlam payload expected")
            };
            assert_eq!(payload.vehicle.brand, tables::DEFAULT_SANLAM_BRAND);
            assert_eq!(payload.agent.agentkey, "99999");
        }
    }

    mod mcma {
        use super::*;

        #[test]
        fn electric_is_sent_as_diesel() {
            let mut request = full_request();
            request.vehicle.carburant = Some("electrique".into());
            let mapped = mapper().map(&request, ProviderCode::Mcma, &context()).unwrap();
            let MappedPayload::Mcma(p) = mapped else {
                unreachable!("MCMA payload expected")
            };
            assert_eq!(p.fuel, "Diesel");
            assert_eq!(p.date_of_circulation, "2019-06-01");
            assert_eq!(p.value_of_new_vehicle, 200_000);
        }

        #[test]
        fn only_needs_first_registration() {
            let mut request =
                CanonicalQuoteRequest::new(Decimal::from(100_000), Decimal::from(80_000));
            request.vehicle.date_mec = Some(date(2020, 1, 1));
            assert!(mapper().map(&request, ProviderCode::Mcma, &context()).is_ok());
        }
    }

    mod rma {
        use super::*;

        #[test]
        fn requires_identity() {
            let mut request = full_request();
            request.applicant.nom = None;
            let err = mapper().map(&request, ProviderCode::Rma, &context()).unwrap_err();
            assert_eq!(err.field(), "nom");

            let mut request = full_request();
            request.vehicle.nombre_places = None;
            let err = mapper().map(&request, ProviderCode::Rma, &context()).unwrap_err();
            assert_eq!(err.field(), "nombre_places");
        }

        #[test]
        fn maps_form_values() {
            let mapped = mapper().map(&full_request(), ProviderCode::Rma, &context()).unwrap();
            let MappedPayload::Rma(p) = mapped else {
                unreachable!("RMA payload expected")
            };
            assert_eq!(p.carburant, "diesel");
            assert_eq!(p.code_carburant, "2");
            assert_eq!(p.type_plaque, "Plaque standard");
            assert_eq!(p.date_naissance, "1988-05-10");
            assert_eq!(p.telephone.len(), 10);
        }
    }

    #[test]
    fn decimals_are_truncated_to_units() {
        assert_eq!(whole(Decimal::new(1_999_999, 1)), 199_999);
    }

    fn provider_strategy() -> impl Strategy<Value = ProviderCode> {
        prop::sample::select(ProviderCode::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn mapping_is_deterministic_apart_from_filler(
            provider in provider_strategy(),
            neuf in 10_000i64..2_000_000,
            ratio in 1i64..=100,
            power in 1u32..40,
        ) {
            let actuelle = neuf * ratio / 100;
            let mut request = full_request();
            request.vehicle.valeur_neuf = Decimal::from(neuf);
            request.vehicle.valeur_actuelle = Decimal::from(actuelle.max(1));
            request.vehicle.puissance_fiscale = Some(power);

            let first = mapper().map(&request, provider, &context()).unwrap();
            let second = mapper().map(&request, provider, &context()).unwrap();
            prop_assert_eq!(first.provider(), provider);
            prop_assert_eq!(without_filler(first), without_filler(second));
        }
    }
}
