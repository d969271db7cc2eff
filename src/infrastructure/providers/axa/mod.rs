//! # AXA Adapter
//!
//! Stateless quotation API. One `POST /quotation` per billing cadence; the
//! returned quotation id and the original payload let a later `PUT
//! /quotation/{id}` reprice one pack with custom guarantee levels.
//!
//! Response body handed to the normalizer:
//!
//! ```json
//! {"annual": [...], "semi_annual": [...], "base_payload": {...},
//!  "id_quotation": "123", "id_lead": "456"}
//! ```

pub mod payload;
pub mod response;

use crate::domain::catalog::axa_pack_by_code;
use crate::domain::entities::session::{
    OptionSelections, SessionData, SessionHandle, UpdatedPricing,
};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::enums::{BillingCadence, ProviderCode};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::traits::{
    MappedPayload, ProviderAdapter, RawProviderResponse, SessionAdapter, payload_mismatch,
};
use async_trait::async_trait;
use payload::{AxaGarantie, AxaQuotationPayload, AxaUpdatePayload, id_value};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Production endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://axa.ma/bff/website/v1";

/// AXA quotation adapter.
#[derive(Debug, Clone)]
pub struct AxaAdapter {
    client: HttpClient,
    base_url: String,
}

impl AxaAdapter {
    /// Creates an adapter against `base_url`.
    #[must_use]
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn quote(
        &self,
        payload: &AxaQuotationPayload,
        cadence: BillingCadence,
    ) -> ProviderResult<Vec<Value>> {
        let url = format!("{}/quotation", self.base_url);
        let body: Value = self
            .client
            .post(&url, &payload.with_payment_mode(cadence.payment_mode()))
            .await?;
        match body {
            Value::Array(entries) => Ok(entries),
            other => Err(ProviderError::protocol(format!(
                "expected a quotation list, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl ProviderAdapter for AxaAdapter {
    fn provider(&self) -> ProviderCode {
        ProviderCode::Axa
    }

    fn timeout_ms(&self) -> u64 {
        self.client.timeout_ms()
    }

    async fn fetch(&self, payload: MappedPayload) -> ProviderResult<RawProviderResponse> {
        let base = match payload {
            MappedPayload::Axa(base) => base,
            other => return Err(payload_mismatch(ProviderCode::Axa, &other)),
        };

        let annual = self.quote(&base, BillingCadence::Annual).await?;
        let semi_annual = match self.quote(&base, BillingCadence::SemiAnnual).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(
                    provider = %ProviderCode::Axa,
                    error = %error,
                    "semi-annual quotation failed"
                );
                Vec::new()
            }
        };

        let first = annual.first();
        let id_quotation = first.and_then(|e| response::id_text(e, "idQuotation"));
        let id_lead = first.and_then(|e| response::id_text(e, "idLead"));
        debug!(
            annual = annual.len(),
            semi_annual = semi_annual.len(),
            id_quotation = id_quotation.as_deref().unwrap_or("-"),
            "AXA quotations received"
        );

        let base_payload =
            serde_json::to_value(&base).map_err(|e| ProviderError::internal(e.to_string()))?;
        Ok(RawProviderResponse::new(
            ProviderCode::Axa,
            json!({
                "annual": annual,
                "semi_annual": semi_annual,
                "base_payload": base_payload,
                "id_quotation": id_quotation,
                "id_lead": id_lead,
            }),
        ))
    }
}

#[async_trait]
impl SessionAdapter for AxaAdapter {
    fn provider(&self) -> ProviderCode {
        ProviderCode::Axa
    }

    async fn update(
        &self,
        session: &SessionHandle,
        selections: &OptionSelections,
    ) -> ProviderResult<UpdatedPricing> {
        session.ensure_provider(ProviderCode::Axa)?;
        let SessionData::SignedQuotation {
            base_payload,
            quotation_id,
            lead_id,
        } = &session.data
        else {
            return Err(DomainError::SessionShapeMismatch(ProviderCode::Axa).into());
        };

        let pack = axa_pack_by_code(&selections.plan_code)?;
        let resolved = pack.resolve_guarantees(&selections.values)?;
        let base: AxaQuotationPayload = serde_json::from_value(base_payload.clone())
            .map_err(|_| DomainError::SessionShapeMismatch(ProviderCode::Axa))?;

        let body = AxaUpdatePayload {
            base: base.with_payment_mode(selections.cadence.payment_mode()),
            id_quotation: id_value(Some(quotation_id)),
            id_pack: pack.id,
            id_lead: id_value(lead_id.as_deref()),
            garanties: resolved
                .iter()
                .map(|(code, formule)| AxaGarantie::new(code, *formule))
                .collect(),
        };

        let url = format!("{}/quotation/{}", self.base_url, quotation_id);
        let raw: Value = self
            .client
            .put(&url, &body)
            .await
            .map_err(ProviderError::into_session_error)?;

        let entry = response::entry_for_pack(&raw, pack.id);
        let annual = match entry {
            Some(e) => response::pricing_block(e, BillingCadence::Annual)?,
            None => None,
        };
        let semi_annual = match entry {
            Some(e) => response::pricing_block(e, BillingCadence::SemiAnnual)?,
            None => None,
        };
        debug!(pack = pack.id, cadence = %selections.cadence, "AXA quotation updated");

        Ok(UpdatedPricing {
            provider: ProviderCode::Axa,
            plan_code: selections.plan_code.clone(),
            selections: resolved
                .into_iter()
                .map(|(code, formule)| (code.to_string(), formule))
                .collect(),
            annual,
            semi_annual,
            raw,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::payload::{AxaContrat, AxaLeadInfos, AxaVehicule};
    use super::*;
    use rust_decimal::Decimal;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn sample_payload() -> AxaQuotationPayload {
        AxaQuotationPayload {
            contrat: AxaContrat {
                code_intermediaire: 592,
                code_produit: 115,
                nombre_fraction: 0,
                type_fractionnement: "f".into(),
                type_avenant: 1,
                sous_avenant: 1,
                date_effet: "15-03-2025".into(),
                type_contrat: "DF".into(),
                mode_paiement: "12".into(),
                date_echeance: "0".into(),
                date_expiration: "0".into(),
                type_personne: "P".into(),
                assure_est_conducteur: "O".into(),
                identifiant: "a0".into(),
                date_naissance_conducteur: "10-05-1988".into(),
                is_fonctionnaire: "N".into(),
                code_convention: 0,
                new_client: "O".into(),
                nom: "Alami".into(),
                prenom: "Yassine".into(),
                date_naissance_assure: "10-05-1988".into(),
                taux_reduction: 0,
            },
            vehicule: AxaVehicule {
                code_usage: "1B".into(),
                date_mis_circulation: "01-06-2019".into(),
                matricule: "12345-A-6".into(),
                valeur_neuf: 200_000,
                valeur_venale: 150_000,
                valeur_amenagement: 0,
                energie: "G".into(),
                puissance_fiscale: 6,
                code_carrosserie: "B1".into(),
                code_marque: 7,
                nombre_place: 5,
                date_mutation: "0".into(),
            },
            lead_infos: AxaLeadInfos {
                city: "CASABLANCA".into(),
                phone_number: "0612345678".into(),
                licence_date: "01-01-2010".into(),
                brand_name: "RENAULT".into(),
                intermediate_name: "AKER ASSURANCE".into(),
                marketing_consent: true,
                cgu_consent: true,
            },
        }
    }

    fn quote_entry(pack: u8, total: i64) -> Value {
        json!({
            "idQuotation": 777,
            "idLead": 555,
            "idPack": pack,
            "primeNetAnnuel": total - 200,
            "taxesAnnuel": 150,
            "cnpacAnnuel": 20,
            "accessoireAnnuel": 30,
            "primeTotaleAnnuel": total,
            "primeNetComptant": (total - 200) / 2,
            "taxesComptant": 75,
            "cnpacComptant": 10,
            "accessoireComptant": 15,
            "primeTotaleComptant": total / 2,
        })
    }

    fn adapter(server: &MockServer) -> AxaAdapter {
        AxaAdapter::new(HttpClient::new(5000).unwrap(), server.uri())
    }

    mod fetch {
        use super::*;

        #[tokio::test]
        async fn posts_both_cadences() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/quotation"))
                .and(body_partial_json(json!({"contrat": {"modePaiement": "12"}})))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([quote_entry(2, 2000), quote_entry(3, 3000)])),
                )
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .and(path("/quotation"))
                .and(body_partial_json(json!({"contrat": {"modePaiement": "06"}})))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!([quote_entry(2, 2000)])),
                )
                .expect(1)
                .mount(&server)
                .await;

            let raw = adapter(&server)
                .fetch(MappedPayload::Axa(sample_payload()))
                .await
                .unwrap();
            let body = raw.body();
            assert_eq!(body["annual"].as_array().unwrap().len(), 2);
            assert_eq!(body["semi_annual"].as_array().unwrap().len(), 1);
            assert_eq!(body["id_quotation"], "777");
            assert_eq!(body["id_lead"], "555");
            assert_eq!(body["base_payload"]["vehicule"]["matricule"], "12345-A-6");
        }

        #[tokio::test]
        async fn failing_semi_annual_yields_empty_list() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(body_partial_json(json!({"contrat": {"modePaiement": "12"}})))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!([quote_entry(2, 2000)])),
                )
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .and(body_partial_json(json!({"contrat": {"modePaiement": "06"}})))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let raw = adapter(&server)
                .fetch(MappedPayload::Axa(sample_payload()))
                .await
                .unwrap();
            assert_eq!(raw.body()["semi_annual"], json!([]));
        }

        #[tokio::test]
        async fn failing_annual_is_an_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(403))
                .mount(&server)
                .await;

            let result = adapter(&server)
                .fetch(MappedPayload::Axa(sample_payload()))
                .await;
            assert!(matches!(result, Err(ProviderError::Authentication { .. })));
        }

        #[tokio::test]
        async fn non_list_body_is_a_protocol_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "x"})))
                .mount(&server)
                .await;

            let result = adapter(&server)
                .fetch(MappedPayload::Axa(sample_payload()))
                .await;
            assert!(matches!(result, Err(ProviderError::Protocol { .. })));
        }
    }

    mod update {
        use super::*;

        fn handle() -> SessionHandle {
            SessionHandle::signed_quotation(
                ProviderCode::Axa,
                serde_json::to_value(sample_payload()).unwrap(),
                "777",
                Some("555".into()),
            )
        }

        #[tokio::test]
        async fn puts_pack_guarantees() {
            let server = MockServer::start().await;
            Mock::given(method("PUT"))
                .and(path("/quotation/777"))
                .and(body_partial_json(json!({
                    "idQuotation": 777,
                    "idLead": 555,
                    "idPack": 4,
                    "contrat": {"modePaiement": "06"},
                })))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!([quote_entry(4, 4200)])),
                )
                .expect(1)
                .mount(&server)
                .await;

            let selections = OptionSelections::new("4")
                .with_cadence(BillingCadence::SemiAnnual)
                .with_value("35", 9);
            let updated = adapter(&server).update(&handle(), &selections).await.unwrap();

            assert_eq!(updated.plan_code, "4");
            assert_eq!(updated.selections.get("35"), Some(&9));
            assert_eq!(updated.selections.get("1"), Some(&0));
            assert_eq!(updated.selections.get("5"), Some(&1));
            assert_eq!(updated.annual.unwrap().total(), Decimal::from(4200));
            assert_eq!(updated.semi_annual.unwrap().total(), Decimal::from(2100));
        }

        #[tokio::test]
        async fn expired_quotation_is_session_expired() {
            let server = MockServer::start().await;
            Mock::given(method("PUT"))
                .respond_with(ResponseTemplate::new(404))
                .mount(&server)
                .await;

            let result = adapter(&server)
                .update(&handle(), &OptionSelections::new("2"))
                .await;
            assert!(matches!(result, Err(ProviderError::SessionExpired { .. })));
        }

        #[tokio::test]
        async fn rejects_foreign_handle_and_unknown_pack() {
            let server = MockServer::start().await;
            let adapter = adapter(&server);

            let foreign = SessionHandle::token_pair(ProviderCode::Mcma, "1", "t");
            let result = adapter.update(&foreign, &OptionSelections::new("2")).await;
            assert!(matches!(result, Err(ProviderError::InvalidRequest { .. })));

            let result = adapter.update(&handle(), &OptionSelections::new("9")).await;
            assert!(matches!(result, Err(ProviderError::InvalidRequest { .. })));
        }
    }
}
