//! AXA quotation wire types.

use serde::{Deserialize, Serialize};

/// Body of `POST /bff/website/v1/quotation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxaQuotationPayload {
    /// Contract section.
    pub contrat: AxaContrat,
    /// Vehicle section.
    pub vehicule: AxaVehicule,
    /// Lead section.
    #[serde(rename = "leadInfos")]
    pub lead_infos: AxaLeadInfos,
}

impl AxaQuotationPayload {
    /// Returns a copy with `contrat.modePaiement` set.
    #[must_use]
    pub fn with_payment_mode(&self, mode: &str) -> Self {
        let mut payload = self.clone();
        payload.contrat.mode_paiement = mode.to_string();
        payload
    }
}

/// Contract section of a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct AxaContrat {
    pub code_intermediaire: u32,
    pub code_produit: u32,
    pub nombre_fraction: u32,
    pub type_fractionnement: String,
    pub type_avenant: u32,
    pub sous_avenant: u32,
    /// Effective date, `DD-MM-YYYY`.
    pub date_effet: String,
    pub type_contrat: String,
    /// `"12"` or `"06"`.
    pub mode_paiement: String,
    pub date_echeance: String,
    pub date_expiration: String,
    pub type_personne: String,
    pub assure_est_conducteur: String,
    pub identifiant: String,
    pub date_naissance_conducteur: String,
    pub is_fonctionnaire: String,
    pub code_convention: u32,
    pub new_client: String,
    pub nom: String,
    pub prenom: String,
    pub date_naissance_assure: String,
    pub taux_reduction: u32,
}

/// Vehicle section of a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct AxaVehicule {
    pub code_usage: String,
    pub date_mis_circulation: String,
    pub matricule: String,
    pub valeur_neuf: i64,
    pub valeur_venale: i64,
    pub valeur_amenagement: i64,
    /// `E`, `G` or `W`.
    pub energie: String,
    pub puissance_fiscale: u32,
    pub code_carrosserie: String,
    pub code_marque: u32,
    pub nombre_place: u32,
    pub date_mutation: String,
}

/// Lead section of a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct AxaLeadInfos {
    pub city: String,
    pub phone_number: String,
    pub licence_date: String,
    pub brand_name: String,
    pub intermediate_name: String,
    pub marketing_consent: bool,
    pub cgu_consent: bool,
}

/// One guarantee line of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxaGarantie {
    /// Guarantee code.
    pub code_garantie: String,
    /// Selected level.
    pub formule: i64,
    /// Always 1 (passenger car). The upstream spells it this way.
    #[serde(rename = "typeVehcile")]
    pub type_vehicule: u8,
}

impl AxaGarantie {
    /// Creates a passenger-car guarantee line.
    #[must_use]
    pub fn new(code: &str, formule: i64) -> Self {
        Self {
            code_garantie: code.to_string(),
            formule,
            type_vehicule: 1,
        }
    }
}

/// Body of `PUT /bff/website/v1/quotation/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxaUpdatePayload {
    /// Original quotation payload with the cadence's payment mode.
    #[serde(flatten)]
    pub base: AxaQuotationPayload,
    /// Upstream quotation id.
    pub id_quotation: serde_json::Value,
    /// Pack to reprice.
    pub id_pack: u8,
    /// Upstream lead id.
    pub id_lead: serde_json::Value,
    /// Guarantee lines of the pack.
    pub garanties: Vec<AxaGarantie>,
}

/// Sends an id back the way the upstream issued it: numeric when it parses.
#[must_use]
pub fn id_value(id: Option<&str>) -> serde_json::Value {
    match id {
        Some(id) => id
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::from(id)),
        None => serde_json::Value::Null,
    }
}
