//! RMA automation job parameters.

use serde::{Deserialize, Serialize};

/// Parameters of the `rma_offers` workflow.
///
/// Dates are `YYYY-MM-DD`; the workflow reformats them for the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct RmaPayload {
    pub nom: String,
    pub prenom: String,
    /// Canonical fuel name, e.g. `diesel`.
    pub carburant: String,
    /// Form code for the fuel.
    pub code_carburant: String,
    pub puissance_fiscale: u32,
    pub date_mec: String,
    pub type_plaque: String,
    pub immatriculation: String,
    pub valeur_neuf: i64,
    pub valeur_actuelle: i64,
    pub nombre_places: u32,
    pub date_naissance: String,
    pub telephone: String,
    pub date_permis: String,
    pub ville: String,
}

/// Result returned by the `rma_offers` workflow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RmaWorkflowOutput {
    /// Offers for twelve months.
    #[serde(default)]
    pub annual: Option<serde_json::Value>,
    /// Offers for six months; absent when that step failed.
    #[serde(default)]
    pub semi_annual: Option<serde_json::Value>,
    /// Why the six month step failed.
    #[serde(default)]
    pub semi_annual_error: Option<String>,
}
