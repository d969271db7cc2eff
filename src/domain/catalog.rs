//! # Provider Catalogs
//!
//! Static pack definitions for the providers that support quote updates.
//!
//! AXA sells four packs (ids 2 to 5). Each pack lists guarantees that are either
//! fixed or selectable among a set of levels; an update sends one
//! `(codeGarantie, formule)` pair per guarantee. MCMA exposes four packs of
//! which `optimale` and `tout_risque` accept option query parameters.
//!
//! # Examples
//!
//! ```
//! use motor_quote_aggregator::domain::catalog;
//!
//! let optimale = catalog::axa_pack(4).unwrap();
//! assert_eq!(optimale.name, "Optimale");
//! assert_eq!(optimale.selectable_fields().len(), 6);
//! ```

use crate::domain::entities::plan::{Guarantee, SelectOption, SelectableField};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::enums::ProviderCode;
use std::collections::BTreeMap;

/// One selectable level of a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Display label.
    pub label: &'static str,
    /// Upstream value.
    pub value: i64,
}

/// Whether a guarantee is fixed or selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuaranteeKind {
    /// Always sent with this formula.
    Fixed {
        /// Upstream formula value.
        formule: i64,
    },
    /// Customer picks one of `options`.
    Select {
        /// Accepted levels.
        options: &'static [OptionSpec],
        /// Level used when nothing is selected.
        default: i64,
    },
}

/// A guarantee line of a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuaranteeSpec {
    /// Upstream guarantee code.
    pub code: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Fixed or selectable.
    pub kind: GuaranteeKind,
}

impl GuaranteeSpec {
    const fn fixed(code: &'static str, title: &'static str) -> Self {
        Self {
            code,
            title,
            kind: GuaranteeKind::Fixed { formule: 0 },
        }
    }

    const fn select(
        code: &'static str,
        title: &'static str,
        options: &'static [OptionSpec],
        default: i64,
    ) -> Self {
        Self {
            code,
            title,
            kind: GuaranteeKind::Select { options, default },
        }
    }

    fn to_selectable_field(self) -> Option<SelectableField> {
        match self.kind {
            GuaranteeKind::Fixed { .. } => None,
            GuaranteeKind::Select { options, default } => Some(SelectableField {
                code: self.code.to_string(),
                title: self.title.to_string(),
                options: to_select_options(options),
                default: Some(default),
            }),
        }
    }

    fn resolve(self, plan: &str, selections: &BTreeMap<String, i64>) -> DomainResult<i64> {
        match self.kind {
            GuaranteeKind::Fixed { formule } => Ok(formule),
            GuaranteeKind::Select { options, default } => match selections.get(self.code) {
                None => Ok(default),
                Some(&value) if options.iter().any(|o| o.value == value) => Ok(value),
                Some(&value) => Err(DomainError::InvalidOption {
                    plan: plan.to_string(),
                    code: self.code.to_string(),
                    value,
                }),
            },
        }
    }
}

const fn opt(label: &'static str, value: i64) -> OptionSpec {
    OptionSpec { label, value }
}

fn to_select_options(options: &[OptionSpec]) -> Vec<SelectOption> {
    options
        .iter()
        .map(|o| SelectOption {
            label: o.label.to_string(),
            value: o.value,
        })
        .collect()
}

fn reject_unknown_codes(
    plan: &str,
    known: impl Fn(&str) -> bool,
    selections: &BTreeMap<String, i64>,
) -> DomainResult<()> {
    match selections.iter().find(|(code, _)| !known(code.as_str())) {
        Some((code, &value)) => Err(DomainError::InvalidOption {
            plan: plan.to_string(),
            code: code.clone(),
            value,
        }),
        None => Ok(()),
    }
}

const AXA_DEFENSE: &[OptionSpec] = &[
    opt("5 000 DH", 1),
    opt("7 500 DH", 2),
    opt("10 000 DH", 3),
    opt("15 000 DH", 4),
];

const AXA_PFCP: &[OptionSpec] = &[
    opt("F0 : 5000/ 5000/ 1000", 1),
    opt("F1 : 10000/ 10000/ 3000", 2),
    opt("F2 : 20000/ 20000/ 4000", 3),
    opt("F3 : 30000/ 30000/ 5000", 4),
    opt("F4 : 40000/ 40000/ 6000", 5),
    opt("F5 : 50000/ 50000/ 8000", 6),
    opt("F6 : 60000/ 60000/ 9000", 7),
    opt("F7 : 70000/ 70000/ 10000", 8),
    opt("F8 : 100000/100000/10000", 9),
    opt("F9 : 120000/120000/12000", 10),
];

const AXA_INCENDIE: &[OptionSpec] = &[opt("SANS", 1)];

const AXA_VOL: &[OptionSpec] = &[opt("5 %", 1)];

const AXA_GLASS: &[OptionSpec] = &[
    opt("5000 Min. 300 DH", 1),
    opt("10000 Min. 300 DH", 2),
    opt("15000 Min. 300 DH", 3),
    opt("20000 Min. 300 DH", 4),
    opt("25000 Min. 300 DH", 5),
    opt("30000 Min. 300 DH", 6),
    opt("40000 Min.300 DH", 7),
    opt("50000 Min.300 DH", 8),
    opt("60000 Min.300 DH", 9),
    opt("75000 Min.300 DH", 10),
    opt("100000 Min.300 DH", 11),
];

const AXA_COLLISION: &[OptionSpec] = &[
    opt("Dép. 5% Min 1 000 DH", 2),
    opt("10 000 DH & 5% Min. 1 000 DH", 7),
    opt("20 000 DH & 5% Min. 1 000 DH", 9),
    opt("30 000 DH & 5% Min. 1 000 DH", 10),
];

const AXA_ALL_RISK: &[OptionSpec] = &[
    opt("3% & Min. 2500 DH", 1),
    opt("5% & 2500 DH", 2),
    opt("10% & 3500 DH", 4),
    opt("10% & 2500 DH", 5),
    opt("20% & 3500 DH", 8),
    opt("20% & 2500 DH", 9),
    opt("Cap. Réduit 3% & Min. 2500 DH", 10),
    opt("Cap. Réduit 5% & Min. 2500 DH", 11),
    opt("Cap. Réduit 10% & Min. 3500 DH", 13),
    opt("Cap. Réduit 10% & Min. 2500 DH", 14),
    opt("Cap. Réduit 20% & Min. 3500 DH", 17),
    opt("Cap. Réduit 20% & Min. 2500 DH", 18),
];

const RC: GuaranteeSpec = GuaranteeSpec::fixed("1", "RESPONSABILITÉ CIVILE");
const CATNAT: GuaranteeSpec = GuaranteeSpec::fixed("150", "ÉVÈNEMENTS CATASTROPHIQUES");
const DEFENSE: GuaranteeSpec = GuaranteeSpec::select("20", "Défense et Recours", AXA_DEFENSE, 1);
const PFCP: GuaranteeSpec = GuaranteeSpec::select("500", "P.F.C.P", AXA_PFCP, 1);
const INCENDIE: GuaranteeSpec = GuaranteeSpec::select("3", "Incendie", AXA_INCENDIE, 1);
const VOL: GuaranteeSpec = GuaranteeSpec::select("4", "Vol", AXA_VOL, 1);
const GLASS: GuaranteeSpec = GuaranteeSpec::select("5", "Bris de Glaces", AXA_GLASS, 1);

/// An AXA pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxaPack {
    /// Upstream pack id.
    pub id: u8,
    /// Display name.
    pub name: &'static str,
    /// Guarantee lines, in upstream order.
    pub guarantees: &'static [GuaranteeSpec],
}

impl AxaPack {
    /// Returns the fixed guarantees as included plan guarantees.
    #[must_use]
    pub fn fixed_guarantees(&self) -> Vec<Guarantee> {
        self.guarantees
            .iter()
            .filter(|g| matches!(g.kind, GuaranteeKind::Fixed { .. }))
            .map(|g| Guarantee::new(g.title, true).with_code(g.code))
            .collect()
    }

    /// Returns the selectable guarantees.
    #[must_use]
    pub fn selectable_fields(&self) -> Vec<SelectableField> {
        self.guarantees
            .iter()
            .filter_map(|g| g.to_selectable_field())
            .collect()
    }

    /// Resolves `(codeGarantie, formule)` for every guarantee of the pack.
    ///
    /// Unselected guarantees take their default level.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOption` for an unknown code or a level the
    /// guarantee does not offer.
    pub fn resolve_guarantees(
        &self,
        selections: &BTreeMap<String, i64>,
    ) -> DomainResult<Vec<(&'static str, i64)>> {
        let plan = self.id.to_string();
        reject_unknown_codes(
            &plan,
            |code| self.guarantees.iter().any(|g| g.code == code),
            selections,
        )?;
        self.guarantees
            .iter()
            .map(|g| g.resolve(&plan, selections).map(|formule| (g.code, formule)))
            .collect()
    }
}

/// The AXA packs, in the order quotations list them.
pub const AXA_PACKS: [AxaPack; 4] = [
    AxaPack {
        id: 2,
        name: "Basique",
        guarantees: &[RC, CATNAT, DEFENSE, PFCP],
    },
    AxaPack {
        id: 3,
        name: "Basique+",
        guarantees: &[
            RC,
            CATNAT,
            GuaranteeSpec::fixed("20", "DÉFENSE ET RECOURS"),
            INCENDIE,
            VOL,
            PFCP,
        ],
    },
    AxaPack {
        id: 4,
        name: "Optimale",
        guarantees: &[
            RC,
            CATNAT,
            INCENDIE,
            VOL,
            GLASS,
            DEFENSE,
            PFCP,
            GuaranteeSpec::select("35", "Dommages Collision", AXA_COLLISION, 2),
        ],
    },
    AxaPack {
        id: 5,
        name: "Premium",
        guarantees: &[
            RC,
            CATNAT,
            INCENDIE,
            VOL,
            GLASS,
            DEFENSE,
            PFCP,
            GuaranteeSpec::select("2", "Dommages Tous Accidents", AXA_ALL_RISK, 1),
        ],
    },
];

/// Looks up an AXA pack by id.
#[must_use]
pub fn axa_pack(id: u8) -> Option<&'static AxaPack> {
    AXA_PACKS.iter().find(|p| p.id == id)
}

/// Looks up an AXA pack by its plan code (the pack id as text).
///
/// # Errors
///
/// Returns `DomainError::UnknownPlan` if the code is not a known pack id.
pub fn axa_pack_by_code(code: &str) -> DomainResult<&'static AxaPack> {
    code.trim()
        .parse::<u8>()
        .ok()
        .and_then(axa_pack)
        .ok_or_else(|| DomainError::UnknownPlan {
            provider: ProviderCode::Axa,
            plan: code.to_string(),
        })
}

const MCMA_GLASS: &[OptionSpec] = &[
    opt("7 000 DH", 7000),
    opt("10 000 DH", 10000),
    opt("15 000 DH", 15000),
];

const MCMA_COLLISION: &[OptionSpec] = &[
    opt("20 000 DH", 20000),
    opt("30 000 DH", 30000),
    opt("50 000 DH", 50000),
];

const MCMA_FRANCHISE: &[OptionSpec] = &[opt("3%", 3), opt("5%", 5), opt("10%", 10)];

/// Query parameter carrying the broken glass capital.
pub const MCMA_BROKEN_GLASS: &str = "brokenGlassValue";
/// Query parameter carrying the collision capital.
pub const MCMA_DAMAGE_COLLISION: &str = "damageAndCollision";
/// Query parameter carrying the deductible percentage.
pub const MCMA_FRANCHISE_PARAM: &str = "franchise";

/// Order in which MCMA packs are listed.
pub const MCMA_PACK_ORDER: [&str; 4] = ["essentielle", "confort", "optimale", "tout_risque"];

/// An MCMA pack that accepts option query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McmaPack {
    /// Pack key used in URLs.
    pub key: &'static str,
    /// Query parameters the customer can choose.
    pub fields: &'static [GuaranteeSpec],
    /// Query parameters sent with a fixed value.
    pub fixed_params: &'static [(&'static str, i64)],
}

impl McmaPack {
    /// Returns the selectable fields.
    #[must_use]
    pub fn selectable_fields(&self) -> Vec<SelectableField> {
        self.fields
            .iter()
            .filter_map(|g| g.to_selectable_field())
            .collect()
    }

    /// Builds the pricing query for `selections`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOption` for an unknown parameter or level.
    pub fn query(
        &self,
        selections: &BTreeMap<String, i64>,
    ) -> DomainResult<Vec<(&'static str, i64)>> {
        reject_unknown_codes(
            self.key,
            |code| self.fields.iter().any(|g| g.code == code),
            selections,
        )?;
        let mut params = self
            .fields
            .iter()
            .map(|g| g.resolve(self.key, selections).map(|v| (g.code, v)))
            .collect::<DomainResult<Vec<_>>>()?;
        params.extend_from_slice(self.fixed_params);
        Ok(params)
    }
}

/// The MCMA packs that accept options.
pub const MCMA_SELECTABLE_PACKS: [McmaPack; 2] = [
    McmaPack {
        key: "optimale",
        fields: &[
            GuaranteeSpec::select(MCMA_BROKEN_GLASS, "Bris de Glaces", MCMA_GLASS, 7000),
            GuaranteeSpec::select(
                MCMA_DAMAGE_COLLISION,
                "Dommages-Collision",
                MCMA_COLLISION,
                20000,
            ),
        ],
        fixed_params: &[(MCMA_FRANCHISE_PARAM, 5)],
    },
    McmaPack {
        key: "tout_risque",
        fields: &[
            GuaranteeSpec::select(MCMA_BROKEN_GLASS, "Bris de Glaces", MCMA_GLASS, 7000),
            GuaranteeSpec::select(MCMA_FRANCHISE_PARAM, "Franchise", MCMA_FRANCHISE, 5),
        ],
        fixed_params: &[(MCMA_DAMAGE_COLLISION, 20000)],
    },
];

/// Looks up a selectable MCMA pack.
#[must_use]
pub fn mcma_pack(key: &str) -> Option<&'static McmaPack> {
    MCMA_SELECTABLE_PACKS.iter().find(|p| p.key == key)
}

/// Looks up a selectable MCMA pack for an update.
///
/// # Errors
///
/// Returns `DomainError::UnknownPlan` if the pack does not accept options.
pub fn mcma_pack_by_code(key: &str) -> DomainResult<&'static McmaPack> {
    mcma_pack(key).ok_or_else(|| DomainError::UnknownPlan {
        provider: ProviderCode::Mcma,
        plan: key.to_string(),
    })
}

/// Per-plan color palette of a provider, cycled by plan index.
#[must_use]
pub fn plan_palette(provider: ProviderCode) -> &'static [&'static str] {
    match provider {
        ProviderCode::Axa => &["#1a472a", "#00008F", "#003d7a", "#0066FF"],
        ProviderCode::Sanlam => &["#0066B3", "#003366", "#004d99"],
        ProviderCode::Rma => &["#1E3A8A", "#1e40af", "#2563eb", "#3b82f6"],
        ProviderCode::Mcma => &["#2fd0a7", "#1ba88e", "#0d8f75", "#00765c"],
    }
}

/// Returns the palette color for the plan at `index`.
#[must_use]
pub fn plan_color(provider: ProviderCode, index: usize) -> &'static str {
    let palette = plan_palette(provider);
    palette
        .get(index % palette.len().max(1))
        .copied()
        .unwrap_or("#000000")
}
