//! Recognized ontology vocabularies.
//!
//! All terms live in the single `ontologyterm` table and are told apart by
//! the `ontologytermtype` discriminator column. [`OntologyType`] is the
//! closed set of discriminator values this client will query; anything else
//! is rejected before a query is built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CurationError;

macro_rules! ontology_types {
    ($($variant:ident),+ $(,)?) => {
        /// Discriminator value of the `ontologytermtype` column.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum OntologyType {
            $($variant),+
        }

        impl OntologyType {
            /// Every recognized discriminator, in alphabetical order.
            pub const ALL: &'static [OntologyType] = &[$(OntologyType::$variant),+];

            /// The exact string stored in `ontologytermtype`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(OntologyType::$variant => stringify!($variant)),+
                }
            }
        }

        impl FromStr for OntologyType {
            type Err = CurationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(OntologyType::$variant),)+
                    other => Err(CurationError::InvalidOntologyType(other.to_string())),
                }
            }
        }
    };
}

ontology_types!(
    APOTerm,
    ATPTerm,
    BSPOTerm,
    BTOTerm,
    CHEBITerm,
    CLTerm,
    CMOTerm,
    DAOTerm,
    DOTerm,
    ECOTerm,
    EMAPATerm,
    FBBTTerm,
    FBCVTerm,
    FBDVTerm,
    GENOTerm,
    GOTerm,
    HPTerm,
    MATerm,
    MITerm,
    MMOTerm,
    MMUSDVTerm,
    MODTerm,
    MPATHTerm,
    MPTerm,
    Molecule,
    NCBITaxonTerm,
    OBITerm,
    PATOTerm,
    ROTerm,
    RSTerm,
    SOTerm,
    UBERONTerm,
    VTTerm,
    WBBTTerm,
    WBLSTerm,
    WBPhenotypeTerm,
    XBATerm,
    XBEDTerm,
    XBSTerm,
    XCOTerm,
    XPOTerm,
    XSMOTerm,
    ZECOTerm,
    ZFATerm,
    ZFSTerm,
);

impl fmt::Display for OntologyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anatomy ontology used by a data provider's curators.
pub fn anatomy_ontology(provider: &str) -> Result<OntologyType, CurationError> {
    match provider.trim().to_ascii_uppercase().as_str() {
        "WB" => Ok(OntologyType::WBBTTerm),
        "FB" => Ok(OntologyType::FBBTTerm),
        "ZFIN" => Ok(OntologyType::ZFATerm),
        "MGI" => Ok(OntologyType::EMAPATerm),
        "XB" => Ok(OntologyType::XBATerm),
        "RGD" | "HUMAN" => Ok(OntologyType::UBERONTerm),
        _ => Err(CurationError::UnknownDataProvider {
            provider: provider.to_string(),
            kind: "anatomy",
        }),
    }
}

/// Developmental stage ontology used by a data provider's curators.
pub fn life_stage_ontology(provider: &str) -> Result<OntologyType, CurationError> {
    match provider.trim().to_ascii_uppercase().as_str() {
        "WB" => Ok(OntologyType::WBLSTerm),
        "FB" => Ok(OntologyType::FBDVTerm),
        "ZFIN" => Ok(OntologyType::ZFSTerm),
        "MGI" => Ok(OntologyType::MMUSDVTerm),
        "XB" => Ok(OntologyType::XBSTerm),
        _ => Err(CurationError::UnknownDataProvider {
            provider: provider.to_string(),
            kind: "life stage",
        }),
    }
}

/// The three GO sub-ontologies, stored in the term's `namespace` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoAspect {
    BiologicalProcess,
    MolecularFunction,
    CellularComponent,
}

impl GoAspect {
    pub fn namespace(self) -> &'static str {
        match self {
            GoAspect::BiologicalProcess => "biological_process",
            GoAspect::MolecularFunction => "molecular_function",
            GoAspect::CellularComponent => "cellular_component",
        }
    }
}

impl FromStr for GoAspect {
    type Err = CurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "biological_process" | "bp" | "p" => Ok(GoAspect::BiologicalProcess),
            "molecular_function" | "mf" | "f" => Ok(GoAspect::MolecularFunction),
            "cellular_component" | "cc" | "c" => Ok(GoAspect::CellularComponent),
            other => Err(CurationError::InvalidRequest(format!(
                "unknown GO aspect '{}'; use biological_process, molecular_function or cellular_component",
                other
            ))),
        }
    }
}
