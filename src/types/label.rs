//! Clinical entity labels.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Clinical entity type.
///
/// Canonical labels are upper case (`SYMPTOM`, `PROBLEM`, ...). Parsing also
/// accepts the synonyms that show up in reference annotations:
///
/// | Label | Accepted synonyms |
/// |-------|-------------------|
/// | `SYMPTOM` | `SIGN` |
/// | `PROBLEM` | `DIAGNOSIS`, `DISEASE`, `CONDITION` |
/// | `ANATOMY` | `BODY_PART` |
/// | `PROCEDURE` | |
/// | `TEST` | `EXAM`, `EXAMINATION` |
/// | `DRUG` | `MEDICATION`, `MEDICINE` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityType {
    /// Complaint or finding reported by the patient
    Symptom,
    /// Diagnosis, disease or clinical condition
    Problem,
    /// Body part or structure
    Anatomy,
    /// Procedure performed on the patient
    Procedure,
    /// Exam, lab test or vital-sign measurement
    Test,
    /// Medication
    Drug,
}

impl EntityType {
    /// Every type, in canonical order.
    pub const ALL: [EntityType; 6] = [
        EntityType::Symptom,
        EntityType::Problem,
        EntityType::Anatomy,
        EntityType::Procedure,
        EntityType::Test,
        EntityType::Drug,
    ];

    /// Canonical upper-case label.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            EntityType::Symptom => "SYMPTOM",
            EntityType::Problem => "PROBLEM",
            EntityType::Anatomy => "ANATOMY",
            EntityType::Procedure => "PROCEDURE",
            EntityType::Test => "TEST",
            EntityType::Drug => "DRUG",
        }
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        match label.trim().to_uppercase().as_str() {
            "SYMPTOM" | "SIGN" => Ok(EntityType::Symptom),
            "PROBLEM" | "DIAGNOSIS" | "DISEASE" | "CONDITION" => Ok(EntityType::Problem),
            "ANATOMY" | "BODY_PART" => Ok(EntityType::Anatomy),
            "PROCEDURE" => Ok(EntityType::Procedure),
            "TEST" | "EXAM" | "EXAMINATION" => Ok(EntityType::Test),
            "DRUG" | "MEDICATION" | "MEDICINE" => Ok(EntityType::Drug),
            other => Err(Error::parse(format!("unknown entity type '{other}'"))),
        }
    }
}

impl TryFrom<String> for EntityType {
    type Error = Error;

    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

impl From<EntityType> for String {
    fn from(ty: EntityType) -> Self {
        ty.as_label().to_string()
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
