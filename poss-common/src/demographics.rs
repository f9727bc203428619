//! Demographic vocabulary declared by the user
//!
//! Labels are the Portuguese strings used throughout the catalog gating
//! lists, so `as_str()` values compare directly against
//! `EntityDefinition::affected_genders` / `affected_age_groups`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Sentinel label meaning "prefer not to say"
pub const SEX_UNDISCLOSED: &str = "Não informar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "Masculino")]
    Male,
    #[serde(rename = "Feminino")]
    Female,
    #[serde(rename = "Não informar")]
    Undisclosed,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Masculino",
            Sex::Female => "Feminino",
            Sex::Undisclosed => SEX_UNDISCLOSED,
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        [Sex::Male, Sex::Female, Sex::Undisclosed]
            .into_iter()
            .find(|v| v.as_str().to_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown sex label: {}", s)))
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "Criança")]
    Child,
    #[serde(rename = "Adolescente")]
    Teen,
    #[default]
    #[serde(rename = "Adulto")]
    Adult,
    #[serde(rename = "Idoso")]
    Elder,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [AgeGroup::Child, AgeGroup::Teen, AgeGroup::Adult, AgeGroup::Elder];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Child => "Criança",
            AgeGroup::Teen => "Adolescente",
            AgeGroup::Adult => "Adulto",
            AgeGroup::Elder => "Idoso",
        }
    }
}

impl FromStr for AgeGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AgeGroup::ALL
            .into_iter()
            .find(|v| v.as_str().to_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown age group: {}", s)))
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
