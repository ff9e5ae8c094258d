// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Instrument setups: array configurations, operational modes, spectral
resolutions and observation kinds.

All of these parse case-insensitively from the spellings used in night plans,
on the command line and in manual-input files.
 */


use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

lazy_static::lazy_static! {
    pub static ref ARRAY_CONFIGURATIONS_COMMA_SEPARATED: String = ArrayConfiguration::iter().join(", ");

    pub static ref OPERATIONAL_MODES_COMMA_SEPARATED: String = OperationalMode::iter().join(", ");

    pub static ref RESOLUTIONS_COMMA_SEPARATED: String = Resolution::iter().join(", ");
}

/// The telescope array in use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ArrayConfiguration {
    /// The four unit telescopes.
    #[strum(to_string = "UTs", serialize = "ut")]
    #[serde(alias = "UTs", alias = "UT", alias = "ut")]
    Uts,

    #[strum(serialize = "small")]
    Small,

    #[strum(serialize = "medium")]
    Medium,

    #[strum(serialize = "large")]
    Large,

    #[strum(serialize = "extended")]
    Extended,
}

impl ArrayConfiguration {
    pub fn family(self) -> ArrayFamily {
        match self {
            ArrayConfiguration::Uts => ArrayFamily::Uts,
            _ => ArrayFamily::Ats,
        }
    }
}

/// The kind of telescope. The defaults for an OB depend only on this, not on
/// the AT baseline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ArrayFamily {
    #[strum(serialize = "uts")]
    Uts,

    #[strum(serialize = "ats")]
    Ats,
}

/// MATISSE standalone, or with GRAVITY as the fringe tracker (GRA4MAT).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OperationalMode {
    #[strum(to_string = "matisse", serialize = "st", serialize = "standalone")]
    #[serde(alias = "st", alias = "standalone")]
    Matisse,

    #[strum(to_string = "gra4mat", serialize = "gr")]
    #[serde(alias = "gr")]
    Gra4mat,
}

impl OperationalMode {
    /// The name of the directory that OBs of this mode are written into.
    pub fn dir_name(self) -> &'static str {
        match self {
            OperationalMode::Matisse => "standalone",
            OperationalMode::Gra4mat => "GRA4MAT",
        }
    }
}

/// The spectral resolution of the L band.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    #[strum(to_string = "low", serialize = "lr")]
    #[serde(alias = "LOW", alias = "LR")]
    Low,

    #[strum(to_string = "med", serialize = "mr")]
    #[serde(alias = "MED", alias = "MR")]
    Med,

    #[strum(to_string = "high", serialize = "hr")]
    #[serde(alias = "HIGH", alias = "HR")]
    High,
}

impl Resolution {
    /// The name of the resolution as it appears in an OB.
    pub fn ob_name(self) -> &'static str {
        match self {
            Resolution::Low => "LOW",
            Resolution::Med => "MED",
            Resolution::High => "HIGH",
        }
    }
}

/// Whether an OB observes a science target or a calibrator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    #[strum(to_string = "sci", serialize = "science")]
    #[serde(rename = "sci", alias = "science")]
    Science,

    #[strum(to_string = "cal", serialize = "calibrator")]
    #[serde(rename = "cal", alias = "calibrator")]
    Calibrator,
}

impl ObservationKind {
    /// The prefix of an OB's name.
    pub fn ob_prefix(self) -> &'static str {
        match self {
            ObservationKind::Science => "SCI",
            ObservationKind::Calibrator => "CAL",
        }
    }

    /// The data-product category of an OB.
    pub fn category(self) -> &'static str {
        match self {
            ObservationKind::Science => "SCIENCE",
            ObservationKind::Calibrator => "CALIB",
        }
    }
}
