// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Observing Blocks (OBs).
//!
//! An [`ObDescriptor`] is the complete, typed description of one OB. It is
//! built by the [`Composer`] from the [`Templates`] of an operational mode
//! and the data that catalogs know about a target. Descriptors can be
//! rendered as OBX text ([`ObDescriptor::to_obx`]) or as JSON field maps for
//! upload.

mod compose;
mod error;
mod templates;
mod write;
#[cfg(test)]
mod tests;

pub use compose::{ob_name, Composer, ObRequest};
pub use error::{ComposeError, ObxWriteError};
pub use templates::{ModeTemplates, Templates};

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ALLOWED_CENTRAL_WAVELENGTHS, ALLOWED_DITS},
    instrument::Resolution,
};

/// Field names and values, in the order they're written.
pub type FieldMap = IndexMap<String, serde_json::Value>;

/// The value of a single OB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),

    /// A real number, written with a fixed number of decimal places.
    Real {
        value: f64,
        decimals: usize,
    },

    /// Written as `T` or `F`.
    Flag(bool),
}

impl FieldValue {
    fn text<S: Into<String>>(s: S) -> FieldValue {
        FieldValue::Text(s.into())
    }

    fn real(value: f64, decimals: usize) -> FieldValue {
        FieldValue::Real { value, decimals }
    }

    /// Snap `value` to the closest entry of `allowed`, keeping the allowed
    /// value's spelling.
    fn snapped(value: f64, allowed: &[(f64, &str)]) -> FieldValue {
        let closest = allowed.iter().min_by(|(a, _), (b, _)| {
            (a - value)
                .abs()
                .partial_cmp(&(b - value).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        match closest {
            Some((allowed_value, spelling)) => FieldValue::Real {
                value: *allowed_value,
                decimals: spelling.split_once('.').map_or(0, |(_, d)| d.len()),
            },
            None => FieldValue::real(value, 3),
        }
    }

    /// The value as it's given to the upload service. Reals are rounded to
    /// their number of decimal places.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::from(s.as_str()),
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Real { value, decimals } => {
                // Round-trip through the text so the service sees what the
                // OBX file would contain.
                let rounded: f64 = format!("{value:.prec$}", prec = *decimals)
                    .parse()
                    .unwrap_or(*value);
                serde_json::Value::from(rounded)
            }
            FieldValue::Flag(b) => serde_json::Value::from(if *b { "T" } else { "F" }),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Real { value, decimals } => write!(f, "{value:.prec$}", prec = *decimals),
            FieldValue::Flag(b) => write!(f, "{}", if *b { "T" } else { "F" }),
        }
    }
}

/// An ordered list of fields that belong together.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup {
    pub section: Section,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl FieldGroup {
    /// The fields as a JSON map. Template names are part of the map.
    pub fn to_field_map(&self) -> FieldMap {
        self.fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect()
    }
}

/// The parts an OB is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    User,
    Target,
    Constraints,
    Description,
    Acquisition,
    Observation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderUser {
    pub name: String,

    #[serde(rename = "userComments")]
    pub user_comments: String,

    #[serde(rename = "InstrumentComments")]
    pub instrument_comments: String,

    #[serde(rename = "userPriority")]
    pub user_priority: i64,

    #[serde(rename = "type")]
    pub ob_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderTarget {
    #[serde(rename = "TARGET.NAME")]
    pub name: String,

    /// Proper motion in right ascension [arcsec/yr].
    #[serde(rename = "propRA")]
    pub prop_ra: f64,

    /// Proper motion in declination [arcsec/yr].
    #[serde(rename = "propDec")]
    pub prop_dec: f64,

    #[serde(rename = "diffRA")]
    pub diff_ra: f64,

    #[serde(rename = "diffDec")]
    pub diff_dec: f64,

    pub equinox: i64,
    pub epoch: f64,

    /// Sexagesimal hours.
    pub ra: String,

    /// Sexagesimal degrees.
    pub dec: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderConstraints {
    #[serde(rename = "CONSTRAINT.SET.NAME")]
    pub set_name: String,

    pub seeing: f64,
    pub sky_transparency: String,
    pub air_mass: f64,
    pub fractional_lunar_illumination: f64,

    /// [degrees]
    pub moon_angular_distance: i64,

    pub strehlratio: f64,
    pub twilight: i64,

    /// Precipitable water vapour [mm].
    pub watervapour: f64,

    pub atm: String,
    pub contrast: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderObservation {
    #[serde(rename = "OBSERVATION.DESCRIPTION.NAME")]
    pub name: String,

    pub instrument: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    pub user: HeaderUser,
    pub target: HeaderTarget,
    pub constraints: HeaderConstraints,
    pub observation: HeaderObservation,
}

/// The acquisition template of an OB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Acquisition {
    #[serde(rename = "ACQUISITION.TEMPLATE.NAME")]
    pub template_name: String,

    /// [Jy]
    #[serde(rename = "SEQ.TARG.FLUX.L")]
    pub flux_l: f64,

    /// [Jy]
    #[serde(rename = "SEQ.TARG.FLUX.N")]
    pub flux_n: f64,

    /// Only the fringe-tracking templates have this.
    #[serde(
        rename = "SEQ.TARG.MAG.H",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mag_h: Option<f64>,

    #[serde(rename = "SEQ.TARG.MAG.K")]
    pub mag_k: f64,

    #[serde(rename = "TEL.TARG.ADDVELALPHA")]
    pub add_vel_alpha: f64,

    #[serde(rename = "TEL.TARG.ADDVELDELTA")]
    pub add_vel_delta: f64,

    #[serde(rename = "COU.AG.ALPHA")]
    pub guide_alpha: String,

    #[serde(rename = "COU.AG.DELTA")]
    pub guide_delta: String,

    #[serde(rename = "COU.AG.EPOCH")]
    pub guide_epoch: f64,

    #[serde(rename = "COU.AG.EQUINOX")]
    pub guide_equinox: f64,

    #[serde(rename = "COU.AG.GSSOURCE")]
    pub guide_source: String,

    #[serde(rename = "COU.AG.PMA")]
    pub guide_pma: f64,

    #[serde(rename = "COU.AG.PMD")]
    pub guide_pmd: f64,

    #[serde(rename = "COU.AG.TYPE")]
    pub guide_type: String,

    #[serde(rename = "COU.GS.MAG")]
    pub guide_mag: f64,

    #[serde(rename = "ISS.BASELINE")]
    pub baseline: String,

    #[serde(rename = "ISS.VLTITYPE")]
    pub vlti_type: String,
}

/// The observation template of an OB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Observation {
    #[serde(rename = "TEMPLATE.NAME")]
    pub template_name: String,

    /// Detector integration time [s].
    #[serde(rename = "DET1.DIT")]
    pub dit: f64,

    #[serde(rename = "DET1.READ.CURNAME")]
    pub read_mode: String,

    #[serde(rename = "SEQ.DIL.USER.WL0")]
    pub user_central_wavelength: f64,

    /// Central wavelength [µm].
    #[serde(rename = "SEQ.DIL.WL0")]
    pub central_wavelength: f64,

    #[serde(rename = "SEQ.FRINGES.NCYCLES")]
    pub fringe_cycles: i64,

    #[serde(rename = "SEQ.PHOTO.ST")]
    pub photometry: bool,

    #[serde(rename = "SEQ.SKY.OFFS.ALPHA")]
    pub sky_offset_alpha: f64,

    #[serde(rename = "SEQ.SKY.OFFS.DELTA")]
    pub sky_offset_delta: f64,

    #[serde(rename = "SEQ.TRACK.BAND")]
    pub track_band: String,

    #[serde(rename = "INS.DIL.NAME")]
    pub l_resolution: Resolution,

    #[serde(rename = "INS.DIN.NAME")]
    pub n_resolution: String,

    #[serde(rename = "DPR.CATG")]
    pub category: String,
}

/// A complete Observing Block.
#[derive(Debug, Clone, PartialEq)]
pub struct ObDescriptor {
    pub name: String,
    pub header: Header,
    pub acquisition: Acquisition,
    pub observation: Observation,
}

impl ObDescriptor {
    /// All fields of the OB, grouped the way they are written.
    pub fn field_groups(&self) -> Vec<FieldGroup> {
        use FieldValue as V;

        let user = &self.header.user;
        let target = &self.header.target;
        let constraints = &self.header.constraints;
        let description = &self.header.observation;
        let acq = &self.acquisition;
        let obs = &self.observation;

        let mut acquisition = vec![
            ("ACQUISITION.TEMPLATE.NAME", V::text(&acq.template_name)),
            ("SEQ.TARG.FLUX.L", V::real(acq.flux_l, 2)),
            ("SEQ.TARG.FLUX.N", V::real(acq.flux_n, 2)),
        ];
        if let Some(mag_h) = acq.mag_h {
            acquisition.push(("SEQ.TARG.MAG.H", V::real(mag_h, 2)));
        }
        acquisition.extend([
            ("SEQ.TARG.MAG.K", V::real(acq.mag_k, 2)),
            ("TEL.TARG.ADDVELALPHA", V::real(acq.add_vel_alpha, 1)),
            ("TEL.TARG.ADDVELDELTA", V::real(acq.add_vel_delta, 1)),
            ("COU.AG.ALPHA", V::text(&acq.guide_alpha)),
            ("COU.AG.DELTA", V::text(&acq.guide_delta)),
            ("COU.AG.EPOCH", V::real(acq.guide_epoch, 1)),
            ("COU.AG.EQUINOX", V::real(acq.guide_equinox, 1)),
            ("COU.AG.GSSOURCE", V::text(&acq.guide_source)),
            ("COU.AG.PMA", V::real(acq.guide_pma, 6)),
            ("COU.AG.PMD", V::real(acq.guide_pmd, 6)),
            ("COU.AG.TYPE", V::text(&acq.guide_type)),
            ("COU.GS.MAG", V::real(acq.guide_mag, 2)),
            ("ISS.BASELINE", V::text(&acq.baseline)),
            ("ISS.VLTITYPE", V::text(&acq.vlti_type)),
        ]);

        vec![
            FieldGroup {
                section: Section::User,
                fields: vec![
                    ("name", V::text(&user.name)),
                    ("userComments", V::text(&user.user_comments)),
                    ("InstrumentComments", V::text(&user.instrument_comments)),
                    ("userPriority", V::Integer(user.user_priority)),
                    ("type", V::text(&user.ob_type)),
                ],
            },
            FieldGroup {
                section: Section::Target,
                fields: vec![
                    ("TARGET.NAME", V::text(&target.name)),
                    ("propRA", V::real(target.prop_ra, 6)),
                    ("propDec", V::real(target.prop_dec, 6)),
                    ("diffRA", V::real(target.diff_ra, 6)),
                    ("diffDec", V::real(target.diff_dec, 6)),
                    ("equinox", V::Integer(target.equinox)),
                    ("epoch", V::real(target.epoch, 1)),
                    ("ra", V::text(&target.ra)),
                    ("dec", V::text(&target.dec)),
                ],
            },
            FieldGroup {
                section: Section::Constraints,
                fields: vec![
                    ("CONSTRAINT.SET.NAME", V::text(&constraints.set_name)),
                    ("seeing", V::real(constraints.seeing, 1)),
                    ("sky_transparency", V::text(&constraints.sky_transparency)),
                    ("air_mass", V::real(constraints.air_mass, 1)),
                    (
                        "fractional_lunar_illumination",
                        V::real(constraints.fractional_lunar_illumination, 1),
                    ),
                    (
                        "moon_angular_distance",
                        V::Integer(constraints.moon_angular_distance),
                    ),
                    ("strehlratio", V::real(constraints.strehlratio, 1)),
                    ("twilight", V::Integer(constraints.twilight)),
                    ("watervapour", V::real(constraints.watervapour, 1)),
                    ("atm", V::text(&constraints.atm)),
                    ("contrast", V::real(constraints.contrast, 1)),
                    ("description", V::text(&constraints.description)),
                ],
            },
            FieldGroup {
                section: Section::Description,
                fields: vec![
                    ("OBSERVATION.DESCRIPTION.NAME", V::text(&description.name)),
                    ("instrument", V::text(&description.instrument)),
                ],
            },
            FieldGroup {
                section: Section::Acquisition,
                fields: acquisition,
            },
            FieldGroup {
                section: Section::Observation,
                fields: vec![
                    ("TEMPLATE.NAME", V::text(&obs.template_name)),
                    ("DET1.DIT", V::snapped(obs.dit, &ALLOWED_DITS)),
                    ("DET1.READ.CURNAME", V::text(&obs.read_mode)),
                    ("SEQ.DIL.USER.WL0", V::real(obs.user_central_wavelength, 2)),
                    (
                        "SEQ.DIL.WL0",
                        V::snapped(obs.central_wavelength, &ALLOWED_CENTRAL_WAVELENGTHS),
                    ),
                    ("SEQ.FRINGES.NCYCLES", V::Integer(obs.fringe_cycles)),
                    ("SEQ.PHOTO.ST", V::Flag(obs.photometry)),
                    ("SEQ.SKY.OFFS.ALPHA", V::real(obs.sky_offset_alpha, 1)),
                    ("SEQ.SKY.OFFS.DELTA", V::real(obs.sky_offset_delta, 1)),
                    ("SEQ.TRACK.BAND", V::text(&obs.track_band)),
                    ("INS.DIL.NAME", V::text(obs.l_resolution.ob_name())),
                    ("INS.DIN.NAME", V::text(&obs.n_resolution)),
                    ("DPR.CATG", V::text(&obs.category)),
                ],
            },
        ]
    }

    /// The fields of one part of the OB as a JSON map.
    pub fn field_map(&self, section: Section) -> FieldMap {
        self.field_groups()
            .into_iter()
            .find(|g| g.section == section)
            .map(|g| g.to_field_map())
            .unwrap_or_default()
    }

    /// Look up a field's value as it would be written.
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.field_groups()
            .into_iter()
            .flat_map(|g| g.fields)
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}
