// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration of OB defaults.
//!
//! A [`Configuration`] is built once (from the built-in defaults, optionally
//! overridden by a file) and is only read afterwards. Integration times,
//! central wavelengths and photometry flags are looked up per operational
//! mode, array family and resolution.

mod error;

pub use error::SettingsError;

use std::{fs::File, io::Read, path::Path, str::FromStr};

use itertools::Itertools;
use log::{debug, trace};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    catalog::Catalog,
    constants::DEFAULT_CATALOG_DELAY_MS,
    instrument::{ArrayFamily, OperationalMode, Resolution},
};

lazy_static::lazy_static! {
    pub(crate) static ref DOCUMENT_FILE_TYPES_COMMA_SEPARATED: String = DocumentFileType::iter().join(", ");
}

/// The kinds of files that configuration-like documents can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub(crate) enum DocumentFileType {
    #[strum(serialize = "toml")]
    Toml,

    #[strum(serialize = "json")]
    Json,

    #[strum(serialize = "yaml", serialize = "yml")]
    Yaml,
}

/// Read a toml, json or yaml file, chosen by its extension, into a generic
/// document.
pub(crate) fn read_document(path: &Path) -> Result<serde_json::Value, SettingsError> {
    debug!("Attempting to parse {}", path.display());

    let file_type = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| DocumentFileType::from_str(e).ok())
        .ok_or_else(|| SettingsError::UnrecognisedExtension {
            path: path.to_path_buf(),
            valid: DOCUMENT_FILE_TYPES_COMMA_SEPARATED.clone(),
        })?;

    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    let value = match file_type {
        DocumentFileType::Toml => {
            trace!("Parsing toml file...");
            toml::from_str(&contents)?
        }
        DocumentFileType::Json => {
            trace!("Parsing json file...");
            serde_json::from_str(&contents)?
        }
        DocumentFileType::Yaml => {
            trace!("Parsing yaml file...");
            serde_yaml::from_str(&contents)?
        }
    };
    Ok(value)
}

/// Read a toml, json or yaml file directly into a type.
pub(crate) fn read_document_as<T: DeserializeOwned>(path: &Path) -> Result<T, SettingsError> {
    Ok(serde_json::from_value(read_document(path)?)?)
}

/// Recursively overwrite the values of `base` with those in `overrides`.
/// Tables are merged key by key; anything else is replaced.
pub(crate) fn merge_documents(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge_documents(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// Values per operational mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeTable<T> {
    pub matisse: T,
    pub gra4mat: T,
}

impl<T> ModeTable<T> {
    pub fn get(&self, mode: OperationalMode) -> &T {
        match mode {
            OperationalMode::Matisse => &self.matisse,
            OperationalMode::Gra4mat => &self.gra4mat,
        }
    }
}

/// Values per array family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyTable<T> {
    pub uts: T,
    pub ats: T,
}

impl<T> FamilyTable<T> {
    pub fn get(&self, family: ArrayFamily) -> &T {
        match family {
            ArrayFamily::Uts => &self.uts,
            ArrayFamily::Ats => &self.ats,
        }
    }
}

/// Values per spectral resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolutionTable<T> {
    pub low: T,
    pub med: T,
    pub high: T,
}

impl<T> ResolutionTable<T> {
    pub fn get(&self, resolution: Resolution) -> &T {
        match resolution {
            Resolution::Low => &self.low,
            Resolution::Med => &self.med,
            Resolution::High => &self.high,
        }
    }

    fn uniform(value: T) -> Self
    where
        T: Copy,
    {
        ResolutionTable {
            low: value,
            med: value,
            high: value,
        }
    }
}

/// A value for every (operational mode, array family, resolution).
pub type SetupTable<T> = ModeTable<FamilyTable<ResolutionTable<T>>>;

/// The fraction of sky that may be covered by clouds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SkyTransparency {
    #[strum(serialize = "photometric")]
    Photometric,

    #[default]
    #[strum(serialize = "clear")]
    Clear,

    #[strum(serialize = "thin")]
    Thin,

    #[strum(serialize = "thick")]
    Thick,
}

impl SkyTransparency {
    /// The name of the transparency as it appears in an OB.
    pub fn ob_name(self) -> &'static str {
        match self {
            SkyTransparency::Photometric => "Photometric",
            SkyTransparency::Clear => "Clear",
            SkyTransparency::Thin => "Variable, thin cirrus",
            SkyTransparency::Thick => "Variable, thick cirrus",
        }
    }
}

/// Observing constraints applied to every OB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constraints {
    /// Precipitable water vapour [mm].
    pub pwv: f64,

    /// Turbulence category [%]. One of 10, 30 or 70.
    pub turbulence: u8,

    pub transparency: SkyTransparency,
}

impl Constraints {
    /// The turbulence category as it appears in an OB.
    pub fn atmosphere(&self) -> Result<&'static str, SettingsError> {
        match self.turbulence {
            10 => Ok("10%  (Seeing < 0.6 arcsec, t0 > 5.2 ms)"),
            30 => Ok("30%  (Seeing < 0.8 arcsec, t0 > 4.1 ms)"),
            70 => Ok("70%  (Seeing < 1.15 arcsec, t0 > 2.2 ms)"),
            t => Err(SettingsError::InvalidTurbulence(t)),
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints {
            pwv: 10.0,
            turbulence: 30,
            transparency: SkyTransparency::Clear,
        }
    }
}

/// Which catalogs are queried for target data, and how often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSettings {
    pub catalogs: Vec<Catalog>,

    /// The delay between consecutive catalog queries [milliseconds].
    pub delay_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            catalogs: Catalog::iter().collect(),
            delay_ms: DEFAULT_CATALOG_DELAY_MS,
        }
    }
}

/// The settings resolved for one OB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSettings {
    pub resolution: Resolution,

    /// Detector integration time [s].
    pub dit: f64,

    /// Central wavelength [µm].
    pub central_wavelength: f64,

    pub photometry_enabled: bool,
}

/// All OB defaults. Files only need to contain the values that differ from
/// the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// The resolution used when nothing else asks for one.
    pub resolution: Resolution,

    /// Whether the requested resolution beats a target's own resolution.
    pub overwrite_resolution: bool,

    pub photometry: ModeTable<FamilyTable<bool>>,

    /// Central wavelengths [µm].
    pub central_wavelength: SetupTable<f64>,

    /// Detector integration times [s].
    pub dit: SetupTable<f64>,

    pub constraints: Constraints,

    pub catalogs: CatalogSettings,
}

impl Default for Configuration {
    fn default() -> Self {
        let flat_wavelength = FamilyTable {
            uts: ResolutionTable::uniform(4.1),
            ats: ResolutionTable::uniform(4.1),
        };

        Configuration {
            resolution: Resolution::Low,
            overwrite_resolution: false,
            photometry: ModeTable {
                matisse: FamilyTable {
                    uts: true,
                    ats: true,
                },
                gra4mat: FamilyTable {
                    uts: false,
                    ats: true,
                },
            },
            central_wavelength: ModeTable {
                matisse: flat_wavelength,
                gra4mat: FamilyTable {
                    uts: ResolutionTable {
                        low: 4.1,
                        med: 3.52,
                        high: 3.52,
                    },
                    ats: ResolutionTable::uniform(4.1),
                },
            },
            dit: ModeTable {
                matisse: FamilyTable {
                    uts: ResolutionTable::uniform(0.111),
                    ats: ResolutionTable::uniform(0.111),
                },
                gra4mat: FamilyTable {
                    uts: ResolutionTable::uniform(0.6),
                    ats: ResolutionTable {
                        low: 0.6,
                        med: 1.3,
                        high: 3.0,
                    },
                },
            },
            constraints: Constraints::default(),
            catalogs: CatalogSettings::default(),
        }
    }
}

impl Configuration {
    /// Read a configuration file (toml, json or yaml). Anything not in the
    /// file keeps its default value.
    pub fn from_file(path: &Path) -> Result<Configuration, SettingsError> {
        let mut document = serde_json::to_value(Configuration::default())?;
        merge_documents(&mut document, read_document(path)?);
        let config: Configuration = serde_json::from_value(document)?;
        config.validate()?;
        debug!("Read configuration from {}", path.display());
        Ok(config)
    }

    /// Check that the values make sense.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.constraints.atmosphere()?;
        if !(self.constraints.pwv > 0.0) {
            return Err(SettingsError::InvalidPwv(self.constraints.pwv));
        }
        for (what, table) in [
            ("DIT", &self.dit),
            ("central wavelength", &self.central_wavelength),
        ] {
            for mode in OperationalMode::iter() {
                for family in ArrayFamily::iter() {
                    for resolution in Resolution::iter() {
                        let value = *table.get(mode).get(family).get(resolution);
                        if !(value > 0.0) {
                            return Err(SettingsError::NotPositive {
                                what,
                                key: format!("{mode}.{family}.{resolution}"),
                                value,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// A copy of this configuration with a different resolution-overwrite
    /// flag.
    pub fn with_overwrite_resolution(&self, overwrite_resolution: bool) -> Configuration {
        Configuration {
            overwrite_resolution,
            ..self.clone()
        }
    }

    /// The resolution to use for an OB. A target's own resolution beats the
    /// requested one, unless `overwrite_resolution` is set.
    pub fn resolve_resolution(
        &self,
        requested: Resolution,
        target_override: Option<Resolution>,
    ) -> Resolution {
        match target_override {
            Some(r) if !self.overwrite_resolution => r,
            _ => requested,
        }
    }

    /// Get the settings for an OB.
    pub fn resolve(
        &self,
        mode: OperationalMode,
        family: ArrayFamily,
        requested: Resolution,
        target_override: Option<Resolution>,
    ) -> ResolvedSettings {
        let resolution = self.resolve_resolution(requested, target_override);
        let settings = ResolvedSettings {
            resolution,
            dit: *self.dit.get(mode).get(family).get(resolution),
            central_wavelength: *self.central_wavelength.get(mode).get(family).get(resolution),
            photometry_enabled: *self.photometry.get(mode).get(family),
        };
        trace!("Settings for {mode}, {family}, {requested} (override {target_override:?}): {settings:?}");
        settings
    }
}
