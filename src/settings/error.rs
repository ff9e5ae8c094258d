// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

/// Errors associated with configuration files.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration file '{}' doesn't have a recognised file extension! Valid extensions are: {valid}", path.display())]
    UnrecognisedExtension { path: PathBuf, valid: String },

    #[error("Turbulence category {0}% is not one of 10, 30 or 70")]
    InvalidTurbulence(u8),

    #[error("The precipitable water vapour must be positive, but got {0} mm")]
    InvalidPwv(f64),

    #[error("The {what} for {key} must be positive, but got {value}")]
    NotPositive {
        what: &'static str,
        key: String,
        value: f64,
    },

    #[error("Couldn't decode toml structure: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Couldn't decode json structure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Couldn't decode yaml structure: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
