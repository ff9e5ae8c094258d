// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::{catalog::CatalogError, coord::SexagesimalError, settings::SettingsError};

/// Errors associated with composing an OB.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Unrecognised {what} '{value}'; valid values are: {valid}")]
    InvalidConfiguration {
        what: &'static str,
        value: String,
        valid: String,
    },

    #[error("Target '{target}' has no {field}, and it can't be defaulted")]
    MissingField {
        target: String,
        field: &'static str,
    },

    #[error("Target '{target}' has unusable coordinates: {source}")]
    Coordinates {
        target: String,
        source: SexagesimalError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ComposeError {
    /// Whether the error only concerns the one target being composed, so that
    /// other targets can still be composed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ComposeError::MissingField { .. }
            | ComposeError::Coordinates { .. }
            | ComposeError::Catalog(_) => true,
            ComposeError::InvalidConfiguration { .. } | ComposeError::Settings(_) => false,
        }
    }
}

/// Errors associated with writing OBX files.
#[derive(Error, Debug)]
pub enum ObxWriteError {
    #[error("Couldn't create the output directory '{}': {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("Couldn't write '{}': {source}", file.display())]
    Write {
        file: PathBuf,
        source: std::io::Error,
    },
}
