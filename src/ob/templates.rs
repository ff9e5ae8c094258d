// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The default values of every OB field.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{Acquisition, Header, Observation};
use crate::{
    instrument::OperationalMode,
    settings::{merge_documents, read_document, SettingsError},
};

const BUILTIN_TEMPLATES: &str = include_str!("../../data/templates.toml");

/// The acquisition and observation templates of one operational mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeTemplates {
    pub acquisition: Acquisition,
    pub observation: Observation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Templates {
    pub header: Header,
    pub matisse: ModeTemplates,
    pub gra4mat: ModeTemplates,
}

impl Templates {
    /// The templates shipped with this crate.
    pub fn builtin() -> Result<Templates, SettingsError> {
        Ok(toml::from_str(BUILTIN_TEMPLATES)?)
    }

    /// Read templates from a file (toml, json or yaml). Fields that aren't in
    /// the file keep their built-in values.
    pub fn from_file(path: &Path) -> Result<Templates, SettingsError> {
        let mut document = serde_json::to_value(Templates::builtin()?)?;
        merge_documents(&mut document, read_document(path)?);
        let templates = serde_json::from_value(document)?;
        debug!("Read OB templates from {}", path.display());
        Ok(templates)
    }

    pub fn for_mode(&self, mode: OperationalMode) -> &ModeTemplates {
        match mode {
            OperationalMode::Matisse => &self.matisse,
            OperationalMode::Gra4mat => &self.gra4mat,
        }
    }
}
