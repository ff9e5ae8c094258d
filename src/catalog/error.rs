// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::settings::SettingsError;

/// Errors associated with catalog queries.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Target '{0}' wasn't found in any catalog")]
    NotFound(String),

    #[error("Querying {catalog} for '{target}' failed: {message}")]
    Service {
        catalog: String,
        target: String,
        message: String,
    },

    #[error("Couldn't read the local catalog: {0}")]
    File(#[from] SettingsError),
}
