// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors associated with the upload service.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Couldn't log in to {server} as '{username}': {message}")]
    Login {
        server: String,
        username: String,
        message: String,
    },

    #[error("Couldn't create container '{name}': {message}")]
    Container { name: String, message: String },

    #[error("Couldn't create OB '{name}': {message}")]
    Ob { name: String, message: String },

    #[error("Couldn't set the {kind} template of OB '{name}': {message}")]
    Template {
        name: String,
        kind: String,
        message: String,
    },
}
