// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

/// Errors associated with reading in a night plan.
#[derive(Error, Debug)]
pub enum NightPlanError {
    #[error("Night plan file '{}' was not found/does not exist", .0.display())]
    DoesNotExist(PathBuf),

    #[error("Night plan '{}' doesn't contain any observation groups", .0.display())]
    NoGroups(PathBuf),

    #[error("Couldn't decode yaml night plan: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Couldn't decode json night plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Errors associated with getting run metadata.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("No {0} was given for the run")]
    NoSelection(String),

    #[error("Selection {index} for the run's {what} is invalid; there are only {num_choices} choices")]
    InvalidSelection {
        what: String,
        index: usize,
        num_choices: usize,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
