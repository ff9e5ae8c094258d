// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    night_plan::DescriptorError,
    ob::{ComposeError, ObxWriteError},
    settings::SettingsError,
    upload::UploadError,
};

/// Errors that stop a whole run of OB creation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Manual input: {0}")]
    ManualInput(String),

    #[error("Couldn't read manual input: {0}")]
    ManualInputFile(#[from] SettingsError),

    #[error("No array configuration was given for the manual input")]
    NoArrayConfiguration,

    #[error("Couldn't write to the skipped-targets log '{}': {source}", path.display())]
    SkipLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Errors from wherever finished OBs go.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Obx(#[from] ObxWriteError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl SinkError {
    /// Whether only the one OB is affected, i.e. the next OB may still get
    /// through.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SinkError::Upload(_))
    }
}
