// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all p2ob-related errors. This should be the *only* error
//! enum that is publicly visible from the command line.

use thiserror::Error;

use crate::{
    catalog::CatalogError,
    night_plan::{DescriptorError, NightPlanError},
    ob::{ComposeError, ObxWriteError},
    pipeline::{PipelineError, SinkError},
    settings::SettingsError,
    upload::UploadError,
};

/// The *only* publicly visible error from p2ob. Each error message carries a
/// hint on where to look, unless it's "generic".
#[derive(Error, Debug)]
pub enum P2obError {
    /// An error related to reading night plans.
    #[error("{0}\n\nNight plans need run headers (e.g. 'run 1, UTs, MATISSE LR'), optionally night headers, and data lines starting with an index. Try 'p2ob parse' on the file.")]
    NightPlan(String),

    /// An error related to run metadata.
    #[error("{0}\n\nIf the run labels don't say, give the array configuration, resolution or mode on the command line.")]
    RunMetadata(String),

    /// An error related to configuration, template or manual input files, or
    /// values given on the command line.
    #[error("{0}\n\nSee 'p2ob help create' for the accepted values and file formats.")]
    Configuration(String),

    /// An error related to target data.
    #[error("{0}\n\nCheck that the catalog file has a record for every target, keyed by the target's name.")]
    Catalog(String),

    /// An error related to building an OB.
    #[error("{0}\n\nTurn up the verbosity (-v or -vv) to see the target data that was used.")]
    Compose(String),

    /// An error related to writing or uploading OBs.
    #[error("{0}\n\nCheck that the output directory is writable.")]
    Output(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<NightPlanError> for P2obError {
    fn from(e: NightPlanError) -> Self {
        match e {
            NightPlanError::IO(e) => Self::from(e),
            _ => Self::NightPlan(e.to_string()),
        }
    }
}

impl From<DescriptorError> for P2obError {
    fn from(e: DescriptorError) -> Self {
        match e {
            DescriptorError::IO(e) => Self::from(e),
            _ => Self::RunMetadata(e.to_string()),
        }
    }
}

impl From<SettingsError> for P2obError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::IO(e) => Self::from(e),
            _ => Self::Configuration(e.to_string()),
        }
    }
}

impl From<CatalogError> for P2obError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::File(e) => Self::Catalog(format!("Couldn't read the local catalog: {e}")),
            CatalogError::NotFound(_) | CatalogError::Service { .. } => Self::Catalog(e.to_string()),
        }
    }
}

impl From<ComposeError> for P2obError {
    fn from(e: ComposeError) -> Self {
        match e {
            ComposeError::InvalidConfiguration { .. } => Self::Configuration(e.to_string()),
            ComposeError::Settings(e) => Self::from(e),
            ComposeError::Catalog(e) => Self::from(e),
            ComposeError::MissingField { .. } | ComposeError::Coordinates { .. } => {
                Self::Compose(e.to_string())
            }
        }
    }
}

impl From<ObxWriteError> for P2obError {
    fn from(e: ObxWriteError) -> Self {
        Self::Output(e.to_string())
    }
}

impl From<UploadError> for P2obError {
    fn from(e: UploadError) -> Self {
        Self::Output(e.to_string())
    }
}

impl From<PipelineError> for P2obError {
    fn from(e: PipelineError) -> Self {
        let s = e.to_string();
        match e {
            PipelineError::ManualInput(_) | PipelineError::NoArrayConfiguration => {
                Self::Configuration(s)
            }
            PipelineError::ManualInputFile(e) => Self::from(e),
            PipelineError::SkipLog { .. } => Self::Output(s),
            PipelineError::Descriptor(e) => Self::from(e),
            PipelineError::Compose(e) => Self::from(e),
            PipelineError::Sink(SinkError::Obx(e)) => Self::from(e),
            PipelineError::Sink(SinkError::Upload(e)) => Self::from(e),
        }
    }
}

impl From<std::io::Error> for P2obError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
