// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A persistent record of the targets that couldn't be turned into OBs.

use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use super::{PipelineError, SkippedTarget};

/// Appends skipped targets to a file. The file is only created once there
/// is something to write.
#[derive(Debug)]
pub struct SkipLog {
    path: PathBuf,
    file: Option<File>,
}

impl SkipLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> SkipLog {
        SkipLog {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, skipped: &SkippedTarget) -> Result<(), PipelineError> {
        let io_error = |source| PipelineError::SkipLog {
            path: self.path.clone(),
            source,
        };

        let file = match &mut self.file {
            Some(f) => f,
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent).map_err(io_error)?;
                }
                let f = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .map_err(io_error)?;
                self.file.insert(f)
            }
        };

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut entry = format!(
            "{timestamp} - Skipped {} '{}' ({}): {}\n",
            skipped.kind, skipped.target, skipped.location, skipped.error
        );
        for cause in &skipped.causes {
            entry.push_str(&format!("    caused by: {cause}\n"));
        }
        file.write_all(entry.as_bytes()).map_err(io_error)
    }
}
