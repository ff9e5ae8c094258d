// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing OBs as OBX files.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;

use super::{ObDescriptor, ObxWriteError};
use crate::constants::OBX_KEY_WIDTH;

impl ObDescriptor {
    /// The OB in the OBX format: every field on its own line, its key padded
    /// and its value quoted, with two empty lines after each group of fields.
    pub fn to_obx(&self) -> String {
        let mut obx = String::new();
        for group in self.field_groups() {
            for (key, value) in group.fields {
                obx.push_str(&format!("{key:<width$}\"{value}\"\n", width = OBX_KEY_WIDTH));
            }
            obx.push_str("\n\n");
        }
        obx
    }

    /// Write the OB to `<dir>/<name>.obx`, creating `dir` if necessary.
    /// Returns the path of the new file.
    pub fn write_obx(&self, dir: &Path) -> Result<PathBuf, ObxWriteError> {
        fs::create_dir_all(dir).map_err(|source| ObxWriteError::CreateDir {
            dir: dir.to_path_buf(),
            source,
        })?;

        let file = dir.join(format!("{}.obx", self.name));
        let write_error = |source| ObxWriteError::Write {
            file: file.clone(),
            source,
        };
        let mut handle = File::create(&file).map_err(write_error)?;
        handle
            .write_all(self.to_obx().as_bytes())
            .map_err(write_error)?;
        debug!("Wrote {}", file.display());
        Ok(file)
    }
}
