// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Where finished OBs go.

use std::path::PathBuf;

use super::{ObLocation, SinkError};
use crate::{
    ob::ObDescriptor,
    upload::{P2Api, Uploader},
};

/// Something that takes finished OBs.
pub trait ObSink {
    fn accept(&mut self, location: &ObLocation, ob: &ObDescriptor) -> Result<(), SinkError>;
}

/// Collects OBs in memory.
impl ObSink for Vec<(ObLocation, ObDescriptor)> {
    fn accept(&mut self, location: &ObLocation, ob: &ObDescriptor) -> Result<(), SinkError> {
        self.push((location.clone(), ob.clone()));
        Ok(())
    }
}

/// Writes OBs as OBX files into `<root>/<folders...>/<mode>/`.
#[derive(Debug, Clone)]
pub struct ObxDirectoryWriter {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl ObxDirectoryWriter {
    pub fn new<P: Into<PathBuf>>(root: P) -> ObxDirectoryWriter {
        ObxDirectoryWriter {
            root: root.into(),
            written: vec![],
        }
    }

    /// The files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ObSink for ObxDirectoryWriter {
    fn accept(&mut self, location: &ObLocation, ob: &ObDescriptor) -> Result<(), SinkError> {
        let mut dir = self.root.clone();
        dir.extend(location.folders());
        let file = ob.write_obx(&dir)?;
        self.written.push(file);
        Ok(())
    }
}

impl<A: P2Api> ObSink for Uploader<A> {
    fn accept(&mut self, location: &ObLocation, ob: &ObDescriptor) -> Result<(), SinkError> {
        self.upload(&location.folders(), &location.group, ob)?;
        Ok(())
    }
}
