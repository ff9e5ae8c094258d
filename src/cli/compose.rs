// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compose a single OB.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use super::{
    common::{SetupArgs, ARRAY_CONFIGURATION_HELP, OPERATIONAL_MODE_HELP, RESOLUTION_HELP},
    P2obError,
};
use crate::ob::{Composer, ObRequest};

/// Compose the OB of a single target. Without an output directory, the OBX
/// text is printed.
#[derive(Parser, Debug)]
pub struct ComposeArgs {
    /// The name of the target, as it appears in the catalog.
    #[clap(name = "TARGET")]
    target: String,

    /// Whether the target is a science target (sci) or a calibrator (cal).
    #[clap(short, long, default_value = "sci")]
    kind: String,

    #[clap(short, long, help = ARRAY_CONFIGURATION_HELP.as_str())]
    array_configuration: String,

    #[clap(short, long, default_value = "matisse", help = OPERATIONAL_MODE_HELP.as_str())]
    mode: String,

    /// Default taken from the configuration.
    #[clap(short, long, help = RESOLUTION_HELP.as_str())]
    resolution: Option<String>,

    /// For calibrators, the science target that they calibrate.
    #[clap(long)]
    sci_name: Option<String>,

    /// For calibrators, the waveband(s) they are used for (L, N or LN).
    #[clap(long)]
    tag: Option<String>,

    #[clap(flatten)]
    setup: SetupArgs,

    /// Write the OBX file into this directory.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

impl ComposeArgs {
    pub fn run(self, dry_run: bool) -> Result<(), P2obError> {
        let setup = self.setup.load()?;
        let mut catalog = setup.catalog;
        let resolution = self
            .resolution
            .unwrap_or_else(|| setup.config.resolution.to_string());
        let request = ObRequest::parse(
            &self.target,
            &self.kind,
            &self.array_configuration,
            &self.mode,
            self.sci_name.as_deref(),
            self.tag.as_deref(),
            &resolution,
        )?;

        let composer = Composer::new(&setup.config, &setup.templates);
        let ob = composer.compose(&request, &mut catalog)?;
        match &self.output {
            Some(dir) if !dry_run => {
                let file = ob.write_obx(dir)?;
                info!("Wrote {}", file.display());
            }
            _ => print!("{}", ob.to_obx()),
        }
        Ok(())
    }
}
