// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. The `create` and `compose`
//! subcommands both need OB defaults, templates and target data, so the
//! arguments for these are shared between them.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::{path::PathBuf, time::Duration};

use clap::Args;
use log::debug;

use super::P2obError;
use crate::{
    catalog::{LocalCatalog, Throttled},
    instrument::{
        ARRAY_CONFIGURATIONS_COMMA_SEPARATED, OPERATIONAL_MODES_COMMA_SEPARATED,
        RESOLUTIONS_COMMA_SEPARATED,
    },
    ob::Templates,
    pipeline::MODE_SELECTIONS_COMMA_SEPARATED,
    settings::{Configuration, DOCUMENT_FILE_TYPES_COMMA_SEPARATED},
};

lazy_static::lazy_static! {
    pub(super) static ref CONFIG_HELP: String =
        format!("A file of OB defaults (resolutions, DITs, wavelengths, constraints, catalogs). Only the values in the file override the built-in defaults. Supported formats: {}", *DOCUMENT_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref TEMPLATES_HELP: String =
        format!("A file of OB template values that override the built-in templates. Supported formats: {}", *DOCUMENT_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref CATALOG_HELP: String =
        format!("A file of target records, keyed by target name. Supported formats: {}", *DOCUMENT_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref ARRAY_CONFIGURATION_HELP: String =
        format!("The array configuration. Valid values are: {}", *ARRAY_CONFIGURATIONS_COMMA_SEPARATED);

    pub(super) static ref OPERATIONAL_MODE_HELP: String =
        format!("The operational mode. Valid values are: {}", *OPERATIONAL_MODES_COMMA_SEPARATED);

    pub(super) static ref MODE_SELECTION_HELP: String =
        format!("Which operational modes to make OBs for. Valid values are: {}", *MODE_SELECTIONS_COMMA_SEPARATED);

    pub(super) static ref RESOLUTION_HELP: String =
        format!("The L-band resolution. Valid values are: {}", *RESOLUTIONS_COMMA_SEPARATED);
}

/// Where OB defaults and target data come from.
#[derive(Debug, Default, Args)]
pub(super) struct SetupArgs {
    #[clap(short, long, parse(from_os_str), help = CONFIG_HELP.as_str())]
    pub(super) config: Option<PathBuf>,

    #[clap(long, parse(from_os_str), help = TEMPLATES_HELP.as_str())]
    pub(super) templates: Option<PathBuf>,

    #[clap(long, parse(from_os_str), help = CATALOG_HELP.as_str())]
    pub(super) catalog: PathBuf,

    /// The delay between consecutive catalog queries [milliseconds]. Default
    /// taken from the configuration.
    #[clap(long)]
    pub(super) catalog_delay: Option<u64>,
}

/// Everything that OBs are made from.
pub(super) struct Setup {
    pub(super) config: Configuration,
    pub(super) templates: Templates,
    pub(super) catalog: Throttled<LocalCatalog>,
}

impl SetupArgs {
    pub(super) fn load(self) -> Result<Setup, P2obError> {
        let mut printer = InfoPrinter::new("OB defaults".into());

        let config = match &self.config {
            Some(file) => {
                printer.push_line(format!("Configuration: {}", file.display()).into());
                Configuration::from_file(file)?
            }
            None => {
                printer.push_line("Configuration: built-in".into());
                Configuration::default()
            }
        };
        let templates = match &self.templates {
            Some(file) => {
                printer.push_line(format!("Templates:     {}", file.display()).into());
                Templates::from_file(file)?
            }
            None => {
                printer.push_line("Templates:     built-in".into());
                Templates::builtin()?
            }
        };

        let catalog = LocalCatalog::from_file(&self.catalog)?;
        let delay_ms = self.catalog_delay.unwrap_or(config.catalogs.delay_ms);
        printer.push_block(vec![
            format!(
                "Catalog:       {} ({} targets)",
                self.catalog.display(),
                catalog.len()
            )
            .into(),
            format!(
                "Using: {}",
                config
                    .catalogs
                    .catalogs
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
            .into(),
            format!("{delay_ms} ms between queries").into(),
        ]);
        printer.push_line(
            format!(
                "Default resolution {}, overwrite target resolutions: {}",
                config.resolution, config.overwrite_resolution
            )
            .into(),
        );
        printer.display();
        debug!("Configuration: {config:?}");

        Ok(Setup {
            config,
            templates,
            catalog: Throttled::new(catalog, Duration::from_millis(delay_ms)),
        })
    }
}
