// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Create the OBs of a night plan or of manually given targets.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use super::{
    common::{
        InfoPrinter, SetupArgs, ARRAY_CONFIGURATION_HELP, MODE_SELECTION_HELP, RESOLUTION_HELP,
    },
    P2obError,
};
use crate::{
    constants::{DEFAULT_NIGHT_IDENTIFIER, DEFAULT_RUN_IDENTIFIER, SKIP_LOG_FILENAME},
    instrument::{ArrayConfiguration, Resolution},
    night_plan::{NightPlan, TerminalPrompt},
    ob::ObDescriptor,
    pipeline::{
        ManualInput, ModeSelection, ObLocation, ObSink, ObxDirectoryWriter, Pipeline,
        ResolutionMap, RunOptions, RunSummary, SkipLog,
    },
    settings::read_document_as,
    upload::ObservationMode,
};

/// Create OBX files for every target of a night plan, or of a file of
/// manually given targets. Targets that can't be turned into OBs are skipped
/// and listed in a log file.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Path to the night plan (text, or a yaml/json file saved by
    /// 'p2ob parse').
    #[clap(short, long, parse(from_os_str))]
    #[clap(required_unless_present = "manual", conflicts_with = "manual")]
    night_plan: Option<PathBuf>,

    /// Path to a file (toml, json or yaml) of manually given targets and
    /// their calibrators.
    #[clap(long, parse(from_os_str))]
    manual: Option<PathBuf>,

    /// Lines starting with this (ignoring case) start a run.
    #[clap(long, default_value = DEFAULT_RUN_IDENTIFIER)]
    run_identifier: String,

    /// Lines starting with this (ignoring case) start a night.
    #[clap(long, default_value = DEFAULT_NIGHT_IDENTIFIER)]
    night_identifier: String,

    #[clap(flatten)]
    setup: SetupArgs,

    /// The directory that OBX files are written into.
    #[clap(short, long, parse(from_os_str))]
    output: PathBuf,

    #[clap(short, long, default_value = "both", help = MODE_SELECTION_HELP.as_str())]
    mode: ModeSelection,

    /// Make OBs for service mode. The resolution and operational mode are
    /// then taken from each run's label.
    #[clap(long)]
    service: bool,

    #[clap(short, long, help = RESOLUTION_HELP.as_str())]
    resolution: Option<Resolution>,

    /// A file (toml, json or yaml) of resolutions per target. The
    /// "standard" key is used for targets that aren't listed.
    #[clap(long, parse(from_os_str), conflicts_with = "resolution")]
    resolutions: Option<PathBuf>,

    #[clap(short, long, help = ARRAY_CONFIGURATION_HELP.as_str())]
    array_configuration: Option<ArrayConfiguration>,

    /// The file that skipped targets are logged to. Default:
    /// <OUTPUT>/skipped_targets.log
    #[clap(long, parse(from_os_str))]
    skip_log: Option<PathBuf>,
}

impl CreateArgs {
    /// Create the OBs. The number of skipped targets is returned.
    pub fn run(self, dry_run: bool) -> Result<usize, P2obError> {
        let setup = self.setup.load()?;
        let config = setup.config;
        let templates = setup.templates;
        let mut catalog = setup.catalog;

        let resolutions = match (&self.resolutions, self.resolution) {
            (Some(file), _) => read_document_as::<ResolutionMap>(file)?,
            (None, Some(r)) => ResolutionMap::uniform(r),
            (None, None) => ResolutionMap::uniform(config.resolution),
        };
        let options = RunOptions {
            modes: self.mode,
            observation_mode: if self.service {
                ObservationMode::Service
            } else {
                ObservationMode::Visitor
            },
            array_configuration: self.array_configuration,
            resolutions,
        };

        let mut writer = ObxDirectoryWriter::new(&self.output);
        let mut collected: Vec<(ObLocation, ObDescriptor)> = vec![];
        let sink: &mut dyn ObSink = if dry_run {
            info!("Dry run; no OBX files will be written");
            &mut collected
        } else {
            &mut writer
        };
        let mut pipeline = Pipeline::new(&config, &templates, &mut catalog, sink);
        if !dry_run {
            let skip_log = self
                .skip_log
                .unwrap_or_else(|| self.output.join(SKIP_LOG_FILENAME));
            pipeline = pipeline.with_skip_log(SkipLog::new(skip_log));
        }

        match (self.night_plan, self.manual) {
            (Some(night_plan), _) => {
                let plan =
                    NightPlan::read_file(&night_plan, &self.run_identifier, &self.night_identifier)?;
                let mut prompt = TerminalPrompt::new();
                pipeline.run_night_plan(&plan, &options, &mut prompt)?;
            }
            (None, Some(manual)) => {
                let input = ManualInput::read_file(&manual)?;
                pipeline.run_manual(&input, &options)?;
            }
            (None, None) => {
                return Err(P2obError::Configuration(
                    "Neither a night plan nor manual input was given".to_string(),
                ))
            }
        }

        let summary = pipeline.finish();
        display_summary(&summary);
        if !dry_run {
            info!(
                "Wrote {} OBX files into {}",
                writer.written().len(),
                self.output.display()
            );
        }
        Ok(summary.skipped.len())
    }
}

fn display_summary(summary: &RunSummary) {
    let mut printer = InfoPrinter::new(
        format!(
            "Created {} OBs, skipped {} targets",
            summary.created.len(),
            summary.skipped.len()
        )
        .into(),
    );
    for skipped in &summary.skipped {
        let mut block = vec![format!(
            "{} '{}' ({}): {}",
            skipped.kind, skipped.target, skipped.location, skipped.error
        )
        .into()];
        block.extend(
            skipped
                .causes
                .iter()
                .map(|cause| format!("  caused by: {cause}").into()),
        );
        printer.push_block(block);
    }
    printer.display();
}
