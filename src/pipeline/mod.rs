// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Creating the OBs of whole night plans.
//!
//! Every observation group is turned into the sequence of its calibrators
//! observed before the science target, the science target, and the
//! calibrators observed after it. Every element of that sequence becomes an
//! OB. Targets that can't be turned into OBs (e.g. because a catalog doesn't
//! know them) are skipped and recorded; anything else stops the run.

mod error;
mod manual;
mod sink;
mod skip_log;

pub use error::{PipelineError, SinkError};
pub use manual::{Calibrators, ManualInput, OneOrMany};
pub use sink::{ObSink, ObxDirectoryWriter};
pub use skip_log::SkipLog;

use std::{error::Error, fmt};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    catalog::CatalogQuery,
    instrument::{ArrayConfiguration, ObservationKind, OperationalMode, Resolution},
    night_plan::{
        parse_array_configuration, parse_night_name, parse_operational_mode, parse_resolution,
        parse_run_name, BandTag, CalibratorOrder, NightPlan, ObservationGroup, Prompt,
    },
    ob::{Composer, ObRequest, Templates},
    settings::Configuration,
    upload::ObservationMode,
};

lazy_static::lazy_static! {
    pub static ref MODE_SELECTIONS_COMMA_SEPARATED: String = ModeSelection::iter().join(", ");
}

/// The folder that OBs from manual input are put into.
pub const MANUAL_FOLDER: &str = "manual";

/// The key of a [`ResolutionMap`] that applies to all other targets.
pub const STANDARD_RESOLUTION_KEY: &str = "standard";

/// Which operational modes OBs are made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ModeSelection {
    #[strum(serialize = "st")]
    Standalone,

    #[strum(serialize = "gr")]
    Gra4mat,

    #[default]
    #[strum(serialize = "both")]
    Both,
}

impl ModeSelection {
    pub fn modes(self) -> Vec<OperationalMode> {
        match self {
            ModeSelection::Standalone => vec![OperationalMode::Matisse],
            ModeSelection::Gra4mat => vec![OperationalMode::Gra4mat],
            ModeSelection::Both => vec![OperationalMode::Matisse, OperationalMode::Gra4mat],
        }
    }
}

/// Resolutions per target, with a fallback for targets that aren't listed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Resolution>", into = "IndexMap<String, Resolution>")]
pub struct ResolutionMap {
    pub standard: Resolution,
    pub targets: IndexMap<String, Resolution>,
}

impl ResolutionMap {
    pub fn uniform(standard: Resolution) -> ResolutionMap {
        ResolutionMap {
            standard,
            targets: IndexMap::new(),
        }
    }

    pub fn get(&self, target: &str) -> Resolution {
        self.targets
            .get(target.trim())
            .copied()
            .unwrap_or(self.standard)
    }
}

impl From<IndexMap<String, Resolution>> for ResolutionMap {
    fn from(mut map: IndexMap<String, Resolution>) -> Self {
        let standard = map
            .shift_remove(STANDARD_RESOLUTION_KEY)
            .unwrap_or_default();
        ResolutionMap {
            standard,
            targets: map,
        }
    }
}

impl From<ResolutionMap> for IndexMap<String, Resolution> {
    fn from(map: ResolutionMap) -> Self {
        std::iter::once((STANDARD_RESOLUTION_KEY.to_string(), map.standard))
            .chain(map.targets)
            .collect()
    }
}

/// Where an OB belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObLocation {
    /// e.g. the run and the night.
    pub path: Vec<String>,
    pub mode: OperationalMode,

    /// The science target of the OB's group.
    pub group: String,
}

impl ObLocation {
    /// The folders of the OB, including the operational mode's folder.
    pub fn folders(&self) -> Vec<String> {
        let mut folders = self.path.clone();
        folders.push(self.mode.dir_name().to_string());
        folders
    }
}

impl fmt::Display for ObLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folders().join("/"))
    }
}

/// One element of an observation group's sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObItem {
    pub target: String,
    pub kind: ObservationKind,

    /// The science target, for calibrators.
    pub sci_name: Option<String>,
    pub tag: Option<BandTag>,
}

fn calibrator_items(
    group: &ObservationGroup,
    order: CalibratorOrder,
) -> impl Iterator<Item = ObItem> + '_ {
    group
        .calibrators
        .iter()
        .filter(move |c| c.order == order)
        .map(move |c| ObItem {
            target: c.name.clone(),
            kind: ObservationKind::Calibrator,
            sci_name: Some(group.target.clone()),
            tag: Some(c.tag),
        })
}

/// The order in which the targets of a group are observed.
pub fn group_sequence(group: &ObservationGroup) -> Vec<ObItem> {
    calibrator_items(group, CalibratorOrder::Before)
        .chain(std::iter::once(ObItem {
            target: group.target.clone(),
            kind: ObservationKind::Science,
            sci_name: None,
            tag: None,
        }))
        .chain(calibrator_items(group, CalibratorOrder::After))
        .collect()
}

/// How a run of OB creation is set up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub modes: ModeSelection,
    pub observation_mode: ObservationMode,

    /// If set, this is used instead of what the run labels say.
    pub array_configuration: Option<ArrayConfiguration>,

    pub resolutions: ResolutionMap,
}

/// A target that didn't become an OB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTarget {
    pub target: String,
    pub kind: ObservationKind,
    pub location: String,
    pub error: String,

    /// The sources of the error, outermost first.
    pub causes: Vec<String>,
}

impl SkippedTarget {
    fn new(item: &ObItem, location: &ObLocation, error: &dyn Error) -> SkippedTarget {
        let mut causes = vec![];
        let mut source = error.source();
        while let Some(e) = source {
            causes.push(e.to_string());
            source = e.source();
        }
        SkippedTarget {
            target: item.target.clone(),
            kind: item.kind,
            location: location.to_string(),
            error: error.to_string(),
            causes,
        }
    }
}

/// What a run of OB creation did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// The names of the OBs that were created.
    pub created: Vec<String>,
    pub skipped: Vec<SkippedTarget>,
}

/// Turns observation groups into OBs and hands them to a sink.
pub struct Pipeline<'a, Q: ?Sized, S: ?Sized> {
    config: &'a Configuration,
    templates: &'a Templates,
    catalog: &'a mut Q,
    sink: &'a mut S,
    skip_log: Option<SkipLog>,
    summary: RunSummary,
}

impl<'a, Q: CatalogQuery + ?Sized, S: ObSink + ?Sized> Pipeline<'a, Q, S> {
    pub fn new(
        config: &'a Configuration,
        templates: &'a Templates,
        catalog: &'a mut Q,
        sink: &'a mut S,
    ) -> Pipeline<'a, Q, S> {
        Pipeline {
            config,
            templates,
            catalog,
            sink,
            skip_log: None,
            summary: RunSummary::default(),
        }
    }

    /// Also record skipped targets in a file.
    pub fn with_skip_log(mut self, skip_log: SkipLog) -> Pipeline<'a, Q, S> {
        self.skip_log = Some(skip_log);
        self
    }

    /// Create the OBs of every run and night of a night plan. What isn't
    /// given in `options` is taken from the run labels, asking `prompt` if
    /// a label doesn't say.
    pub fn run_night_plan(
        &mut self,
        plan: &NightPlan,
        options: &RunOptions,
        prompt: &mut dyn Prompt,
    ) -> Result<(), PipelineError> {
        for run in &plan.runs {
            let run_name = parse_run_name(&run.label);
            info!("Creating OBs for run '{run_name}'");

            let array_configuration = match options.array_configuration {
                Some(c) => c,
                None => parse_array_configuration(&run.label, prompt)?,
            };

            // In service mode, the run decides the resolution and mode, and
            // the targets' own resolutions are ignored.
            let (config, modes, resolutions) = match options.observation_mode {
                ObservationMode::Visitor => (
                    self.config.clone(),
                    options.modes.modes(),
                    options.resolutions.clone(),
                ),
                ObservationMode::Service => (
                    self.config.with_overwrite_resolution(true),
                    vec![parse_operational_mode(&run.label, prompt)?],
                    ResolutionMap {
                        standard: parse_resolution(&run.label, prompt)?,
                        ..options.resolutions.clone()
                    },
                ),
            };
            debug!("Run '{run_name}': {array_configuration}, modes {modes:?}, {resolutions:?}");

            for mode in modes {
                for night in &run.nights {
                    let path = vec![run_name.clone(), parse_night_name(&night.label)];
                    self.run_groups(
                        &config,
                        &night.groups,
                        &path,
                        array_configuration,
                        mode,
                        &resolutions,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Create the OBs of manually given targets.
    pub fn run_manual(
        &mut self,
        input: &ManualInput,
        options: &RunOptions,
    ) -> Result<(), PipelineError> {
        let array_configuration = options
            .array_configuration
            .or(input.array_configuration)
            .ok_or(PipelineError::NoArrayConfiguration)?;
        let resolutions = input
            .resolution
            .clone()
            .unwrap_or_else(|| options.resolutions.clone());
        let groups = input.groups()?;
        let config = self.config.clone();
        info!("Creating OBs for {} manually given targets", groups.len());

        for mode in options.modes.modes() {
            self.run_groups(
                &config,
                &groups,
                &[MANUAL_FOLDER.to_string()],
                array_configuration,
                mode,
                &resolutions,
            )?;
        }
        Ok(())
    }

    /// Create the OBs of observation groups that all belong in the same
    /// place.
    pub fn run_groups(
        &mut self,
        config: &Configuration,
        groups: &[ObservationGroup],
        path: &[String],
        array_configuration: ArrayConfiguration,
        mode: OperationalMode,
        resolutions: &ResolutionMap,
    ) -> Result<(), PipelineError> {
        let composer = Composer::new(config, self.templates);
        for group in groups {
            let location = ObLocation {
                path: path.to_vec(),
                mode,
                group: group.target.clone(),
            };
            let resolution = resolutions.get(&group.target);
            info!("{location}: '{}'", group.target);

            for item in group_sequence(group) {
                let request = ObRequest {
                    target: item.target.clone(),
                    kind: item.kind,
                    array_configuration,
                    operational_mode: mode,
                    sci_name: item.sci_name.clone(),
                    tag: item.tag,
                    resolution,
                };
                self.process(&composer, &request, &item, &location)?;
            }
        }
        Ok(())
    }

    fn process(
        &mut self,
        composer: &Composer,
        request: &ObRequest,
        item: &ObItem,
        location: &ObLocation,
    ) -> Result<(), PipelineError> {
        let ob = match composer.compose(request, &mut *self.catalog) {
            Ok(ob) => ob,
            Err(e) if e.is_recoverable() => return self.skip(item, location, &e),
            Err(e) => return Err(e.into()),
        };
        match self.sink.accept(location, &ob) {
            Ok(()) => {
                info!("    Created '{}'", ob.name);
                self.summary.created.push(ob.name);
                Ok(())
            }
            Err(e) if e.is_recoverable() => self.skip(item, location, &e),
            Err(e) => Err(e.into()),
        }
    }

    fn skip(
        &mut self,
        item: &ObItem,
        location: &ObLocation,
        error: &dyn Error,
    ) -> Result<(), PipelineError> {
        warn!("    Skipped {} '{}': {error}", item.kind, item.target);
        let skipped = SkippedTarget::new(item, location, error);
        if let Some(skip_log) = self.skip_log.as_mut() {
            skip_log.record(&skipped)?;
        }
        self.summary.skipped.push(skipped);
        Ok(())
    }

    /// What has been done so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn finish(self) -> RunSummary {
        self.summary
    }
}
