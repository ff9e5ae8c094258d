// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Night plans.
//!
//! A night plan is a loosely structured text file written by a
//! calibrator-matching tool. It is cut into runs, runs are cut into nights,
//! and the lines of each night are turned into observation groups (a science
//! target and its calibrators).

mod descriptor;
mod error;
mod groups;
mod segment;

pub use descriptor::{
    parse_array_configuration, parse_night_name, parse_operational_mode, parse_program_id,
    parse_resolution, parse_run_name, Prompt, TerminalPrompt,
};
pub use error::{DescriptorError, NightPlanError};
pub use groups::parse_groups;
pub use segment::{segment, Section};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The waveband(s) a calibrator is good for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum BandTag {
    L,
    N,
    LN,
}

/// Whether a calibrator is observed before or after its science target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CalibratorOrder {
    #[strum(to_string = "before", serialize = "b")]
    #[serde(rename = "b", alias = "before")]
    Before,

    #[strum(to_string = "after", serialize = "a")]
    #[serde(rename = "a", alias = "after")]
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibratorRef {
    pub name: String,
    pub tag: BandTag,
    pub order: CalibratorOrder,
}

/// A science target and the calibrators observed with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationGroup {
    pub target: String,
    #[serde(default)]
    pub calibrators: Vec<CalibratorRef>,
}

impl ObservationGroup {
    pub fn science_only(target: &str) -> ObservationGroup {
        ObservationGroup {
            target: target.to_string(),
            calibrators: vec![],
        }
    }
}

/// The groups of one night, in observing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightSection {
    pub label: String,
    pub groups: Vec<ObservationGroup>,
}

/// The nights of one run. The label carries the run's metadata; see
/// [`parse_array_configuration`] and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSection {
    pub label: String,
    pub nights: Vec<NightSection>,
}

/// A parsed night plan. Runs and nights are kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightPlan {
    pub runs: Vec<RunSection>,
}

impl NightPlan {
    /// Parse the lines of a night plan. Nights without any observation
    /// groups are left out, as are runs without any nights.
    pub fn parse<S: AsRef<str>>(
        lines: &[S],
        run_identifier: &str,
        night_identifier: &str,
    ) -> NightPlan {
        let mut runs = vec![];
        for run in segment(lines, run_identifier) {
            let mut nights = vec![];
            for night in segment(run.lines, night_identifier) {
                let groups = parse_groups(night.lines);
                if groups.is_empty() {
                    debug!("'{}' / '{}' has no observation groups", run.label, night.label);
                    continue;
                }
                nights.push(NightSection {
                    label: night.label,
                    groups,
                });
            }

            if nights.is_empty() {
                debug!("Run '{}' has no nights with observations", run.label);
                continue;
            }
            runs.push(RunSection {
                label: run.label,
                nights,
            });
        }

        NightPlan { runs }
    }

    /// Read a night plan from a file. Text files are parsed; yaml and json
    /// files are expected to contain a previously parsed night plan.
    pub fn read_file(
        path: &Path,
        run_identifier: &str,
        night_identifier: &str,
    ) -> Result<NightPlan, NightPlanError> {
        if !path.exists() {
            return Err(NightPlanError::DoesNotExist(path.to_path_buf()));
        }

        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| NightPlanFileType::from_str(e).ok())
            .unwrap_or(NightPlanFileType::Text);
        debug!("Reading night plan {} as {file_type}", path.display());

        let plan = match file_type {
            NightPlanFileType::Text => {
                let lines = BufReader::new(File::open(path)?)
                    .lines()
                    .collect::<Result<Vec<String>, _>>()?;
                NightPlan::parse(&lines, run_identifier, night_identifier)
            }
            NightPlanFileType::Yaml => serde_yaml::from_reader(File::open(path)?)?,
            NightPlanFileType::Json => serde_json::from_reader(File::open(path)?)?,
        };

        if plan.num_groups() == 0 {
            return Err(NightPlanError::NoGroups(path.to_path_buf()));
        }
        info!(
            "Read {} runs with {} observation groups from {}",
            plan.runs.len(),
            plan.num_groups(),
            path.display()
        );
        Ok(plan)
    }

    /// The total number of observation groups across all runs and nights.
    pub fn num_groups(&self) -> usize {
        self.runs
            .iter()
            .flat_map(|r| &r.nights)
            .map(|n| n.groups.len())
            .sum()
    }
}

/// The kinds of files a night plan can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum NightPlanFileType {
    #[strum(serialize = "txt")]
    Text,

    #[strum(serialize = "yaml", serialize = "yml")]
    Yaml,

    #[strum(serialize = "json")]
    Json,
}
