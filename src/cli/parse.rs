// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Show (or save) what p2ob finds in a night plan.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use log::info;

use super::{common::InfoPrinter, P2obError};
use crate::{
    constants::{DEFAULT_NIGHT_IDENTIFIER, DEFAULT_RUN_IDENTIFIER},
    night_plan::{parse_night_name, parse_program_id, parse_run_name, NightPlan, NightPlanFileType},
};

/// Read a night plan and print its runs, nights and observation groups.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Path to the night plan. Text files are parsed; yaml and json files
    /// must contain a previously saved night plan.
    #[clap(name = "NIGHT_PLAN", parse(from_os_str))]
    night_plan: PathBuf,

    /// Lines starting with this (ignoring case) start a run.
    #[clap(long, default_value = DEFAULT_RUN_IDENTIFIER)]
    run_identifier: String,

    /// Lines starting with this (ignoring case) start a night.
    #[clap(long, default_value = DEFAULT_NIGHT_IDENTIFIER)]
    night_identifier: String,

    /// Save the parsed night plan to this file (yaml or json), so that it can
    /// be edited and given to 'p2ob create'.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

impl ParseArgs {
    pub fn run(self, dry_run: bool) -> Result<(), P2obError> {
        let plan = NightPlan::read_file(
            &self.night_plan,
            &self.run_identifier,
            &self.night_identifier,
        )?;
        display_plan(&plan);

        if let Some(output) = &self.output {
            if dry_run {
                info!("Dry run; not writing {}", output.display());
            } else {
                save_plan(&plan, output)?;
                info!("Wrote night plan to {}", output.display());
            }
        }
        Ok(())
    }
}

fn display_plan(plan: &NightPlan) {
    for run in &plan.runs {
        let mut title = parse_run_name(&run.label);
        if let Some(id) = parse_program_id(&run.label) {
            title.push_str(&format!(" ({id})"));
        }
        let mut printer = InfoPrinter::new(title.into());
        for night in &run.nights {
            let mut block = vec![format!(
                "{}: {} groups",
                parse_night_name(&night.label),
                night.groups.len()
            )
            .into()];
            for group in &night.groups {
                let calibrators = group
                    .calibrators
                    .iter()
                    .map(|c| format!("{} ({}, {})", c.name, c.tag, c.order))
                    .collect::<Vec<_>>();
                block.push(if calibrators.is_empty() {
                    format!("  {}", group.target).into()
                } else {
                    format!("  {}: {}", group.target, calibrators.join(", ")).into()
                });
            }
            printer.push_block(block);
        }
        printer.display();
    }
}

fn save_plan(plan: &NightPlan, output: &Path) -> Result<(), P2obError> {
    let file_type = match output
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| NightPlanFileType::from_str(e).ok())
    {
        Some(t @ (NightPlanFileType::Yaml | NightPlanFileType::Json)) => t,
        _ => {
            return Err(P2obError::Configuration(format!(
                "Can't save a night plan to '{}'; use a yaml or json file",
                output.display()
            )))
        }
    };
    let write_error = |e: &dyn std::fmt::Display| {
        P2obError::Output(format!("Couldn't write '{}': {e}", output.display()))
    };

    let mut f = BufWriter::new(File::create(output)?);
    if file_type == NightPlanFileType::Yaml {
        serde_yaml::to_writer(&mut f, plan).map_err(|e| write_error(&e))?;
    } else {
        serde_json::to_writer_pretty(&mut f, plan).map_err(|e| write_error(&e))?;
    }
    f.flush()?;
    Ok(())
}
