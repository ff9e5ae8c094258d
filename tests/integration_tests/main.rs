// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod compose;
mod create;
mod no_stderr;
mod parse;

use std::{
    fs,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use indoc::indoc;

fn p2ob() -> Command {
    Command::cargo_bin("p2ob").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

const NIGHT_PLAN: &str = indoc! {"
    # Made by the calibrator-matching tool
    run 1, UTs, MATISSE LR, 110.2474.004
    night 1: 2023-01-10, 3h
    1   cal_L_HD 100920   11 36 47.1 -63 34 21.0   4.1 3.1 3.0
    2   HD 142666   15 56 40.02 -22 01 40.0   8.82 6.08 3.41
    3   cal_N_HD 150798   16 34 31.8 -29 51 09.5   0.3 0.1 89.0

    4   AS 209   16 49 15.3 -14 22 08.6   11.3 7.0 0.9
"};

const CATALOG: &str = indoc! {r#"
    HD 142666:
      RA: "15 56 40.0221"
      DEC: "-22 01 40.002"
      PMRA: -10.5
      PMDEC: -21.0
      med-Lflux: 3.41
      med-Nflux: 4.8
      Kmag: 6.08
      Vmag: 8.81
    HD 100920:
      RA: "11 36 47.1"
      DEC: "-63 34 21.0"
      W1mag: 4.0
      W3mag: 3.9
    HD 150798:
      RA: "16 34 31.8"
      DEC: "-29 51 09.5"
      med-Lflux: 450.0
      med-Nflux: 120.0
"#};

/// The files that p2ob is pointed at.
struct Inputs {
    night_plan: PathBuf,
    catalog: PathBuf,
}

fn write_inputs(dir: &Path) -> Inputs {
    let night_plan = dir.join("plan.txt");
    fs::write(&night_plan, NIGHT_PLAN).unwrap();
    let catalog = dir.join("catalog.yaml");
    fs::write(&catalog, CATALOG).unwrap();
    Inputs {
        night_plan,
        catalog,
    }
}
