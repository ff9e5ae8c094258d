// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, p2ob, write_inputs, Inputs};

#[test]
fn test_parse_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { night_plan, .. } = write_inputs(tmp_dir.path());

    let cmd = p2ob()
        .args(["parse", &night_plan.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "parse failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_compose_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { catalog, .. } = write_inputs(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "compose", "HD 142666",
            "--array-configuration", "medium",
            "--catalog", &catalog.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "compose failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
