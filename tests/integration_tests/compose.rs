// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{get_cmd_output, p2ob, write_inputs, Inputs};

#[test]
fn test_compose_prints_obx() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { catalog, .. } = write_inputs(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "compose", "HD 100920",
            "--kind", "cal",
            "--sci-name", "HD 142666",
            "--tag", "L",
            "--array-configuration", "small",
            "--mode", "gra4mat",
            "--resolution", "med",
            "--catalog", &catalog.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "compose failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains(&format!("{:<40}\"CAL_HD_100920_HD_142666_L\"\n", "name")));
    assert!(stdout.contains(&format!("{:<40}\"CALIB\"\n", "DPR.CATG")));
    assert!(stdout.contains(&format!("{:<40}\"MED\"\n", "INS.DIL.NAME")));
    assert!(stdout.contains(&format!("{:<40}\"1.3\"\n", "DET1.DIT")));
}

#[test]
fn test_compose_writes_obx() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { catalog, .. } = write_inputs(tmp_dir.path());
    let out = tmp_dir.path().join("single");

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "compose", "HD 142666",
            "--array-configuration", "UTs",
            "--catalog", &catalog.display().to_string(),
            "--output", &out.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "compose failed: {}", cmd.err().unwrap());
    assert!(out.join("SCI_HD_142666.obx").exists());
}

#[test]
fn test_compose_invalid_configuration() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { catalog, .. } = write_inputs(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "compose", "HD 142666",
            "--array-configuration", "tiny",
            "--catalog", &catalog.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(
        stderr.contains("Unrecognised array configuration 'tiny'"),
        "{stderr}"
    );
}

#[test]
fn test_compose_unknown_target() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { catalog, .. } = write_inputs(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "compose", "AS 209",
            "--array-configuration", "UTs",
            "--catalog", &catalog.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("wasn't found in any catalog"), "{stderr}");
}
