// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use p2ob_matisse::NightPlan;

use crate::{get_cmd_output, p2ob, write_inputs, Inputs};

#[test]
fn test_parse_shows_groups() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { night_plan, .. } = write_inputs(tmp_dir.path());

    let cmd = p2ob()
        .args(["parse", &night_plan.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "parse failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("run1 (110.2474.004)"), "{stdout}");
    assert!(stdout.contains("night1_2023-01-10: 2 groups"), "{stdout}");
    assert!(
        stdout.contains("HD 142666: HD 100920 (L, before), HD 150798 (N, after)"),
        "{stdout}"
    );
}

#[test]
fn test_parse_saves_yaml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { night_plan, .. } = write_inputs(tmp_dir.path());
    let output = tmp_dir.path().join("plan.yaml");

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "parse", &night_plan.display().to_string(),
            "-o", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "parse failed: {}", cmd.err().unwrap());

    // The saved plan reads back as the same thing.
    let saved = NightPlan::read_file(&output, "run", "night").unwrap();
    let parsed = NightPlan::read_file(&night_plan, "run", "night").unwrap();
    assert_eq!(saved, parsed);
    assert_eq!(saved.num_groups(), 2);
}

#[test]
fn test_parse_rejects_text_output() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { night_plan, .. } = write_inputs(tmp_dir.path());
    let output = tmp_dir.path().join("plan.csv");

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "parse", &night_plan.display().to_string(),
            "-o", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("use a yaml or json file"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn test_parse_missing_file() {
    let cmd = p2ob().args(["parse", "/does/not/exist.txt"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("was not found"), "{stderr}");
}
