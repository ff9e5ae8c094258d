// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use indoc::indoc;
use tempfile::TempDir;

use crate::{get_cmd_output, p2ob, write_inputs, Inputs};

#[test]
fn test_create_from_night_plan() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs {
        night_plan,
        catalog,
    } = write_inputs(tmp_dir.path());
    let out = tmp_dir.path().join("obs");

    #[rustfmt::skip]
    let output = p2ob()
        .args([
            "create",
            "--night-plan", &night_plan.display().to_string(),
            "--catalog", &catalog.display().to_string(),
            "--output", &out.display().to_string(),
            "--mode", "st",
            "--catalog-delay", "0",
        ])
        .output()
        .unwrap();
    // AS 209 isn't in the catalog.
    assert_eq!(output.status.code(), Some(2));

    let night = out.join("run1").join("night1_2023-01-10").join("standalone");
    for name in [
        "CAL_HD_100920_HD_142666_L",
        "SCI_HD_142666",
        "CAL_HD_150798_HD_142666_N",
    ] {
        assert!(night.join(format!("{name}.obx")).exists(), "{name} is missing");
    }
    assert!(!night.join("SCI_AS_209.obx").exists());
    assert!(!out.join("run1").join("night1_2023-01-10").join("GRA4MAT").exists());

    let obx = fs::read_to_string(night.join("SCI_HD_142666.obx")).unwrap();
    assert!(obx.starts_with(&format!("{:<40}\"SCI_HD_142666\"\n", "name")));
    assert!(obx.contains(&format!("{:<40}\"HD_142666\"\n", "TARGET.NAME")));
    assert!(obx.contains(&format!("{:<40}\"UTs\"\n", "ISS.BASELINE")));
    assert!(obx.contains(&format!("{:<40}\"3.41\"\n", "SEQ.TARG.FLUX.L")));

    let skip_log = fs::read_to_string(out.join("skipped_targets.log")).unwrap();
    assert_eq!(skip_log.lines().count(), 1);
    assert!(skip_log.contains("Skipped sci 'AS 209' (run1/night1_2023-01-10/standalone)"));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Created 3 OBs, skipped 1 targets"), "{stdout}");
}

#[test]
fn test_create_in_service_mode() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs {
        night_plan,
        catalog,
    } = write_inputs(tmp_dir.path());
    let out = tmp_dir.path().join("obs");

    #[rustfmt::skip]
    let output = p2ob()
        .args([
            "create",
            "--night-plan", &night_plan.display().to_string(),
            "--catalog", &catalog.display().to_string(),
            "--output", &out.display().to_string(),
            "--service",
            "--array-configuration", "large",
            "--catalog-delay", "0",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    // The run's label says MATISSE, so there are no GRA4MAT OBs.
    let run = out.join("run1").join("night1_2023-01-10");
    assert!(!run.join("GRA4MAT").exists());
    let obx = fs::read_to_string(run.join("standalone").join("SCI_HD_142666.obx")).unwrap();
    assert!(obx.contains(&format!("{:<40}\"large\"\n", "ISS.BASELINE")));
    assert!(obx.contains(&format!("{:<40}\"LOW\"\n", "INS.DIL.NAME")));
}

#[test]
fn test_create_from_manual_input() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { catalog, .. } = write_inputs(tmp_dir.path());
    let manual = tmp_dir.path().join("targets.yaml");
    fs::write(
        &manual,
        indoc! {r#"
            targets: ["HD 142666"]
            calibrators: [["HD 100920", "HD 150798"]]
            orders: [["b", "a"]]
            tags: [["L", "N"]]
            array_configuration: UTs
        "#},
    )
    .unwrap();
    let out = tmp_dir.path().join("obs");

    #[rustfmt::skip]
    let cmd = p2ob()
        .args([
            "create",
            "--manual", &manual.display().to_string(),
            "--catalog", &catalog.display().to_string(),
            "--output", &out.display().to_string(),
            "--mode", "gr",
            "--catalog-delay", "0",
        ])
        .ok();
    assert!(cmd.is_ok(), "create failed: {}", cmd.err().unwrap());

    let dir = out.join("manual").join("GRA4MAT");
    let mut written: Vec<String> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    written.sort();
    assert_eq!(
        written,
        [
            "CAL_HD_100920_HD_142666_L.obx",
            "CAL_HD_150798_HD_142666_N.obx",
            "SCI_HD_142666.obx",
        ]
    );
    // Nothing was skipped, so there's no log.
    assert!(!out.join("skipped_targets.log").exists());

    let obx = fs::read_to_string(dir.join("SCI_HD_142666.obx")).unwrap();
    assert!(obx.contains(&format!("{:<40}\"MATISSE_img_acq_ft\"\n", "ACQUISITION.TEMPLATE.NAME")));
}

#[test]
fn test_create_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs {
        night_plan,
        catalog,
    } = write_inputs(tmp_dir.path());
    let out = tmp_dir.path().join("obs");

    #[rustfmt::skip]
    let output = p2ob()
        .args([
            "create",
            "--night-plan", &night_plan.display().to_string(),
            "--catalog", &catalog.display().to_string(),
            "--output", &out.display().to_string(),
            "--catalog-delay", "0",
            "--dry-run",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
}

#[test]
fn test_create_without_catalog_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Inputs { night_plan, .. } = write_inputs(tmp_dir.path());
    let out = tmp_dir.path().join("obs");

    #[rustfmt::skip]
    let output = p2ob()
        .args([
            "create",
            "--night-plan", &night_plan.display().to_string(),
            "--catalog", &tmp_dir.path().join("nothing.yaml").display().to_string(),
            "--output", &out.display().to_string(),
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let (_, stderr) = get_cmd_output(Ok(output));
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(!out.exists());
}
