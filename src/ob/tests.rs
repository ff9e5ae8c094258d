// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::tempdir;

use super::{compose::flux_from_magnitude, *};
use crate::{
    catalog::{Catalog, CatalogError, LocalCatalog, RecordValue, TargetRecord},
    instrument::{ArrayConfiguration, ObservationKind, OperationalMode},
    night_plan::BandTag,
    settings::Configuration,
};

fn record(fields: &[(&str, RecordValue)]) -> TargetRecord {
    fields.iter().cloned().collect()
}

fn hd_142666() -> TargetRecord {
    record(&[
        ("RA", "15 56 40.0221".into()),
        ("DEC", "-22 01 40.002".into()),
        ("PMRA", (-10.5).into()),
        ("PMDEC", (-21.0).into()),
        ("med-Lflux", 3.41.into()),
        ("med-Nflux", 4.8.into()),
        ("W1mag", 4.0.into()),
        ("Vmag", 8.81.into()),
        ("Kmag", 6.08.into()),
        ("Hmag", 6.74.into()),
    ])
}

fn local_catalog() -> LocalCatalog {
    LocalCatalog::from_records([
        ("HD 142666", hd_142666()),
        (
            "HD 100920",
            record(&[
                ("RA", "11 36 47.1".into()),
                ("DEC", "-63 34 21.0".into()),
                ("W1mag", 4.0.into()),
                ("W3mag", 3.9.into()),
            ]),
        ),
    ])
}

fn sci_request(
    array_configuration: ArrayConfiguration,
    operational_mode: OperationalMode,
) -> ObRequest {
    ObRequest {
        target: "HD 142666".to_string(),
        kind: ObservationKind::Science,
        array_configuration,
        operational_mode,
        sci_name: None,
        tag: None,
        resolution: Resolution::Low,
    }
}

#[test]
fn test_builtin_templates() {
    let templates = Templates::builtin().unwrap();
    assert_eq!(templates.matisse.acquisition.template_name, "MATISSE_img_acq");
    assert_eq!(
        templates.gra4mat.acquisition.template_name,
        "MATISSE_img_acq_ft"
    );
    assert!(templates.matisse.acquisition.mag_h.is_none());
    assert!(templates.gra4mat.acquisition.mag_h.is_some());
    assert_eq!(
        templates.gra4mat.observation.template_name,
        "MATISSE_hyb_obs_ft_vis"
    );
    assert_eq!(templates.header.constraints.moon_angular_distance, 30);
    assert_eq!(
        templates.for_mode(OperationalMode::Matisse).observation.l_resolution,
        Resolution::Low
    );
}

#[test]
fn test_template_file_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("templates.toml");
    std::fs::write(
        &path,
        indoc! {r#"
            [header.user]
            userPriority = 3

            [gra4mat.observation]
            "DET1.READ.CURNAME" = "SCI-FAST-SPEED"
        "#},
    )
    .unwrap();

    let templates = Templates::from_file(&path).unwrap();
    let builtin = Templates::builtin().unwrap();
    assert_eq!(templates.header.user.user_priority, 3);
    assert_eq!(templates.gra4mat.observation.read_mode, "SCI-FAST-SPEED");
    assert_eq!(templates.matisse, builtin.matisse);
    assert_eq!(templates.header.target, builtin.header.target);
}

#[test]
fn test_ob_names() {
    assert_eq!(
        ob_name(
            ObservationKind::Calibrator,
            "HD 100920",
            Some("HD 142666"),
            Some(BandTag::L)
        ),
        "CAL_HD_100920_HD_142666_L"
    );
    assert_eq!(
        ob_name(ObservationKind::Science, "HD 142666", None, None),
        "SCI_HD_142666"
    );
    assert_eq!(
        ob_name(ObservationKind::Science, "V* AK Sco (B)", None, None),
        "SCI_V*_AK_Sco_B"
    );
}

#[test]
fn test_request_parsing() {
    let request = ObRequest::parse(
        "HD 100920",
        "CAL",
        "uts",
        "GR",
        Some("HD 142666"),
        Some("ln"),
        "MED",
    )
    .unwrap();
    assert_eq!(request.kind, ObservationKind::Calibrator);
    assert_eq!(request.array_configuration, ArrayConfiguration::Uts);
    assert_eq!(request.operational_mode, OperationalMode::Gra4mat);
    assert_eq!(request.tag, Some(BandTag::LN));
    assert_eq!(request.resolution, Resolution::Med);

    let result = ObRequest::parse("HD 1", "sci", "tiny", "st", None, None, "low");
    assert!(matches!(
        result,
        Err(ComposeError::InvalidConfiguration {
            what: "array configuration",
            ..
        })
    ));
    let result = ObRequest::parse("HD 1", "sci", "small", "gravity", None, None, "low");
    assert!(matches!(
        result,
        Err(ComposeError::InvalidConfiguration {
            what: "operational mode",
            ..
        })
    ));
    assert!(!result.unwrap_err().is_recoverable());
}

#[test]
fn test_compose_science_target() {
    let config = Configuration::default();
    let templates = Templates::builtin().unwrap();
    let composer = Composer::new(&config, &templates);
    let ob = composer
        .compose(
            &sci_request(ArrayConfiguration::Small, OperationalMode::Matisse),
            &mut local_catalog(),
        )
        .unwrap();

    assert_eq!(ob.name, "SCI_HD_142666");
    assert_eq!(ob.header.user.name, "SCI_HD_142666");
    assert_eq!(ob.header.observation.name, "SCI_HD_142666");
    assert_eq!(ob.header.target.name, "HD_142666");
    assert_eq!(ob.header.target.ra, "15:56:40.022");
    assert_eq!(ob.header.target.dec, "-22:01:40.002");
    assert_abs_diff_eq!(ob.header.target.prop_ra, -0.0105, epsilon = 1e-12);
    assert_abs_diff_eq!(ob.header.target.prop_dec, -0.021, epsilon = 1e-12);
    assert_eq!(ob.header.constraints.moon_angular_distance, 30);
    assert_eq!(ob.header.constraints.sky_transparency, "Clear");
    assert_eq!(
        ob.header.constraints.atm,
        "30%  (Seeing < 0.8 arcsec, t0 > 4.1 ms)"
    );
    assert_abs_diff_eq!(ob.header.constraints.watervapour, 10.0);

    // The median flux beats the WISE magnitude.
    assert_abs_diff_eq!(ob.acquisition.flux_l, 3.41);
    assert_abs_diff_eq!(ob.acquisition.flux_n, 4.8);
    assert_abs_diff_eq!(ob.acquisition.mag_k, 6.08);
    assert_abs_diff_eq!(ob.acquisition.guide_mag, 8.81);
    assert_eq!(ob.acquisition.mag_h, None);
    assert_eq!(ob.acquisition.baseline, "small");
    assert_eq!(ob.acquisition.guide_source, "SCIENCE");

    assert_eq!(ob.observation.category, "SCIENCE");
    assert_eq!(ob.observation.l_resolution, Resolution::Low);
    assert_abs_diff_eq!(ob.observation.dit, 0.111);
    assert_abs_diff_eq!(ob.observation.central_wavelength, 4.1);
    assert!(ob.observation.photometry);
}

#[test]
fn test_compose_calibrator_on_uts_with_gra4mat() {
    let config = Configuration::default();
    let templates = Templates::builtin().unwrap();
    let composer = Composer::new(&config, &templates);
    let request = ObRequest {
        target: "HD 100920".to_string(),
        kind: ObservationKind::Calibrator,
        array_configuration: ArrayConfiguration::Uts,
        operational_mode: OperationalMode::Gra4mat,
        sci_name: Some("HD 142666".to_string()),
        tag: Some(BandTag::L),
        resolution: Resolution::Med,
    };
    let ob = composer.compose(&request, &mut local_catalog()).unwrap();

    assert_eq!(ob.name, "CAL_HD_100920_HD_142666_L");
    assert_eq!(ob.header.constraints.moon_angular_distance, 10);
    assert_eq!(ob.acquisition.baseline, "UTs");
    assert_eq!(ob.acquisition.template_name, "MATISSE_img_acq_ft");
    assert_eq!(ob.observation.category, "CALIB");
    assert_eq!(ob.observation.l_resolution, Resolution::Med);
    assert_abs_diff_eq!(ob.observation.dit, 0.6);
    assert_abs_diff_eq!(ob.observation.central_wavelength, 3.52);
    assert!(!ob.observation.photometry);
    // No guide star magnitude, no V magnitude.
    assert_abs_diff_eq!(ob.acquisition.guide_mag, 0.0);
    // The template's H magnitude stays when there's nothing better.
    assert_eq!(ob.acquisition.mag_h, Some(0.0));

    // Fluxes from WISE magnitudes.
    assert_abs_diff_eq!(
        ob.acquisition.flux_l,
        309.54 * 10_f64.powf(-4.0 / 2.5),
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        ob.acquisition.flux_n,
        31.674 * 10_f64.powf(-3.9 / 2.5),
        epsilon = 1e-9
    );
    assert_eq!(
        ob.field("SEQ.TARG.FLUX.L").unwrap().to_string(),
        format!("{:.2}", flux_from_magnitude(4.0, 309.54))
    );
}

#[test]
fn test_compose_is_deterministic() {
    let config = Configuration::default();
    let templates = Templates::builtin().unwrap();
    let composer = Composer::new(&config, &templates);
    let request = sci_request(ArrayConfiguration::Large, OperationalMode::Gra4mat);
    let first = composer.compose(&request, &mut local_catalog()).unwrap();
    let second = composer.compose(&request, &mut local_catalog()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_obx(), second.to_obx());
    assert_eq!(first.acquisition.mag_h, Some(6.74));
}

#[test]
fn test_target_resolution_override() {
    let templates = Templates::builtin().unwrap();
    let mut target = hd_142666();
    target.insert("LResAT", "HIGH".into());
    target.insert("LResUT", "TBD".into());
    let mut catalog = move |_: &str, _: &[Catalog]| Ok::<_, CatalogError>(target.clone());

    // The target's own resolution beats the requested one...
    let config = Configuration::default();
    let composer = Composer::new(&config, &templates);
    let ob = composer
        .compose(
            &sci_request(ArrayConfiguration::Medium, OperationalMode::Gra4mat),
            &mut catalog,
        )
        .unwrap();
    assert_eq!(ob.observation.l_resolution, Resolution::High);
    assert_abs_diff_eq!(ob.observation.dit, 3.0);

    // ... unless that's ignored ...
    let config = Configuration::default().with_overwrite_resolution(true);
    let composer = Composer::new(&config, &templates);
    let ob = composer
        .compose(
            &sci_request(ArrayConfiguration::Medium, OperationalMode::Gra4mat),
            &mut catalog,
        )
        .unwrap();
    assert_eq!(ob.observation.l_resolution, Resolution::Low);

    // ... or undetermined.
    let config = Configuration::default();
    let composer = Composer::new(&config, &templates);
    let ob = composer
        .compose(
            &sci_request(ArrayConfiguration::Uts, OperationalMode::Gra4mat),
            &mut catalog,
        )
        .unwrap();
    assert_eq!(ob.observation.l_resolution, Resolution::Low);
}

#[test]
fn test_local_values_and_guide_star() {
    let config = Configuration::default();
    let templates = Templates::builtin().unwrap();
    let composer = Composer::new(&config, &templates);
    let mut target = hd_142666();
    for (key, value) in [
        ("local.RA", RecordValue::from("15:56:40.100")),
        ("local.DEC", "-22:01:40.200".into()),
        ("local.propRA", 0.25.into()),
        ("GSname", "TYC 6779-305-1".into()),
        ("GSdist", 12.3456.into()),
        ("GSRa", "15:56:41.000".into()),
        ("GSDec", "-22:01:30.000".into()),
        ("GSpropRa", 0.01.into()),
        ("GSmag", 11.2.into()),
    ] {
        target.insert(key, value);
    }
    let mut catalog = move |_: &str, _: &[Catalog]| Ok::<_, CatalogError>(target.clone());

    let ob = composer
        .compose(
            &sci_request(ArrayConfiguration::Extended, OperationalMode::Matisse),
            &mut catalog,
        )
        .unwrap();
    assert_eq!(ob.header.target.ra, "15:56:40.100");
    assert_eq!(ob.header.target.dec, "-22:01:40.200");
    assert_abs_diff_eq!(ob.header.target.prop_ra, 0.25);
    // Local proper motions replace the catalog ones completely.
    assert_abs_diff_eq!(ob.header.target.prop_dec, 0.0);
    assert_eq!(
        ob.header.user.user_comments,
        "GS: TYC 6779-305-1. GS Distance: 12.35 arcsec"
    );
    assert_eq!(ob.acquisition.guide_alpha, "15:56:41.000");
    assert_eq!(ob.acquisition.guide_delta, "-22:01:30.000");
    assert_eq!(ob.acquisition.guide_source, "SETUPFILE");
    assert_abs_diff_eq!(ob.acquisition.guide_pma, 0.01);
    assert_abs_diff_eq!(ob.acquisition.guide_pmd, 0.0);
    assert_abs_diff_eq!(ob.acquisition.guide_mag, 11.2);
}

#[test]
fn test_missing_fields() {
    let config = Configuration::default();
    let templates = Templates::builtin().unwrap();
    let composer = Composer::new(&config, &templates);
    let request = sci_request(ArrayConfiguration::Small, OperationalMode::Matisse);

    // No fluxes at all.
    let mut catalog = |_: &str, _: &[Catalog]| {
        Ok::<_, CatalogError>(record(&[
            ("RA", "15 56 40.0221".into()),
            ("DEC", "-22 01 40.002".into()),
            ("Vmag", 8.81.into()),
        ]))
    };
    let error = composer.compose(&request, &mut catalog).unwrap_err();
    assert!(matches!(error, ComposeError::MissingField { .. }));
    assert!(error.is_recoverable());

    // No declination.
    let mut catalog = |_: &str, _: &[Catalog]| {
        Ok::<_, CatalogError>(record(&[
            ("RA", "15 56 40.0221".into()),
            ("med-Lflux", 1.0.into()),
        ]))
    };
    let error = composer.compose(&request, &mut catalog).unwrap_err();
    assert!(matches!(
        error,
        ComposeError::MissingField {
            field: "declination",
            ..
        }
    ));

    // Only one band; the other is 0.
    let mut catalog = |_: &str, _: &[Catalog]| {
        Ok::<_, CatalogError>(record(&[
            ("RA", "15 56 40.0221".into()),
            ("DEC", "-22 01 40.002".into()),
            ("W3mag", 2.0.into()),
            ("PMRA", RecordValue::Missing),
        ]))
    };
    let ob = composer.compose(&request, &mut catalog).unwrap();
    assert_abs_diff_eq!(ob.acquisition.flux_l, 0.0);
    assert_abs_diff_eq!(ob.acquisition.flux_n, 31.674 * 10_f64.powf(-0.8));
    assert_abs_diff_eq!(ob.header.target.prop_ra, 0.0);

    // Unknown targets.
    let error = composer
        .compose(
            &ObRequest {
                target: "HD 1".to_string(),
                ..request.clone()
            },
            &mut local_catalog(),
        )
        .unwrap_err();
    assert!(matches!(
        error,
        ComposeError::Catalog(CatalogError::NotFound(_))
    ));
    assert!(error.is_recoverable());

    // Garbage coordinates.
    let mut catalog = |_: &str, _: &[Catalog]| {
        Ok::<_, CatalogError>(record(&[
            ("RA", "25 00 00".into()),
            ("DEC", "-22 01 40.002".into()),
            ("med-Lflux", 1.0.into()),
        ]))
    };
    let error = composer.compose(&request, &mut catalog).unwrap_err();
    assert!(matches!(error, ComposeError::Coordinates { .. }));
}

#[test]
fn test_field_values() {
    assert_eq!(
        FieldValue::Real {
            value: 0.5,
            decimals: 1
        }
        .to_string(),
        "0.5"
    );
    assert_eq!(FieldValue::Flag(false).to_string(), "F");
    assert_eq!(
        FieldValue::Real {
            value: 7.775_3,
            decimals: 2
        }
        .to_json(),
        serde_json::json!(7.78)
    );
    assert_eq!(
        FieldValue::snapped(0.02, &crate::constants::ALLOWED_DITS).to_string(),
        "0.020"
    );
    assert_eq!(
        FieldValue::snapped(3.519, &crate::constants::ALLOWED_CENTRAL_WAVELENGTHS).to_string(),
        "3.52"
    );
}

#[test]
fn test_obx_format() {
    let config = Configuration::default();
    let templates = Templates::builtin().unwrap();
    let composer = Composer::new(&config, &templates);
    let ob = composer
        .compose(
            &sci_request(ArrayConfiguration::Small, OperationalMode::Matisse),
            &mut local_catalog(),
        )
        .unwrap();
    let obx = ob.to_obx();

    assert!(obx.starts_with(indoc! {r#"
        name                                    "SCI_HD_142666"
        userComments                            ""
        InstrumentComments                      ""
        userPriority                            "1"
        type                                    "O"


        TARGET.NAME                             "HD_142666"
        propRA                                  "-0.010500"
        propDec                                 "-0.021000"
    "#}));
    assert!(obx.contains("ra                                      \"15:56:40.022\"\n"));
    assert!(obx.contains("DET1.DIT                                \"0.111\"\n"));
    assert!(obx.contains("SEQ.DIL.WL0                             \"4.1\"\n"));
    assert!(obx.contains("SEQ.PHOTO.ST                            \"T\"\n"));
    assert!(obx.contains("INS.DIL.NAME                            \"LOW\"\n"));
    assert!(obx.contains("SEQ.TARG.FLUX.L                         \"3.41\"\n"));
    assert!(obx.ends_with("DPR.CATG                                \"SCIENCE\"\n\n\n"));
    // Six groups, each followed by two empty lines.
    assert_eq!(obx.matches("\"\n\n\n").count(), 6);

    let dir = tempdir().unwrap();
    let path = ob.write_obx(&dir.path().join("run1").join("standalone")).unwrap();
    assert_eq!(path.file_name().unwrap(), "SCI_HD_142666.obx");
    assert_eq!(std::fs::read_to_string(path).unwrap(), obx);
}

#[test]
fn test_field_maps() {
    let config = Configuration::default();
    let templates = Templates::builtin().unwrap();
    let composer = Composer::new(&config, &templates);
    let ob = composer
        .compose(
            &sci_request(ArrayConfiguration::Small, OperationalMode::Matisse),
            &mut local_catalog(),
        )
        .unwrap();
    let acquisition = ob.field_map(Section::Acquisition);
    assert_eq!(
        acquisition.get("ACQUISITION.TEMPLATE.NAME"),
        Some(&serde_json::json!("MATISSE_img_acq"))
    );
    assert_eq!(
        acquisition.get("SEQ.TARG.FLUX.L"),
        Some(&serde_json::json!(3.41))
    );
    let observation = ob.field_map(Section::Observation);
    assert_eq!(observation.get("SEQ.PHOTO.ST"), Some(&serde_json::json!("T")));
    assert_eq!(observation.get("DET1.DIT"), Some(&serde_json::json!(0.111)));
    let target = ob.field_map(Section::Target);
    assert_eq!(target.keys().next().unwrap(), "TARGET.NAME");
}
