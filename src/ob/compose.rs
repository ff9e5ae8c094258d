// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning a target into an OB.

use std::str::FromStr;

use log::{debug, trace};

use super::{ComposeError, ObDescriptor, Templates};
use crate::{
    catalog::{CatalogQuery, TargetRecord},
    cli::Warn,
    constants::{
        L_BAND_ZERO_POINT, MAS_PER_ARCSEC, N_BAND_ZERO_POINT, UNDETERMINED_VALUE,
        UT_MOON_ANGULAR_DISTANCE,
    },
    coord::RADec,
    instrument::{
        ArrayConfiguration, ArrayFamily, ObservationKind, OperationalMode, Resolution,
        ARRAY_CONFIGURATIONS_COMMA_SEPARATED, OPERATIONAL_MODES_COMMA_SEPARATED,
        RESOLUTIONS_COMMA_SEPARATED,
    },
    night_plan::BandTag,
    settings::Configuration,
};

/// Everything needed to compose one OB, apart from the target's data.
#[derive(Debug, Clone, PartialEq)]
pub struct ObRequest {
    pub target: String,
    pub kind: ObservationKind,
    pub array_configuration: ArrayConfiguration,
    pub operational_mode: OperationalMode,

    /// For calibrators, the science target that they calibrate.
    pub sci_name: Option<String>,

    /// For calibrators, the waveband(s) they are used for.
    pub tag: Option<BandTag>,

    /// The requested resolution. A target's own resolution may beat this.
    pub resolution: Resolution,
}

impl ObRequest {
    /// Build a request from free-form strings. Anything unrecognised is an
    /// [`ComposeError::InvalidConfiguration`].
    pub fn parse(
        target: &str,
        kind: &str,
        array_configuration: &str,
        operational_mode: &str,
        sci_name: Option<&str>,
        tag: Option<&str>,
        resolution: &str,
    ) -> Result<ObRequest, ComposeError> {
        fn parse_one<T: FromStr>(
            what: &'static str,
            value: &str,
            valid: &str,
        ) -> Result<T, ComposeError> {
            T::from_str(value.trim()).map_err(|_| ComposeError::InvalidConfiguration {
                what,
                value: value.to_string(),
                valid: valid.to_string(),
            })
        }

        Ok(ObRequest {
            target: target.trim().to_string(),
            kind: parse_one("observation kind", kind, "sci, cal")?,
            array_configuration: parse_one(
                "array configuration",
                array_configuration,
                &ARRAY_CONFIGURATIONS_COMMA_SEPARATED,
            )?,
            operational_mode: parse_one(
                "operational mode",
                operational_mode,
                &OPERATIONAL_MODES_COMMA_SEPARATED,
            )?,
            sci_name: sci_name.map(|s| s.trim().to_string()),
            tag: tag
                .map(|t| parse_one("calibrator tag", t, "L, N, LN"))
                .transpose()?,
            resolution: parse_one("resolution", resolution, &RESOLUTIONS_COMMA_SEPARATED)?,
        })
    }
}

/// The name of an OB, e.g. `CAL_HD_100920_HD_142666_L`. Spaces become
/// underscores and parentheses are removed.
pub fn ob_name(
    kind: ObservationKind,
    target: &str,
    sci_name: Option<&str>,
    tag: Option<BandTag>,
) -> String {
    let mut name = format!("{}_{}", kind.ob_prefix(), clean_name(target));
    if let Some(sci_name) = sci_name {
        name.push('_');
        name.push_str(&clean_name(sci_name));
    }
    if let Some(tag) = tag {
        name.push('_');
        name.push_str(&tag.to_string());
    }
    name
}

fn clean_name(name: &str) -> String {
    name.trim()
        .replace(|c: char| c == '(' || c == ')', "")
        .replace(' ', "_")
}

/// Builds OBs. The configuration and templates are only read.
pub struct Composer<'a> {
    config: &'a Configuration,
    templates: &'a Templates,
}

impl<'a> Composer<'a> {
    pub fn new(config: &'a Configuration, templates: &'a Templates) -> Composer<'a> {
        Composer { config, templates }
    }

    pub fn config(&self) -> &Configuration {
        self.config
    }

    /// Query the catalogs for the request's target, and merge what they know
    /// with the configuration and templates into an OB.
    pub fn compose<Q: CatalogQuery + ?Sized>(
        &self,
        request: &ObRequest,
        catalog: &mut Q,
    ) -> Result<ObDescriptor, ComposeError> {
        let target = request.target.as_str();
        debug!(
            "Composing {} OB for '{target}' ({}, {}, {})",
            request.kind,
            request.array_configuration,
            request.operational_mode,
            request.resolution
        );

        let record = catalog.query(target, &self.config.catalogs.catalogs)?;
        trace!("Catalog record for '{target}': {record:?}");

        let family = request.array_configuration.family();
        let settings = self.config.resolve(
            request.operational_mode,
            family,
            request.resolution,
            target_resolution(&record, family),
        );

        let (ra, dec) = coordinates(&record, target)?;
        let (prop_ra, prop_dec) = proper_motion(&record);
        let (flux_l, flux_n) = fluxes(&record, target)?;
        let name = ob_name(
            request.kind,
            target,
            request.sci_name.as_deref(),
            request.tag,
        );

        let mut header = self.templates.header.clone();
        header.user.name = name.clone();
        header.user.user_comments = guide_star_comments(&record);
        header.target.name = target.replace(' ', "_");
        header.target.ra = ra;
        header.target.dec = dec;
        header.target.prop_ra = prop_ra;
        header.target.prop_dec = prop_dec;
        header.observation.name = name.clone();
        header.constraints.atm = self.config.constraints.atmosphere()?.to_string();
        header.constraints.sky_transparency =
            self.config.constraints.transparency.ob_name().to_string();
        header.constraints.watervapour = self.config.constraints.pwv;
        if family == ArrayFamily::Uts {
            header.constraints.moon_angular_distance = UT_MOON_ANGULAR_DISTANCE;
        }

        let mode_templates = self.templates.for_mode(request.operational_mode);

        let mut acquisition = mode_templates.acquisition.clone();
        acquisition.flux_l = flux_l;
        acquisition.flux_n = flux_n;
        if let (Some(ra), Some(dec)) = (record.text("GSRa"), record.text("GSDec")) {
            acquisition.guide_alpha = ra;
            acquisition.guide_delta = dec;
            acquisition.guide_source = "SETUPFILE".to_string();
        }
        if let Some(pma) = record.number("GSpropRa") {
            acquisition.guide_pma = pma;
        }
        if let Some(pmd) = record.number("GSpropDec") {
            acquisition.guide_pmd = pmd;
        }
        if let Some(epoch) = record.number("GSepoch") {
            acquisition.guide_epoch = epoch;
        }
        if let Some(equinox) = record.number("GSequinox") {
            acquisition.guide_equinox = equinox;
        }
        acquisition.guide_mag = first_number(&record, &["GSmag", "Vmag", "FLUX_V"]).unwrap_or(0.0);
        acquisition.baseline = request.array_configuration.to_string();
        if let Some(mag_k) = first_number(&record, &["Kmag", "FLUX_K"]) {
            acquisition.mag_k = mag_k;
        }
        if acquisition.mag_h.is_some() {
            if let Some(mag_h) = first_number(&record, &["Hmag", "FLUX_H"]) {
                acquisition.mag_h = Some(mag_h);
            }
        }

        let mut observation = mode_templates.observation.clone();
        observation.category = request.kind.category().to_string();
        observation.l_resolution = settings.resolution;
        observation.dit = settings.dit;
        observation.central_wavelength = settings.central_wavelength;
        observation.photometry = settings.photometry_enabled;

        debug!("Composed OB '{name}'");
        Ok(ObDescriptor {
            name,
            header,
            acquisition,
            observation,
        })
    }
}

fn first_number(record: &TargetRecord, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| record.number(k))
}

/// A target's own L-band resolution for the given array family, if the
/// catalogs know one.
fn target_resolution(record: &TargetRecord, family: ArrayFamily) -> Option<Resolution> {
    let key = match family {
        ArrayFamily::Uts => "LResUT",
        ArrayFamily::Ats => "LResAT",
    };
    let value = record.text(key)?;
    if value.eq_ignore_ascii_case(UNDETERMINED_VALUE) {
        return None;
    }
    match Resolution::from_str(&value) {
        Ok(r) => Some(r),
        Err(_) => {
            debug!("Ignoring unrecognised target resolution {key} = '{value}'");
            None
        }
    }
}

/// Sexagesimal right ascension and declination. The catalog's right
/// ascension and declination are parsed together, so that both get the
/// right units.
fn coordinates(record: &TargetRecord, target: &str) -> Result<(String, String), ComposeError> {
    if let (Some(ra), Some(dec)) = (record.text("local.RA"), record.text("local.DEC")) {
        return Ok((ra, dec));
    }

    let missing = |field| ComposeError::MissingField {
        target: target.to_string(),
        field,
    };
    let ra = record.text("RA").ok_or_else(|| missing("right ascension"))?;
    let dec = record.text("DEC").ok_or_else(|| missing("declination"))?;
    let radec = RADec::parse_sexagesimal(&format!("{ra} {dec}")).map_err(|source| {
        ComposeError::Coordinates {
            target: target.to_string(),
            source,
        }
    })?;
    Ok((radec.ra_hms(), radec.dec_dms()))
}

/// Proper motion [arcsec/yr]. Missing components are 0.
fn proper_motion(record: &TargetRecord) -> (f64, f64) {
    if record.contains("local.propRA") || record.contains("local.propDec") {
        return (
            record.number("local.propRA").unwrap_or(0.0),
            record.number("local.propDec").unwrap_or(0.0),
        );
    }
    (
        record.number("PMRA").map_or(0.0, |pm| pm / MAS_PER_ARCSEC),
        record.number("PMDEC").map_or(0.0, |pm| pm / MAS_PER_ARCSEC),
    )
}

/// A flux density from a magnitude and the band's zero point [Jy].
pub(super) fn flux_from_magnitude(magnitude: f64, zero_point: f64) -> f64 {
    zero_point * 10_f64.powf(-magnitude / 2.5)
}

fn band_flux(
    record: &TargetRecord,
    flux_keys: &[&str],
    magnitude_key: &str,
    zero_point: f64,
) -> Option<f64> {
    first_number(record, flux_keys).or_else(|| {
        record
            .number(magnitude_key)
            .map(|m| flux_from_magnitude(m, zero_point))
    })
}

/// L- and N-band flux densities [Jy]. A single missing band is 0, but a
/// target needs at least one.
fn fluxes(record: &TargetRecord, target: &str) -> Result<(f64, f64), ComposeError> {
    let l = band_flux(record, &["Lflux", "med-Lflux"], "W1mag", L_BAND_ZERO_POINT);
    let n = band_flux(record, &["Nflux", "med-Nflux"], "W3mag", N_BAND_ZERO_POINT);
    match (l, n) {
        (Some(l), Some(n)) => Ok((l, n)),
        (Some(l), None) => {
            format!("No N-band flux for '{target}'; using 0 Jy").warn();
            Ok((l, 0.0))
        }
        (None, Some(n)) => {
            format!("No L-band flux for '{target}'; using 0 Jy").warn();
            Ok((0.0, n))
        }
        (None, None) => Err(ComposeError::MissingField {
            target: target.to_string(),
            field: "L- or N-band flux",
        }),
    }
}

fn guide_star_comments(record: &TargetRecord) -> String {
    let mut comments = vec![];
    if let Some(name) = record.text("GSname") {
        comments.push(format!("GS: {name}"));
    }
    if let Some(distance) = record.number("GSdist") {
        comments.push(format!("GS Distance: {distance:.2} arcsec"));
    }
    comments.join(". ")
}
