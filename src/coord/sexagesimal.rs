// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Code for handling conversion to and from sexagesimal.

Catalogs give right ascensions in "hours minutes seconds" and declinations in
"degrees minutes seconds". A right ascension and declination are always read
together, so that hours and degrees can't be mixed up between them.
 */

use thiserror::Error;

/// A right ascension and declination pair [degrees].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RADec {
    pub ra: f64,
    pub dec: f64,
}

impl RADec {
    /// Parse a combined right ascension (hours) and declination (degrees)
    /// string, e.g. `"17 56 21.2882 -21 57 21.872"` or
    /// `"17:56:21.2882 -21:57:21.872"`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use p2ob_matisse::coord::sexagesimal::*;
    /// # use approx::*;
    /// # fn main() -> Result<(), SexagesimalError> {
    /// let radec = RADec::parse_sexagesimal("17 56 21.2882 -21 57 21.872")?;
    /// assert_abs_diff_eq!(radec.ra, 269.088700833, epsilon = 1e-6);
    /// assert_abs_diff_eq!(radec.dec, -21.956075556, epsilon = 1e-6);
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse_sexagesimal(s: &str) -> Result<RADec, SexagesimalError> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let (ra_fields, dec_fields): (Vec<&str>, Vec<&str>) = match tokens.len() {
            0 | 1 => return Err(SexagesimalError::CantSplit(s.to_string())),
            // Each half is a single token, possibly colon delimited.
            2 => (
                tokens[0].split(':').collect(),
                tokens[1].split(':').collect(),
            ),
            n => {
                // The declination starts at the first signed token; otherwise
                // the halves are equally long.
                let split = match tokens
                    .iter()
                    .skip(1)
                    .position(|t| t.starts_with('+') || t.starts_with('-'))
                {
                    Some(i) => i + 1,
                    None if n % 2 == 0 => n / 2,
                    None => return Err(SexagesimalError::CantSplit(s.to_string())),
                };
                (tokens[..split].to_vec(), tokens[split..].to_vec())
            }
        };

        let (ra_negative, [h, m, sec]) = parse_fields(&ra_fields, s)?;
        if ra_negative {
            return Err(SexagesimalError::InvalidRa(s.to_string()));
        }
        let ra = sexagesimal_hms_to_degrees(h, m, sec);
        if !(0.0..360.0).contains(&ra) {
            return Err(SexagesimalError::InvalidRa(s.to_string()));
        }

        let (dec_negative, [d, m, sec]) = parse_fields(&dec_fields, s)?;
        let dec_abs = sexagesimal_dms_to_degrees(d, m, sec);
        if dec_abs > 90.0 {
            return Err(SexagesimalError::InvalidDec(s.to_string()));
        }
        let dec = if dec_negative { -dec_abs } else { dec_abs };

        Ok(RADec { ra, dec })
    }

    /// The right ascension as `HH:MM:SS.sss`.
    pub fn ra_hms(&self) -> String {
        degrees_to_sexagesimal_hms(self.ra)
    }

    /// The declination as `DD:MM:SS.sss`, with a leading `-` if negative.
    pub fn dec_dms(&self) -> String {
        degrees_to_sexagesimal_dms(self.dec)
    }
}

/// Parse between one and three sexagesimal fields. The sign of the first
/// field applies to the whole value; the returned fields are unsigned.
fn parse_fields(fields: &[&str], whole: &str) -> Result<(bool, [f64; 3]), SexagesimalError> {
    if fields.is_empty() || fields.len() > 3 {
        return Err(SexagesimalError::WrongFieldCount(whole.to_string()));
    }
    let negative = fields[0].starts_with('-');
    let mut values = [0.0; 3];
    for (value, field) in values.iter_mut().zip(fields) {
        let v: f64 = field.parse()?;
        *value = v.abs();
    }
    if values[1] >= 60.0 || values[2] >= 60.0 {
        return Err(SexagesimalError::OutOfRange(whole.to_string()));
    }
    Ok((negative, values))
}

/// Convert unsigned "degrees minutes seconds" to degrees.
pub fn sexagesimal_dms_to_degrees(d: f64, m: f64, s: f64) -> f64 {
    d + m / 60.0 + s / 3600.0
}

/// Convert unsigned "hours minutes seconds" to degrees.
pub fn sexagesimal_hms_to_degrees(h: f64, m: f64, s: f64) -> f64 {
    sexagesimal_dms_to_degrees(15.0 * h, 15.0 * m, 15.0 * s)
}

/// Format an unsigned number of hours or degrees as `XX:MM:SS.sss`. The
/// rounding is done on whole milliseconds so that 60 seconds never appears.
fn format_colon_sexagesimal(value: f64, negative: bool, wrap: Option<u64>) -> String {
    let mut total_ms = (value * 3_600_000.0).round() as u64;
    if let Some(wrap) = wrap {
        total_ms %= wrap * 3_600_000;
    }
    let sign = if negative && total_ms > 0 { "-" } else { "" };
    format!(
        "{sign}{whole:02}:{min:02}:{sec:02}.{ms:03}",
        whole = total_ms / 3_600_000,
        min = (total_ms / 60_000) % 60,
        sec = (total_ms / 1000) % 60,
        ms = total_ms % 1000,
    )
}

/// Convert a right ascension [degrees] to `HH:MM:SS.sss`.
///
/// # Examples
///
/// ```
/// # use p2ob_matisse::coord::sexagesimal::*;
/// assert_eq!(degrees_to_sexagesimal_hms(269.0887008), "17:56:21.288");
/// ```
pub fn degrees_to_sexagesimal_hms(f: f64) -> String {
    format_colon_sexagesimal(f.rem_euclid(360.0) / 15.0, false, Some(24))
}

/// Convert a declination [degrees] to `DD:MM:SS.sss`.
///
/// # Examples
///
/// ```
/// # use p2ob_matisse::coord::sexagesimal::*;
/// assert_eq!(degrees_to_sexagesimal_dms(-21.9559089), "-21:57:21.272");
/// ```
pub fn degrees_to_sexagesimal_dms(f: f64) -> String {
    format_colon_sexagesimal(f.abs(), f < 0.0, None)
}

#[derive(Error, Debug)]
pub enum SexagesimalError {
    /// Between one and three numbers (fields) are expected per coordinate.
    #[error("Did not get between one and three sexagesimal fields per coordinate: {0}")]
    WrongFieldCount(String),

    #[error("Couldn't separate the right ascension from the declination in '{0}'")]
    CantSplit(String),

    #[error("Minutes or seconds of '{0}' are not below 60")]
    OutOfRange(String),

    #[error("The right ascension of '{0}' is out of range (0h <= RA < 24h)")]
    InvalidRa(String),

    #[error("The declination of '{0}' is out of range (-90° <= Dec <= 90°)")]
    InvalidDec(String),

    #[error("{0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn test_parse_space_delimited() {
        let result = RADec::parse_sexagesimal("17 56 21.2882 -21 57 21.872");
        assert!(result.is_ok(), "{}", result.unwrap_err());
        let radec = result.unwrap();
        assert_abs_diff_eq!(radec.ra, 269.08870083333335, epsilon = 1e-10);
        assert_abs_diff_eq!(radec.dec, -21.956075555555556, epsilon = 1e-10);
        assert_eq!(radec.ra_hms(), "17:56:21.288");
        assert_eq!(radec.dec_dms(), "-21:57:21.872");
    }

    #[test]
    fn test_parse_colon_delimited() {
        let radec = RADec::parse_sexagesimal("11:34:23.7854 +22:58:52.56").unwrap();
        assert_abs_diff_eq!(radec.ra, 173.59910583333334, epsilon = 1e-10);
        assert_abs_diff_eq!(radec.dec, 22.981266666666667, epsilon = 1e-10);
        assert_eq!(radec.dec_dms(), "22:58:52.560");
    }

    #[test]
    fn test_negative_zero_degrees() {
        // The sign must come from the text, as -0 degrees is still south.
        let radec = RADec::parse_sexagesimal("00 00 00.0 -00 30 00").unwrap();
        assert_abs_diff_eq!(radec.dec, -0.5, epsilon = 1e-10);
        assert_eq!(radec.dec_dms(), "-00:30:00.000");
        assert_eq!(radec.ra_hms(), "00:00:00.000");
    }

    #[test]
    fn test_unsigned_declination_splits_evenly() {
        let radec = RADec::parse_sexagesimal("01 02 03 04 05 06").unwrap();
        assert_abs_diff_eq!(radec.ra, 15.5125, epsilon = 1e-10);
        assert_abs_diff_eq!(radec.dec, 4.085, epsilon = 1e-10);
    }

    #[test]
    fn test_rounding_never_gives_60_seconds() {
        assert_eq!(degrees_to_sexagesimal_dms(10.0 - 1e-9), "10:00:00.000");
        assert_eq!(degrees_to_sexagesimal_hms(360.0 - 1e-9), "00:00:00.000");
    }

    #[test]
    fn test_bad_coordinates() {
        assert!(matches!(
            RADec::parse_sexagesimal("17 56 21.2882"),
            Err(SexagesimalError::CantSplit(_))
        ));
        assert!(matches!(
            RADec::parse_sexagesimal("25 00 00 +10 00 00"),
            Err(SexagesimalError::InvalidRa(_))
        ));
        assert!(matches!(
            RADec::parse_sexagesimal("10 00 00 +95 00 00"),
            Err(SexagesimalError::InvalidDec(_))
        ));
        assert!(matches!(
            RADec::parse_sexagesimal("10 61 00 +05 00 00"),
            Err(SexagesimalError::OutOfRange(_))
        ));
        assert!(matches!(
            RADec::parse_sexagesimal("10 a 00 +05 00 00"),
            Err(SexagesimalError::ParseFloat(_))
        ));
        assert!(matches!(
            RADec::parse_sexagesimal("1:2:3:4 5"),
            Err(SexagesimalError::WrongFieldCount(_))
        ));
    }
}
