// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

/// Night-plan lines whose lower-cased form starts with this are run headers.
pub const DEFAULT_RUN_IDENTIFIER: &str = "run";

/// Night-plan lines whose lower-cased form starts with this are night headers.
pub const DEFAULT_NIGHT_IDENTIFIER: &str = "night";

/// Prefix of a night-plan section label when no header line was found.
pub const FULL_SECTION_PREFIX: &str = "full_";

/// Object names in a night plan starting with this are calibrators, encoded
/// as `cal_<TAG>_<NAME>`.
pub const CALIBRATOR_PREFIX: &str = "cal_";

/// Zero point of the L band (WISE W1) [Jy].
pub const L_BAND_ZERO_POINT: f64 = 309.54;

/// Zero point of the N band (WISE W3) [Jy].
pub const N_BAND_ZERO_POINT: f64 = 31.674;

/// Milliarcseconds per arcsecond.
pub const MAS_PER_ARCSEC: f64 = 1000.0;

/// The moon-angular-distance constraint used for the UTs [degrees].
pub const UT_MOON_ANGULAR_DISTANCE: i64 = 10;

/// Catalog values that mean "not yet determined".
pub const UNDETERMINED_VALUE: &str = "TBD";

/// The width that OBX keys are padded to.
pub const OBX_KEY_WIDTH: usize = 40;

/// The default delay between consecutive catalog queries [milliseconds].
pub const DEFAULT_CATALOG_DELAY_MS: u64 = 100;

/// The name of the skipped-targets log inside an output directory.
pub const SKIP_LOG_FILENAME: &str = "skipped_targets.log";

/// Detector integration times accepted by the instrument [seconds], with the
/// spelling the instrument expects.
pub const ALLOWED_DITS: [(f64, &str); 8] = [
    (0.020, "0.020"),
    (0.075, "0.075"),
    (0.111, "0.111"),
    (0.6, "0.6"),
    (1.0, "1.0"),
    (1.3, "1.3"),
    (3.0, "3.0"),
    (10.0, "10.0"),
];

/// Central wavelengths accepted by the instrument [micrometres], with the
/// spelling the instrument expects.
pub const ALLOWED_CENTRAL_WAVELENGTHS: [(f64, &str); 15] = [
    (3.5, "3.5"),
    (4.1, "4.1"),
    (3.03, "3.03"),
    (3.05, "3.05"),
    (3.17, "3.17"),
    (3.3, "3.3"),
    (3.4, "3.4"),
    (3.52, "3.52"),
    (3.77, "3.77"),
    (3.88, "3.88"),
    (3.95, "3.95"),
    (4.0, "4.0"),
    (4.05, "4.05"),
    (4.65, "4.65"),
    (4.78, "4.78"),
];
