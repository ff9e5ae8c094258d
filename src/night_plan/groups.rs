// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reconstruction of observation groups from the lines of a single night.
//!
//! Data lines start with an integer index, followed by the object's name, a
//! numeric ID block (`<int> <int> <float>`) and then whatever else the
//! calibrator-matching tool wrote. Calibrators are named
//! `cal_<TAG>_<NAME>`. Blank lines close the current group.

use std::str::FromStr;

use indexmap::IndexMap;
use log::{debug, trace};

use super::{BandTag, CalibratorOrder, CalibratorRef, ObservationGroup};
use crate::{cli::Warn, constants::CALIBRATOR_PREFIX};

/// An object named on a night-plan data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum PlanObject {
    Science(String),
    Calibrator { name: String, tag: BandTag },
}

fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Get the object name out of the whitespace-separated parts of a data line.
/// The name is everything between the leading line index and the numeric ID
/// block. The ID block must be followed by at least two more parts, otherwise
/// it is treated as part of the name.
pub(super) fn object_name(parts: &[&str]) -> String {
    let cutoff = (1..parts.len())
        .find(|&i| {
            i + 4 < parts.len()
                && is_integer(parts[i])
                && is_integer(parts[i + 1])
                && parts[i + 2].contains('.')
        })
        .unwrap_or(parts.len());
    parts.get(1..cutoff).unwrap_or_default().join(" ")
}

/// Interpret the parts of a data line. `None` is returned if nothing sensible
/// could be found.
pub(super) fn parse_object(parts: &[&str], line_num: usize) -> Option<PlanObject> {
    let name = object_name(parts);
    if name.is_empty() {
        return None;
    }

    match name.strip_prefix(CALIBRATOR_PREFIX) {
        None => Some(PlanObject::Science(name)),
        Some(encoded) => {
            let (tag, cal_name) = encoded.split_once('_')?;
            if cal_name.is_empty() {
                return None;
            }
            let tag = match BandTag::from_str(tag) {
                Ok(t) => t,
                Err(_) => {
                    format!(
                        "Night plan line {line_num}: Unknown band tag '{tag}' for calibrator '{cal_name}'; using {}",
                        BandTag::LN
                    )
                    .warn();
                    BandTag::LN
                }
            };
            Some(PlanObject::Calibrator {
                name: cal_name.to_string(),
                tag,
            })
        }
    }
}

/// Parse the lines of one night into its observation groups, in the order
/// their science targets appear.
///
/// A calibrator seen while no science target is open is observed before the
/// next science target; one seen after a science target is observed after it.
/// Groups without calibrators are kept. Each calibrator line belongs to
/// exactly one group.
pub fn parse_groups<S: AsRef<str>>(lines: &[S]) -> Vec<ObservationGroup> {
    let mut groups: IndexMap<String, Vec<CalibratorRef>> = IndexMap::new();
    let mut current_target: Option<String> = None;
    let mut calibrators: Vec<CalibratorRef> = vec![];

    let mut flush = |target: Option<String>,
                     calibrators: &mut Vec<CalibratorRef>,
                     line_num: usize| {
        match target {
            Some(target) => {
                trace!(
                    "Closing group '{target}' with {} calibrators",
                    calibrators.len()
                );
                if groups
                    .insert(target.clone(), std::mem::take(calibrators))
                    .is_some()
                {
                    format!("Night plan line {line_num}: Science target '{target}' appears more than once in a night; only its last group is kept").warn();
                }
            }
            None if !calibrators.is_empty() => {
                format!(
                    "Night plan line {line_num}: Calibrators {} have no science target; ignoring them",
                    calibrators
                        .iter()
                        .map(|c| c.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
                .warn();
                calibrators.clear();
            }
            None => (),
        }
    };

    for (i, line) in lines.iter().enumerate() {
        let line_num = i + 1;
        let parts: Vec<&str> = line.as_ref().split_whitespace().collect();

        // Blank lines close the current group.
        if parts.is_empty() {
            flush(current_target.take(), &mut calibrators, line_num);
            continue;
        }
        // Comments, headers and other free text.
        if parts[0].starts_with('#') || !is_integer(parts[0]) {
            continue;
        }

        match parse_object(&parts, line_num) {
            None => {
                debug!("Night plan line {line_num}: Couldn't find an object name; ignoring");
            }

            Some(PlanObject::Calibrator { name, tag }) => {
                let order = if current_target.is_none() {
                    CalibratorOrder::Before
                } else {
                    CalibratorOrder::After
                };
                trace!("Night plan line {line_num}: Calibrator '{name}' ({tag}, {order})");
                calibrators.push(CalibratorRef { name, tag, order });
            }

            Some(PlanObject::Science(name)) => {
                trace!("Night plan line {line_num}: Science target '{name}'");
                if let Some(previous) = current_target.take() {
                    if calibrators.is_empty() {
                        format!("Night plan line {line_num}: Science target '{previous}' is directly followed by '{name}' without calibrators or a blank line; dropping '{previous}'").warn();
                    } else {
                        flush(Some(previous), &mut calibrators, line_num);
                    }
                }
                current_target = Some(name);
            }
        }
    }
    flush(current_target.take(), &mut calibrators, lines.len());

    groups
        .into_iter()
        .map(|(target, calibrators)| ObservationGroup {
            target,
            calibrators,
        })
        .collect()
}
