// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Targets and calibrators given by hand instead of in a night plan.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{PipelineError, ResolutionMap};
use crate::{
    instrument::ArrayConfiguration,
    night_plan::{BandTag, CalibratorOrder, CalibratorRef, ObservationGroup},
    settings::read_document_as,
};

/// A single value, or one value per calibrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    /// The values for `n` calibrators. A single value applies to all of
    /// them.
    fn expand(&self, n: usize) -> Option<Vec<T>> {
        match self {
            OneOrMany::One(v) => Some(vec![v.clone(); n]),
            OneOrMany::Many(v) if v.len() == n => Some(v.clone()),
            OneOrMany::Many(_) => None,
        }
    }
}

/// The calibrators of one science target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Calibrators {
    Single(CalibratorRef),
    Multiple(Vec<CalibratorRef>),
}

impl Calibrators {
    pub fn into_vec(self) -> Vec<CalibratorRef> {
        match self {
            Calibrators::Single(c) => vec![c],
            Calibrators::Multiple(c) => c,
        }
    }
}

/// Science targets with their calibrators. Apart from `targets`, every list
/// is either empty or has one entry per target; each entry is a single
/// value or one value per calibrator of that target.
///
/// ```yaml
/// targets: ["HD 142666", "AS 209"]
/// calibrators: [["HD 100920", "HD 150798"], "HD 149447"]
/// orders: [["b", "a"], "a"]
/// tags: ["L", "LN"]
/// resolution: {standard: low, AS 209: med}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManualInput {
    pub targets: Vec<String>,

    #[serde(default)]
    pub calibrators: Vec<OneOrMany<String>>,

    /// Defaults to "after".
    #[serde(default)]
    pub orders: Vec<OneOrMany<CalibratorOrder>>,

    /// Defaults to "LN".
    #[serde(default)]
    pub tags: Vec<OneOrMany<BandTag>>,

    #[serde(default)]
    pub array_configuration: Option<ArrayConfiguration>,

    #[serde(default)]
    pub resolution: Option<ResolutionMap>,
}

impl ManualInput {
    /// Read manual input from a toml, json or yaml file.
    pub fn read_file(path: &Path) -> Result<ManualInput, PipelineError> {
        let input: ManualInput = read_document_as(path)?;
        debug!(
            "Read {} manual targets from {}",
            input.targets.len(),
            path.display()
        );
        Ok(input)
    }

    /// The calibrators of every target.
    pub fn calibrators(&self) -> Result<Vec<Option<Calibrators>>, PipelineError> {
        let num_targets = self.targets.len();
        for (what, len) in [
            ("calibrators", self.calibrators.len()),
            ("orders", self.orders.len()),
            ("tags", self.tags.len()),
        ] {
            if len != 0 && len != num_targets {
                return Err(PipelineError::ManualInput(format!(
                    "there are {num_targets} targets, but {len} entries in '{what}'"
                )));
            }
        }

        let mut all = Vec::with_capacity(num_targets);
        for (i_target, target) in self.targets.iter().enumerate() {
            let names: Vec<String> = match self.calibrators.get(i_target) {
                None => vec![],
                Some(OneOrMany::One(name)) => vec![name.clone()],
                Some(OneOrMany::Many(names)) => names.clone(),
            }
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
            if names.is_empty() {
                all.push(None);
                continue;
            }

            let mismatch = |what: &str| {
                PipelineError::ManualInput(format!(
                    "'{target}' has {} calibrators, but a different number of {what}",
                    names.len()
                ))
            };
            let orders = match self.orders.get(i_target) {
                None => vec![CalibratorOrder::After; names.len()],
                Some(o) => o.expand(names.len()).ok_or_else(|| mismatch("orders"))?,
            };
            let tags = match self.tags.get(i_target) {
                None => vec![BandTag::LN; names.len()],
                Some(t) => t.expand(names.len()).ok_or_else(|| mismatch("tags"))?,
            };

            let mut refs: Vec<CalibratorRef> = names
                .iter()
                .zip(orders)
                .zip(tags)
                .map(|((name, order), tag)| CalibratorRef {
                    name: name.clone(),
                    tag,
                    order,
                })
                .collect();
            all.push(Some(if refs.len() == 1 {
                Calibrators::Single(refs.remove(0))
            } else {
                Calibrators::Multiple(refs)
            }));
        }
        Ok(all)
    }

    /// The input as observation groups, in the order the targets were given.
    pub fn groups(&self) -> Result<Vec<ObservationGroup>, PipelineError> {
        Ok(self
            .targets
            .iter()
            .zip(self.calibrators()?)
            .map(|(target, calibrators)| ObservationGroup {
                target: target.trim().to_string(),
                calibrators: calibrators.map(Calibrators::into_vec).unwrap_or_default(),
            })
            .collect())
    }
}
